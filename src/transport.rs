use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, COOKIE, SET_COOKIE};
use url::Url;

use crate::config::ScraperConfig;
use crate::error::{ScrapeError, ScrapeResult};
use crate::session::SessionToken;

#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    /// Raw `Set-Cookie` header values, in the order the server sent them.
    pub set_cookies: Vec<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        HttpResponse { status: 200, set_cookies: Vec::new(), body: body.into() }
    }

    pub fn status(status: u16) -> Self {
        HttpResponse { status, ..HttpResponse::default() }
    }

    /// Turns a non-2xx response into the matching error: 403 becomes
    /// `Authorization`, anything else `HttpStatus`.
    pub fn error_for_status(self, url: &Url) -> ScrapeResult<Self> {
        match self.status {
            s if (200..300).contains(&s) => Ok(self),
            403 => Err(ScrapeError::Authorization { url: url.to_string() }),
            status => Err(ScrapeError::HttpStatus { url: url.to_string(), status }),
        }
    }
}

/// The one HTTP operation the scraper needs. `Err` is reserved for transport
/// failures; HTTP error statuses come back as a response.
pub trait HttpTransport: Send + Sync {
    fn get(&self, url: &Url, session: Option<&SessionToken>) -> ScrapeResult<HttpResponse>;
}

pub struct BlockingTransport {
    client: Client,
}

impl BlockingTransport {
    pub fn new(config: &ScraperConfig) -> ScrapeResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ScrapeError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(BlockingTransport { client })
    }
}

impl HttpTransport for BlockingTransport {
    fn get(&self, url: &Url, session: Option<&SessionToken>) -> ScrapeResult<HttpResponse> {
        let transport_err = |e: reqwest::Error| ScrapeError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let mut request = self.client.get(url.clone());
        if let Some(token) = session {
            request = request.header(COOKIE, token.as_str());
        }

        let resp = request.send().map_err(transport_err)?;
        let status = resp.status().as_u16();
        let set_cookies = resp
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        let body = resp.text().map_err(transport_err)?;

        Ok(HttpResponse { status, set_cookies, body })
    }
}
