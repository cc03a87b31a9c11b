use log::{info, warn};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ScraperConfig;
use crate::error::{ScrapeError, ScrapeResult};
use crate::models::{Country, LeaderRecord};
use crate::session::{SessionManager, SessionToken};
use crate::transport::HttpTransport;

/// Client for the country-leaders API. Owns the transport and the session.
pub struct LeaderApi<T: HttpTransport> {
    transport: T,
    session: SessionManager,
    countries_url: Url,
    leaders_url: Url,
}

impl<T: HttpTransport> LeaderApi<T> {
    pub fn new(transport: T, config: &ScraperConfig) -> ScrapeResult<Self> {
        Ok(LeaderApi {
            transport,
            session: SessionManager::new(config.endpoint_url(&config.cookie_endpoint)?),
            countries_url: config.endpoint_url(&config.countries_endpoint)?,
            leaders_url: config.endpoint_url(&config.leaders_endpoint)?,
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Refreshes the session cookie. A failure is logged and otherwise
    /// ignored; later calls cope with a missing or stale cookie.
    pub fn refresh_cookie(&self) -> bool {
        match self.session.refresh(&self.transport) {
            Ok(()) => true,
            Err(e) => {
                warn!("An error occurred while refreshing cookie: {}", e);
                false
            }
        }
    }

    /// Country codes in API order. Always refreshes the cookie first since
    /// its lifetime is unknown.
    pub fn fetch_countries(&self) -> ScrapeResult<Vec<Country>> {
        self.refresh_cookie();
        let token = self.session.snapshot(&self.countries_url);
        let countries: Vec<Country> = self.get_json(&self.countries_url, token.as_ref())?;
        info!("Fetched {} countries", countries.len());
        Ok(countries)
    }

    /// Leaders for `country`. A 403 earns exactly one cookie refresh and one
    /// retry; any other failure, or a failed retry, is returned as is.
    pub fn fetch_leaders(&self, country: &str) -> ScrapeResult<Vec<LeaderRecord>> {
        let mut url = self.leaders_url.clone();
        url.query_pairs_mut().append_pair("country", country);

        let token = self.session.ensure(&self.transport, &url);
        match self.get_json(&url, token.as_ref()) {
            Err(e) if e.is_authorization() => {
                info!("Cookie rejected while fetching leaders for {}; refreshing and retrying once", country);
                let renewed = match self.session.refresh_after_rejection(&self.transport, &url, token.as_ref()) {
                    Ok(t) => t,
                    Err(refresh_err) => {
                        warn!("Cookie refresh failed before retry for {}: {}", country, refresh_err);
                        self.session.snapshot(&url)
                    }
                };
                self.get_json(&url, renewed.as_ref())
            }
            other => other,
        }
    }

    fn get_json<R: DeserializeOwned>(&self, url: &Url, token: Option<&SessionToken>) -> ScrapeResult<R> {
        let resp = self.transport.get(url, token)?.error_for_status(url)?;
        serde_json::from_str(&resp.body).map_err(|e| ScrapeError::parse(format!("JSON from {}", url), e))
    }
}
