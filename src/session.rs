use log::{debug, info, warn};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;
use std::sync::{Mutex, PoisonError};
use url::Url;

use crate::error::{ScrapeError, ScrapeResult};
use crate::transport::HttpTransport;

/// Opaque API credential: the `Cookie` header value the jar produces for
/// one request URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        SessionToken(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Owns the API cookie jar. Readers take a per-request snapshot; refreshes
/// go through a single-writer gate.
pub struct SessionManager {
    cookie_url: Url,
    jar: Jar,
    refresh_gate: Mutex<()>,
}

impl SessionManager {
    pub fn new(cookie_url: Url) -> Self {
        SessionManager {
            cookie_url,
            jar: Jar::default(),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Cookies the jar would send to `url` right now. Expired ones are left out.
    pub fn snapshot(&self, url: &Url) -> Option<SessionToken> {
        self.jar
            .cookies(url)
            .and_then(|value| value.to_str().ok().map(SessionToken::new))
    }

    /// Asks the cookie endpoint for fresh cookies and merges them into the
    /// jar. On failure the jar is left as it was.
    pub fn refresh(&self, transport: &dyn HttpTransport) -> ScrapeResult<()> {
        let _gate = self.refresh_gate.lock().unwrap_or_else(PoisonError::into_inner);
        self.refresh_locked(transport)
    }

    /// Reactive refresh after `stale` was rejected for `url`. If another
    /// caller already replaced it while we waited for the gate, the newer
    /// cookies are reused without a network call.
    pub fn refresh_after_rejection(
        &self,
        transport: &dyn HttpTransport,
        url: &Url,
        stale: Option<&SessionToken>,
    ) -> ScrapeResult<Option<SessionToken>> {
        let _gate = self.refresh_gate.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = self.snapshot(url) {
            if stale != Some(&current) {
                debug!("Session cookie already renewed by another worker");
                return Ok(Some(current));
            }
        }
        self.refresh_locked(transport)?;
        Ok(self.snapshot(url))
    }

    /// Cookies for `url`, refreshing first when the jar has none.
    pub fn ensure(&self, transport: &dyn HttpTransport, url: &Url) -> Option<SessionToken> {
        if let Some(token) = self.snapshot(url) {
            return Some(token);
        }

        let _gate = self.refresh_gate.lock().unwrap_or_else(PoisonError::into_inner);
        // someone else may have refreshed while we waited
        if let Some(token) = self.snapshot(url) {
            return Some(token);
        }
        match self.refresh_locked(transport) {
            Ok(()) => self.snapshot(url),
            Err(e) => {
                warn!("Proceeding without a session cookie: {}", e);
                None
            }
        }
    }

    fn refresh_locked(&self, transport: &dyn HttpTransport) -> ScrapeResult<()> {
        let resp = transport
            .get(&self.cookie_url, None)?
            .error_for_status(&self.cookie_url)?;

        let headers: Vec<HeaderValue> = resp
            .set_cookies
            .iter()
            .filter_map(|c| HeaderValue::from_str(c).ok())
            .collect();
        if headers.is_empty() {
            return Err(ScrapeError::parse("cookie response", format!("{} set no cookie", self.cookie_url)));
        }

        self.jar.set_cookies(&mut headers.iter(), &self.cookie_url);
        if self.jar.cookies(&self.cookie_url).is_none() {
            return Err(ScrapeError::parse(
                "cookie response",
                format!("{} set no usable cookie", self.cookie_url),
            ));
        }
        info!("Session cookie refreshed.");
        Ok(())
    }
}
