//! Scripted transport for offline tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;
use url::Url;

use crate::error::{ScrapeError, ScrapeResult};
use crate::session::SessionToken;
use crate::transport::{HttpResponse, HttpTransport};

type Scripted = ScrapeResult<HttpResponse>;

/// Answers requests from per-URL queues. The last queued answer for a URL is
/// repeated once the queue runs dry; unknown URLs get a 404.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<(String, Option<String>)>>,
    latency: Mutex<HashMap<String, Duration>>,
    rendezvous: Mutex<Option<Rendezvous>>,
}

/// Holds back the first request to each URL under `prefix` until `barrier`
/// has seen all parties, so those requests are answered together.
struct Rendezvous {
    prefix: String,
    barrier: Arc<Barrier>,
    seen: HashSet<String>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, url: &str, response: Scripted) {
        self.routes
            .lock()
            .unwrap()
            .entry(normalize(url))
            .or_default()
            .push_back(response);
    }

    pub fn with(self, url: &str, response: HttpResponse) -> Self {
        self.push(url, Ok(response));
        self
    }

    pub fn with_failure(self, url: &str) -> Self {
        self.push(
            url,
            Err(ScrapeError::Transport { url: url.to_string(), message: "connection refused".into() }),
        );
        self
    }

    /// Delays every answer for `url`.
    pub fn with_latency(self, url: &str, delay: Duration) -> Self {
        self.latency.lock().unwrap().insert(normalize(url), delay);
        self
    }

    /// The first request to each of `parties` distinct URLs starting with
    /// `prefix` waits until all of them have arrived.
    pub fn with_rendezvous(self, prefix: &str, parties: usize) -> Self {
        *self.rendezvous.lock().unwrap() = Some(Rendezvous {
            prefix: prefix.to_string(),
            barrier: Arc::new(Barrier::new(parties)),
            seen: HashSet::new(),
        });
        self
    }

    /// Calls made so far as `(url, cookie header)`.
    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, url: &str) -> usize {
        let url = normalize(url);
        self.calls.lock().unwrap().iter().filter(|(u, _)| *u == url).count()
    }
}

impl HttpTransport for FakeTransport {
    fn get(&self, url: &Url, session: Option<&SessionToken>) -> ScrapeResult<HttpResponse> {
        let key = url.to_string();
        self.calls
            .lock()
            .unwrap()
            .push((key.clone(), session.map(|t| t.as_str().to_string())));

        let barrier = self.rendezvous.lock().unwrap().as_mut().and_then(|r| {
            (key.starts_with(&r.prefix) && r.seen.insert(key.clone())).then(|| Arc::clone(&r.barrier))
        });
        if let Some(barrier) = barrier {
            barrier.wait();
        }
        let delay = self.latency.lock().unwrap().get(&key).copied();
        if let Some(delay) = delay {
            thread::sleep(delay);
        }

        let mut routes = self.routes.lock().unwrap();
        let Some(queue) = routes.get_mut(&key) else {
            return Ok(HttpResponse::status(404));
        };
        if queue.len() > 1 {
            return queue.pop_front().unwrap_or_else(|| Ok(HttpResponse::status(404)));
        }
        match queue.front() {
            Some(Ok(resp)) => Ok(resp.clone()),
            Some(Err(ScrapeError::Transport { url, message })) => {
                Err(ScrapeError::Transport { url: url.clone(), message: message.clone() })
            }
            Some(Err(other)) => Err(ScrapeError::parse("scripted response", other)),
            None => Ok(HttpResponse::status(404)),
        }
    }
}

/// Same form `Url` serializes to, so raw test URLs match requested ones.
fn normalize(url: &str) -> String {
    Url::parse(url).map(|u| u.to_string()).unwrap_or_else(|_| url.to_string())
}

/// A `/cookie` response carrying the given `user_cookie` value.
pub fn cookie_response(value: &str) -> HttpResponse {
    HttpResponse {
        status: 200,
        set_cookies: vec![format!("user_cookie={}; Path=/; HttpOnly", value)],
        body: String::new(),
    }
}
