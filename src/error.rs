use thiserror::Error;

/// Everything that can go wrong while scraping. Component operations return
/// these; the pipeline logs them and falls back to an empty value.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Network failure, DNS, timeout.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// HTTP 403. Kept apart from other statuses because it triggers a
    /// credential refresh and one retry.
    #[error("authorization rejected by {url}")]
    Authorization { url: String },

    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("could not parse {what}: {message}")]
    Parse { what: String, message: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ScrapeError {
    pub fn parse(what: impl Into<String>, message: impl ToString) -> Self {
        ScrapeError::Parse {
            what: what.into(),
            message: message.to_string(),
        }
    }

    pub fn is_authorization(&self) -> bool {
        matches!(self, ScrapeError::Authorization { .. })
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;
