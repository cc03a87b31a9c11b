pub mod api;
pub mod config;
pub mod error;
pub mod extractor;
pub mod logger;
pub mod models;
pub mod pipeline;
pub mod session;
pub mod store;
pub mod transport;
pub mod worker_pool;

#[cfg(test)]
pub(crate) mod testing;

// Exporting types for convenience
pub use api::LeaderApi;
pub use config::{RunMode, ScraperConfig};
pub use error::{ScrapeError, ScrapeResult};
pub use extractor::{NameQuery, ParagraphExtractor};
pub use models::{Country, LeaderRecord};
pub use pipeline::{Pipeline, RunSummary};
pub use session::{SessionManager, SessionToken};
pub use store::ResultSet;
pub use transport::{BlockingTransport, HttpResponse, HttpTransport};
