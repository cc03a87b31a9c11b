use log::{error, info, warn};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::api::LeaderApi;
use crate::config::{RunMode, ScraperConfig};
use crate::error::ScrapeResult;
use crate::extractor::ParagraphExtractor;
use crate::models::{Country, LeaderRecord};
use crate::store::ResultSet;
use crate::transport::HttpTransport;
use crate::worker_pool::for_each_bounded;

/// Counters reported at the end of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub countries: usize,
    pub failed_countries: usize,
    pub leaders: usize,
    pub paragraphs: usize,
    pub failed_paragraphs: usize,
    pub exported: bool,
}

#[derive(Default)]
struct Counters {
    failed_countries: AtomicUsize,
    leaders: AtomicUsize,
    paragraphs: AtomicUsize,
    failed_paragraphs: AtomicUsize,
}

pub struct Pipeline<T: HttpTransport> {
    api: LeaderApi<T>,
    extractor: ParagraphExtractor,
    config: ScraperConfig,
    results: ResultSet,
    counters: Counters,
}

impl<T: HttpTransport> Pipeline<T> {
    pub fn new(transport: T, config: ScraperConfig) -> ScrapeResult<Self> {
        config.validate()?;
        Ok(Pipeline {
            api: LeaderApi::new(transport, &config)?,
            extractor: ParagraphExtractor::new(),
            config,
            results: ResultSet::new(),
            counters: Counters::default(),
        })
    }

    pub fn api(&self) -> &LeaderApi<T> {
        &self.api
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    /// Refresh, fetch countries, collect and enrich every country, export.
    pub fn run(&self) -> RunSummary {
        self.api.refresh_cookie();

        let countries = match self.api.fetch_countries() {
            Ok(countries) => countries,
            Err(e) => {
                error!("An error occurred while getting countries: {}", e);
                Vec::new()
            }
        };

        info!("Processing {} countries ({:?} mode)", countries.len(), self.config.mode);
        let country_count = countries.len();
        match self.config.mode {
            RunMode::Sequential => countries.into_iter().for_each(|c| self.process_country(c)),
            RunMode::Concurrent => {
                for_each_bounded(countries, self.config.pool_size(), |c| self.process_country(c))
            }
        }

        if self.results.is_empty() {
            warn!("No countries collected; exporting an empty result set");
        }
        let exported = self.results.export_or_log(&self.config.output_path);
        if exported {
            info!("Data saved to {}", self.config.output_path.display());
        }

        let summary = RunSummary {
            countries: country_count,
            failed_countries: self.counters.failed_countries.load(Ordering::Relaxed),
            leaders: self.counters.leaders.load(Ordering::Relaxed),
            paragraphs: self.counters.paragraphs.load(Ordering::Relaxed),
            failed_paragraphs: self.counters.failed_paragraphs.load(Ordering::Relaxed),
            exported,
        };
        info!(
            "Scraping completed: {} countries ({} failed), {} leaders, {} paragraphs ({} failed)",
            summary.countries, summary.failed_countries, summary.leaders, summary.paragraphs, summary.failed_paragraphs
        );
        summary
    }

    /// Fetches one country's leaders, enriches them and stores the list.
    /// The country always ends up in the result set, empty if the fetch failed.
    pub fn process_country(&self, country: Country) {
        let mut leaders = match self.api.fetch_leaders(&country) {
            Ok(leaders) => leaders,
            Err(e) => {
                warn!("An error occurred while getting leaders for {}: {}", country, e);
                self.counters.failed_countries.fetch_add(1, Ordering::Relaxed);
                Vec::new()
            }
        };
        info!("{}: {} leaders", country, leaders.len());
        self.counters.leaders.fetch_add(leaders.len(), Ordering::Relaxed);

        match self.config.mode {
            RunMode::Sequential => leaders.iter_mut().for_each(|l| self.enrich_leader(l)),
            RunMode::Concurrent => {
                for_each_bounded(leaders.iter_mut(), self.config.pool_size(), |l| self.enrich_leader(l))
            }
        }

        self.results.insert(country, leaders);
    }

    /// Adds `first_paragraph` to a leader with a usable Wikipedia URL.
    /// Leaders without one are left untouched.
    pub fn enrich_leader(&self, leader: &mut LeaderRecord) {
        let Some(url) = leader.wikipedia_url().map(str::to_string) else {
            return;
        };

        let paragraph = match self
            .extractor
            .try_extract(self.api.transport(), &url, leader.first_name(), leader.last_name())
        {
            Ok(paragraph) => {
                self.counters.paragraphs.fetch_add(1, Ordering::Relaxed);
                paragraph
            }
            Err(e) => {
                warn!("An error occurred while getting paragraphs from Wikipedia: {}", e);
                self.counters.failed_paragraphs.fetch_add(1, Ordering::Relaxed);
                String::new()
            }
        };

        info!("First paragraph for {}: {}", leader.display_name(), paragraph);
        leader.set_first_paragraph(paragraph);
    }
}
