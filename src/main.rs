use clap::Parser;
use log::{error, info, LevelFilter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use leaders_scraper_lib::config::{DEFAULT_BASE_URL, DEFAULT_OUTPUT};
use leaders_scraper_lib::{logger, BlockingTransport, Pipeline, RunMode, ScraperConfig};

#[derive(Parser)]
#[command(name = "leaders-scraper")]
#[command(about = "Collect country leaders and the intro paragraph of their Wikipedia page")]
struct Cli {
    /// Where to write the JSON results
    #[arg(short, long, env = "LEADERS_OUTPUT", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Base URL of the country leaders API
    #[arg(long, env = "LEADERS_API_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Process countries and leaders with bounded worker pools
    #[arg(long)]
    concurrent: bool,

    /// Workers per pool when --concurrent is set (at most 10)
    #[arg(long, default_value_t = 10)]
    workers: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

impl Cli {
    fn into_config(self) -> ScraperConfig {
        ScraperConfig {
            base_url: self.base_url,
            output_path: self.output,
            mode: if self.concurrent { RunMode::Concurrent } else { RunMode::Sequential },
            workers: self.workers,
            timeout: Duration::from_secs(self.timeout),
            ..ScraperConfig::default()
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.log_level);
    info!("Starting Leaders Scraper...");

    let config = cli.into_config();
    if let Err(e) = config.validate() {
        error!("{}", e);
        return ExitCode::FAILURE;
    }

    let transport = match BlockingTransport::new(&config) {
        Ok(t) => t,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let pipeline = match Pipeline::new(transport, config) {
        Ok(p) => p,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let summary = pipeline.run();
    if !summary.exported {
        error!("Results were not saved.");
    }
    ExitCode::SUCCESS
}
