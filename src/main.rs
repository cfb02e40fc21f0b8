use clap::Parser;
use anyhow::Result;
use dotenvy::dotenv;

mod scrape;
mod telemetry;

/// Scrape EV charger discussions (Reddit + generic forums) into a CSV.
#[derive(Parser)]
#[command(name = "ev-charger-scraper", version, about)]
struct Cli {
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(long, default_value_t = false)]
    json: bool,

    #[command(flatten)]
    scrape: scrape::ScrapeCmd,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // initialize logging/tracing (stderr). Respect RUST_LOG and EVSCRAPE_LOG_FORMAT
    telemetry::config::init_tracing();

    scrape::run(cli.scrape).await
}
