use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use uuid::Uuid;

use crate::telemetry::{self, ctx::LogCtx};
use crate::telemetry::emit::Meta;
use crate::telemetry::ops::scrape::{Phase as ScrapePhase, Scrape};

pub mod analyze;
pub mod classify;
pub mod error;
pub mod extractor;
pub mod fetch;
mod input;
pub mod types;
mod write;

use classify::UrlEntry;
use error::ScrapeError;
use fetch::{FetchPolicy, Fetcher};
use types::{CommentMention, ResultSet, ScrapedRecord};

#[derive(Args, Clone, Debug)]
pub struct ScrapeCmd {
    /// File with one thread URL per line
    #[arg(long, default_value = "urls.txt")] pub input: PathBuf,
    /// CSV written once all URLs are processed (overwritten)
    #[arg(long, default_value = "ev_charger_data.csv")] pub output: PathBuf,
    /// Also write one row per brand-mentioning post to this CSV
    #[arg(long)] pub mentions: Option<PathBuf>,
    /// Pause between consecutive URLs
    #[arg(long, default_value_t = 2000)] pub delay_ms: u64,
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))] pub timeout_secs: u64,
    /// Extra attempts after a failed fetch (0 = single attempt)
    #[arg(long, default_value_t = 0)] pub retries: u32,
    #[arg(long, default_value_t = 5)] pub retry_wait_secs: u64,
}

impl ScrapeCmd {
    fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            timeout: Duration::from_secs(self.timeout_secs),
            retries: self.retries,
            retry_wait: Duration::from_secs(self.retry_wait_secs),
        }
    }
}

pub async fn run(args: ScrapeCmd) -> Result<()> {
    let log = telemetry::scrape();
    let t0 = Instant::now();
    let run_id = Uuid::new_v4();
    let _g = log.root_span_kv([
        ("run_id", run_id.to_string()),
        ("input", args.input.display().to_string()),
        ("output", args.output.display().to_string()),
        ("delay_ms", args.delay_ms.to_string()),
        ("retries", args.retries.to_string()),
    ]).entered();

    let urls = input::read_urls(&args.input)?;
    if urls.is_empty() {
        log.warn(format!("No URLs in {}; writing header-only output.", args.input.display()));
    }

    let fetcher = Fetcher::new(args.fetch_policy())?;
    let results = scrape_all(&log, &fetcher, &urls, Duration::from_millis(args.delay_ms)).await;

    {
        let _s = log.span_kv(&ScrapePhase::Write, [("path", args.output.display().to_string())]).entered();
        write::write_records(&args.output, &results.records)?;
        log.info(format!("💾 Wrote {} rows to {}", results.records.len(), args.output.display()));
        if let Some(path) = &args.mentions {
            write::write_mentions(path, &results.mentions)?;
            log.info(format!("💾 Wrote {} mentions to {}", results.mentions.len(), path.display()));
        }
    }

    log.totals(results.records.len(), results.ok_count(), results.failed_count(), results.mentions.len());

    if telemetry::config::json_mode() {
        let summary = summarize(&results, &args.output, args.mentions.as_deref());
        let meta = Meta { duration_ms: Some(t0.elapsed().as_millis()), run_id: Some(run_id.to_string()) };
        log.result(&summary, Some(meta))?;
    }
    Ok(())
}

/// Processes every URL in order; never fails, each URL yields exactly one record.
/// `delay` separates consecutive requests; URLs rejected before fetching don't wait.
pub async fn scrape_all(log: &LogCtx<Scrape>, fetcher: &Fetcher, urls: &[String], delay: Duration) -> ResultSet {
    let mut results = ResultSet::default();
    let mut fetched_any = false;
    for (idx, raw) in urls.iter().enumerate() {
        let _u = log.span_kv(&ScrapePhase::Url, [("n", format!("{}/{}", idx + 1, urls.len())), ("url", raw.clone())]).entered();
        log.info(format!("🔎 Processing URL {}/{}: {}", idx + 1, urls.len(), raw));

        let entry = {
            let _s = log.span(&ScrapePhase::Classify).entered();
            classify::classify(raw)
        };
        let (record, mentions) = match entry {
            Err(err) => (failed(log, raw, None, err), Vec::new()),
            Ok(entry) => {
                if fetched_any && !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                fetched_any = true;
                match scrape_entry(log, fetcher, &entry).await {
                    Ok(out) => out,
                    Err(err) => (failed(log, raw, Some(&entry), err), Vec::new()),
                }
            }
        };
        results.push(record, mentions);
    }
    results
}

async fn scrape_entry(log: &LogCtx<Scrape>, fetcher: &Fetcher, entry: &UrlEntry) -> Result<(ScrapedRecord, Vec<CommentMention>), ScrapeError> {
    let html = {
        let _s = log.span_kv(&ScrapePhase::Fetch, [("target", entry.target.clone())]).entered();
        fetcher
            .fetch_page(&entry.target, |attempt, e| {
                log.warn_kv("⚠️ fetch attempt failed, retrying", [("url", e.url().to_string()), ("attempt", attempt.to_string()), ("error", e.to_string())]);
            })
            .await?
    };

    let page = {
        let _s = log.span_kv(&ScrapePhase::Extract, [("kind", entry.kind.label().to_string())]).entered();
        extractor::extract(entry.kind, &html)?
    };
    if page.posts.is_empty() {
        log.warn_kv("no posts found; check markup or comment availability", [("url", entry.target.clone())]);
    }

    let _s = log.span(&ScrapePhase::Analyze).entered();
    let analysis = analyze::analyze(&page);
    let now = Utc::now();
    let mentions = CommentMention::from_analysis(entry, &page, &analysis, now);
    for m in &mentions {
        log.debug(format!("{} by {}: brand={} tariff={} reason={}", m.comment_id, m.comment_author, m.brand, m.tariff, m.reason));
    }
    let record = ScrapedRecord::success(entry, &page, &analysis, now);
    log.thread_summary(&entry.target, &record.title, record.post_count, mentions.len());
    Ok((record, mentions))
}

fn failed(log: &LogCtx<Scrape>, raw: &str, entry: Option<&UrlEntry>, err: ScrapeError) -> ScrapedRecord {
    log.error_kv("❌ skipped", [("url", raw.to_string()), ("status", err.status().to_string()), ("error", err.to_string())]);
    ScrapedRecord::failure(raw, entry, &err, Utc::now())
}

fn summarize(results: &ResultSet, output: &Path, mentions: Option<&Path>) -> types::ScrapeResult {
    use types::{FailureSample, ScrapeResult, ScrapeTotals};
    ScrapeResult {
        totals: ScrapeTotals {
            urls: results.records.len(),
            ok: results.ok_count(),
            failed: results.failed_count(),
            mentions: results.mentions.len(),
        },
        output: output.display().to_string(),
        mentions_output: mentions.map(|p| p.display().to_string()),
        failures: results
            .records
            .iter()
            .filter(|r| !r.is_ok())
            .map(|r| FailureSample { url: r.thread_url.clone(), status: r.status.clone(), error: r.error.clone() })
            .collect(),
    }
}
