use chrono::{DateTime, Utc};
use serde::Serialize;

use super::analyze::{thread_posts, ThreadAnalysis};
use super::classify::UrlEntry;
use super::error::ScrapeError;
use super::extractor::ThreadPage;

pub const STATUS_OK: &str = "ok";
const UNKNOWN_TITLE: &str = "Unknown Title";
const UNKNOWN_AUTHOR: &str = "Unknown";
const NO_TARIFF: &str = "None";
const LIST_SEP: &str = "; ";

pub const RECORD_HEADER: [&str; 13] = [
    "Source", "Thread_URL", "Fetch_URL", "Thread_Title", "Author", "Date", "Body",
    "Post_Count", "Brands", "Tariffs", "Scraped_At", "Status", "Error",
];

pub const MENTION_HEADER: [&str; 10] = [
    "Source", "Thread_URL", "Thread_Title", "Comment_ID", "Comment_Author",
    "Comment_Date", "Brand", "Reason", "Tariff", "Comment_Text",
];

/// One row of the main output, one per input URL.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ScrapedRecord {
    #[serde(rename = "Source")] pub source: String,
    #[serde(rename = "Thread_URL")] pub thread_url: String,
    #[serde(rename = "Fetch_URL")] pub fetch_url: String,
    #[serde(rename = "Thread_Title")] pub title: String,
    #[serde(rename = "Author")] pub author: String,
    #[serde(rename = "Date")] pub date: String,
    #[serde(rename = "Body")] pub body: String,
    #[serde(rename = "Post_Count")] pub post_count: usize,
    #[serde(rename = "Brands")] pub brands: String,
    #[serde(rename = "Tariffs")] pub tariffs: String,
    #[serde(rename = "Scraped_At")] pub scraped_at: String,
    #[serde(rename = "Status")] pub status: String,
    #[serde(rename = "Error")] pub error: String,
}

impl ScrapedRecord {
    pub fn success(entry: &UrlEntry, page: &ThreadPage, analysis: &ThreadAnalysis<'_>, scraped_at: DateTime<Utc>) -> Self {
        let opening = page.opening.as_ref();
        ScrapedRecord {
            source: entry.kind.label().to_string(),
            thread_url: entry.raw.clone(),
            fetch_url: entry.target.clone(),
            title: page.title.clone().unwrap_or_default(),
            author: opening.and_then(|p| p.author.clone()).unwrap_or_default(),
            date: opening.and_then(|p| p.date.clone()).unwrap_or_default(),
            body: opening.map(|p| p.text.clone()).unwrap_or_default(),
            post_count: thread_posts(page).count(),
            brands: analysis.brands.join(LIST_SEP),
            tariffs: analysis.tariffs.join(LIST_SEP),
            scraped_at: format_ts(scraped_at),
            status: STATUS_OK.to_string(),
            error: String::new(),
        }
    }

    /// Row for a URL that produced nothing; content columns stay empty.
    pub fn failure(raw: &str, entry: Option<&UrlEntry>, err: &ScrapeError, scraped_at: DateTime<Utc>) -> Self {
        ScrapedRecord {
            source: entry.map(|e| e.kind.label().to_string()).unwrap_or_default(),
            thread_url: raw.to_string(),
            fetch_url: entry.map(|e| e.target.clone()).unwrap_or_default(),
            title: String::new(),
            author: String::new(),
            date: String::new(),
            body: String::new(),
            post_count: 0,
            brands: String::new(),
            tariffs: String::new(),
            scraped_at: format_ts(scraped_at),
            status: err.status().to_string(),
            error: err.to_string(),
        }
    }

    pub fn is_ok(&self) -> bool { self.status == STATUS_OK }
}

/// One row per post naming a charger brand.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CommentMention {
    #[serde(rename = "Source")] pub source: String,
    #[serde(rename = "Thread_URL")] pub thread_url: String,
    #[serde(rename = "Thread_Title")] pub thread_title: String,
    #[serde(rename = "Comment_ID")] pub comment_id: String,
    #[serde(rename = "Comment_Author")] pub comment_author: String,
    #[serde(rename = "Comment_Date")] pub comment_date: String,
    #[serde(rename = "Brand")] pub brand: String,
    #[serde(rename = "Reason")] pub reason: String,
    #[serde(rename = "Tariff")] pub tariff: String,
    #[serde(rename = "Comment_Text")] pub comment_text: String,
}

impl CommentMention {
    pub fn from_analysis(entry: &UrlEntry, page: &ThreadPage, analysis: &ThreadAnalysis<'_>, scraped_at: DateTime<Utc>) -> Vec<Self> {
        let title = page
            .title
            .as_deref()
            .map(super::analyze::clean_text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
        analysis
            .mentions
            .iter()
            .map(|m| CommentMention {
                source: entry.kind.label().to_string(),
                thread_url: entry.target.clone(),
                thread_title: title.clone(),
                comment_id: m.post.id.clone(),
                comment_author: m.post.author.clone().unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
                comment_date: m.post.date.clone().unwrap_or_else(|| format_ts(scraped_at)),
                brand: m.brand.to_string(),
                reason: m.reason.clone(),
                tariff: m.tariff.unwrap_or(NO_TARIFF).to_string(),
                comment_text: super::analyze::clean_text(&m.post.text),
            })
            .collect()
    }
}

/// Everything a run produced, in input order. Owned by the run loop, consumed by the writer.
#[derive(Debug, Default)]
pub struct ResultSet {
    pub records: Vec<ScrapedRecord>,
    pub mentions: Vec<CommentMention>,
}

impl ResultSet {
    pub fn push(&mut self, record: ScrapedRecord, mentions: Vec<CommentMention>) {
        self.records.push(record);
        self.mentions.extend(mentions);
    }

    pub fn ok_count(&self) -> usize { self.records.iter().filter(|r| r.is_ok()).count() }
    pub fn failed_count(&self) -> usize { self.records.len() - self.ok_count() }
}

pub fn format_ts(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

// JSON result envelope types
#[derive(Serialize)]
pub struct FailureSample { pub url: String, pub status: String, pub error: String }

#[derive(Serialize)]
pub struct ScrapeTotals { pub urls: usize, pub ok: usize, pub failed: usize, pub mentions: usize }

#[derive(Serialize)]
pub struct ScrapeResult {
    pub totals: ScrapeTotals,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentions_output: Option<String>,
    pub failures: Vec<FailureSample>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::analyze::analyze;
    use crate::scrape::classify::classify;
    use crate::scrape::error::FetchError;
    use crate::scrape::extractor::Post;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> { Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap() }

    fn page() -> ThreadPage {
        let op = Post { id: "t3_x".into(), author: Some("op".into()), date: Some("2025-05-01".into()), text: "Ohme vs Zappi?".into() };
        ThreadPage {
            title: Some("Chargers!".into()),
            opening: Some(op),
            posts: vec![Post { id: "t1_a".into(), author: None, date: None, text: "Zappi, on IOG.".into() }],
        }
    }

    #[test]
    fn success_record_fields() {
        let entry = classify("https://www.reddit.com/r/ev/comments/x/y/").unwrap();
        let page = page();
        let rec = ScrapedRecord::success(&entry, &page, &analyze(&page), ts());
        assert_eq!(rec.source, "Reddit");
        assert_eq!(rec.thread_url, "https://www.reddit.com/r/ev/comments/x/y/");
        assert_eq!(rec.fetch_url, "https://old.reddit.com/r/ev/comments/x/y/");
        assert_eq!(rec.author, "op");
        assert_eq!(rec.post_count, 2);
        assert_eq!(rec.brands, "Ohme; Zappi");
        assert_eq!(rec.tariffs, "IOG");
        assert_eq!(rec.scraped_at, "2025-06-01 12:30:00");
        assert!(rec.is_ok());
    }

    #[test]
    fn post_count_includes_opening_post_once() {
        let entry = classify("https://forum.example.org/t/1").unwrap();
        let first = Post { id: "forum_0".into(), author: None, date: None, text: "Rolec".into() };
        let second = Post { id: "forum_1".into(), author: None, date: None, text: "Easee".into() };
        let page = ThreadPage { title: None, opening: Some(first.clone()), posts: vec![first, second] };
        let rec = ScrapedRecord::success(&entry, &page, &analyze(&page), ts());
        assert_eq!(rec.post_count, 2);

        let empty = ThreadPage::default();
        assert_eq!(ScrapedRecord::success(&entry, &empty, &analyze(&empty), ts()).post_count, 0);
    }

    #[test]
    fn failure_record_is_empty_with_status() {
        let entry = classify("https://forum.example.org/t/1").unwrap();
        let err: ScrapeError = FetchError::Status { url: entry.target.clone(), status: 404 }.into();
        let rec = ScrapedRecord::failure(&entry.raw, Some(&entry), &err, ts());
        assert_eq!(rec.source, "Forum");
        assert_eq!(rec.status, "fetch_failed");
        assert!(rec.error.contains("404"));
        assert!(rec.title.is_empty() && rec.body.is_empty() && rec.brands.is_empty());
        assert!(!rec.is_ok());
    }

    #[test]
    fn mentions_use_placeholders() {
        let entry = classify("https://www.reddit.com/r/ev/comments/x/y/").unwrap();
        let page = page();
        let rows = CommentMention::from_analysis(&entry, &page, &analyze(&page), ts());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].thread_title, "Chargers");
        assert_eq!(rows[0].brand, "Ohme");
        assert_eq!(rows[0].tariff, "None");
        assert_eq!(rows[1].comment_author, "Unknown");
        assert_eq!(rows[1].comment_date, "2025-06-01 12:30:00");
        assert_eq!(rows[1].tariff, "IOG");
        assert_eq!(rows[1].thread_url, "https://old.reddit.com/r/ev/comments/x/y/");
    }
}
