use url::Url;

use super::error::ScrapeError;

pub const LEGACY_REDDIT_HOST: &str = "old.reddit.com";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UrlKind {
    Generic,
    Reddit,
}

impl UrlKind {
    /// Value written to the `Source` column.
    pub fn label(&self) -> &'static str {
        match self {
            UrlKind::Generic => "Forum",
            UrlKind::Reddit => "Reddit",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlEntry {
    pub raw: String,
    pub target: String,
    pub kind: UrlKind,
}

pub fn classify(raw: &str) -> Result<UrlEntry, ScrapeError> {
    let raw = raw.trim();
    let malformed = |reason: &str| ScrapeError::MalformedUrl { url: raw.to_string(), reason: reason.to_string() };

    let mut parsed = Url::parse(raw).map_err(|e| malformed(&e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(malformed("unsupported scheme"));
    }
    let host = match parsed.host_str() {
        Some(h) if !h.is_empty() => h.to_ascii_lowercase(),
        _ => return Err(malformed("missing host")),
    };

    if !is_reddit_host(&host) {
        return Ok(UrlEntry { raw: raw.to_string(), target: raw.to_string(), kind: UrlKind::Generic });
    }

    // userinfo, port, path, query and fragment carry over from the parsed url
    parsed
        .set_host(Some(LEGACY_REDDIT_HOST))
        .map_err(|e| malformed(&e.to_string()))?;
    let target = parsed.to_string();

    Ok(UrlEntry { raw: raw.to_string(), target, kind: UrlKind::Reddit })
}

fn is_reddit_host(host: &str) -> bool {
    let host = host.trim_end_matches('.');
    host == "reddit.com" || host.ends_with(".reddit.com")
}
