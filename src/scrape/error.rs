use thiserror::Error;

/// Why a single URL produced no content. None of these abort the run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("malformed url {url}: {reason}")]
    MalformedUrl { url: String, reason: String },
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

impl ScrapeError {
    pub fn status(&self) -> &'static str {
        match self {
            ScrapeError::MalformedUrl { .. } => "malformed_url",
            ScrapeError::Fetch(_) => "fetch_failed",
            ScrapeError::Extract(_) => "extract_failed",
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Timeout { url } | FetchError::Network { url, .. } | FetchError::Status { url, .. } => url,
        }
    }

    pub(crate) fn from_reqwest(url: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return FetchError::Timeout { url: url.to_string() };
        }
        if let Some(status) = e.status() {
            return FetchError::Status { url: url.to_string(), status: status.as_u16() };
        }
        FetchError::Network { url: url.to_string(), reason: e.to_string() }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("expected markup not found: {0}")]
    MissingStructure(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_tags() {
        let e = ScrapeError::MalformedUrl { url: "x".into(), reason: "no host".into() };
        assert_eq!(e.status(), "malformed_url");
        let e: ScrapeError = FetchError::Status { url: "http://a/".into(), status: 404 }.into();
        assert_eq!(e.status(), "fetch_failed");
        assert_eq!(e.to_string(), "http://a/ returned HTTP 404");
        let e: ScrapeError = ExtractError::MissingStructure("div.commentarea").into();
        assert_eq!(e.status(), "extract_failed");
    }
}
