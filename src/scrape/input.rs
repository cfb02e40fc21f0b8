use std::path::Path;

use anyhow::{Context, Result};

/// Non-blank, trimmed lines of the URL list, in file order.
pub fn read_urls(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read URL list {}", path.display()))?;
    Ok(parse_urls(&text))
}

pub fn parse_urls(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
