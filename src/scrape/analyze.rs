use std::sync::LazyLock;

use regex::Regex;

use super::extractor::{Post, ThreadPage};

/// Home charger brands sold in the UK/EU, plus common misspellings.
/// Order matters: the first match wins.
pub const BRANDS: &[&str] = &[
    "Hypervolt", "Hypervault", "Ohme", "Zappi", "Project EV", "Pod Point", "Wallbox", "Easee",
    "Rolec", "EO Charging", "Andersen", "Anderson", "SyncEV", "Alfen", "EVBox", "ChargePoint",
    "Tesla", "ABB", "Garo", "NewMotion", "Shell Recharge", "Connected Kerb", "Hive", "EVEC",
    "Simpson & Partners", "Simpson", "PodPoint", "myenergi", "myenergy", "NexBlue", "GivEnergy", "Indra",
];

/// Specific tariff names come before the supplier names they start with.
pub const TARIFFS: &[&str] = &[
    "Agile Octopus",
    "Intelligent Octopus",
    "Octopus Go",
    "OVO Charge Anytime",
    "Octopus",
    "OVO",
    "British Gas",
    "IOG",
    "Agile",
];

const REASON_FALLBACK_CHARS: usize = 200;

static BRAND_RES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| word_patterns(BRANDS));
static TARIFF_RES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| word_patterns(TARIFFS));
static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s,.]").expect("static regex"));

fn word_patterns(names: &'static [&'static str]) -> Vec<(&'static str, Regex)> {
    names
        .iter()
        .map(|n| (*n, word_regex(n)))
        .collect()
}

fn word_regex(name: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(name))).expect("escaped literal is a valid regex")
}

fn first_match(table: &[(&'static str, Regex)], text: &str) -> Option<&'static str> {
    table.iter().find(|(_, re)| re.is_match(text)).map(|(name, _)| *name)
}

pub fn detect_brand(text: &str) -> Option<&'static str> {
    first_match(&BRAND_RES, text)
}

pub fn detect_tariff(text: &str) -> Option<&'static str> {
    first_match(&TARIFF_RES, text)
}

/// Collapse whitespace and drop everything except word chars, spaces, commas and full stops.
pub fn clean_text(text: &str) -> String {
    let collapsed = collapse(text);
    collapse(&DISALLOWED.replace_all(&collapsed, ""))
}

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First sentence naming `brand`, or the start of the text when no sentence does.
pub fn extract_reason(text: &str, brand: &str) -> String {
    let re = word_regex(brand);
    if let Some(sentence) = text.split('.').find(|s| re.is_match(s)) {
        return clean_text(sentence);
    }
    let head: String = text.chars().take(REASON_FALLBACK_CHARS).collect();
    clean_text(&head)
}

/// A post that names a known brand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mention<'p> {
    pub post: &'p Post,
    pub brand: &'static str,
    pub tariff: Option<&'static str>,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ThreadAnalysis<'p> {
    /// Distinct brands in first-seen order.
    pub brands: Vec<&'static str>,
    pub tariffs: Vec<&'static str>,
    pub mentions: Vec<Mention<'p>>,
}

/// Opening post followed by the replies, without counting the opening post twice.
pub fn thread_posts(page: &ThreadPage) -> impl Iterator<Item = &Post> {
    let opening = page
        .opening
        .as_ref()
        .filter(|op| page.posts.first().map(|p| p.id != op.id).unwrap_or(true));
    opening.into_iter().chain(page.posts.iter())
}

pub fn analyze(page: &ThreadPage) -> ThreadAnalysis<'_> {
    let mut out = ThreadAnalysis::default();
    for post in thread_posts(page) {
        if post.text.is_empty() {
            continue;
        }
        for brand in BRAND_RES.iter().filter(|(_, re)| re.is_match(&post.text)).map(|(n, _)| *n) {
            if !out.brands.contains(&brand) { out.brands.push(brand); }
        }
        for tariff in TARIFF_RES.iter().filter(|(_, re)| re.is_match(&post.text)).map(|(n, _)| *n) {
            if !out.tariffs.contains(&tariff) { out.tariffs.push(tariff); }
        }
        if let Some(brand) = detect_brand(&post.text) {
            out.mentions.push(Mention {
                post,
                brand,
                tariff: detect_tariff(&post.text),
                reason: extract_reason(&post.text, brand),
            });
        }
    }
    out
}
