use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Scrape;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Url, Classify, Fetch, Extract, Analyze, Write }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Url => "url",
        Phase::Classify => "classify",
        Phase::Fetch => "fetch",
        Phase::Extract => "extract",
        Phase::Analyze => "analyze",
        Phase::Write => "write",
    }}
    fn span(&self) -> Span { match self {
        Phase::Url => info_span!("url"),
        Phase::Classify => info_span!("classify"),
        Phase::Fetch => info_span!("fetch"),
        Phase::Extract => info_span!("extract"),
        Phase::Analyze => info_span!("analyze"),
        Phase::Write => info_span!("write"),
    }}
}

impl OpMarker for Scrape {
    const NAME: &'static str = "scrape";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("scrape") }
}
