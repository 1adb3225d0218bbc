//! Strategy selection.
//!
//! Dispatch is an ordered table of predicates; the first match wins.

use serde::Serialize;
use std::fmt;

use super::formats::{SourceKind, TargetFormat};

/// How a validated request is turned into output bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Delegate to the external document conversion service.
    ExternalJob,
    /// Return the image bytes unchanged.
    ImagePassthrough,
    /// Produce a plain-text rendition.
    TextExtraction,
    /// Synthesize a descriptive single-page PDF.
    PlaceholderPdf,
    /// Return the original bytes.
    Echo,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::ExternalJob => "external_job",
            Strategy::ImagePassthrough => "image_passthrough",
            Strategy::TextExtraction => "text_extraction",
            Strategy::PlaceholderPdf => "placeholder_pdf",
            Strategy::Echo => "echo",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Predicate = fn(SourceKind, TargetFormat) -> bool;

fn word_to_pdf(source: SourceKind, target: TargetFormat) -> bool {
    source == SourceKind::Word && target == TargetFormat::Pdf
}

fn image_to_image(source: SourceKind, target: TargetFormat) -> bool {
    source == SourceKind::Image && target != TargetFormat::Pdf
}

fn to_text(_: SourceKind, target: TargetFormat) -> bool {
    target == TargetFormat::Txt
}

fn to_pdf(_: SourceKind, target: TargetFormat) -> bool {
    target == TargetFormat::Pdf
}

/// Priority-ordered dispatch table. `Echo` is the fallthrough and has no row.
pub const STRATEGY_TABLE: &[(Strategy, Predicate)] = &[
    (Strategy::ExternalJob, word_to_pdf),
    (Strategy::ImagePassthrough, image_to_image),
    (Strategy::TextExtraction, to_text),
    (Strategy::PlaceholderPdf, to_pdf),
];

/// Pick the strategy for a source MIME type and requested format.
pub fn select_strategy(mime: &str, target: TargetFormat) -> Strategy {
    let source = SourceKind::classify(mime);
    STRATEGY_TABLE
        .iter()
        .find(|(_, matches)| matches(source, target))
        .map(|(strategy, _)| *strategy)
        .unwrap_or(Strategy::Echo)
}
