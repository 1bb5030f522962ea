//! Context-window heuristics
//!
//! Detectors and relabeling passes that look at the characters around a
//! span rather than at the span alone:
//! - [`CvvDetector`] finds card verification codes near card vocabulary
//! - [`DateReclassifier`] settles DOB vs. expiry-date ambiguity

pub mod cvv;
pub mod dates;

pub use cvv::CvvDetector;
pub use dates::DateReclassifier;

use crate::entity::TextSpan;

/// Substring of `text` covering `span` plus up to `radius` characters on
/// each side, clamped to the text.
///
/// `span` must lie on char boundaries of `text`.
pub fn window(text: &str, span: TextSpan, radius: usize) -> &str {
    let from = text[..span.start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(span.start);
    let to = text[span.end..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| span.end + i)
        .unwrap_or(text.len());
    &text[from..to]
}
