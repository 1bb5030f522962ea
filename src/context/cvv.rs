//! Contextual CVV detection
//!
//! A bare 3-4 digit number is only a card verification code when the text
//! around it says so. Two passes run over the text:
//!
//! 1. keyword-anchored: a CVV phrase followed by separators and 3-4 digits,
//!    vetoed when a false-positive word sits within `keyword_window` chars
//! 2. proximity: any standalone 3-4 digit token with a whole-word card
//!    keyword within `proximity_window` chars, vetoed when that window also
//!    holds an ISO-like date, a `$` amount or a 16-digit card number
//!
//! Results are unioned; a candidate whose span is already taken is dropped,
//! so keyword hits (0.9) shadow proximity hits (0.7) on the same digits.

use super::window;
use crate::config::CvvConfig;
use crate::entity::{EntityCandidate, EntityType, TextSpan};
use crate::error::{Error, Result};
use regex::Regex;

const RECOGNIZER: &str = "cvv";
const KEYWORD_SOURCE: &str = "cvv_keyword";
const PROXIMITY_SOURCE: &str = "cvv_proximity";

/// Two-pass heuristic CVV detector. Built once from config.
#[derive(Debug, Clone)]
pub struct CvvDetector {
    keyword_patterns: Vec<Regex>,
    false_positive_words: Vec<String>,
    card_keyword_patterns: Vec<Regex>,
    digit_token: Regex,
    iso_date: Regex,
    amount: Regex,
    card_number: Regex,
    keyword_window: usize,
    proximity_window: usize,
    keyword_score: f64,
    proximity_score: f64,
}

impl CvvDetector {
    pub fn new(config: &CvvConfig) -> Result<Self> {
        let keyword_patterns = config
            .keywords
            .iter()
            .map(|keyword| {
                compile(&format!(
                    r"(?i){}[\s:,\-]*(\d{{3,4}})",
                    phrase(keyword)
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let card_keyword_patterns = config
            .card_keywords
            .iter()
            .map(|keyword| {
                compile(&format!(r"\b{}\b", phrase(&keyword.to_lowercase())))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            keyword_patterns,
            false_positive_words: config
                .false_positive_words
                .iter()
                .map(|w| w.to_lowercase())
                .collect(),
            card_keyword_patterns,
            digit_token: compile(r"\b\d{3,4}\b")?,
            iso_date: compile(r"\d{4}[-/]\d{2}[-/]\d{2,4}")?,
            amount: compile(r"\$\d+")?,
            card_number: compile(r"\d{4}\s*\d{4}\s*\d{4}\s*\d{4}")?,
            keyword_window: config.keyword_window,
            proximity_window: config.proximity_window,
            keyword_score: config.keyword_score,
            proximity_score: config.proximity_score,
        })
    }

    /// Find CVV candidates in `text`.
    pub fn detect(&self, text: &str) -> Vec<EntityCandidate> {
        let mut found = Vec::new();
        self.keyword_pass(text, &mut found);
        let keyword_hits = found.len();
        self.proximity_pass(text, &mut found);

        tracing::debug!(
            keyword = keyword_hits,
            proximity = found.len() - keyword_hits,
            "CVV detection finished"
        );
        found
    }

    fn keyword_pass(&self, text: &str, found: &mut Vec<EntityCandidate>) {
        for pattern in &self.keyword_patterns {
            for caps in pattern.captures_iter(text) {
                let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let matched = TextSpan {
                    start: whole.start(),
                    end: whole.end(),
                };
                let context = window(text, matched, self.keyword_window).to_lowercase();
                if self
                    .false_positive_words
                    .iter()
                    .any(|word| context.contains(word.as_str()))
                {
                    continue;
                }
                push_unique(
                    found,
                    TextSpan {
                        start: digits.start(),
                        end: digits.end(),
                    },
                    self.keyword_score,
                    KEYWORD_SOURCE,
                );
            }
        }
    }

    fn proximity_pass(&self, text: &str, found: &mut Vec<EntityCandidate>) {
        for token in self.digit_token.find_iter(text) {
            let span = TextSpan {
                start: token.start(),
                end: token.end(),
            };
            let context = window(text, span, self.proximity_window).to_lowercase();

            let has_card_context = self
                .card_keyword_patterns
                .iter()
                .any(|keyword| keyword.is_match(&context));
            if !has_card_context
                || self.iso_date.is_match(&context)
                || self.amount.is_match(&context)
                || self.card_number.is_match(&context)
            {
                continue;
            }
            push_unique(found, span, self.proximity_score, PROXIMITY_SOURCE);
        }
    }
}

fn push_unique(found: &mut Vec<EntityCandidate>, span: TextSpan, score: f64, source: &str) {
    if found.iter().any(|c| c.span == span) {
        return;
    }
    found.push(EntityCandidate::new(EntityType::CvvNo, span, score, source));
}

/// Regex source for a keyword phrase; inner whitespace matches any run.
fn phrase(keyword: &str) -> String {
    keyword
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::Pattern {
        recognizer: RECOGNIZER.to_string(),
        source: e,
    })
}
