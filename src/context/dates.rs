//! Date-of-birth vs. expiry-date reclassification
//!
//! The DOB and expiry patterns overlap heavily (`01/02/25` fits both
//! shapes), so the final label comes from nearby keywords. DOB keywords are
//! checked first; when neither list matches, the label is left as the
//! recognizer produced it.

use super::window;
use crate::config::DateContextConfig;
use crate::entity::{EntityCandidate, EntityType};

/// Relabels DOB / EXPIRY_NO candidates in place from surrounding keywords.
#[derive(Debug, Clone)]
pub struct DateReclassifier {
    window: usize,
    dob_keywords: Vec<String>,
    expiry_keywords: Vec<String>,
}

impl DateReclassifier {
    pub fn new(config: &DateContextConfig) -> Self {
        Self {
            window: config.window,
            dob_keywords: lowercase(&config.dob_keywords),
            expiry_keywords: lowercase(&config.expiry_keywords),
        }
    }

    /// Relabel date candidates. Spans and other fields are untouched.
    pub fn reclassify(&self, text: &str, candidates: &mut [EntityCandidate]) {
        let mut relabeled = 0usize;

        for candidate in candidates.iter_mut().filter(|c| c.entity_type.is_date()) {
            let snippet = window(text, candidate.span, self.window).to_lowercase();

            let forced = if contains_any(&snippet, &self.dob_keywords) {
                Some(EntityType::Dob)
            } else if contains_any(&snippet, &self.expiry_keywords) {
                Some(EntityType::ExpiryNo)
            } else {
                None
            };

            if let Some(entity_type) = forced {
                if candidate.entity_type != entity_type {
                    relabeled += 1;
                }
                candidate.entity_type = entity_type;
            }
        }

        if relabeled > 0 {
            tracing::debug!(relabeled, "Reclassified date candidates");
        }
    }
}

fn contains_any(snippet: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| snippet.contains(k.as_str()))
}

fn lowercase(items: &[String]) -> Vec<String> {
    items.iter().map(|s| s.to_lowercase()).collect()
}
