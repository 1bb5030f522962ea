//! Regex-based pattern recognizers
//!
//! Each `PatternRecognizer` emits one entity type from one or more named
//! patterns. Matches within one pattern never overlap each other; matches
//! from different patterns or recognizers may, and are left for the
//! overlap resolver.

use super::{char_result, EntityRecognizer, RecognizerResult};
use crate::config::CustomPattern;
use crate::entity::{EntityCandidate, EntityType, TextSpan};
use crate::error::{Error, Result};
use crate::text::CharIndex;
use regex::Regex;

/// A named regex with the confidence assigned to its matches.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub name: String,
    pub regex: Regex,
    pub score: f64,
}

impl Pattern {
    /// Compile a pattern.
    pub fn new(name: impl Into<String>, pattern: &str, score: f64) -> Result<Self> {
        let name = name.into();
        let regex = Regex::new(pattern).map_err(|e| Error::Pattern {
            recognizer: name.clone(),
            source: e,
        })?;
        Ok(Self { name, regex, score })
    }
}

/// Recognizer for one entity type backed by regex patterns.
#[derive(Debug, Clone)]
pub struct PatternRecognizer {
    name: String,
    entities: Vec<EntityType>,
    patterns: Vec<Pattern>,
    language: String,
}

impl PatternRecognizer {
    pub fn new(name: impl Into<String>, entity_type: EntityType, patterns: Vec<Pattern>) -> Self {
        Self {
            name: name.into(),
            entities: vec![entity_type],
            patterns,
            language: "en".to_string(),
        }
    }

    /// Restrict this recognizer to `language`.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Build a recognizer from a user-defined pattern.
    pub fn from_custom(custom: &CustomPattern) -> Result<Self> {
        let pattern = Pattern::new(custom.name.clone(), &custom.pattern, custom.score)?;
        Ok(Self::new(
            custom.name.clone(),
            custom.entity.clone(),
            vec![pattern],
        ))
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.entities[0]
    }

    /// All matches of every pattern, in pattern order, as byte spans.
    pub fn find(&self, text: &str) -> Vec<EntityCandidate> {
        let entity_type = self.entity_type();
        self.patterns
            .iter()
            .flat_map(|pattern| {
                pattern.regex.find_iter(text).map(move |m| {
                    EntityCandidate::new(
                        entity_type.clone(),
                        TextSpan {
                            start: m.start(),
                            end: m.end(),
                        },
                        pattern.score,
                        self.name.as_str(),
                    )
                })
            })
            .filter(|c| !c.span.is_empty())
            .collect()
    }
}

impl EntityRecognizer for PatternRecognizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_entities(&self) -> &[EntityType] {
        &self.entities
    }

    fn supports_language(&self, language: &str) -> bool {
        self.language == language
    }

    fn analyze(
        &self,
        text: &str,
        entities: &[EntityType],
        _language: &str,
    ) -> Result<Vec<RecognizerResult>> {
        if !entities.contains(self.entity_type()) {
            return Ok(Vec::new());
        }
        let index = CharIndex::new(text);
        Ok(self
            .find(text)
            .into_iter()
            .filter_map(|c| char_result(&index, &c.entity_type, c.span, c.confidence))
            .collect())
    }
}

/// The fixed set of domain pattern recognizers.
///
/// Built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct PatternRecognizerSet {
    recognizers: Vec<PatternRecognizer>,
}

impl PatternRecognizerSet {
    /// Payment card, national ID, expiry date, date of birth and phone number.
    pub fn builtin(language: &str) -> Result<Self> {
        let recognizers = vec![
            PatternRecognizer::new(
                "credit_card",
                EntityType::CreditDebitNo,
                vec![Pattern::new(
                    "CREDIT_CARD_PATTERN",
                    r"\b(?:\d{4}[-\s]?){3}\d{4}\b",
                    0.85,
                )?],
            ),
            PatternRecognizer::new(
                "aadhar",
                EntityType::AadharNum,
                vec![Pattern::new("AADHAR_PATTERN", r"\b\d{4}\s\d{4}\s\d{4}\b", 0.9)?],
            ),
            PatternRecognizer::new(
                "expiry",
                EntityType::ExpiryNo,
                vec![Pattern::new(
                    "EXPIRY_PATTERN",
                    r"\b(0[1-9]|1[0-2])[/\-](0?[0-9]|[0-9]{2}|[0-9]{4})\b",
                    0.8,
                )?],
            ),
            PatternRecognizer::new(
                "dob",
                EntityType::Dob,
                vec![Pattern::new(
                    "DOB_PATTERN",
                    r"\b(0[1-9]|[12][0-9]|3[01])[-/](0[1-9]|1[0-2])[-/](19|20)\d{2}\b",
                    0.9,
                )?],
            ),
            PatternRecognizer::new(
                "phone",
                EntityType::PhoneNumber,
                vec![Pattern::new(
                    "PHONE_PATTERN",
                    r"(?:\+\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}",
                    0.8,
                )?],
            ),
        ];

        Ok(Self {
            recognizers: recognizers
                .into_iter()
                .map(|r| r.with_language(language))
                .collect(),
        })
    }

    /// Run every recognizer over `text`, one pass each.
    pub fn match_all(&self, text: &str) -> Vec<EntityCandidate> {
        self.recognizers
            .iter()
            .flat_map(|recognizer| recognizer.find(text))
            .collect()
    }

    pub fn recognizers(&self) -> &[PatternRecognizer] {
        &self.recognizers
    }

    pub fn into_recognizers(self) -> Vec<PatternRecognizer> {
        self.recognizers
    }
}

/// Generic email address recognizer.
pub fn email_recognizer(language: &str) -> Result<PatternRecognizer> {
    Ok(PatternRecognizer::new(
        "email",
        EntityType::EmailAddress,
        vec![Pattern::new(
            "EMAIL_PATTERN",
            r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
            1.0,
        )?],
    )
    .with_language(language))
}
