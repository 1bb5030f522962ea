//! SafeMask configuration management
//!
//! Every default reproduces the built-in masking behavior, so an empty
//! config file and `MaskerConfig::default()` are equivalent.

use crate::entity::EntityType;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main SafeMask configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskerConfig {
    /// Working language tag passed to recognizers
    pub language: String,

    /// Entity types requested from the analyzer
    pub entities: Vec<EntityType>,

    /// Analyzer configuration
    pub analyzer: AnalyzerConfig,

    /// Contextual CVV detection
    pub cvv: CvvConfig,

    /// Date reclassification
    pub dates: DateContextConfig,

    /// Overlap resolution
    pub resolution: ResolutionConfig,
}

impl Default for MaskerConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            entities: default_requested_entities(),
            analyzer: AnalyzerConfig::default(),
            cvv: CvvConfig::default(),
            dates: DateContextConfig::default(),
            resolution: ResolutionConfig::default(),
        }
    }
}

impl MaskerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string and validate it.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            return Err(Error::Config("language must not be empty".to_string()));
        }
        check_score("analyzer.score_threshold", self.analyzer.score_threshold)?;
        check_score("cvv.keyword_score", self.cvv.keyword_score)?;
        check_score("cvv.proximity_score", self.cvv.proximity_score)?;
        for pattern in &self.analyzer.custom_patterns {
            check_score(&format!("custom pattern '{}'", pattern.name), pattern.score)?;
            if pattern.name.is_empty() {
                return Err(Error::Config(
                    "custom pattern name must not be empty".to_string(),
                ));
            }
        }
        if self.cvv.keywords.iter().any(|k| k.trim().is_empty())
            || self.cvv.card_keywords.iter().any(|k| k.trim().is_empty())
        {
            return Err(Error::Config("CVV keywords must not be empty".to_string()));
        }
        Ok(())
    }
}

fn check_score(field: &str, score: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&score) {
        return Err(Error::Config(format!(
            "{} must be within [0, 1], got {}",
            field, score
        )));
    }
    Ok(())
}

/// Entity types requested from the analyzer by default
pub fn default_requested_entities() -> Vec<EntityType> {
    vec![
        EntityType::Person,
        EntityType::EmailAddress,
        EntityType::PhoneNumber,
        EntityType::Dob,
        EntityType::AadharNum,
        EntityType::CreditDebitNo,
        EntityType::ExpiryNo,
    ]
}

/// Analyzer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Analyzer results scoring below this are dropped
    pub score_threshold: f64,

    /// Known person names matched as whole words (case-sensitive)
    pub person_names: Vec<String>,

    /// Additional pattern recognizers
    pub custom_patterns: Vec<CustomPattern>,
}

/// A user-defined pattern recognizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomPattern {
    /// Pattern name (used as the candidate source)
    pub name: String,

    /// Entity type emitted for matches
    pub entity: EntityType,

    /// Regex pattern
    pub pattern: String,

    /// Confidence score for matches
    pub score: f64,
}

/// Contextual CVV detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CvvConfig {
    /// Phrases that directly precede a CVV (whitespace inside a phrase
    /// matches any whitespace run)
    pub keywords: Vec<String>,

    /// Words that veto a keyword-anchored match when near it
    pub false_positive_words: Vec<String>,

    /// Whole words that make a bare 3-4 digit number look like a CVV
    pub card_keywords: Vec<String>,

    /// Characters inspected on each side of a keyword-anchored match
    pub keyword_window: usize,

    /// Characters inspected on each side of a bare digit token
    pub proximity_window: usize,

    /// Confidence of keyword-anchored candidates
    pub keyword_score: f64,

    /// Confidence of proximity candidates
    pub proximity_score: f64,
}

impl Default for CvvConfig {
    fn default() -> Self {
        Self {
            keywords: strings(&[
                "cvv",
                "cvc",
                "security code",
                "card verification",
                "verification code",
                "card security code",
                "three digit code",
                "four digit code",
            ]),
            false_positive_words: strings(&[
                "year", "date", "phone", "zip", "postal", "age", "quantity", "amount", "price",
            ]),
            card_keywords: strings(&[
                "card", "credit", "debit", "payment", "expire", "expiry", "valid",
            ]),
            keyword_window: 20,
            proximity_window: 50,
            keyword_score: 0.9,
            proximity_score: 0.7,
        }
    }
}

/// Date reclassification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DateContextConfig {
    /// Characters inspected on each side of a date
    pub window: usize,

    /// Keywords that force a date to DOB (checked first)
    pub dob_keywords: Vec<String>,

    /// Keywords that force a date to EXPIRY_NO
    pub expiry_keywords: Vec<String>,
}

impl Default for DateContextConfig {
    fn default() -> Self {
        Self {
            window: 30,
            dob_keywords: strings(&["born", "birth", "dob", "date of birth"]),
            expiry_keywords: strings(&["expiry", "exp", "expires", "valid until", "valid till"]),
        }
    }
}

/// Overlap resolution configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    pub strategy: ResolutionStrategy,
}

/// How overlapping candidates are settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Compare each candidate only against the most recently kept entity
    #[default]
    LastKept,

    /// Keep the non-overlapping subset with the highest total confidence
    Weighted,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
