//! Entity data model shared by every pipeline stage
//!
//! A single [`EntityCandidate`] structure is threaded through detection,
//! reclassification, resolution and masking. Candidate spans are byte
//! offsets into the normalized text and always fall on char boundaries;
//! [`MaskedEntityRecord::position`] is reported in characters.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity type tag produced by detectors.
///
/// Known types map to a fixed classification and placeholder. Types the
/// base detector reports that are not listed here are carried as
/// [`EntityType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum EntityType {
    Person,
    EmailAddress,
    PhoneNumber,
    Dob,
    AadharNum,
    CreditDebitNo,
    CvvNo,
    ExpiryNo,
    /// Any other label reported by a recognizer, kept verbatim
    Other(String),
}

impl EntityType {
    /// Upper-case label as used by recognizers (`PERSON`, `CVV_NO`, ...).
    pub fn as_label(&self) -> &str {
        match self {
            Self::Person => "PERSON",
            Self::EmailAddress => "EMAIL_ADDRESS",
            Self::PhoneNumber => "PHONE_NUMBER",
            Self::Dob => "DOB",
            Self::AadharNum => "AADHAR_NUM",
            Self::CreditDebitNo => "CREDIT_DEBIT_NO",
            Self::CvvNo => "CVV_NO",
            Self::ExpiryNo => "EXPIRY_NO",
            Self::Other(label) => label.as_str(),
        }
    }

    /// Parse a recognizer label. Unknown labels become [`EntityType::Other`].
    pub fn from_label(label: &str) -> Self {
        match label {
            "PERSON" => Self::Person,
            "EMAIL_ADDRESS" => Self::EmailAddress,
            "PHONE_NUMBER" => Self::PhoneNumber,
            "DOB" => Self::Dob,
            "AADHAR_NUM" => Self::AadharNum,
            "CREDIT_DEBIT_NO" => Self::CreditDebitNo,
            "CVV_NO" => Self::CvvNo,
            "EXPIRY_NO" => Self::ExpiryNo,
            other => Self::Other(other.to_string()),
        }
    }

    /// Canonical classification for this entity type.
    pub fn classification(&self) -> Classification {
        match self {
            Self::Person => Classification::FullName,
            Self::EmailAddress => Classification::Email,
            Self::PhoneNumber => Classification::PhoneNumber,
            Self::Dob => Classification::Dob,
            Self::AadharNum => Classification::AadharNum,
            Self::CreditDebitNo => Classification::CreditDebitNo,
            Self::CvvNo => Classification::CvvNo,
            Self::ExpiryNo => Classification::ExpiryNo,
            Self::Other(label) => Classification::Other(label.to_lowercase()),
        }
    }

    /// Whether this is one of the two date types the reclassifier relabels.
    pub fn is_date(&self) -> bool {
        matches!(self, Self::Dob | Self::ExpiryNo)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

impl From<String> for EntityType {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<EntityType> for String {
    fn from(entity_type: EntityType) -> Self {
        entity_type.as_label().to_string()
    }
}

/// Canonical category name reported for a masked entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Classification {
    FullName,
    Email,
    PhoneNumber,
    Dob,
    AadharNum,
    CreditDebitNo,
    CvvNo,
    ExpiryNo,
    /// Lower-cased label of an unknown entity type
    Other(String),
}

impl Classification {
    pub fn as_str(&self) -> &str {
        match self {
            Self::FullName => "full_name",
            Self::Email => "email",
            Self::PhoneNumber => "phone_number",
            Self::Dob => "dob",
            Self::AadharNum => "aadhar_num",
            Self::CreditDebitNo => "credit_debit_no",
            Self::CvvNo => "cvv_no",
            Self::ExpiryNo => "expiry_no",
            Self::Other(name) => name.as_str(),
        }
    }

    /// Placeholder token substituted into the masked text, e.g. `[email]`.
    pub fn placeholder(&self) -> String {
        format!("[{}]", self.as_str())
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Classification {
    fn from(name: String) -> Self {
        match name.as_str() {
            "full_name" => Self::FullName,
            "email" => Self::Email,
            "phone_number" => Self::PhoneNumber,
            "dob" => Self::Dob,
            "aadhar_num" => Self::AadharNum,
            "credit_debit_no" => Self::CreditDebitNo,
            "cvv_no" => Self::CvvNo,
            "expiry_no" => Self::ExpiryNo,
            _ => Self::Other(name),
        }
    }
}

impl From<Classification> for String {
    fn from(classification: Classification) -> Self {
        classification.as_str().to_string()
    }
}

/// Half-open `[start, end)` range into the normalized text.
///
/// Byte offsets inside the pipeline, character offsets in
/// [`MaskedEntityRecord`]. Serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "[usize; 2]", try_from = "[usize; 2]")]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

impl TextSpan {
    /// Create a non-empty span.
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if start >= end {
            return Err(Error::InvalidSpan {
                start,
                end,
                reason: "start must be before end".to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn overlaps(&self, other: &TextSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check the span against `text`: non-empty, in bounds, on char boundaries.
    pub fn check(&self, text: &str) -> Result<()> {
        let invalid = |reason: String| Error::InvalidSpan {
            start: self.start,
            end: self.end,
            reason,
        };
        if self.start >= self.end {
            return Err(invalid("start must be before end".to_string()));
        }
        if self.end > text.len() {
            return Err(invalid(format!(
                "end is past the end of a text of {} bytes",
                text.len()
            )));
        }
        if !text.is_char_boundary(self.start) || !text.is_char_boundary(self.end) {
            return Err(invalid("offset is not on a char boundary".to_string()));
        }
        Ok(())
    }

    /// Slice `text` by this span. The span must have passed [`TextSpan::check`].
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

impl From<TextSpan> for [usize; 2] {
    fn from(span: TextSpan) -> Self {
        [span.start, span.end]
    }
}

impl TryFrom<[usize; 2]> for TextSpan {
    type Error = String;

    fn try_from([start, end]: [usize; 2]) -> std::result::Result<Self, Self::Error> {
        TextSpan::new(start, end).map_err(|e| e.to_string())
    }
}

/// A detector's proposed occurrence of a PII type.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityCandidate {
    /// Entity type; only the date reclassifier changes it after creation
    pub entity_type: EntityType,
    pub span: TextSpan,
    /// Confidence score (0.0 to 1.0)
    pub confidence: f64,
    /// Which detector produced this candidate
    pub source: String,
}

impl EntityCandidate {
    pub fn new(
        entity_type: EntityType,
        span: TextSpan,
        confidence: f64,
        source: impl Into<String>,
    ) -> Self {
        Self {
            entity_type,
            span,
            confidence,
            source: source.into(),
        }
    }
}

/// One masked entity as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedEntityRecord {
    /// Character span in the normalized (pre-substitution) text
    pub position: TextSpan,
    pub classification: Classification,
    /// Original substring that was masked
    pub entity: String,
}

/// Result of masking one text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedDocument {
    #[serde(rename = "masked_email")]
    pub masked_text: String,
    /// Records in ascending position order
    #[serde(rename = "list_of_masked_entities")]
    pub entities: Vec<MaskedEntityRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_table() {
        let cases = [
            (EntityType::Person, "full_name"),
            (EntityType::EmailAddress, "email"),
            (EntityType::PhoneNumber, "phone_number"),
            (EntityType::Dob, "dob"),
            (EntityType::AadharNum, "aadhar_num"),
            (EntityType::CreditDebitNo, "credit_debit_no"),
            (EntityType::CvvNo, "cvv_no"),
            (EntityType::ExpiryNo, "expiry_no"),
        ];
        for (entity_type, expected) in cases {
            let classification = entity_type.classification();
            assert_eq!(classification.as_str(), expected);
            assert_eq!(classification.placeholder(), format!("[{}]", expected));
        }
    }

    #[test]
    fn test_unknown_type_is_lowercased() {
        let entity_type = EntityType::from_label("IBAN_CODE");
        assert_eq!(entity_type, EntityType::Other("IBAN_CODE".into()));
        assert_eq!(entity_type.classification().as_str(), "iban_code");
        assert_eq!(entity_type.classification().placeholder(), "[iban_code]");
    }

    #[test]
    fn test_label_round_trip() {
        for label in ["PERSON", "CVV_NO", "EXPIRY_NO", "LOCATION"] {
            assert_eq!(EntityType::from_label(label).as_label(), label);
        }
    }

    #[test]
    fn test_span_rejects_empty() {
        assert!(TextSpan::new(3, 3).is_err());
        assert!(TextSpan::new(4, 2).is_err());
        assert_eq!(TextSpan::new(2, 4).unwrap().len(), 2);
    }

    #[test]
    fn test_span_check_bounds_and_boundaries() {
        let text = "héllo";
        assert!(TextSpan { start: 0, end: 6 }.check(text).is_ok());
        assert!(TextSpan { start: 0, end: 7 }.check(text).is_err());
        // 'é' spans bytes 1..3
        assert!(TextSpan { start: 2, end: 4 }.check(text).is_err());
    }

    #[test]
    fn test_span_overlaps() {
        let a = TextSpan { start: 0, end: 10 };
        let b = TextSpan { start: 5, end: 15 };
        let c = TextSpan { start: 10, end: 12 };
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_document_serializes_with_payload_names() {
        let doc = MaskedDocument {
            masked_text: "hi [full_name]".into(),
            entities: vec![MaskedEntityRecord {
                position: TextSpan { start: 3, end: 7 },
                classification: Classification::FullName,
                entity: "John".into(),
            }],
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["masked_email"], "hi [full_name]");
        let record = &json["list_of_masked_entities"][0];
        assert_eq!(record["position"], serde_json::json!([3, 7]));
        assert_eq!(record["classification"], "full_name");
        assert_eq!(record["entity"], "John");

        let back: MaskedDocument = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_span_deserialize_rejects_inverted() {
        let result: std::result::Result<TextSpan, _> = serde_json::from_str("[5, 2]");
        assert!(result.is_err());
    }
}
