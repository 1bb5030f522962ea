//! Entity analyzer
//!
//! Defines the `EntityRecognizer` trait, the seam through which the
//! general-purpose named-entity recognizer and the domain pattern
//! recognizers are invoked together, and `AnalyzerEngine`, which runs every
//! registered recognizer for a requested set of entity types.
//!
//! ## Architecture
//!
//! ```text
//! text ─┬─ [PatternRecognizer × N] ─┐
//!       ├─ [DenyListRecognizer]   ──┼─ filter ─ validate ─ EntityCandidate
//!       └─ [external NER]         ──┘
//! ```
//!
//! Recognizers report character offsets; candidates carry byte offsets
//! into the same text. Every candidate carries the producing recognizer's
//! name as its `source`.

pub mod deny_list;
pub mod pattern;

pub use deny_list::DenyListRecognizer;
pub use pattern::{email_recognizer, Pattern, PatternRecognizer, PatternRecognizerSet};

use crate::entity::{EntityCandidate, EntityType, TextSpan};
use crate::error::{Error, Result};
use crate::text::CharIndex;

/// A raw entity reported by a recognizer.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizerResult {
    pub entity_type: EntityType,
    /// Start character offset in the analyzed text
    pub start: usize,
    /// End character offset (exclusive)
    pub end: usize,
    /// Confidence score (0.0 to 1.0)
    pub score: f64,
}

/// Pluggable entity recognizer.
///
/// Implementations must be reentrant: `analyze` takes `&self` and may be
/// called concurrently from independent requests.
pub trait EntityRecognizer: Send + Sync {
    /// Name used as the candidate source and in logs.
    fn name(&self) -> &str;

    /// Entity types this recognizer can produce.
    fn supported_entities(&self) -> &[EntityType];

    /// Whether this recognizer handles `language`.
    fn supports_language(&self, _language: &str) -> bool {
        true
    }

    /// Find entities of the requested types in `text`.
    ///
    /// Failures must be reported, not swallowed; use [`Error::detector`].
    fn analyze(
        &self,
        text: &str,
        entities: &[EntityType],
        language: &str,
    ) -> Result<Vec<RecognizerResult>>;
}

/// Ordered collection of recognizers. Built once, then read-only.
#[derive(Default)]
pub struct RecognizerRegistry {
    recognizers: Vec<Box<dyn EntityRecognizer>>,
}

impl RecognizerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a recognizer. Recognizers run in registration order.
    pub fn add_recognizer(&mut self, recognizer: Box<dyn EntityRecognizer>) {
        tracing::debug!(
            recognizer = recognizer.name(),
            entities = ?recognizer.supported_entities(),
            "Registered recognizer"
        );
        self.recognizers.push(recognizer);
    }

    /// Register every recognizer of a pattern set.
    pub fn add_pattern_set(&mut self, set: PatternRecognizerSet) {
        for recognizer in set.into_recognizers() {
            self.add_recognizer(Box::new(recognizer));
        }
    }

    /// Recognizers that support `language` and at least one requested type.
    pub fn recognizers_for<'a>(
        &'a self,
        entities: &'a [EntityType],
        language: &'a str,
    ) -> impl Iterator<Item = &'a Box<dyn EntityRecognizer>> + 'a {
        self.recognizers.iter().filter(move |r| {
            r.supports_language(language)
                && r.supported_entities().iter().any(|e| entities.contains(e))
        })
    }

    pub fn len(&self) -> usize {
        self.recognizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recognizers.is_empty()
    }
}

/// Runs registered recognizers and turns their output into candidates.
pub struct AnalyzerEngine {
    registry: RecognizerRegistry,
    language: String,
    score_threshold: f64,
}

impl AnalyzerEngine {
    pub fn new(registry: RecognizerRegistry, language: impl Into<String>) -> Self {
        Self {
            registry,
            language: language.into(),
            score_threshold: 0.0,
        }
    }

    /// Drop results scoring below `threshold`.
    pub fn with_score_threshold(mut self, threshold: f64) -> Self {
        self.score_threshold = threshold;
        self
    }

    pub fn registry(&self) -> &RecognizerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut RecognizerRegistry {
        &mut self.registry
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Analyze `text` for the requested entity types.
    ///
    /// Any recognizer error, or any result with an invalid span or score,
    /// fails the whole call.
    pub fn analyze(&self, text: &str, entities: &[EntityType]) -> Result<Vec<EntityCandidate>> {
        let mut candidates = Vec::new();
        let index = CharIndex::new(text);

        for recognizer in self.registry.recognizers_for(entities, &self.language) {
            let results = recognizer.analyze(text, entities, &self.language)?;
            let before = candidates.len();

            for result in results {
                if !entities.contains(&result.entity_type) {
                    continue;
                }
                if !(0.0..=1.0).contains(&result.score) {
                    return Err(Error::detector(
                        recognizer.name(),
                        format!(
                            "score {} for {} is outside [0, 1]",
                            result.score, result.entity_type
                        ),
                    ));
                }
                let span = byte_span(&index, &result)
                    .map_err(|e| Error::detector(recognizer.name(), e.to_string()))?;

                if result.score < self.score_threshold {
                    continue;
                }
                candidates.push(EntityCandidate::new(
                    result.entity_type,
                    span,
                    result.score,
                    recognizer.name(),
                ));
            }

            tracing::debug!(
                recognizer = recognizer.name(),
                found = candidates.len() - before,
                "Recognizer finished"
            );
        }

        Ok(candidates)
    }
}

/// Convert a recognizer's character span to a byte span of the same text.
fn byte_span(index: &CharIndex, result: &RecognizerResult) -> Result<TextSpan> {
    let invalid = |reason: String| Error::InvalidSpan {
        start: result.start,
        end: result.end,
        reason,
    };
    if result.start >= result.end {
        return Err(invalid("start must be before end".to_string()));
    }
    match (index.to_byte(result.start), index.to_byte(result.end)) {
        (Some(start), Some(end)) => Ok(TextSpan { start, end }),
        _ => Err(invalid(format!(
            "end is past the end of a text of {} chars",
            index.char_len()
        ))),
    }
}

/// Convert a byte span from a regex match into a recognizer result.
pub(crate) fn char_result(
    index: &CharIndex,
    entity_type: &EntityType,
    span: TextSpan,
    score: f64,
) -> Option<RecognizerResult> {
    Some(RecognizerResult {
        entity_type: entity_type.clone(),
        start: index.to_char(span.start)?,
        end: index.to_char(span.end)?,
        score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Recognizer returning a fixed result list, standing in for an NER engine.
    struct FixedRecognizer {
        entities: Vec<EntityType>,
        results: Vec<RecognizerResult>,
    }

    impl EntityRecognizer for FixedRecognizer {
        fn name(&self) -> &str {
            "fixed"
        }

        fn supported_entities(&self) -> &[EntityType] {
            &self.entities
        }

        fn analyze(
            &self,
            _text: &str,
            _entities: &[EntityType],
            _language: &str,
        ) -> Result<Vec<RecognizerResult>> {
            Ok(self.results.clone())
        }
    }

    struct FailingRecognizer {
        entities: Vec<EntityType>,
    }

    impl EntityRecognizer for FailingRecognizer {
        fn name(&self) -> &str {
            "failing"
        }

        fn supported_entities(&self) -> &[EntityType] {
            &self.entities
        }

        fn analyze(
            &self,
            _text: &str,
            _entities: &[EntityType],
            _language: &str,
        ) -> Result<Vec<RecognizerResult>> {
            Err(Error::detector("failing", "model not loaded"))
        }
    }

    struct GermanOnly {
        entities: Vec<EntityType>,
    }

    impl EntityRecognizer for GermanOnly {
        fn name(&self) -> &str {
            "german"
        }

        fn supported_entities(&self) -> &[EntityType] {
            &self.entities
        }

        fn supports_language(&self, language: &str) -> bool {
            language == "de"
        }

        fn analyze(
            &self,
            _text: &str,
            _entities: &[EntityType],
            _language: &str,
        ) -> Result<Vec<RecognizerResult>> {
            Err(Error::detector("german", "should not run"))
        }
    }

    fn result(entity_type: EntityType, start: usize, end: usize, score: f64) -> RecognizerResult {
        RecognizerResult {
            entity_type,
            start,
            end,
            score,
        }
    }

    fn engine_with(recognizer: Box<dyn EntityRecognizer>) -> AnalyzerEngine {
        let mut registry = RecognizerRegistry::new();
        registry.add_recognizer(recognizer);
        AnalyzerEngine::new(registry, "en")
    }

    #[test]
    fn test_candidates_carry_source() {
        let engine = engine_with(Box::new(FixedRecognizer {
            entities: vec![EntityType::Person],
            results: vec![result(EntityType::Person, 0, 4, 0.85)],
        }));
        let candidates = engine.analyze("John here", &[EntityType::Person]).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].source, "fixed");
        assert_eq!(candidates[0].span, TextSpan { start: 0, end: 4 });
    }

    #[test]
    fn test_unrequested_types_filtered() {
        let engine = engine_with(Box::new(FixedRecognizer {
            entities: vec![EntityType::Person, EntityType::Other("LOCATION".into())],
            results: vec![
                result(EntityType::Person, 0, 4, 0.85),
                result(EntityType::Other("LOCATION".into()), 10, 15, 0.85),
            ],
        }));
        let candidates = engine
            .analyze("John from Paris", &[EntityType::Person])
            .unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].entity_type, EntityType::Person);
    }

    #[test]
    fn test_unsupported_recognizer_skipped() {
        let engine = engine_with(Box::new(FailingRecognizer {
            entities: vec![EntityType::Person],
        }));
        let candidates = engine.analyze("text", &[EntityType::EmailAddress]).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_other_language_skipped() {
        let engine = engine_with(Box::new(GermanOnly {
            entities: vec![EntityType::Person],
        }));
        assert!(engine.analyze("text", &[EntityType::Person]).unwrap().is_empty());
    }

    #[test]
    fn test_recognizer_error_propagates() {
        let engine = engine_with(Box::new(FailingRecognizer {
            entities: vec![EntityType::Person],
        }));
        let err = engine.analyze("text", &[EntityType::Person]).unwrap_err();
        assert!(matches!(err, Error::Detector { ref detector, .. } if detector == "failing"));
    }

    #[test]
    fn test_out_of_bounds_result_is_detector_error() {
        let engine = engine_with(Box::new(FixedRecognizer {
            entities: vec![EntityType::Person],
            results: vec![result(EntityType::Person, 2, 40, 0.85)],
        }));
        let err = engine.analyze("short", &[EntityType::Person]).unwrap_err();
        assert!(matches!(err, Error::Detector { .. }));
    }

    #[test]
    fn test_empty_span_is_detector_error() {
        let engine = engine_with(Box::new(FixedRecognizer {
            entities: vec![EntityType::Person],
            results: vec![result(EntityType::Person, 3, 3, 0.85)],
        }));
        assert!(engine.analyze("short", &[EntityType::Person]).is_err());
    }

    #[test]
    fn test_bad_score_is_detector_error() {
        let engine = engine_with(Box::new(FixedRecognizer {
            entities: vec![EntityType::Person],
            results: vec![result(EntityType::Person, 0, 2, 1.2)],
        }));
        assert!(engine.analyze("short", &[EntityType::Person]).is_err());

        let engine = engine_with(Box::new(FixedRecognizer {
            entities: vec![EntityType::Person],
            results: vec![result(EntityType::Person, 0, 2, f64::NAN)],
        }));
        assert!(engine.analyze("short", &[EntityType::Person]).is_err());
    }

    #[test]
    fn test_score_threshold() {
        let engine = engine_with(Box::new(FixedRecognizer {
            entities: vec![EntityType::Person],
            results: vec![
                result(EntityType::Person, 0, 4, 0.3),
                result(EntityType::Person, 9, 13, 0.9),
            ],
        }))
        .with_score_threshold(0.5);
        let candidates = engine.analyze("John and Jane", &[EntityType::Person]).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].span.start, 9);
    }

    #[test]
    fn test_character_offsets_converted() {
        let text = "Zoë und Jürgen";
        let engine = engine_with(Box::new(FixedRecognizer {
            entities: vec![EntityType::Person],
            results: vec![
                result(EntityType::Person, 0, 3, 0.85),
                result(EntityType::Person, 8, 14, 0.85),
            ],
        }));
        let candidates = engine.analyze(text, &[EntityType::Person]).unwrap();
        assert_eq!(candidates[0].span, TextSpan { start: 0, end: 4 });
        assert_eq!(candidates[1].span, TextSpan { start: 9, end: 16 });
        assert_eq!(candidates[1].span.slice(text), "Jürgen");
    }

    #[test]
    fn test_span_past_last_char_is_detector_error() {
        // "Zoë" is 3 chars but 4 bytes
        let engine = engine_with(Box::new(FixedRecognizer {
            entities: vec![EntityType::Person],
            results: vec![result(EntityType::Person, 0, 4, 0.85)],
        }));
        let err = engine.analyze("Zoë", &[EntityType::Person]).unwrap_err();
        assert!(matches!(err, Error::Detector { .. }));
    }
}
