//! PII masking pipeline
//!
//! ```text
//! raw ─► normalize ─► analyze ──┐
//!                    CVV scan ──┴► reclassify dates ─► resolve ─► anonymize
//! ```
//!
//! Everything a [`Masker`] needs is compiled in [`Masker::new`]; masking a
//! text only reads that state, so one masker can serve many threads.

use crate::analyzer::{
    email_recognizer, AnalyzerEngine, DenyListRecognizer, EntityRecognizer, PatternRecognizer,
    PatternRecognizerSet, RecognizerRegistry,
};
use crate::anonymize::anonymize;
use crate::config::MaskerConfig;
use crate::context::{CvvDetector, DateReclassifier};
use crate::entity::{EntityType, MaskedDocument};
use crate::error::Result;
use crate::resolve::OverlapResolver;
use crate::text::normalize;

/// Detects and masks PII in free-form text.
pub struct Masker {
    engine: AnalyzerEngine,
    entities: Vec<EntityType>,
    cvv: CvvDetector,
    dates: DateReclassifier,
    resolver: OverlapResolver,
}

impl Masker {
    /// Build a masker from `config`.
    ///
    /// Registers the built-in pattern recognizers, the email recognizer,
    /// the person-name deny list (when names are configured) and any
    /// custom patterns, in that order.
    pub fn new(config: &MaskerConfig) -> Result<Self> {
        config.validate()?;
        let language = config.language.as_str();

        let mut registry = RecognizerRegistry::new();
        registry.add_pattern_set(PatternRecognizerSet::builtin(language)?);
        registry.add_recognizer(Box::new(email_recognizer(language)?));

        let names = DenyListRecognizer::person_names(&config.analyzer.person_names)?;
        if !names.is_empty() {
            registry.add_recognizer(Box::new(names));
        }

        for custom in &config.analyzer.custom_patterns {
            let recognizer = PatternRecognizer::from_custom(custom)?.with_language(language);
            registry.add_recognizer(Box::new(recognizer));
        }

        let engine = AnalyzerEngine::new(registry, language)
            .with_score_threshold(config.analyzer.score_threshold);

        tracing::info!(
            language,
            recognizers = engine.registry().len(),
            strategy = ?config.resolution.strategy,
            "Masker initialized"
        );

        Ok(Self {
            engine,
            entities: config.entities.clone(),
            cvv: CvvDetector::new(&config.cvv)?,
            dates: DateReclassifier::new(&config.dates),
            resolver: OverlapResolver::new(config.resolution.strategy),
        })
    }

    /// Register an additional recognizer, typically a named-entity model.
    ///
    /// It is only consulted for the requested entity types it supports.
    pub fn with_recognizer(mut self, recognizer: Box<dyn EntityRecognizer>) -> Self {
        self.engine.registry_mut().add_recognizer(recognizer);
        self
    }

    /// Entity types requested from the analyzer.
    pub fn requested_entities(&self) -> &[EntityType] {
        &self.entities
    }

    /// Normalize `raw`, detect PII in it and mask every resolved entity.
    ///
    /// Positions in the result are character offsets into the normalized
    /// text. Any detector failure aborts the call.
    pub fn mask_pii(&self, raw: &str) -> Result<MaskedDocument> {
        let text = normalize(raw);
        if text.is_empty() {
            return Ok(MaskedDocument {
                masked_text: text,
                entities: Vec::new(),
            });
        }

        let mut candidates = self.engine.analyze(&text, &self.entities)?;
        let analyzed = candidates.len();
        candidates.extend(self.cvv.detect(&text));

        self.dates.reclassify(&text, &mut candidates);

        let total = candidates.len();
        let resolved = self.resolver.resolve(candidates)?;
        let document = anonymize(&text, &resolved)?;

        tracing::debug!(
            chars = text.chars().count(),
            analyzed,
            cvv = total - analyzed,
            masked = document.entities.len(),
            "Masked text"
        );
        Ok(document)
    }
}
