//! SafeMask - PII redaction for free-form text
//!
//! SafeMask finds personal and payment-sensitive data in a text and
//! replaces each occurrence with a placeholder such as `[email]`, returning
//! the masked text together with the exact position and original value of
//! everything it masked.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Masker                               │
//! │                                                               │
//! │  raw text ──► Normalizer                                      │
//! │                   │                                           │
//! │        ┌──────────┴───────────┐                               │
//! │        ▼                      ▼                               │
//! │  AnalyzerEngine         CVV detector                          │
//! │  - pattern recognizers  - keyword pass                        │
//! │  - email / names        - proximity pass                      │
//! │  - external NER                                               │
//! │        └──────────┬───────────┘                               │
//! │                   ▼                                           │
//! │          Date reclassifier (DOB vs expiry)                    │
//! │                   ▼                                           │
//! │          Overlap resolver                                     │
//! │                   ▼                                           │
//! │          Anonymizer ──► MaskedDocument                        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`text`]: Markup stripping and whitespace normalization
//! - [`analyzer`]: Recognizer trait, registry and built-in recognizers
//! - [`context`]: Context-window heuristics (CVV, date disambiguation)
//! - [`resolve`]: Overlap resolution between detectors
//! - [`anonymize`]: Placeholder substitution
//! - [`pipeline`]: The [`Masker`] entry point
//! - [`config`]: Configuration management
//!
//! ## Example
//!
//! ```
//! use safemask::{Masker, MaskerConfig};
//!
//! let masker = Masker::new(&MaskerConfig::default()).unwrap();
//! let doc = masker.mask_pii("Mail me at jane@example.com").unwrap();
//! assert_eq!(doc.masked_text, "Mail me at [email]");
//! ```

pub mod analyzer;
pub mod anonymize;
pub mod config;
pub mod context;
pub mod entity;
pub mod error;
pub mod pipeline;
pub mod resolve;
pub mod text;

pub use analyzer::{EntityRecognizer, RecognizerResult};
pub use config::MaskerConfig;
pub use entity::{
    Classification, EntityCandidate, EntityType, MaskedDocument, MaskedEntityRecord, TextSpan,
};
pub use error::{Error, Result};
pub use pipeline::Masker;
pub use text::{normalize, CharIndex};
