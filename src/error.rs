//! Error taxonomy for the lexicon core.
//!
//! Expected absence (word/segment probes used pervasively by analyses) is
//! reported through `Option` returns; the variants here cover failed lookups
//! that callers asked to be fatal, construction-time validation, and
//! persistence integrity failures.

use thiserror::Error;

use crate::lexicon::AttributeType;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LexiconError>;

/// All errors raised by the lexicon data model.
#[derive(Debug, Error)]
pub enum LexiconError {
    /// A word lookup failed and the caller asked for an error.
    #[error("the word \"{0}\" is not in the corpus")]
    WordNotFound(String),

    /// A segment symbol is not present in the inventory.
    #[error("could not find \"{0}\" in the inventory")]
    SegmentNotFound(String),

    /// A word was constructed with neither spelling nor transcription.
    #[error("words must have at least a spelling or a transcription")]
    EmptyWord,

    /// A stress/tone/morpheme annotation points outside the symbol sequence.
    #[error("annotation at position {position} is out of range for a transcription of length {length}")]
    InvalidAnnotation { position: usize, length: usize },

    /// A segment was added to a feature matrix with an undeclared feature.
    #[error("segment \"{segment}\" has a feature \"{feature}\" that is not defined for this feature matrix")]
    UnknownFeature { segment: String, feature: String },

    /// A feature description token could not be parsed.
    ///
    /// Tokens must be a one-character value prefix followed by a feature
    /// name, e.g. `+voice`.
    #[error("invalid feature description token \"{0}\"")]
    InvalidDescription(String),

    /// An attribute was given a value outside its declared type.
    #[error("attribute \"{attribute}\" expects a {expected} value")]
    AttributeTypeMismatch {
        attribute: String,
        expected: AttributeType,
    },

    /// Persisted corpus state was malformed or unreadable.
    ///
    /// Wraps the low-level cause; the raw deserialization error type never
    /// crosses the crate boundary.
    #[error("corpus integrity error: {message}; please recreate or redownload the corpus")]
    Integrity {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl LexiconError {
    /// Wrap a low-level persistence failure into an integrity error.
    pub(crate) fn integrity(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LexiconError::Integrity {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// An integrity error with no underlying cause (e.g. version mismatch).
    pub(crate) fn integrity_message(message: impl Into<String>) -> Self {
        LexiconError::Integrity {
            message: message.into(),
            source: None,
        }
    }
}
