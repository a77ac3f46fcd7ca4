//! # phonolex
//!
//! Core library for phonological corpus analysis: the lexicon data model
//! and its environment-matching engine.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! persist  → versioned on-disk corpus storage
//!   ↓
//! lexicon  → words, attributes, inventory, corpus aggregate
//!   ↓
//! features → feature matrices and category schemes
//!   ↓
//! base     → primitives (feature values, descriptions, segments)
//! ```
//!
//! Front-ends (GUI, CLI, corpus file importers) live in separate crates and
//! consume this one through the [`Corpus`] API.

/// Foundation types: feature values, feature descriptions, segments
pub mod base;

/// Feature systems: conventions, category schemes, feature matrices
pub mod features;

/// The lexicon data model: transcriptions, environments, words, corpora
pub mod lexicon;

pub mod error;
pub mod persist;

// Re-export the types nearly every caller touches
pub use base::{FeatureDescription, FeatureSpec, FeatureValue, Segment};
pub use error::LexiconError;
pub use features::FeatureMatrix;
pub use lexicon::{Corpus, EnvironmentFilter, Inventory, Transcription, Word};
