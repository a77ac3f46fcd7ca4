//! Foundation types for the lexicon core.
//!
//! This module provides the fundamental phonological types:
//! - [`FeatureValue`], [`FeatureSpec`] - per-segment feature content
//! - [`FeatureDescription`] - the `"+voice,-sonorant"` mini-language
//! - [`Segment`] - a phoneme symbol plus its features
//!
//! This module depends only on the crate-wide error type, never on the
//! feature, lexicon, or persistence layers above it.

mod feature;
mod segment;

pub use feature::{FeatureDescription, FeatureSpec, FeatureToken, FeatureValue};
pub use segment::{BOUNDARY, Segment};
