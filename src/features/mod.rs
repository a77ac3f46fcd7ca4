//! Feature systems: category schemes and feature matrices.

mod categories;
mod matrix;

pub use categories::{
    CategoryScheme, ClassMarkers, FeatureConvention, Rounding, SegmentCategory, Voicing,
};
pub use matrix::FeatureMatrix;
