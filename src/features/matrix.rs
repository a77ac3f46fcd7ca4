//! Feature matrices: named tables mapping segment symbols to full feature
//! specifications, with derived category tables.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::base::{BOUNDARY, FeatureDescription, FeatureSpec, FeatureValue};
use crate::error::LexiconError;

use super::categories::{
    CategoryScheme, FeatureConvention, Rounding, SegmentCategory, Voicing,
};

/// A named table of segment feature specifications.
///
/// Built once from a feature-file definition; mutated only through
/// [`add_segment`](FeatureMatrix::add_segment) and
/// [`add_feature`](FeatureMatrix::add_feature), both of which re-run
/// validation so every segment always carries a value for every declared
/// feature afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeatureMatrix {
    name: String,
    segments: IndexMap<SmolStr, FeatureSpec>,
    features: IndexSet<SmolStr>,
    possible_values: IndexSet<FeatureValue>,
    default_value: FeatureValue,
    scheme: CategoryScheme,
}

impl FeatureMatrix {
    /// Build a matrix from `(symbol, spec)` entries.
    ///
    /// The declared feature set is the union of the feature names across all
    /// entries. The boundary symbol is always added, with no features. The
    /// category scheme is chosen by convention detection on the feature
    /// names.
    pub fn new<S, I>(name: impl Into<String>, entries: I) -> Self
    where
        S: Into<SmolStr>,
        I: IntoIterator<Item = (S, FeatureSpec)>,
    {
        let mut segments: IndexMap<SmolStr, FeatureSpec> = IndexMap::new();
        let mut features = IndexSet::new();
        let mut possible_values = IndexSet::new();
        for (symbol, spec) in entries {
            for (feature, value) in spec.iter() {
                features.insert(feature.clone());
                possible_values.insert(value.clone());
            }
            segments.insert(symbol.into(), spec);
        }
        segments.entry(SmolStr::from(BOUNDARY)).or_default();
        let scheme = FeatureConvention::detect(features.iter()).scheme();
        Self {
            name: name.into(),
            segments,
            features,
            possible_values,
            default_value: FeatureValue::NotApplicable,
            scheme,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared feature names, sorted.
    pub fn features(&self) -> Vec<SmolStr> {
        let mut names: Vec<SmolStr> = self.features.iter().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn possible_values(&self) -> &IndexSet<FeatureValue> {
        &self.possible_values
    }

    pub fn default_value(&self) -> &FeatureValue {
        &self.default_value
    }

    pub fn scheme(&self) -> &CategoryScheme {
        &self.scheme
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.segments.contains_key(symbol)
    }

    /// The feature specification for a symbol.
    pub fn get(&self, symbol: &str) -> Option<&FeatureSpec> {
        self.segments.get(symbol)
    }

    /// All segment symbols with a specification, in declaration order.
    pub fn symbols(&self) -> impl Iterator<Item = &SmolStr> {
        self.segments.keys()
    }

    /// Fill every missing feature on every segment with the default value.
    ///
    /// After this runs, every segment (the boundary included) has a value
    /// for every declared feature.
    pub fn validate(&mut self) {
        for spec in self.segments.values_mut() {
            for feature in &self.features {
                if !spec.contains(feature) {
                    spec.set(feature, self.default_value.clone());
                }
            }
        }
    }

    /// Add a segment with a feature specification.
    ///
    /// Every feature in the specification must already be declared;
    /// validation is re-run so the new segment is filled out.
    pub fn add_segment(
        &mut self,
        symbol: impl Into<SmolStr>,
        spec: FeatureSpec,
    ) -> Result<(), LexiconError> {
        let symbol = symbol.into();
        for feature in spec.names() {
            if !self.features.contains(feature) {
                return Err(LexiconError::UnknownFeature {
                    segment: symbol.to_string(),
                    feature: feature.to_string(),
                });
            }
        }
        for value in spec.iter().map(|(_, v)| v) {
            self.possible_values.insert(value.clone());
        }
        self.segments.insert(symbol, spec);
        self.validate();
        Ok(())
    }

    /// Declare a new feature, filling it in on every segment.
    ///
    /// With no explicit default the matrix default value is used.
    pub fn add_feature(&mut self, feature: impl Into<SmolStr>, default: Option<FeatureValue>) {
        let feature = feature.into();
        self.features.insert(feature.clone());
        if let Some(value) = default {
            self.possible_values.insert(value.clone());
            for spec in self.segments.values_mut() {
                if !spec.contains(&feature) {
                    spec.set(&feature, value.clone());
                }
            }
        }
        self.validate();
    }

    /// Remove a segment's specification. Removing an absent symbol is a
    /// no-op.
    pub fn remove_segment(&mut self, symbol: &str) {
        self.segments.shift_remove(symbol);
    }

    /// Every segment symbol whose stored values match all tokens of the
    /// description. The empty description matches every segment.
    pub fn features_to_segments(&self, description: &FeatureDescription) -> Vec<SmolStr> {
        self.segments
            .iter()
            .filter(|(_, spec)| description.matched_by(spec))
            .map(|(symbol, _)| symbol.clone())
            .collect()
    }

    /// Every well-formed `<value><feature>` token over this matrix's values
    /// and features.
    pub fn valid_feature_strings(&self) -> Vec<String> {
        let mut strings = Vec::new();
        for value in &self.possible_values {
            for feature in self.features() {
                strings.push(format!("{value}{feature}"));
            }
        }
        strings
    }

    /// Classify a segment by walking the category tables.
    ///
    /// The boundary symbol and unknown symbols have no category. Vowels are
    /// identified by the vowel marker; diphthongs short-circuit. Tables are
    /// walked in order and the first matching entry wins; no match leaves
    /// that slot `None`.
    pub fn categorize(&self, symbol: &str) -> Option<SegmentCategory> {
        if symbol == BOUNDARY {
            return None;
        }
        let spec = self.segments.get(symbol)?;
        let markers = &self.scheme.markers;
        if markers.vowel.matched_by(spec) {
            if markers.diphthong.matched_by(spec) {
                return Some(SegmentCategory::Diphthong);
            }
            let height = first_match(&self.scheme.height, spec);
            let backness = first_match(&self.scheme.backness, spec);
            let rounding = if markers.rounded.matched_by(spec) {
                Rounding::Rounded
            } else {
                Rounding::Unrounded
            };
            Some(SegmentCategory::Vowel {
                height,
                backness,
                rounding,
            })
        } else {
            let place = first_match(&self.scheme.places, spec);
            let manner = first_match(&self.scheme.manners, spec);
            let voicing = if markers.voice.matched_by(spec) {
                Voicing::Voiced
            } else {
                Voicing::Voiceless
            };
            Some(SegmentCategory::Consonant {
                place,
                manner,
                voicing,
            })
        }
    }

    /// A display row for one segment: its symbol followed by its value for
    /// each feature, in sorted feature order.
    pub fn segment_row(&self, symbol: &str) -> Option<Vec<String>> {
        let spec = self.segments.get(symbol)?;
        let mut row = vec![symbol.to_string()];
        for feature in self.features() {
            let value = spec.get(&feature).cloned().unwrap_or_default();
            row.push(value.to_string());
        }
        Some(row)
    }
}

/// Matrix equality compares segment specifications only, not the name or
/// derived tables.
impl PartialEq for FeatureMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

fn first_match(
    table: &IndexMap<SmolStr, FeatureDescription>,
    spec: &FeatureSpec,
) -> Option<SmolStr> {
    table
        .iter()
        .find(|(_, desc)| desc.matched_by(spec))
        .map(|(label, _)| label.clone())
}
