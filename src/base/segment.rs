//! Atomic phonological units.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::feature::{FeatureDescription, FeatureSpec, FeatureValue};

/// The reserved word-boundary symbol.
///
/// Present in every inventory and feature matrix; carries no feature content
/// until a matrix's `validate` fills defaults in.
pub const BOUNDARY: &str = "#";

/// A segment: a phoneme symbol plus its feature values.
///
/// Identity is the symbol alone. Two segments with the same symbol but
/// different feature specs compare equal, hash equal, and order equal;
/// feature content never participates in identity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Segment {
    symbol: SmolStr,
    #[serde(default)]
    features: FeatureSpec,
}

impl Segment {
    /// A segment with no feature content.
    pub fn new(symbol: impl Into<SmolStr>) -> Self {
        Self {
            symbol: symbol.into(),
            features: FeatureSpec::new(),
        }
    }

    pub fn with_features(symbol: impl Into<SmolStr>, features: FeatureSpec) -> Self {
        Self {
            symbol: symbol.into(),
            features,
        }
    }

    /// The word-boundary segment.
    pub fn boundary() -> Self {
        Self::new(BOUNDARY)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn is_boundary(&self) -> bool {
        self.symbol == BOUNDARY
    }

    pub fn features(&self) -> &FeatureSpec {
        &self.features
    }

    /// Replace the feature specification wholesale (an inventory being
    /// specified against a matrix copies specs in through here).
    pub fn specify(&mut self, features: FeatureSpec) {
        self.features = features;
    }

    /// The value of one feature, if specified.
    pub fn value(&self, feature: &str) -> Option<&FeatureValue> {
        self.features.get(feature)
    }

    pub(crate) fn set_value(&mut self, feature: &str, value: FeatureValue) {
        self.features.set(feature, value);
    }

    /// Whether this segment satisfies a feature description.
    pub fn matches(&self, description: &FeatureDescription) -> bool {
        description.matched_by(&self.features)
    }

    /// `matches` with `None` meaning "no constraint".
    pub fn matches_opt(&self, description: Option<&FeatureDescription>) -> bool {
        description.is_none_or(|d| self.matches(d))
    }

    /// True iff, ignoring the features named in `ignore`, every feature
    /// this segment specifies has the same value on `other`.
    pub fn minimal_difference(&self, other: &Segment, ignore: &[SmolStr]) -> bool {
        for (name, value) in self.features.iter() {
            if ignore.contains(name) {
                continue;
            }
            if other.value(name) != Some(value) {
                return false;
            }
        }
        true
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl Eq for Segment {}

impl PartialEq<str> for Segment {
    fn eq(&self, other: &str) -> bool {
        self.symbol == other
    }
}

impl PartialEq<&str> for Segment {
    fn eq(&self, other: &&str) -> bool {
        self.symbol == *other
    }
}

impl Hash for Segment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symbol.hash(state);
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        self.symbol.cmp(&other.symbol)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voiced(symbol: &str) -> Segment {
        Segment::with_features(symbol, FeatureSpec::from_pairs([("voice", FeatureValue::Plus)]))
    }

    #[test]
    fn test_equality_ignores_features() {
        let plain = Segment::new("t");
        let specified = voiced("t");
        assert_eq!(plain, specified);

        let other = Segment::new("d");
        assert_ne!(plain, other);
    }

    #[test]
    fn test_ordering_by_symbol() {
        let a = voiced("a");
        let b = Segment::new("b");
        assert!(a < b);
    }

    #[test]
    fn test_matches_description() {
        let z = voiced("z");
        let desc = FeatureDescription::parse("+voice").unwrap();
        assert!(z.matches(&desc));

        let negated = FeatureDescription::parse("-voice").unwrap();
        assert!(!z.matches(&negated));

        // Missing feature excludes the segment.
        let nasal = FeatureDescription::parse("+nasal").unwrap();
        assert!(!z.matches(&nasal));
    }

    #[test]
    fn test_matches_opt_none_is_no_constraint() {
        let boundary = Segment::boundary();
        assert!(boundary.matches_opt(None));
        assert!(boundary.matches(&FeatureDescription::empty()));
    }

    #[test]
    fn test_minimal_difference() {
        let s = Segment::with_features(
            "s",
            FeatureSpec::from_pairs([
                ("voice", FeatureValue::Minus),
                ("continuant", FeatureValue::Plus),
            ]),
        );
        let z = Segment::with_features(
            "z",
            FeatureSpec::from_pairs([
                ("voice", FeatureValue::Plus),
                ("continuant", FeatureValue::Plus),
            ]),
        );
        assert!(s.minimal_difference(&z, &["voice".into()]));
        assert!(!s.minimal_difference(&z, &[]));
    }
}
