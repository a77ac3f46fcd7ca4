//! Feature values, per-segment feature specifications, and the feature
//! description mini-language.
//!
//! A feature description is the one textual protocol the core defines:
//! strings of the form `"<sign><featurename>"` joined by commas (or an
//! equivalent token list), e.g. `"+voice,-sonorant"`. It is parsed in exactly
//! one place ([`FeatureDescription::parse`]) and consumed everywhere a
//! natural class is looked up.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::LexiconError;

/// The value a segment has for a single feature.
///
/// Binary feature systems use `Plus`/`Minus`; `NotApplicable` (`n`) is the
/// default fill value for features a segment is unspecified for. Other
/// systems may carry arbitrary categorical or numeric values, stored as
/// `Other`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FeatureValue {
    Plus,
    Minus,
    #[default]
    NotApplicable,
    Other(SmolStr),
}

impl FeatureValue {
    /// The textual form of this value, as written in a feature description.
    pub fn as_str(&self) -> &str {
        match self {
            FeatureValue::Plus => "+",
            FeatureValue::Minus => "-",
            FeatureValue::NotApplicable => "n",
            FeatureValue::Other(s) => s.as_str(),
        }
    }

    /// Whether this is one of the two binary values `+`/`-`.
    pub fn is_binary(&self) -> bool {
        matches!(self, FeatureValue::Plus | FeatureValue::Minus)
    }
}

impl From<char> for FeatureValue {
    fn from(c: char) -> Self {
        match c {
            '+' => FeatureValue::Plus,
            '-' => FeatureValue::Minus,
            'n' => FeatureValue::NotApplicable,
            other => FeatureValue::Other(SmolStr::from(other.to_string())),
        }
    }
}

impl From<&str> for FeatureValue {
    fn from(s: &str) -> Self {
        match s {
            "+" => FeatureValue::Plus,
            "-" => FeatureValue::Minus,
            "n" => FeatureValue::NotApplicable,
            other => FeatureValue::Other(SmolStr::from(other)),
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FeatureValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FeatureValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = SmolStr::deserialize(deserializer)?;
        Ok(FeatureValue::from(s.as_str()))
    }
}

/// An immutable-by-convention mapping from feature name to feature value.
///
/// Feature names are lowercased at construction; lookups are
/// case-insensitive. Each segment owns its spec: inventories copy specs out
/// of a feature matrix rather than aliasing them, so mutating one corpus can
/// never leak into another.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSpec {
    values: IndexMap<SmolStr, FeatureValue>,
}

impl FeatureSpec {
    /// An empty specification (used for the boundary symbol and for
    /// segments not covered by the active feature matrix).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a spec from name/value pairs, lowercasing the names.
    pub fn from_pairs<N, I>(pairs: I) -> Self
    where
        N: AsRef<str>,
        I: IntoIterator<Item = (N, FeatureValue)>,
    {
        let values = pairs
            .into_iter()
            .map(|(name, value)| (lower(name.as_ref()), value))
            .collect();
        Self { values }
    }

    /// Look up the value for a feature (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        if let Some(v) = self.values.get(name) {
            return Some(v);
        }
        self.values.get(lower(name).as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set a feature value (used by matrix validation and mutation; the
    /// name is lowercased).
    pub fn set(&mut self, name: &str, value: FeatureValue) {
        self.values.insert(lower(name), value);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterate name/value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &FeatureValue)> {
        self.values.iter()
    }

    /// Iterate feature names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &SmolStr> {
        self.values.keys()
    }
}

fn lower(s: &str) -> SmolStr {
    if s.chars().any(|c| c.is_uppercase()) {
        SmolStr::from(s.to_lowercase())
    } else {
        SmolStr::from(s)
    }
}

/// One token of a feature description: a value and a feature name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureToken {
    pub value: FeatureValue,
    pub name: SmolStr,
}

impl FeatureToken {
    pub fn new(value: FeatureValue, name: impl AsRef<str>) -> Self {
        Self {
            value,
            name: lower(name.as_ref()),
        }
    }
}

impl fmt::Display for FeatureToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.name)
    }
}

/// A parsed feature description.
///
/// Matching is AND semantics across tokens. The empty description carries no
/// constraint at all: it matches every segment, including the boundary
/// symbol. Wildcard context queries rely on this.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeatureDescription {
    tokens: Vec<FeatureToken>,
}

impl FeatureDescription {
    /// The empty, match-everything description.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A single-token description.
    pub fn single(value: FeatureValue, name: impl AsRef<str>) -> Self {
        Self {
            tokens: vec![FeatureToken::new(value, name)],
        }
    }

    pub fn from_tokens(tokens: Vec<FeatureToken>) -> Self {
        Self { tokens }
    }

    /// Parse a comma-joined description string.
    ///
    /// An empty or all-whitespace string parses to the empty description.
    /// Each token must be at least two characters: a one-character value
    /// prefix followed by the feature name.
    pub fn parse(text: &str) -> Result<Self, LexiconError> {
        if text.trim().is_empty() {
            return Ok(Self::empty());
        }
        let mut tokens = Vec::new();
        for raw in text.split(',') {
            let token = raw.trim();
            let mut chars = token.chars();
            let sign = chars
                .next()
                .ok_or_else(|| LexiconError::InvalidDescription(raw.to_string()))?;
            let name = chars.as_str();
            if name.is_empty() {
                return Err(LexiconError::InvalidDescription(raw.to_string()));
            }
            tokens.push(FeatureToken::new(FeatureValue::from(sign), name));
        }
        Ok(Self { tokens })
    }

    /// Parse a list of token strings (the list form of the mini-language).
    pub fn from_parts<S: AsRef<str>>(parts: &[S]) -> Result<Self, LexiconError> {
        let mut tokens = Vec::new();
        for part in parts {
            let parsed = Self::parse(part.as_ref())?;
            tokens.extend(parsed.tokens);
        }
        Ok(Self { tokens })
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureToken> {
        self.tokens.iter()
    }

    /// The feature names this description constrains.
    pub fn names(&self) -> impl Iterator<Item = &SmolStr> {
        self.tokens.iter().map(|t| &t.name)
    }

    /// Whether a feature specification satisfies every token.
    ///
    /// A spec missing any queried feature does not match. The empty
    /// description matches every spec.
    pub fn matched_by(&self, spec: &FeatureSpec) -> bool {
        self.tokens
            .iter()
            .all(|t| spec.get(&t.name) == Some(&t.value))
    }
}

impl FromStr for FeatureDescription {
    type Err = LexiconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FeatureDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

impl Serialize for FeatureDescription {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FeatureDescription {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        FeatureDescription::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_token() {
        let desc = FeatureDescription::parse("+voice").unwrap();
        assert_eq!(desc.len(), 1);
        let token = desc.iter().next().unwrap();
        assert_eq!(token.value, FeatureValue::Plus);
        assert_eq!(token.name.as_str(), "voice");
    }

    #[test]
    fn test_parse_comma_joined() {
        let desc = FeatureDescription::parse("+voice,-sonorant").unwrap();
        assert_eq!(desc.len(), 2);
        assert_eq!(desc.to_string(), "+voice,-sonorant");
    }

    #[test]
    fn test_parse_list_form_equals_string_form() {
        let from_list = FeatureDescription::from_parts(&["+voice", "-sonorant"]).unwrap();
        let from_string = FeatureDescription::parse("+voice,-sonorant").unwrap();
        assert_eq!(from_list, from_string);
    }

    #[test]
    fn test_empty_description_matches_everything() {
        let desc = FeatureDescription::parse("").unwrap();
        assert!(desc.is_empty());
        assert!(desc.matched_by(&FeatureSpec::new()));
        let spec = FeatureSpec::from_pairs([("voice", FeatureValue::Minus)]);
        assert!(desc.matched_by(&spec));
    }

    #[test]
    fn test_bare_sign_is_invalid() {
        assert!(FeatureDescription::parse("+").is_err());
        assert!(FeatureDescription::parse("+voice,,").is_err());
    }

    #[test]
    fn test_missing_feature_excludes_spec() {
        let desc = FeatureDescription::parse("+voice").unwrap();
        let spec = FeatureSpec::from_pairs([("nasal", FeatureValue::Minus)]);
        assert!(!desc.matched_by(&spec));
    }

    #[test]
    fn test_names_are_lowercased() {
        let desc = FeatureDescription::parse("+Voice").unwrap();
        let spec = FeatureSpec::from_pairs([("VOICE", FeatureValue::Plus)]);
        assert!(desc.matched_by(&spec));
    }

    #[test]
    fn test_dot_sign_round_trips() {
        let desc = FeatureDescription::parse(".high").unwrap();
        let token = desc.iter().next().unwrap();
        assert_eq!(token.value, FeatureValue::Other(".".into()));
        assert_eq!(desc.to_string(), ".high");
    }

    #[test]
    fn test_value_serde_round_trip() {
        for v in [
            FeatureValue::Plus,
            FeatureValue::Minus,
            FeatureValue::NotApplicable,
            FeatureValue::Other("3".into()),
        ] {
            let json = serde_json::to_string(&v).unwrap();
            let back: FeatureValue = serde_json::from_str(&json).unwrap();
            assert_eq!(v, back);
        }
    }
}
