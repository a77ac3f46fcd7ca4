//! Lexicon entries: spelling, transcription, frequency, and schema-driven
//! extra attributes.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::LexiconError;

use super::attribute::{AttributeType, AttributeValue};
use super::transcription::Transcription;

/// Attribute names that alias the canonical `frequency` column. Corpora
/// built from different source formats name their frequency column
/// differently; reads and writes under any of these route to `frequency`.
pub const FREQUENCY_ALIASES: [&str; 5] = [
    "abs_freq",
    "freq_per_mil",
    "sfreq",
    "lowercase_freq",
    "log10_freq",
];

fn canonical_name(name: &str) -> &str {
    if FREQUENCY_ALIASES.contains(&name) {
        "frequency"
    } else {
        name
    }
}

/// One corpus-attested instance of a word, as found in running text or a
/// time-aligned recording. Aggregated opaquely on the owning [`Word`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WordToken {
    pub spelling: Option<String>,
    pub transcription: Option<Transcription>,
    pub begin: Option<f64>,
    pub end: Option<f64>,
}

/// One lexicon entry.
///
/// Every word has a spelling; when constructed from a transcription alone
/// the spelling is derived by concatenating the segment symbols. Identity
/// is spelling plus transcription; frequency and extra attributes do not
/// participate in equality.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Word {
    spelling: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transcription: Option<Transcription>,
    #[serde(default)]
    frequency: f64,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    attributes: IndexMap<SmolStr, AttributeValue>,
    #[serde(skip)]
    tokens: Vec<WordToken>,
}

impl Word {
    /// A word from a spelling, a transcription, or both.
    ///
    /// Fails fast when neither is given; a missing spelling is derived
    /// from the transcription's symbols.
    pub fn new(
        spelling: Option<String>,
        transcription: Option<Transcription>,
    ) -> Result<Self, LexiconError> {
        let spelling = match spelling.filter(|s| !s.is_empty()) {
            Some(s) => s,
            None => match &transcription {
                Some(t) if !t.is_empty() => t.iter().map(SmolStr::as_str).collect(),
                _ => return Err(LexiconError::EmptyWord),
            },
        };
        Ok(Self {
            spelling,
            transcription,
            frequency: 0.0,
            attributes: IndexMap::new(),
            tokens: Vec::new(),
        })
    }

    /// Shorthand for a spelled and transcribed entry.
    pub fn from_parts<S: Into<SmolStr>>(
        spelling: impl Into<String>,
        symbols: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            spelling: spelling.into(),
            transcription: Some(Transcription::from_symbols(symbols)),
            frequency: 0.0,
            attributes: IndexMap::new(),
            tokens: Vec::new(),
        }
    }

    pub fn with_frequency(mut self, frequency: f64) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_attribute(mut self, name: impl Into<SmolStr>, value: AttributeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn spelling(&self) -> &str {
        &self.spelling
    }

    pub fn transcription(&self) -> Option<&Transcription> {
        self.transcription.as_ref()
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency;
    }

    pub(crate) fn add_frequency(&mut self, frequency: f64) {
        self.frequency += frequency;
    }

    /// Extra attributes beyond spelling, transcription, and frequency.
    pub fn extra_attributes(&self) -> &IndexMap<SmolStr, AttributeValue> {
        &self.attributes
    }

    /// Read an attribute value by name, routing the three basic names to
    /// their dedicated fields. Frequency aliases resolve to `frequency`.
    pub fn get(&self, name: &str) -> Option<AttributeValue> {
        match canonical_name(name) {
            "spelling" => Some(AttributeValue::Text(self.spelling.clone())),
            "transcription" => self.transcription.clone().map(AttributeValue::Tier),
            "frequency" => Some(AttributeValue::Number(self.frequency)),
            other => self.attributes.get(other).cloned(),
        }
    }

    /// Write an attribute value by name, with the same routing as
    /// [`get`](Word::get).
    ///
    /// Fails fast when a basic name is given a value of the wrong shape.
    pub fn set(&mut self, name: &str, value: AttributeValue) -> Result<(), LexiconError> {
        match canonical_name(name) {
            "spelling" => match value {
                AttributeValue::Text(s) => {
                    self.spelling = s;
                    Ok(())
                }
                _ => Err(mismatch("spelling", AttributeType::Spelling)),
            },
            "transcription" => match value {
                AttributeValue::Tier(t) => {
                    self.transcription = Some(t);
                    Ok(())
                }
                _ => Err(mismatch("transcription", AttributeType::Tier)),
            },
            "frequency" => match value {
                AttributeValue::Number(n) => {
                    self.frequency = n;
                    Ok(())
                }
                _ => Err(mismatch("frequency", AttributeType::Numeric)),
            },
            other => {
                self.attributes.insert(SmolStr::from(other), value);
                Ok(())
            }
        }
    }

    /// Derive a tier: the subsequence of the transcription's symbols that
    /// are members of `segments`, stored under `name`. A word with no
    /// transcription gets an empty tier.
    pub fn add_tier<'a>(
        &mut self,
        name: impl Into<SmolStr>,
        segments: impl IntoIterator<Item = &'a SmolStr>,
    ) {
        let symbols = match &self.transcription {
            Some(t) => t.match_segments(segments),
            None => Vec::new(),
        };
        self.attributes
            .insert(name.into(), AttributeValue::Tier(Transcription::from_symbols(symbols)));
    }

    /// Derive an abstract tier: each transcription symbol is replaced by
    /// the label of the first class in `classes` containing it, and the
    /// labels are concatenated (e.g. a CV skeleton). Symbols in no class
    /// are dropped.
    pub fn add_abstract_tier(
        &mut self,
        name: impl Into<SmolStr>,
        classes: &IndexMap<SmolStr, Vec<SmolStr>>,
    ) {
        let mut skeleton = String::new();
        if let Some(t) = &self.transcription {
            for symbol in t.iter() {
                for (label, members) in classes {
                    if members.contains(symbol) {
                        skeleton.push_str(label);
                        break;
                    }
                }
            }
        }
        self.attributes
            .insert(name.into(), AttributeValue::Text(skeleton));
    }

    /// Drop an extra attribute. The three basic names are never removable
    /// and are silently left alone.
    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.shift_remove(canonical_name(name));
    }

    pub(crate) fn set_extra(&mut self, name: SmolStr, value: AttributeValue) {
        self.attributes.insert(name, value);
    }

    pub fn tokens(&self) -> &[WordToken] {
        &self.tokens
    }

    pub fn add_token(&mut self, token: WordToken) {
        self.tokens.push(token);
    }
}

fn mismatch(attribute: &str, expected: AttributeType) -> LexiconError {
    LexiconError::AttributeTypeMismatch {
        attribute: attribute.to_string(),
        expected,
    }
}

impl PartialEq for Word {
    fn eq(&self, other: &Self) -> bool {
        self.spelling == other.spelling && self.transcription == other.transcription
    }
}

impl Eq for Word {}

impl PartialOrd for Word {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Word {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.spelling
            .cmp(&other.spelling)
            .then_with(|| self.transcription().map(Transcription::to_string)
                .cmp(&other.transcription().map(Transcription::to_string)))
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spelling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_spelling_or_transcription() {
        let err = Word::new(None, None).unwrap_err();
        assert!(matches!(err, LexiconError::EmptyWord));
        let err = Word::new(Some(String::new()), None).unwrap_err();
        assert!(matches!(err, LexiconError::EmptyWord));
    }

    #[test]
    fn test_spelling_derived_from_transcription() {
        let word = Word::new(None, Some(Transcription::from_symbols(["k", "a", "t"]))).unwrap();
        assert_eq!(word.spelling(), "kat");
    }

    #[test]
    fn test_equality_ignores_frequency_and_extras() {
        let a = Word::from_parts("cat", ["k", "a", "t"]).with_frequency(10.0);
        let b = Word::from_parts("cat", ["k", "a", "t"])
            .with_attribute("pos", AttributeValue::Factor("noun".into()));
        assert_eq!(a, b);
        let c = Word::from_parts("cat", ["k", "a", "s"]);
        assert_ne!(a, c);
    }

    #[test]
    fn test_frequency_aliases_route_to_frequency() {
        let mut word = Word::from_parts("cat", ["k", "a", "t"]);
        for alias in FREQUENCY_ALIASES {
            word.set(alias, AttributeValue::Number(3.0)).unwrap();
            assert_eq!(word.frequency(), 3.0);
            assert_eq!(word.get(alias), Some(AttributeValue::Number(3.0)));
            word.set_frequency(0.0);
        }
        assert!(word.extra_attributes().is_empty());
    }

    #[test]
    fn test_set_rejects_wrong_shape_for_basic_names() {
        let mut word = Word::from_parts("cat", ["k", "a", "t"]);
        let err = word
            .set("frequency", AttributeValue::Text("lots".into()))
            .unwrap_err();
        assert!(matches!(
            err,
            LexiconError::AttributeTypeMismatch {
                expected: AttributeType::Numeric,
                ..
            }
        ));
    }

    #[test]
    fn test_add_tier() {
        let mut word = Word::from_parts("banana", ["b", "a", "n", "a", "n", "a"]);
        let vowels = [SmolStr::from("a")];
        word.add_tier("vowels", &vowels);
        let tier = word.get("vowels").and_then(|v| v.as_tier().cloned()).unwrap();
        assert_eq!(tier, Transcription::from_symbols(["a", "a", "a"]));
    }

    #[test]
    fn test_add_abstract_tier() {
        let mut word = Word::from_parts("cat", ["k", "a", "t"]);
        let mut classes = IndexMap::new();
        classes.insert(SmolStr::from("C"), vec![SmolStr::from("k"), SmolStr::from("t")]);
        classes.insert(SmolStr::from("V"), vec![SmolStr::from("a")]);
        word.add_abstract_tier("cv", &classes);
        assert_eq!(word.get("cv"), Some(AttributeValue::Text("CVC".into())));
    }

    #[test]
    fn test_remove_attribute_spares_basics() {
        let mut word = Word::from_parts("cat", ["k", "a", "t"])
            .with_attribute("pos", AttributeValue::Factor("noun".into()));
        word.remove_attribute("pos");
        assert!(word.get("pos").is_none());
        word.remove_attribute("spelling");
        assert_eq!(word.spelling(), "cat");
    }
}
