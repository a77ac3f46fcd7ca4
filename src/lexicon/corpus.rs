//! The corpus aggregate: inventory, attribute schema, and the keyed word
//! collection.

use std::ops::AddAssign;

use indexmap::{IndexMap, IndexSet};
use rand::Rng;
use rand::seq::IteratorRandom;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use tracing::{debug, info};

use crate::base::FeatureDescription;
use crate::error::LexiconError;
use crate::features::FeatureMatrix;

use super::attribute::{Attribute, AttributeType, AttributeValue};
use super::inventory::Inventory;
use super::word::Word;

/// A binary comparison over a numeric attribute, used in subset filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Comparison {
    pub fn test(self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::Eq => value == threshold,
            Comparison::Ne => value != threshold,
            Comparison::Gt => value > threshold,
            Comparison::Ge => value >= threshold,
            Comparison::Lt => value < threshold,
            Comparison::Le => value <= threshold,
        }
    }
}

/// One predicate of a corpus subset query. A word must satisfy every
/// filter to be kept (AND semantics).
#[derive(Clone, Debug)]
pub enum SubsetFilter {
    /// Numeric attribute compared against a threshold.
    Numeric {
        attribute: SmolStr,
        comparison: Comparison,
        threshold: f64,
    },
    /// Factor attribute restricted to a set of acceptable levels.
    Factor {
        attribute: SmolStr,
        levels: IndexSet<SmolStr>,
    },
}

impl SubsetFilter {
    fn passes(&self, word: &Word) -> bool {
        match self {
            SubsetFilter::Numeric {
                attribute,
                comparison,
                threshold,
            } => word
                .get(attribute)
                .and_then(|v| v.as_number())
                .is_some_and(|n| comparison.test(n, *threshold)),
            SubsetFilter::Factor { attribute, levels } => word
                .get(attribute)
                .is_some_and(|v| v.as_text().is_some_and(|t| levels.contains(t))),
        }
    }
}

/// How the segments of interest for a derived tier or count column are
/// named: by feature description or by explicit symbol list.
#[derive(Clone, Debug)]
pub enum SegmentSpec {
    Features(FeatureDescription),
    Symbols(Vec<SmolStr>),
}

/// A lexicon: the inventory of attested segments, the per-word attribute
/// schema, and the disambiguated-key word collection.
///
/// The first word added under a spelling owns the bare spelling as its key;
/// later duplicates get `" (n)"` suffixes. The schema grows monotonically:
/// every word carries every attribute (back-filled with defaults), and a new
/// attribute arriving on one word extends the schema for all words.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Corpus {
    name: String,
    words: IndexMap<String, Word>,
    #[serde(default = "basic_attributes")]
    attributes: Vec<Attribute>,
    #[serde(default)]
    inventory: Inventory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    specifier: Option<FeatureMatrix>,
}

/// The three attributes every corpus schema starts with and never loses.
fn basic_attributes() -> Vec<Attribute> {
    vec![
        Attribute::new("spelling", AttributeType::Spelling),
        Attribute::new("transcription", AttributeType::Tier),
        Attribute::new("frequency", AttributeType::Numeric),
    ]
}

impl Corpus {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            words: IndexMap::new(),
            attributes: basic_attributes(),
            inventory: Inventory::new(),
            specifier: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn specifier(&self) -> Option<&FeatureMatrix> {
        self.specifier.as_ref()
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    /// The word stored under an exact key.
    pub fn get(&self, key: &str) -> Option<&Word> {
        self.words.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.words.contains_key(key)
    }

    /// Iterate `(key, word)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Word)> {
        self.words.iter().map(|(k, w)| (k.as_str(), w))
    }

    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.words.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.words.keys().map(String::as_str)
    }

    /// Iterate `(key, word)` in key order rather than insertion order.
    pub fn iter_sorted(&self) -> impl Iterator<Item = (&str, &Word)> {
        let mut entries: Vec<(&str, &Word)> =
            self.words.iter().map(|(k, w)| (k.as_str(), w)).collect();
        entries.sort_unstable_by_key(|(k, _)| *k);
        entries.into_iter()
    }

    /// The key a word is stored under, matched by spelling and
    /// transcription.
    pub fn key(&self, word: &Word) -> Option<&str> {
        self.words
            .iter()
            .find(|&(_, w)| w == word)
            .map(|(k, _)| k.as_str())
    }

    /// The attested segment for a symbol.
    pub fn symbol_to_segment(&self, symbol: &str) -> Option<&crate::base::Segment> {
        self.inventory.get(symbol)
    }

    /// The feature specification of an attested symbol, once a matrix has
    /// been applied. Uncovered symbols have an empty spec.
    pub fn segment_to_features(&self, symbol: &str) -> Option<&crate::base::FeatureSpec> {
        self.inventory.get(symbol).map(|s| s.features())
    }

    /// Add a word, canonicalizing its transcription against the inventory
    /// and folding its attributes into the schema.
    ///
    /// Returns the key the word was stored under. With
    /// `allow_duplicates=false` a word whose spelling is already present is
    /// silently dropped and `None` is returned; subsetting workflows rely
    /// on this.
    pub fn add_word(&mut self, word: Word, allow_duplicates: bool) -> Option<String> {
        if !allow_duplicates && self.words.contains_key(word.spelling()) {
            debug!(spelling = word.spelling(), "dropping duplicate word");
            return None;
        }
        Some(self.insert_word(word))
    }

    fn insert_word(&mut self, mut word: Word) -> String {
        if let Some(transcription) = word.transcription() {
            for symbol in transcription.iter() {
                self.inventory.add_symbol(symbol.clone());
            }
            for (&position, marker) in transcription.stress() {
                if let Some(symbol) = transcription.get(position) {
                    self.inventory.record_stress(marker.clone(), symbol.clone());
                }
            }
        }
        self.absorb_schema(&mut word);
        let key = self.free_key(word.spelling());
        self.words.insert(key.clone(), word);
        key
    }

    /// Extend the schema with the word's new attributes, back-fill the
    /// word with defaults for attributes it lacks, and fold its values
    /// into every attribute's observed range.
    fn absorb_schema(&mut self, word: &mut Word) {
        let new: Vec<(SmolStr, AttributeType)> = word
            .extra_attributes()
            .iter()
            .filter(|(name, _)| self.attribute(name).is_none())
            .map(|(name, value)| (name.clone(), value.inferred_type()))
            .collect();
        for (name, att_type) in new {
            self.attributes.push(Attribute::new(name, att_type));
        }
        for attribute in &mut self.attributes {
            match word.get(attribute.name()) {
                Some(value) => attribute.update_range(&value),
                None => {
                    let default = attribute.default_value().clone();
                    // Basic names always resolve, so this only back-fills
                    // extra attributes and cannot fail.
                    let _ = word.set(attribute.name(), default);
                }
            }
        }
    }

    /// The bare spelling if unused, else the first free `" (n)"` key.
    fn free_key(&self, spelling: &str) -> String {
        if !self.words.contains_key(spelling) {
            return spelling.to_string();
        }
        let mut n = 1usize;
        loop {
            let key = format!("{spelling} ({n})");
            if !self.words.contains_key(&key) {
                return key;
            }
            n += 1;
        }
    }

    /// Look a word up by spelling.
    ///
    /// Tries the exact spelling and its first disambiguation key; with
    /// `ignore_case`, also the lowercased and title-cased variants of both.
    pub fn find(&self, spelling: &str, ignore_case: bool) -> Result<&Word, LexiconError> {
        let mut candidates = vec![spelling.to_string()];
        if ignore_case {
            candidates.push(spelling.to_lowercase());
            candidates.push(title_case(spelling));
        }
        for candidate in candidates {
            if let Some(word) = self.words.get(&candidate) {
                return Ok(word);
            }
            if let Some(word) = self.words.get(&format!("{candidate} (1)")) {
                return Ok(word);
            }
        }
        Err(LexiconError::WordNotFound(spelling.to_string()))
    }

    /// Every word stored under the given spelling, duplicates included.
    pub fn find_all(&self, spelling: &str) -> Vec<&Word> {
        self.words
            .values()
            .filter(|w| w.spelling() == spelling)
            .collect()
    }

    /// The existing word matching spelling and transcription, or a newly
    /// added one.
    pub fn get_or_create_word(
        &mut self,
        spelling: &str,
        transcription: Option<super::transcription::Transcription>,
    ) -> Result<&Word, LexiconError> {
        let existing = self
            .words
            .iter()
            .find(|(_, w)| w.spelling() == spelling && w.transcription() == transcription.as_ref())
            .map(|(k, _)| k.clone());
        let key = match existing {
            Some(key) => key,
            None => {
                let word = Word::new(Some(spelling.to_string()), transcription)?;
                self.insert_word(word)
            }
        };
        self.words
            .get(&key)
            .ok_or_else(|| LexiconError::WordNotFound(spelling.to_string()))
    }

    /// Remove the word under an exact key. Removing an absent key is a
    /// no-op.
    pub fn remove_word(&mut self, key: &str) {
        self.words.shift_remove(key);
    }

    /// Insert-or-replace an attribute in the schema, optionally writing its
    /// default value onto every word.
    pub fn add_attribute(&mut self, attribute: Attribute, initialize_defaults: bool) {
        if initialize_defaults {
            let default = attribute.default_value().clone();
            for word in self.words.values_mut() {
                let _ = word.set(attribute.name(), default.clone());
            }
        }
        match self.attributes.iter().position(|a| a.name() == attribute.name()) {
            Some(i) => self.attributes[i] = attribute,
            None => self.attributes.push(attribute),
        }
    }

    /// Drop an attribute from the schema and from every word. The three
    /// basic attributes are never removed.
    pub fn remove_attribute(&mut self, name: &str) {
        if matches!(name, "spelling" | "transcription" | "frequency") {
            return;
        }
        self.attributes.retain(|a| a.name() != name);
        for word in self.words.values_mut() {
            word.remove_attribute(name);
        }
    }

    fn resolve_segments(&self, spec: &SegmentSpec) -> Vec<SmolStr> {
        match spec {
            SegmentSpec::Features(description) => self.inventory.features_to_segments(description),
            SegmentSpec::Symbols(symbols) => symbols.clone(),
        }
    }

    /// Derive a tier on every word: the subsequence of its transcription
    /// drawn from the segments the spec names.
    pub fn add_tier(&mut self, name: impl Into<SmolStr>, spec: &SegmentSpec) {
        let name = name.into();
        let segments = self.resolve_segments(spec);
        for word in self.words.values_mut() {
            word.add_tier(name.clone(), &segments);
        }
        let mut attribute = Attribute::new(name, AttributeType::Tier);
        attribute.set_range_segments(segments.into_iter().collect());
        self.add_attribute(attribute, false);
    }

    /// Derive an abstract tier on every word: each transcription symbol is
    /// replaced by the label of the first class containing it.
    pub fn add_abstract_tier(
        &mut self,
        name: impl Into<SmolStr>,
        classes: &IndexMap<SmolStr, SegmentSpec>,
    ) {
        let name = name.into();
        let resolved: IndexMap<SmolStr, Vec<SmolStr>> = classes
            .iter()
            .map(|(label, spec)| (label.clone(), self.resolve_segments(spec)))
            .collect();
        let mut attribute = Attribute::new(name.clone(), AttributeType::Factor);
        for word in self.words.values_mut() {
            word.add_abstract_tier(name.clone(), &resolved);
            if let Some(value) = word.get(&name) {
                attribute.update_range(&value);
            }
        }
        self.add_attribute(attribute, false);
    }

    /// Add a numeric column counting, per word, the transcription symbols
    /// drawn from the segments the spec names.
    pub fn add_count_attribute(&mut self, name: impl Into<SmolStr>, spec: &SegmentSpec) {
        let name = name.into();
        let segments: IndexSet<SmolStr> = self.resolve_segments(spec).into_iter().collect();
        let mut attribute = Attribute::new(name.clone(), AttributeType::Numeric);
        for word in self.words.values_mut() {
            let count = word
                .transcription()
                .map(|t| t.iter().filter(|s| segments.contains(*s)).count())
                .unwrap_or(0);
            let value = AttributeValue::Number(count as f64);
            attribute.update_range(&value);
            let _ = word.set(&name, value);
        }
        self.add_attribute(attribute, false);
    }

    /// Apply a feature matrix: store it as the specifier and specify the
    /// inventory against it.
    pub fn set_feature_matrix(&mut self, matrix: FeatureMatrix) {
        info!(corpus = %self.name, matrix = matrix.name(), "applying feature matrix");
        self.inventory.specify(Some(&matrix));
        self.specifier = Some(matrix);
    }

    /// Clear the specifier and reset the inventory's category tables.
    pub fn clear_feature_matrix(&mut self) {
        self.inventory.specify(None);
        self.specifier = None;
    }

    /// Re-run inventory specification against the current specifier.
    /// Needed after deserialization and after the inventory grows.
    pub fn respecify(&mut self) {
        self.inventory.specify(self.specifier.as_ref());
    }

    /// Inventory symbols the current specifier does not cover. Empty when
    /// no specifier is set.
    pub fn check_coverage(&self) -> Vec<SmolStr> {
        let Some(matrix) = &self.specifier else {
            return Vec::new();
        };
        self.inventory
            .symbols()
            .filter(|s| !matrix.contains(s))
            .cloned()
            .collect()
    }

    /// Every attested symbol matching a feature description.
    pub fn features_to_segments(&self, description: &FeatureDescription) -> Vec<SmolStr> {
        self.inventory.features_to_segments(description)
    }

    /// A new corpus containing only the words passing every filter.
    ///
    /// The attribute schema and specifier are carried over; words are
    /// re-added one by one, so keys and disambiguation are recomputed from
    /// scratch.
    pub fn subset(&self, name: impl Into<String>, filters: &[SubsetFilter]) -> Corpus {
        let mut out = Corpus::new(name);
        out.attributes = self.attributes.clone();
        out.specifier = self.specifier.clone();
        for word in self.words.values() {
            if filters.iter().all(|f| f.passes(word)) {
                out.insert_word(word.clone());
            }
        }
        out.respecify();
        out
    }

    /// A uniformly random word, if the corpus is nonempty.
    pub fn random_word<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Word> {
        self.words.values().choose(rng)
    }

    /// A new corpus of up to `size` distinct randomly chosen words.
    pub fn random_subset<R: Rng + ?Sized>(
        &self,
        name: impl Into<String>,
        size: usize,
        rng: &mut R,
    ) -> Corpus {
        let mut out = Corpus::new(name);
        out.attributes = self.attributes.clone();
        out.specifier = self.specifier.clone();
        for word in self.words.values().choose_multiple(rng, size) {
            out.add_word(word.clone(), false);
        }
        out.respecify();
        out
    }
}

/// Merging unions the schemas. A word whose spelling already exists in the
/// receiver has its frequency summed onto the first existing entry, along
/// with any non-default attribute values and word tokens the incoming entry
/// carries; others are added as new entries.
impl AddAssign<Corpus> for Corpus {
    fn add_assign(&mut self, other: Corpus) {
        if self.specifier.is_none() {
            self.specifier = other.specifier;
        }
        for attribute in other.attributes {
            if self.attribute(attribute.name()).is_none() {
                self.attributes.push(attribute);
            }
        }
        let defaults: IndexMap<SmolStr, AttributeValue> = self
            .attributes
            .iter()
            .map(|a| (SmolStr::from(a.name()), a.default_value().clone()))
            .collect();
        for word in other.words.into_values() {
            let existing = self
                .words
                .values_mut()
                .find(|w| w.spelling() == word.spelling());
            match existing {
                Some(w) => {
                    w.add_frequency(word.frequency());
                    for (name, value) in word.extra_attributes() {
                        if defaults.get(name) != Some(value) {
                            w.set_extra(name.clone(), value.clone());
                        }
                    }
                    for token in word.tokens() {
                        w.add_token(token.clone());
                    }
                }
                None => {
                    self.insert_word(word);
                }
            }
        }
        self.respecify();
    }
}

/// Title-case every word, not just the first character, so multi-word
/// spellings stored as `"The Cat"` are reachable from `"the cat"`.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::super::transcription::Transcription;
    use super::super::word::WordToken;

    fn word(spelling: &str, symbols: &[&str], frequency: f64) -> Word {
        Word::from_parts(spelling, symbols.iter().copied()).with_frequency(frequency)
    }

    #[test]
    fn test_duplicate_keys_in_insertion_order() {
        let mut corpus = Corpus::new("test");
        let k0 = corpus.add_word(word("live", &["l", "ɪ", "v"], 1.0), true).unwrap();
        let k1 = corpus.add_word(word("live", &["l", "aɪ", "v"], 2.0), true).unwrap();
        let k2 = corpus.add_word(word("live", &["l", "i", "v"], 3.0), true).unwrap();
        assert_eq!(k0, "live");
        assert_eq!(k1, "live (1)");
        assert_eq!(k2, "live (2)");
        assert_eq!(corpus.get("live (1)").unwrap().frequency(), 2.0);
        assert_eq!(corpus.get("live (2)").unwrap().frequency(), 3.0);
    }

    #[test]
    fn test_disallowed_duplicate_is_dropped() {
        let mut corpus = Corpus::new("test");
        corpus.add_word(word("cat", &["k", "a", "t"], 1.0), false);
        let key = corpus.add_word(word("cat", &["k", "a", "t"], 9.0), false);
        assert_eq!(key, None);
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.get("cat").unwrap().frequency(), 1.0);
    }

    #[test]
    fn test_inventory_grows_with_words() {
        let mut corpus = Corpus::new("test");
        corpus.add_word(word("cat", &["k", "a", "t"], 1.0), false);
        corpus.add_word(word("dog", &["d", "o", "g"], 1.0), false);
        for symbol in ["k", "a", "t", "d", "o", "g", "#"] {
            assert!(corpus.inventory().contains(symbol), "missing {symbol}");
        }
    }

    #[test]
    fn test_find_with_case_variants() {
        let mut corpus = Corpus::new("test");
        corpus.add_word(word("Cat", &["k", "a", "t"], 1.0), false);
        assert!(corpus.find("Cat", false).is_ok());
        assert!(corpus.find("cat", false).is_err());
        assert!(corpus.find("cat", true).is_ok());
        assert!(corpus.find("CAT", true).is_ok());
        assert!(matches!(
            corpus.find("missing", true),
            Err(LexiconError::WordNotFound(_))
        ));
    }

    #[test]
    fn test_find_title_cases_every_word() {
        let mut corpus = Corpus::new("test");
        corpus.add_word(word("The Cat", &["ð", "ə", "k", "a", "t"], 1.0), false);
        assert!(corpus.find("the cat", true).is_ok());
        assert!(corpus.find("THE CAT", true).is_ok());
        assert!(corpus.find("the cat", false).is_err());
    }

    #[test]
    fn test_schema_extension_backfills_all_words() {
        let mut corpus = Corpus::new("test");
        corpus.add_word(word("cat", &["k", "a", "t"], 1.0), false);
        let dog = word("dog", &["d", "o", "g"], 1.0)
            .with_attribute("pos", AttributeValue::Factor("noun".into()));
        corpus.add_word(dog, false);
        let attr = corpus.attribute("pos").unwrap();
        assert_eq!(attr.att_type(), AttributeType::Factor);
        // The earlier word was not back-filled retroactively, but any word
        // added after the schema grew is.
        let late = word("eel", &["i", "l"], 1.0);
        corpus.add_word(late, false);
        assert_eq!(
            corpus.get("eel").unwrap().get("pos"),
            Some(AttributeValue::Factor("".into()))
        );
    }

    #[test]
    fn test_frequency_range_tracked() {
        let mut corpus = Corpus::new("test");
        corpus.add_word(word("a", &["a"], 2.0), false);
        corpus.add_word(word("b", &["b"], 8.0), false);
        assert_eq!(
            corpus.attribute("frequency").unwrap().range(),
            &super::super::attribute::AttributeRange::Numeric { min: 0.0, max: 8.0 }
        );
    }

    #[test]
    fn test_subset_numeric_filter() {
        let mut corpus = Corpus::new("test");
        corpus.add_word(word("a", &["a"], 1.0), false);
        corpus.add_word(word("b", &["b"], 6.0), false);
        corpus.add_word(word("c", &["c"], 10.0), false);
        let sub = corpus.subset(
            "frequent",
            &[SubsetFilter::Numeric {
                attribute: "frequency".into(),
                comparison: Comparison::Gt,
                threshold: 5.0,
            }],
        );
        assert_eq!(sub.len(), 2);
        assert!(sub.get("b").is_some());
        assert!(sub.get("c").is_some());
        assert!(sub.get("a").is_none());
        assert_eq!(sub.attributes().len(), corpus.attributes().len());
    }

    #[test]
    fn test_subset_factor_filter() {
        let mut corpus = Corpus::new("test");
        corpus.add_word(
            word("cat", &["k", "a", "t"], 1.0)
                .with_attribute("pos", AttributeValue::Factor("noun".into())),
            false,
        );
        corpus.add_word(
            word("run", &["r", "ʌ", "n"], 1.0)
                .with_attribute("pos", AttributeValue::Factor("verb".into())),
            false,
        );
        let mut levels = IndexSet::new();
        levels.insert(SmolStr::from("noun"));
        let sub = corpus.subset(
            "nouns",
            &[SubsetFilter::Factor {
                attribute: "pos".into(),
                levels,
            }],
        );
        assert_eq!(sub.len(), 1);
        assert!(sub.get("cat").is_some());
    }

    #[test]
    fn test_merge_sums_duplicate_frequencies() {
        let mut a = Corpus::new("a");
        a.add_word(word("cat", &["k", "a", "t"], 2.0), false);
        let mut b = Corpus::new("b");
        b.add_word(word("cat", &["k", "a", "t"], 3.0), false);
        b.add_word(word("dog", &["d", "o", "g"], 1.0), false);
        a += b;
        assert_eq!(a.len(), 2);
        assert_eq!(a.get("cat").unwrap().frequency(), 5.0);
        assert!(a.inventory().contains("d"));
    }

    #[test]
    fn test_merge_carries_attributes_and_tokens_onto_duplicates() {
        let mut a = Corpus::new("a");
        a.add_word(word("cat", &["k", "a", "t"], 2.0), false);

        let mut b = Corpus::new("b");
        let mut incoming = word("cat", &["k", "a", "t"], 3.0)
            .with_attribute("pos", AttributeValue::Factor("noun".into()));
        incoming.add_token(WordToken {
            spelling: Some("Cat".to_string()),
            transcription: None,
            begin: Some(0.5),
            end: Some(0.9),
        });
        b.add_word(incoming, false);
        a += b;

        let merged = a.get("cat").unwrap();
        assert_eq!(merged.frequency(), 5.0);
        assert_eq!(
            merged.get("pos"),
            Some(AttributeValue::Factor("noun".into()))
        );
        assert_eq!(merged.tokens().len(), 1);
        assert_eq!(merged.tokens()[0].begin, Some(0.5));
    }

    #[test]
    fn test_add_tier_and_count() {
        let mut corpus = Corpus::new("test");
        corpus.add_word(word("banana", &["b", "a", "n", "a", "n", "a"], 1.0), false);
        let spec = SegmentSpec::Symbols(vec![SmolStr::from("a")]);
        corpus.add_tier("vowels", &spec);
        corpus.add_count_attribute("vowel_count", &spec);
        let w = corpus.get("banana").unwrap();
        assert_eq!(
            w.get("vowels").and_then(|v| v.as_tier().cloned()),
            Some(Transcription::from_symbols(["a", "a", "a"]))
        );
        assert_eq!(w.get("vowel_count"), Some(AttributeValue::Number(3.0)));
        assert_eq!(
            corpus.attribute("vowels").unwrap().att_type(),
            AttributeType::Tier
        );
    }

    #[test]
    fn test_abstract_tier() {
        let mut corpus = Corpus::new("test");
        corpus.add_word(word("cat", &["k", "a", "t"], 1.0), false);
        let mut classes = IndexMap::new();
        classes.insert(
            SmolStr::from("C"),
            SegmentSpec::Symbols(vec![SmolStr::from("k"), SmolStr::from("t")]),
        );
        classes.insert(
            SmolStr::from("V"),
            SegmentSpec::Symbols(vec![SmolStr::from("a")]),
        );
        corpus.add_abstract_tier("cv", &classes);
        assert_eq!(
            corpus.get("cat").unwrap().get("cv"),
            Some(AttributeValue::Text("CVC".into()))
        );
    }

    #[test]
    fn test_remove_attribute_spares_basics() {
        let mut corpus = Corpus::new("test");
        corpus.add_word(
            word("cat", &["k", "a", "t"], 1.0)
                .with_attribute("pos", AttributeValue::Factor("noun".into())),
            false,
        );
        corpus.remove_attribute("pos");
        assert!(corpus.attribute("pos").is_none());
        assert!(corpus.get("cat").unwrap().get("pos").is_none());
        corpus.remove_attribute("frequency");
        assert!(corpus.attribute("frequency").is_some());
    }

    #[test]
    fn test_categorize_without_matrix_is_silent() {
        let mut corpus = Corpus::new("test");
        corpus.add_word(word("cat", &["k", "a", "t"], 1.0), false);
        assert_eq!(corpus.inventory().categorize("k"), None);
        corpus.clear_feature_matrix();
        assert!(corpus.inventory().places().is_empty());
    }

    #[test]
    fn test_get_or_create_word() {
        let mut corpus = Corpus::new("test");
        corpus.add_word(word("cat", &["k", "a", "t"], 1.0), false);
        let t = Transcription::from_symbols(["k", "a", "t"]);
        corpus.get_or_create_word("cat", Some(t)).unwrap();
        assert_eq!(corpus.len(), 1);
        let t2 = Transcription::from_symbols(["k", "æ", "t"]);
        corpus.get_or_create_word("cat", Some(t2)).unwrap();
        assert_eq!(corpus.len(), 2);
        assert!(corpus.get("cat (1)").is_some());
    }

    #[test]
    fn test_random_subset_size() {
        let mut corpus = Corpus::new("test");
        for (i, s) in ["a", "b", "c", "d", "e"].into_iter().enumerate() {
            corpus.add_word(word(s, &[s], i as f64), false);
        }
        let mut rng = StdRng::seed_from_u64(7);
        let sub = corpus.random_subset("sample", 3, &mut rng);
        assert_eq!(sub.len(), 3);
        assert!(corpus.random_word(&mut rng).is_some());
    }
}
