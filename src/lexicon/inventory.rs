//! The per-corpus segment inventory, pre-compiled against a feature matrix
//! for fast categorization and minimal-pair search.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use tracing::debug;

use crate::base::{BOUNDARY, FeatureDescription, FeatureSpec, FeatureValue, Segment};
use crate::features::{FeatureMatrix, Rounding, SegmentCategory, Voicing};

/// The segments actually attested in one corpus.
///
/// Always contains the boundary symbol and grows monotonically as words are
/// ingested. Once [`specify`](Inventory::specify) runs against a feature
/// matrix, every segment carries an owned copy of its feature specification
/// and the category tables are pre-compiled by intersecting the matrix's
/// category definitions with the attested symbol set.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Inventory {
    segments: IndexMap<SmolStr, Segment>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    stresses: IndexMap<SmolStr, IndexSet<SmolStr>>,
    #[serde(skip)]
    features: IndexSet<SmolStr>,
    #[serde(skip)]
    possible_values: IndexSet<FeatureValue>,
    #[serde(skip)]
    uncovered: IndexSet<SmolStr>,
    #[serde(skip)]
    specified: bool,
    #[serde(skip)]
    places: IndexMap<SmolStr, IndexSet<SmolStr>>,
    #[serde(skip)]
    manners: IndexMap<SmolStr, IndexSet<SmolStr>>,
    #[serde(skip)]
    height: IndexMap<SmolStr, IndexSet<SmolStr>>,
    #[serde(skip)]
    backness: IndexMap<SmolStr, IndexSet<SmolStr>>,
    #[serde(skip)]
    vowels: IndexSet<SmolStr>,
    #[serde(skip)]
    voiced: IndexSet<SmolStr>,
    #[serde(skip)]
    diphthongs: IndexSet<SmolStr>,
    #[serde(skip)]
    rounded: IndexSet<SmolStr>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

impl Inventory {
    /// An inventory holding only the boundary segment.
    pub fn new() -> Self {
        let mut segments = IndexMap::new();
        segments.insert(SmolStr::from(BOUNDARY), Segment::boundary());
        Self {
            segments,
            stresses: IndexMap::new(),
            features: IndexSet::new(),
            possible_values: IndexSet::new(),
            uncovered: IndexSet::new(),
            specified: false,
            places: IndexMap::new(),
            manners: IndexMap::new(),
            height: IndexMap::new(),
            backness: IndexMap::new(),
            vowels: IndexSet::new(),
            voiced: IndexSet::new(),
            diphthongs: IndexSet::new(),
            rounded: IndexSet::new(),
        }
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

    pub fn get(&self, symbol: &str) -> Option<&Segment> {
        self.segments.get(symbol)
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.values()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &SmolStr> {
        self.segments.keys()
    }

    /// Register a symbol, creating a plain featureless segment if it is new.
    pub fn add_symbol(&mut self, symbol: impl Into<SmolStr>) -> &Segment {
        let symbol = symbol.into();
        self.segments
            .entry(symbol.clone())
            .or_insert_with(|| Segment::new(symbol))
    }

    /// Record that a stress marker was seen on a symbol.
    pub fn record_stress(&mut self, marker: impl Into<SmolStr>, symbol: impl Into<SmolStr>) {
        self.stresses
            .entry(marker.into())
            .or_default()
            .insert(symbol.into());
    }

    /// Stress marker to the set of symbols it was observed on.
    pub fn stresses(&self) -> &IndexMap<SmolStr, IndexSet<SmolStr>> {
        &self.stresses
    }

    /// Whether a feature matrix has been applied.
    pub fn is_specified(&self) -> bool {
        self.specified
    }

    /// Copy feature specifications in from a matrix and pre-compile the
    /// category tables over the attested symbol set.
    ///
    /// Segments absent from the matrix degrade to an empty feature set and
    /// are recorded as uncovered rather than failing; see
    /// [`uncovered`](Inventory::uncovered). `specify(None)` resets every
    /// table and every segment's features to empty.
    pub fn specify(&mut self, matrix: Option<&FeatureMatrix>) {
        self.reset_tables();
        let Some(matrix) = matrix else {
            for segment in self.segments.values_mut() {
                segment.specify(FeatureSpec::new());
            }
            self.specified = false;
            return;
        };
        for (symbol, segment) in &mut self.segments {
            match matrix.get(symbol) {
                Some(spec) => segment.specify(spec.clone()),
                None => {
                    segment.specify(FeatureSpec::new());
                    self.uncovered.insert(symbol.clone());
                }
            }
        }
        if !self.uncovered.is_empty() {
            debug!(
                matrix = matrix.name(),
                uncovered = self.uncovered.len(),
                "inventory symbols missing from the feature matrix"
            );
        }
        self.features = matrix.features().into_iter().collect();
        self.possible_values = matrix.possible_values().clone();
        let scheme = matrix.scheme();
        self.places = self.compile_table(&scheme.places);
        self.manners = self.compile_table(&scheme.manners);
        self.height = self.compile_table(&scheme.height);
        self.backness = self.compile_table(&scheme.backness);
        self.vowels = self.compile_marker(&scheme.markers.vowel);
        self.voiced = self.compile_marker(&scheme.markers.voice);
        self.diphthongs = self.compile_marker(&scheme.markers.diphthong);
        self.rounded = self.compile_marker(&scheme.markers.rounded);
        self.specified = true;
    }

    /// Symbols the last applied matrix did not cover. Empty until
    /// [`specify`](Inventory::specify) runs with a matrix.
    pub fn uncovered(&self) -> &IndexSet<SmolStr> {
        &self.uncovered
    }

    pub fn places(&self) -> &IndexMap<SmolStr, IndexSet<SmolStr>> {
        &self.places
    }

    pub fn manners(&self) -> &IndexMap<SmolStr, IndexSet<SmolStr>> {
        &self.manners
    }

    pub fn height(&self) -> &IndexMap<SmolStr, IndexSet<SmolStr>> {
        &self.height
    }

    pub fn backness(&self) -> &IndexMap<SmolStr, IndexSet<SmolStr>> {
        &self.backness
    }

    /// Classify a symbol against the pre-compiled tables.
    ///
    /// `None` for the boundary symbol, for unknown symbols, and when no
    /// matrix has been applied. Table walk order is the matrix's; the first
    /// table entry containing the symbol wins and absence leaves that slot
    /// `None`.
    pub fn categorize(&self, symbol: &str) -> Option<SegmentCategory> {
        if symbol == BOUNDARY || !self.specified || !self.segments.contains_key(symbol) {
            return None;
        }
        if self.vowels.contains(symbol) {
            if self.diphthongs.contains(symbol) {
                return Some(SegmentCategory::Diphthong);
            }
            let rounding = if self.rounded.contains(symbol) {
                Rounding::Rounded
            } else {
                Rounding::Unrounded
            };
            Some(SegmentCategory::Vowel {
                height: first_table_match(&self.height, symbol),
                backness: first_table_match(&self.backness, symbol),
                rounding,
            })
        } else {
            let voicing = if self.voiced.contains(symbol) {
                Voicing::Voiced
            } else {
                Voicing::Voiceless
            };
            Some(SegmentCategory::Consonant {
                place: first_table_match(&self.places, symbol),
                manner: first_table_match(&self.manners, symbol),
                voicing,
            })
        }
    }

    /// Every attested symbol whose segment matches the description. The
    /// empty description matches everything.
    pub fn features_to_segments(&self, description: &FeatureDescription) -> Vec<SmolStr> {
        self.segments
            .iter()
            .filter(|(_, segment)| segment.matches(description))
            .map(|(symbol, _)| symbol.clone())
            .collect()
    }

    /// Every well-formed `<value><feature>` token over the specified
    /// feature set.
    pub fn valid_feature_strings(&self) -> Vec<String> {
        let mut strings = Vec::new();
        for value in &self.possible_values {
            for feature in &self.features {
                strings.push(format!("{value}{feature}"));
            }
        }
        strings
    }

    /// Group segments that form minimal pairs on `features`.
    ///
    /// A segment qualifies if it passes the `others` filter and some other
    /// qualifying segment is identical to it on every feature outside
    /// `features` and the features proven redundant for them. Qualifying
    /// segments are grouped by their value tuple on `features`; only
    /// segments with binary values on every target feature participate.
    pub fn find_min_feature_pairs(
        &self,
        features: &[SmolStr],
        others: Option<&FeatureDescription>,
    ) -> IndexMap<Vec<FeatureValue>, Vec<SmolStr>> {
        let mut ignore = features.to_vec();
        ignore.extend(self.redundant_features(features, others));
        let candidates: Vec<&Segment> = self
            .segments
            .values()
            .filter(|s| !s.is_boundary() && s.matches_opt(others))
            .collect();
        let mut output: IndexMap<Vec<FeatureValue>, Vec<SmolStr>> = IndexMap::new();
        for &segment in &candidates {
            let Some(key) = binary_value_tuple(segment, features) else {
                continue;
            };
            let paired = candidates.iter().any(|&other| {
                other.symbol() != segment.symbol()
                    && binary_value_tuple(other, features).is_some()
                    && segment.minimal_difference(other, &ignore)
                    && other.minimal_difference(segment, &ignore)
            });
            if !paired {
                continue;
            }
            let symbols = output.entry(key).or_default();
            if !symbols.contains(&SmolStr::from(segment.symbol())) {
                symbols.push(SmolStr::from(segment.symbol()));
            }
        }
        output
    }

    /// Features whose value is fully determined by the value tuple of
    /// `features`, over the segments passing the `others` filter.
    ///
    /// This is an implication closure over the attested segment set; it must
    /// be recomputed whenever the inventory or its specification changes.
    /// The scan for each candidate bails out at the first counterexample.
    pub fn redundant_features(
        &self,
        features: &[SmolStr],
        others: Option<&FeatureDescription>,
    ) -> Vec<SmolStr> {
        let excluded: IndexSet<&SmolStr> = features
            .iter()
            .chain(others.into_iter().flat_map(|d| d.names()))
            .collect();
        let candidates: Vec<&Segment> = self
            .segments
            .values()
            .filter(|s| !s.is_boundary() && s.matches_opt(others))
            .collect();
        let mut redundant = Vec::new();
        'candidate: for feature in &self.features {
            if excluded.contains(feature) {
                continue;
            }
            let mut implied: IndexMap<Vec<FeatureValue>, FeatureValue> = IndexMap::new();
            for segment in &candidates {
                let key: Vec<FeatureValue> = features
                    .iter()
                    .map(|f| segment.value(f).cloned().unwrap_or_default())
                    .collect();
                let value = segment.value(feature).cloned().unwrap_or_default();
                match implied.get(&key) {
                    Some(seen) if *seen != value => continue 'candidate,
                    Some(_) => {}
                    None => {
                        implied.insert(key, value);
                    }
                }
            }
            redundant.push(feature.clone());
        }
        redundant
    }

    fn compile_table(
        &self,
        table: &IndexMap<SmolStr, FeatureDescription>,
    ) -> IndexMap<SmolStr, IndexSet<SmolStr>> {
        table
            .iter()
            .map(|(label, desc)| (label.clone(), self.compile_class(desc)))
            .collect()
    }

    /// Markers keep description matching semantics: the empty description
    /// matches everything, so an empty marker's class is the whole symbol
    /// set. This keeps `categorize` in agreement with
    /// [`FeatureMatrix::categorize`] under the generic convention.
    fn compile_marker(&self, description: &FeatureDescription) -> IndexSet<SmolStr> {
        if description.is_empty() {
            return self.segments.keys().cloned().collect();
        }
        self.compile_class(description)
    }

    /// An empty description compiles to an empty symbol set: a category with
    /// no identifying features in this convention claims no segments.
    fn compile_class(&self, description: &FeatureDescription) -> IndexSet<SmolStr> {
        if description.is_empty() {
            return IndexSet::new();
        }
        self.segments
            .iter()
            .filter(|(_, segment)| segment.matches(description))
            .map(|(symbol, _)| symbol.clone())
            .collect()
    }

    fn reset_tables(&mut self) {
        self.features.clear();
        self.possible_values.clear();
        self.uncovered.clear();
        self.places.clear();
        self.manners.clear();
        self.height.clear();
        self.backness.clear();
        self.vowels.clear();
        self.voiced.clear();
        self.diphthongs.clear();
        self.rounded.clear();
    }
}

fn first_table_match(
    table: &IndexMap<SmolStr, IndexSet<SmolStr>>,
    symbol: &str,
) -> Option<SmolStr> {
    table
        .iter()
        .find(|(_, symbols)| symbols.contains(symbol))
        .map(|(label, _)| label.clone())
}

fn binary_value_tuple(segment: &Segment, features: &[SmolStr]) -> Option<Vec<FeatureValue>> {
    features
        .iter()
        .map(|f| {
            segment
                .value(f)
                .filter(|v| v.is_binary())
                .cloned()
        })
        .collect()
}
