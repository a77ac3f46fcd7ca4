//! Category schemes: how a feature system maps onto descriptive
//! place/manner/height/backness labels.
//!
//! Two concrete feature conventions are recognized (Hayes-style and
//! SPE-style), detected from the declared feature names; anything else falls
//! back to a generic scheme whose tables carry no feature constraints.
//! Tables are ordered most-specific-first and walked first-match-wins.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::base::{FeatureDescription, FeatureToken, FeatureValue};

/// Voicing half of a consonant categorization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Voicing {
    Voiced,
    Voiceless,
}

/// Rounding half of a vowel categorization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rounding {
    Rounded,
    Unrounded,
}

/// The result of categorizing a segment.
///
/// A `None` slot means no table entry matched; that is an answer, not an
/// error. Diphthongs short-circuit: no height/backness is computed for them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SegmentCategory {
    Diphthong,
    Vowel {
        height: Option<SmolStr>,
        backness: Option<SmolStr>,
        rounding: Rounding,
    },
    Consonant {
        place: Option<SmolStr>,
        manner: Option<SmolStr>,
        voicing: Voicing,
    },
}

impl SegmentCategory {
    pub fn is_vowel(&self) -> bool {
        matches!(
            self,
            SegmentCategory::Vowel { .. } | SegmentCategory::Diphthong
        )
    }

    pub fn is_consonant(&self) -> bool {
        matches!(self, SegmentCategory::Consonant { .. })
    }
}

/// The four singleton class markers of a feature convention.
///
/// An empty description is "no constraint": under the generic fallback every
/// segment passes the vowel and diphthong tests, mirroring how unspecified
/// systems behave.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMarkers {
    pub vowel: FeatureDescription,
    pub voice: FeatureDescription,
    pub diphthong: FeatureDescription,
    pub rounded: FeatureDescription,
}

/// Ordered category tables plus class markers for one feature convention.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScheme {
    pub places: IndexMap<SmolStr, FeatureDescription>,
    pub manners: IndexMap<SmolStr, FeatureDescription>,
    pub height: IndexMap<SmolStr, FeatureDescription>,
    pub backness: IndexMap<SmolStr, FeatureDescription>,
    pub markers: ClassMarkers,
}

/// Which feature convention a matrix's feature names imply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureConvention {
    Hayes,
    Spe,
    Generic,
}

impl FeatureConvention {
    /// Detect the convention from the set of declared feature names.
    pub fn detect<'a>(mut features: impl Iterator<Item = &'a SmolStr>) -> Self {
        let mut saw_voc = false;
        for f in features.by_ref() {
            if f == "consonantal" {
                return FeatureConvention::Hayes;
            }
            if f == "voc" {
                saw_voc = true;
            }
        }
        if saw_voc {
            FeatureConvention::Spe
        } else {
            FeatureConvention::Generic
        }
    }

    /// The category tables and class markers for this convention.
    pub fn scheme(self) -> CategoryScheme {
        match self {
            FeatureConvention::Hayes => hayes(),
            FeatureConvention::Spe => spe(),
            FeatureConvention::Generic => generic(),
        }
    }
}

fn desc(pairs: &[(char, &str)]) -> FeatureDescription {
    FeatureDescription::from_tokens(
        pairs
            .iter()
            .map(|&(sign, name)| FeatureToken::new(FeatureValue::from(sign), name))
            .collect(),
    )
}

fn table(entries: &[(&str, &[(char, &str)])]) -> IndexMap<SmolStr, FeatureDescription> {
    entries
        .iter()
        .map(|&(label, pairs)| (SmolStr::from(label), desc(pairs)))
        .collect()
}

const PLACE_LABELS: [&str; 10] = [
    "Labial",
    "Labiodental",
    "Dental",
    "Alveolar",
    "Alveopalatal",
    "Palatal",
    "Velar",
    "Uvular",
    "Pharyngeal",
    "Glottal",
];

const MANNER_LABELS: [&str; 8] = [
    "Stop",
    "Nasal",
    "Trill",
    "Tap",
    "Fricative",
    "Affricate",
    "Approximant",
    "Lateral approximant",
];

const BACKNESS_LABELS: [&str; 5] = ["Front", "Near front", "Central", "Near back", "Back"];

const HEIGHT_LABELS: [&str; 5] = ["Close", "Near close", "Close mid", "Open mid", "Open"];

fn height_table() -> IndexMap<SmolStr, FeatureDescription> {
    table(&[
        ("Close", &[('+', "high"), ('-', "low"), ('+', "tense")]),
        ("Near close", &[('+', "high"), ('-', "low"), ('-', "tense")]),
        ("Close mid", &[('-', "high"), ('-', "low"), ('+', "tense")]),
        ("Open mid", &[('-', "high"), ('-', "low"), ('-', "tense")]),
        ("Open", &[('-', "high"), ('+', "low")]),
    ])
}

fn hayes() -> CategoryScheme {
    CategoryScheme {
        places: table(&[
            ("Labial", &[('+', "labial"), ('-', "coronal")]),
            ("Labiodental", &[('+', "labiodental")]),
            ("Dental", &[('+', "anterior"), ('+', "coronal"), ('-', "labial")]),
            ("Alveolar", &[]),
            ("Alveopalatal", &[('-', "anterior"), ('+', "coronal"), ('-', "labial")]),
            ("Palatal", &[('+', "dorsal"), ('+', "coronal"), ('-', "labial")]),
            ("Velar", &[('+', "dorsal"), ('-', "labial")]),
            ("Uvular", &[('+', "dorsal"), ('+', "back"), ('-', "labial")]),
            ("Pharyngeal", &[]),
            (
                "Glottal",
                &[('-', "dorsal"), ('-', "coronal"), ('-', "labial"), ('-', "nasal")],
            ),
        ]),
        manners: table(&[
            (
                "Stop",
                &[('-', "sonorant"), ('-', "continuant"), ('-', "nasal"), ('-', "delayed_release")],
            ),
            ("Nasal", &[('+', "nasal")]),
            ("Trill", &[('+', "trill")]),
            ("Tap", &[('+', "tap")]),
            ("Fricative", &[('-', "sonorant"), ('+', "continuant")]),
            (
                "Affricate",
                &[('-', "sonorant"), ('-', "continuant"), ('+', "delayed_release")],
            ),
            ("Approximant", &[('+', "sonorant"), ('-', "lateral")]),
            ("Lateral approximant", &[('+', "sonorant"), ('+', "lateral")]),
        ]),
        height: height_table(),
        backness: table(&[
            ("Front", &[('+', "front"), ('-', "back"), ('+', "tense")]),
            ("Near front", &[('+', "front"), ('-', "back"), ('-', "tense")]),
            ("Central", &[('-', "front"), ('-', "back")]),
            ("Near back", &[('-', "front"), ('-', "back"), ('-', "tense")]),
            ("Back", &[('-', "front"), ('+', "back"), ('+', "tense")]),
        ]),
        markers: ClassMarkers {
            vowel: desc(&[('+', "syllabic")]),
            voice: desc(&[('+', "voice")]),
            diphthong: desc(&[('+', "diphthong")]),
            rounded: desc(&[('+', "round")]),
        },
    }
}

fn spe() -> CategoryScheme {
    CategoryScheme {
        places: table(&[
            ("Labial", &[('+', "ant"), ('-', "back"), ('-', "cor")]),
            ("Labiodental", &[('+', "ant"), ('-', "back"), ('-', "cor")]),
            ("Dental", &[('+', "ant"), ('-', "back"), ('+', "cor")]),
            ("Alveolar", &[('-', "ant"), ('-', "back"), ('+', "cor"), ('-', "high")]),
            ("Alveopalatal", &[('-', "ant"), ('-', "back"), ('+', "cor"), ('+', "high")]),
            ("Palatal", &[('-', "ant"), ('-', "back"), ('-', "cor")]),
            ("Velar", &[('-', "ant"), ('+', "back"), ('-', "cor"), ('+', "high")]),
            ("Uvular", &[('-', "ant"), ('+', "back"), ('-', "cor"), ('-', "high")]),
            ("Pharyngeal", &[('+', "low"), ('+', "back")]),
            ("Glottal", &[('+', "low"), ('-', "back")]),
        ]),
        manners: table(&[
            ("Stop", &[('-', "son"), ('-', "cont"), ('-', "nasal")]),
            ("Nasal", &[('+', "nasal")]),
            ("Trill", &[]),
            ("Tap", &[]),
            ("Fricative", &[('-', "son"), ('+', "cont"), ('-', "nasal")]),
            ("Affricate", &[('+', "del_rel")]),
            ("Approximant", &[('+', "son"), ('-', "nasal"), ('-', "lat")]),
            ("Lateral approximant", &[('+', "son"), ('-', "nasal"), ('+', "lat")]),
        ]),
        height: height_table(),
        backness: table(&[
            ("Front", &[('-', "back"), ('+', "tense")]),
            ("Near front", &[('-', "back"), ('-', "tense")]),
            ("Central", &[('n', "back")]),
            ("Near back", &[('+', "back"), ('-', "tense")]),
            ("Back", &[('+', "back"), ('+', "tense")]),
        ]),
        markers: ClassMarkers {
            vowel: desc(&[('+', "voc")]),
            voice: desc(&[('+', "voice")]),
            diphthong: desc(&[('.', "high")]),
            rounded: desc(&[('+', "round")]),
        },
    }
}

fn generic() -> CategoryScheme {
    let empty = |labels: &[&str]| {
        labels
            .iter()
            .map(|&l| (SmolStr::from(l), FeatureDescription::empty()))
            .collect()
    };
    CategoryScheme {
        places: empty(&PLACE_LABELS),
        manners: empty(&MANNER_LABELS),
        height: empty(&HEIGHT_LABELS),
        backness: empty(&BACKNESS_LABELS),
        markers: ClassMarkers::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&["consonantal", "voice"], FeatureConvention::Hayes)]
    #[case(&["voc", "voice"], FeatureConvention::Spe)]
    #[case(&["consonantal", "voc"], FeatureConvention::Hayes)]
    #[case(&["height", "frontness"], FeatureConvention::Generic)]
    fn test_convention_detection(#[case] features: &[&str], #[case] expected: FeatureConvention) {
        let names: Vec<SmolStr> = features.iter().map(|&f| SmolStr::from(f)).collect();
        assert_eq!(FeatureConvention::detect(names.iter()), expected);
    }

    #[test]
    fn test_tables_are_ordered() {
        let scheme = FeatureConvention::Hayes.scheme();
        let labels: Vec<&str> = scheme.places.keys().map(|k| k.as_str()).collect();
        assert_eq!(labels, PLACE_LABELS);
    }

    #[test]
    fn test_generic_markers_match_everything() {
        let scheme = FeatureConvention::Generic.scheme();
        assert!(scheme.markers.vowel.is_empty());
        assert!(scheme.places.values().all(|d| d.is_empty()));
    }

    #[test]
    fn test_spe_diphthong_marker_uses_dot_value() {
        let scheme = FeatureConvention::Spe.scheme();
        let token = scheme.markers.diphthong.iter().next().unwrap();
        assert_eq!(token.value, FeatureValue::Other(".".into()));
        assert_eq!(token.name.as_str(), "high");
    }
}
