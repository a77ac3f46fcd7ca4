//! End-to-end persistence tests: versioned envelope round-trips, integrity
//! failures on malformed or unsupported files, and backward compatibility
//! with the bare-array transcription form.

use std::collections::BTreeSet;
use std::io::Write;

use phonolex::lexicon::{AttributeValue, SegmentSpec};
use phonolex::persist::{load_corpus, load_feature_matrix, save_corpus, save_feature_matrix};
use phonolex::{
    Corpus, FeatureMatrix, FeatureSpec, FeatureValue, LexiconError, Transcription, Word,
};
use smol_str::SmolStr;
use tempfile::tempdir;

fn mini_matrix() -> FeatureMatrix {
    let spec = |pairs: &[(&str, char)]| {
        FeatureSpec::from_pairs(
            pairs
                .iter()
                .map(|&(name, sign)| (name, FeatureValue::from(sign))),
        )
    };
    let mut m = FeatureMatrix::new(
        "mini",
        [
            (
                "k",
                spec(&[("consonantal", '+'), ("syllabic", '-'), ("voice", '-')]),
            ),
            (
                "t",
                spec(&[("consonantal", '+'), ("syllabic", '-'), ("voice", '-')]),
            ),
            (
                "a",
                spec(&[("consonantal", '-'), ("syllabic", '+'), ("voice", '+')]),
            ),
        ],
    );
    m.validate();
    m
}

fn sample_corpus() -> Corpus {
    let mut corpus = Corpus::new("sample");
    corpus.add_word(
        Word::from_parts("cat", ["k", "a", "t"])
            .with_frequency(4.0)
            .with_attribute("pos", AttributeValue::Factor("noun".into())),
        true,
    );
    corpus.add_word(Word::from_parts("tack", ["t", "a", "k"]).with_frequency(1.0), true);
    // A spelling duplicate, to exercise disambiguation keys through the
    // round trip.
    corpus.add_word(Word::from_parts("cat", ["k", "a", "t", "t"]), true);
    corpus.add_tier("vowels", &SegmentSpec::Symbols(vec![SmolStr::from("a")]));
    corpus.set_feature_matrix(mini_matrix());
    corpus
}

fn symbol_set(corpus: &Corpus) -> BTreeSet<String> {
    corpus
        .inventory()
        .symbols()
        .map(|s| s.to_string())
        .collect()
}

#[test]
fn test_round_trip_preserves_words_attributes_and_inventory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sample.corpus");
    let original = sample_corpus();
    save_corpus(&original, &path).unwrap();
    let loaded = load_corpus(&path).unwrap();

    let keys: Vec<&str> = loaded.keys().collect();
    assert_eq!(keys, vec!["cat", "tack", "cat (1)"]);

    let cat = loaded.get("cat").unwrap();
    assert_eq!(cat.frequency(), 4.0);
    assert_eq!(cat.get("pos"), Some(AttributeValue::Factor("noun".into())));
    assert_eq!(
        cat.get("vowels").and_then(|v| v.as_tier().cloned()),
        Some(Transcription::from_symbols(["a"]))
    );
    assert_eq!(
        cat.transcription(),
        Some(&Transcription::from_symbols(["k", "a", "t"]))
    );

    assert_eq!(symbol_set(&loaded), symbol_set(&original));

    // The specifier survives and the category tables are recompiled.
    assert_eq!(loaded.specifier().map(|m| m.name()), Some("mini"));
    assert!(loaded.inventory().is_specified());
    assert_eq!(
        loaded.inventory().categorize("k"),
        original.inventory().categorize("k")
    );
}

#[test]
fn test_malformed_file_is_an_integrity_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.corpus");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(b"{ not json")
        .unwrap();
    let err = load_corpus(&path).unwrap_err();
    assert!(matches!(err, LexiconError::Integrity { .. }));
    assert!(err.to_string().contains("recreate or redownload"));
}

#[test]
fn test_missing_file_is_an_integrity_error() {
    let dir = tempdir().unwrap();
    let err = load_corpus(dir.path().join("absent.corpus")).unwrap_err();
    assert!(matches!(err, LexiconError::Integrity { .. }));
}

#[test]
fn test_unsupported_version_is_an_integrity_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("future.corpus");
    std::fs::write(&path, r#"{"version": 99}"#).unwrap();
    let err = load_corpus(&path).unwrap_err();
    assert!(matches!(err, LexiconError::Integrity { source: None, .. }));
    assert!(err.to_string().contains("version 99"));
}

#[test]
fn test_bare_transcription_arrays_still_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("legacy.corpus");
    std::fs::write(
        &path,
        r#"{
            "version": 1,
            "corpus": {
                "name": "legacy",
                "words": {
                    "cat": {
                        "spelling": "cat",
                        "transcription": ["k", "a", "t"],
                        "frequency": 2.0
                    }
                }
            }
        }"#,
    )
    .unwrap();
    let loaded = load_corpus(&path).unwrap();
    assert_eq!(
        loaded.get("cat").unwrap().transcription(),
        Some(&Transcription::from_symbols(["k", "a", "t"]))
    );
    // The schema is regenerated with the three basic attributes.
    let names: Vec<&str> = loaded.attributes().iter().map(|a| a.name()).collect();
    assert_eq!(names, vec!["spelling", "transcription", "frequency"]);
    assert!(loaded.find("cat", false).is_ok());
}

#[test]
fn test_feature_matrix_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mini.features");
    let original = mini_matrix();
    save_feature_matrix(&original, &path).unwrap();
    let loaded = load_feature_matrix(&path).unwrap();
    assert_eq!(loaded, original);
    assert_eq!(loaded.name(), "mini");
}
