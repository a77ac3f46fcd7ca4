//! Versioned on-disk corpus storage.
//!
//! A corpus (with its feature matrix, when one is set) is stored as a JSON
//! envelope carrying an explicit format version. Loading probes the version
//! first, then maps the envelope into the current in-memory shape; any
//! malformed or unreadable state surfaces as a single
//! [`LexiconError::Integrity`] so the raw deserialization error never
//! crosses the crate boundary.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::LexiconError;
use crate::features::FeatureMatrix;
use crate::lexicon::Corpus;

/// Current corpus file format version.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct CorpusEnvelope {
    version: u32,
    corpus: Corpus,
}

#[derive(Serialize, Deserialize)]
struct MatrixEnvelope {
    version: u32,
    matrix: FeatureMatrix,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

/// Write a corpus to `path` as a versioned envelope.
pub fn save_corpus(corpus: &Corpus, path: impl AsRef<Path>) -> Result<(), LexiconError> {
    let path = path.as_ref();
    let file = File::create(path)
        .map_err(|e| LexiconError::integrity(format!("could not create {}", path.display()), e))?;
    let envelope = CorpusEnvelope {
        version: FORMAT_VERSION,
        corpus: corpus.clone(),
    };
    serde_json::to_writer(BufWriter::new(file), &envelope)
        .map_err(|e| LexiconError::integrity(format!("could not write {}", path.display()), e))?;
    info!(corpus = corpus.name(), path = %path.display(), "saved corpus");
    Ok(())
}

/// Load a corpus from a versioned envelope at `path`.
///
/// The inventory's category tables are not persisted; they are recompiled
/// here against the stored specifier.
pub fn load_corpus(path: impl AsRef<Path>) -> Result<Corpus, LexiconError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| LexiconError::integrity(format!("could not read {}", path.display()), e))?;
    let probe: VersionProbe = serde_json::from_str(&text)
        .map_err(|e| LexiconError::integrity(format!("malformed corpus file {}", path.display()), e))?;
    if probe.version != FORMAT_VERSION {
        return Err(LexiconError::integrity_message(format!(
            "corpus file {} has unsupported format version {}",
            path.display(),
            probe.version
        )));
    }
    let envelope: CorpusEnvelope = serde_json::from_str(&text)
        .map_err(|e| LexiconError::integrity(format!("malformed corpus file {}", path.display()), e))?;
    let mut corpus = envelope.corpus;
    corpus.respecify();
    info!(corpus = corpus.name(), words = corpus.len(), "loaded corpus");
    Ok(corpus)
}

/// Write a standalone feature matrix to `path`.
pub fn save_feature_matrix(
    matrix: &FeatureMatrix,
    path: impl AsRef<Path>,
) -> Result<(), LexiconError> {
    let path = path.as_ref();
    let file = File::create(path)
        .map_err(|e| LexiconError::integrity(format!("could not create {}", path.display()), e))?;
    let envelope = MatrixEnvelope {
        version: FORMAT_VERSION,
        matrix: matrix.clone(),
    };
    serde_json::to_writer(BufWriter::new(file), &envelope)
        .map_err(|e| LexiconError::integrity(format!("could not write {}", path.display()), e))
}

/// Load a standalone feature matrix from `path`.
pub fn load_feature_matrix(path: impl AsRef<Path>) -> Result<FeatureMatrix, LexiconError> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| LexiconError::integrity(format!("could not read {}", path.display()), e))?;
    let envelope: MatrixEnvelope = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        LexiconError::integrity(format!("malformed feature matrix file {}", path.display()), e)
    })?;
    if envelope.version != FORMAT_VERSION {
        return Err(LexiconError::integrity_message(format!(
            "feature matrix file {} has unsupported format version {}",
            path.display(),
            envelope.version
        )));
    }
    Ok(envelope.matrix)
}
