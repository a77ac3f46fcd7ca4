//! Tiered phonemic representations and environment search.

use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::base::BOUNDARY;
use crate::error::LexiconError;

use super::environment::{Environment, EnvironmentFilter};

/// One annotated symbol of raw transcription input: a label plus optional
/// stress, tone, and morpheme-group markers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SegmentToken {
    pub label: SmolStr,
    pub stress: Option<SmolStr>,
    pub tone: Option<SmolStr>,
    pub group: Option<u32>,
}

impl SegmentToken {
    pub fn new(label: impl Into<SmolStr>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }
}

/// An ordered, possibly-empty sequence of segment symbols with optional
/// stress, tone, and morpheme-boundary annotations.
///
/// Equality compares the symbol sequence and all annotation maps, so two
/// transcriptions built from different raw inputs that normalize to the
/// same shape are equal. All annotation indices are valid positions into
/// the symbol sequence.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Transcription {
    symbols: Vec<SmolStr>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    stress: IndexMap<usize, SmolStr>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    tones: IndexMap<usize, SmolStr>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    morpheme_breaks: Vec<usize>,
}

impl Transcription {
    /// A transcription from bare symbols, with no annotations.
    pub fn from_symbols<S: Into<SmolStr>>(symbols: impl IntoIterator<Item = S>) -> Self {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// A transcription with explicit annotation maps.
    ///
    /// Fails fast if any annotation index is not a valid position into the
    /// symbol sequence.
    pub fn with_annotations<S: Into<SmolStr>>(
        symbols: impl IntoIterator<Item = S>,
        stress: IndexMap<usize, SmolStr>,
        tones: IndexMap<usize, SmolStr>,
        morpheme_breaks: Vec<usize>,
    ) -> Result<Self, LexiconError> {
        let symbols: Vec<SmolStr> = symbols.into_iter().map(Into::into).collect();
        let length = symbols.len();
        let out_of_range = stress
            .keys()
            .chain(tones.keys())
            .chain(morpheme_breaks.iter())
            .find(|&&p| p >= length);
        if let Some(&position) = out_of_range {
            return Err(LexiconError::InvalidAnnotation { position, length });
        }
        Ok(Self {
            symbols,
            stress,
            tones,
            morpheme_breaks,
        })
    }

    /// Normalize a sequence of annotated tokens.
    ///
    /// Stress markers are kept per position; tone markers are recorded at
    /// change points; morpheme breaks are recorded where the group number
    /// changes.
    pub fn from_tokens(tokens: &[SegmentToken]) -> Self {
        let mut symbols = Vec::with_capacity(tokens.len());
        let mut stress = IndexMap::new();
        let mut tones = IndexMap::new();
        let mut morpheme_breaks = Vec::new();
        let mut current_tone: Option<&SmolStr> = None;
        let mut current_group = 0u32;
        for (i, token) in tokens.iter().enumerate() {
            symbols.push(token.label.clone());
            if let Some(s) = &token.stress {
                stress.insert(i, s.clone());
            }
            if let Some(tone) = &token.tone {
                if current_tone != Some(tone) {
                    tones.insert(i, tone.clone());
                    current_tone = Some(tone);
                }
            }
            if let Some(group) = token.group {
                if group != current_group {
                    morpheme_breaks.push(i);
                    current_group = group;
                }
            }
        }
        Self {
            symbols,
            stress,
            tones,
            morpheme_breaks,
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[SmolStr] {
        &self.symbols
    }

    pub fn get(&self, index: usize) -> Option<&SmolStr> {
        self.symbols.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SmolStr> {
        self.symbols.iter()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    pub fn stress(&self) -> &IndexMap<usize, SmolStr> {
        &self.stress
    }

    pub fn tones(&self) -> &IndexMap<usize, SmolStr> {
        &self.tones
    }

    pub fn morpheme_breaks(&self) -> &[usize] {
        &self.morpheme_breaks
    }

    /// The symbol sequence padded with a boundary symbol on both ends.
    pub fn with_word_boundaries(&self) -> Vec<SmolStr> {
        let mut padded = Vec::with_capacity(self.symbols.len() + 2);
        padded.push(SmolStr::from(BOUNDARY));
        padded.extend(self.symbols.iter().cloned());
        padded.push(SmolStr::from(BOUNDARY));
        padded
    }

    /// The subsequence of symbols that are members of `segments`, in order.
    /// This is how tiers are derived.
    pub fn match_segments<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a SmolStr>,
    ) -> Vec<SmolStr> {
        let wanted: rustc_hash::FxHashSet<&SmolStr> = segments.into_iter().collect();
        self.symbols
            .iter()
            .filter(|s| wanted.contains(s))
            .cloned()
            .collect()
    }

    /// All symbols of this transcription followed by all symbols of
    /// `other`.
    pub fn concat(&self, other: &Transcription) -> Vec<SmolStr> {
        self.symbols
            .iter()
            .chain(other.symbols.iter())
            .cloned()
            .collect()
    }

    /// Find every context where the filter fully matches.
    ///
    /// Short-circuits to `None` when no symbol of the filter's middle set
    /// occurs anywhere in the transcription. Otherwise slides a window of
    /// the filter's width across the boundary-padded sequence and records
    /// an [`Environment`] for every matching window, with the middle
    /// symbol's position reported in unpadded coordinates. Returns `None`
    /// when nothing matches. Read-only.
    pub fn find(&self, filter: &EnvironmentFilter) -> Option<Vec<Environment>> {
        self.scan(filter, |window| filter.matches(window))
    }

    /// Find every context where the target middle symbol occurs but the
    /// full window does NOT satisfy the filter.
    ///
    /// Used to locate positions where a conditioning environment is absent
    /// despite the target segment being present. Same short-circuit and
    /// return conventions as [`find`](Transcription::find). Read-only.
    pub fn find_nonmatch(&self, filter: &EnvironmentFilter) -> Option<Vec<Environment>> {
        let lhs_len = filter.lhs_len();
        self.scan(filter, |window| {
            !filter.matches(window) && filter.middle().contains(&window[lhs_len])
        })
    }

    fn scan(
        &self,
        filter: &EnvironmentFilter,
        accept: impl Fn(&[SmolStr]) -> bool,
    ) -> Option<Vec<Environment>> {
        if !filter.middle().iter().any(|m| self.contains(m)) {
            return None;
        }
        let padded = self.with_word_boundaries();
        let width = filter.len();
        if !filter.is_applicable(padded.len()) {
            return None;
        }
        let lhs_len = filter.lhs_len();
        let mut environments = Vec::new();
        for (start, window) in padded.windows(width).enumerate() {
            if !accept(window) {
                continue;
            }
            // Middle symbol in unpadded coordinates; windows whose middle
            // lands on a padding boundary carry no position and are skipped.
            let Some(position) = (start + lhs_len).checked_sub(1) else {
                continue;
            };
            if position >= self.symbols.len() {
                continue;
            }
            environments.push(Environment::new(
                window[lhs_len].clone(),
                position,
                window[..lhs_len].to_vec(),
                window[lhs_len + 1..].to_vec(),
            ));
        }
        if environments.is_empty() {
            None
        } else {
            Some(environments)
        }
    }
}

impl PartialEq for Transcription {
    fn eq(&self, other: &Self) -> bool {
        self.symbols == other.symbols
            && self.stress == other.stress
            && self.tones == other.tones
            && self.morpheme_breaks == other.morpheme_breaks
    }
}

impl Eq for Transcription {}

impl Hash for Transcription {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symbols.hash(state);
    }
}

impl fmt::Display for Transcription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pieces: Vec<String> = Vec::with_capacity(self.symbols.len());
        for (i, symbol) in self.symbols.iter().enumerate() {
            let mut piece = symbol.to_string();
            if let Some(s) = self.stress.get(&i) {
                piece.push_str(s);
            }
            if let Some(t) = self.tones.get(&i) {
                piece.push_str(t);
            }
            pieces.push(piece);
        }
        if self.morpheme_breaks.is_empty() {
            return f.write_str(&pieces.join("."));
        }
        let mut chunks = Vec::new();
        let mut begin = 0;
        for &brk in &self.morpheme_breaks {
            chunks.push(pieces[begin..brk].join("."));
            begin = brk;
        }
        chunks.push(pieces[begin..].join("."));
        f.write_str(&chunks.join("-"))
    }
}

/// Accepts either the full annotated shape or a bare symbol array (the
/// historical persisted form).
impl<'de> Deserialize<'de> for Transcription {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::{self, MapAccess, SeqAccess, Visitor};

        struct TranscriptionVisitor;

        impl<'de> Visitor<'de> for TranscriptionVisitor {
            type Value = Transcription;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a symbol array or an annotated transcription map")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut symbols = Vec::new();
                while let Some(symbol) = seq.next_element::<SmolStr>()? {
                    symbols.push(symbol);
                }
                Ok(Transcription::from_symbols(symbols))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut symbols: Option<Vec<SmolStr>> = None;
                let mut stress = IndexMap::new();
                let mut tones = IndexMap::new();
                let mut morpheme_breaks = Vec::new();
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "symbols" => symbols = Some(map.next_value()?),
                        "stress" => stress = map.next_value()?,
                        "tones" => tones = map.next_value()?,
                        "morpheme_breaks" => morpheme_breaks = map.next_value()?,
                        _ => {
                            map.next_value::<de::IgnoredAny>()?;
                        }
                    }
                }
                let symbols = symbols.ok_or_else(|| de::Error::missing_field("symbols"))?;
                Transcription::with_annotations(symbols, stress, tones, morpheme_breaks)
                    .map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_any(TranscriptionVisitor)
    }
}
