//! Per-word attribute schema: typed columns with defaults and observed
//! ranges.
//!
//! The attribute type is decided once, when the column enters the schema;
//! values are a tagged sum over the four storage shapes rather than being
//! re-inferred from raw data at every use site.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::LexiconError;

use super::transcription::Transcription;

/// The four column types a corpus schema supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeType {
    /// Free orthographic text; no range is tracked.
    Spelling,
    /// A derived symbol sequence; range is the set of segments observed.
    Tier,
    /// A float; range is the observed [min, max].
    Numeric,
    /// A categorical label; range is the set of levels observed.
    Factor,
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AttributeType::Spelling => "spelling",
            AttributeType::Tier => "tier",
            AttributeType::Numeric => "numeric",
            AttributeType::Factor => "factor",
        })
    }
}

/// A stored attribute value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Text(String),
    Number(f64),
    Tier(Transcription),
    Factor(SmolStr),
}

impl AttributeValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            AttributeValue::Factor(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_tier(&self) -> Option<&Transcription> {
        match self {
            AttributeValue::Tier(t) => Some(t),
            _ => None,
        }
    }

    /// The attribute type a value of this shape implies when it first
    /// appears on a word: plain text becomes a factor column.
    pub fn inferred_type(&self) -> AttributeType {
        match self {
            AttributeValue::Text(_) | AttributeValue::Factor(_) => AttributeType::Factor,
            AttributeValue::Number(_) => AttributeType::Numeric,
            AttributeValue::Tier(_) => AttributeType::Tier,
        }
    }

    fn fits(&self, att_type: AttributeType) -> bool {
        match (att_type, self) {
            (AttributeType::Spelling, AttributeValue::Text(_)) => true,
            (AttributeType::Factor, AttributeValue::Factor(_) | AttributeValue::Text(_)) => true,
            (AttributeType::Numeric, AttributeValue::Number(_)) => true,
            (AttributeType::Tier, AttributeValue::Tier(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(s) => f.write_str(s),
            AttributeValue::Number(n) => write!(f, "{n}"),
            AttributeValue::Tier(t) => write!(f, "{t}"),
            AttributeValue::Factor(s) => f.write_str(s),
        }
    }
}

/// The observed range of a column, shaped by its type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttributeRange {
    /// Spelling columns track no range.
    None,
    Numeric { min: f64, max: f64 },
    Levels(IndexSet<SmolStr>),
    Segments(IndexSet<SmolStr>),
}

/// One column of per-word data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    name: SmolStr,
    att_type: AttributeType,
    #[serde(default)]
    display_name: Option<String>,
    default_value: AttributeValue,
    range: AttributeRange,
    #[serde(default)]
    delimiter: Option<char>,
}

impl Attribute {
    /// A column with the typed default value and empty range for its type.
    pub fn new(name: impl Into<SmolStr>, att_type: AttributeType) -> Self {
        let (default_value, range) = match att_type {
            AttributeType::Spelling => (AttributeValue::Text(String::new()), AttributeRange::None),
            AttributeType::Tier => (
                AttributeValue::Tier(Transcription::default()),
                AttributeRange::Segments(IndexSet::new()),
            ),
            AttributeType::Numeric => (
                AttributeValue::Number(0.0),
                AttributeRange::Numeric { min: 0.0, max: 0.0 },
            ),
            AttributeType::Factor => (
                AttributeValue::Factor(SmolStr::default()),
                AttributeRange::Levels(IndexSet::new()),
            ),
        };
        Self {
            name: name.into(),
            att_type,
            display_name: None,
            default_value,
            range,
            delimiter: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn att_type(&self) -> AttributeType {
        self.att_type
    }

    /// The human-readable name: the explicit one if set, else the
    /// title-cased column name.
    pub fn display_name(&self) -> String {
        match &self.display_name {
            Some(name) => name.clone(),
            None => title_case(&self.name),
        }
    }

    pub fn default_value(&self) -> &AttributeValue {
        &self.default_value
    }

    /// Replace the default value, resetting the observed range around it.
    ///
    /// Fails fast when the value does not fit the declared column type.
    pub fn set_default(&mut self, value: AttributeValue) -> Result<(), LexiconError> {
        if !value.fits(self.att_type) {
            return Err(LexiconError::AttributeTypeMismatch {
                attribute: self.name.to_string(),
                expected: self.att_type,
            });
        }
        self.range = match (&self.att_type, &value) {
            (AttributeType::Numeric, AttributeValue::Number(n)) => {
                AttributeRange::Numeric { min: *n, max: *n }
            }
            (AttributeType::Factor, v) => {
                let mut levels = IndexSet::new();
                if let Some(text) = v.as_text() {
                    if !text.is_empty() {
                        levels.insert(SmolStr::from(text));
                    }
                }
                AttributeRange::Levels(levels)
            }
            (AttributeType::Tier, _) => AttributeRange::Segments(IndexSet::new()),
            _ => AttributeRange::None,
        };
        self.default_value = value;
        Ok(())
    }

    pub fn range(&self) -> &AttributeRange {
        &self.range
    }

    /// Tier delimiter, if one was configured. Meaningless for other types.
    pub fn delimiter(&self) -> Option<char> {
        match self.att_type {
            AttributeType::Tier => self.delimiter,
            _ => None,
        }
    }

    pub fn set_delimiter(&mut self, delimiter: Option<char>) {
        self.delimiter = delimiter;
    }

    pub(crate) fn set_range_segments(&mut self, segments: IndexSet<SmolStr>) {
        self.range = AttributeRange::Segments(segments);
    }

    /// Fold one observed value into the range.
    ///
    /// Numeric values widen [min, max]; factor values add a level; tier
    /// values add their segments. Values that do not fit the column type
    /// are ignored.
    pub fn update_range(&mut self, value: &AttributeValue) {
        match (&mut self.range, value) {
            (AttributeRange::Numeric { min, max }, AttributeValue::Number(n)) => {
                if *n < *min {
                    *min = *n;
                } else if *n > *max {
                    *max = *n;
                }
            }
            (AttributeRange::Levels(levels), v) => {
                if let Some(text) = v.as_text() {
                    levels.insert(SmolStr::from(text));
                }
            }
            (AttributeRange::Segments(segments), AttributeValue::Tier(t)) => {
                segments.extend(t.iter().cloned());
            }
            _ => {}
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Vote on the most likely column type for a sample of raw values.
///
/// Values that parse as floats vote numeric; values containing a
/// transcription delimiter vote tier; repeated values vote factor; the rest
/// vote spelling. Ties resolve in the order spelling, tier, numeric,
/// factor.
pub fn guess_type<S: AsRef<str>>(values: &[S], trans_delimiters: Option<&[char]>) -> AttributeType {
    let delimiters = trans_delimiters.unwrap_or(&['.', ' ', ';', ',']);
    let mut votes = [0usize; 4];
    const ORDER: [AttributeType; 4] = [
        AttributeType::Spelling,
        AttributeType::Tier,
        AttributeType::Numeric,
        AttributeType::Factor,
    ];
    for (i, value) in values.iter().enumerate() {
        let value = value.as_ref();
        if value.parse::<f64>().is_ok() {
            votes[2] += 1;
        } else if value.contains(delimiters) {
            votes[1] += 1;
        } else if values
            .iter()
            .enumerate()
            .any(|(j, other)| j != i && other.as_ref() == value)
        {
            votes[3] += 1;
        } else {
            votes[0] += 1;
        }
    }
    let mut best = 0;
    for i in 1..votes.len() {
        if votes[i] > votes[best] {
            best = i;
        }
    }
    ORDER[best]
}

/// Sanitize a display name into a safe column name: lowercased, with
/// everything but letters, digits, and underscores removed.
pub fn sanitize_name(name: &str) -> SmolStr {
    let cleaned: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    SmolStr::from(cleaned)
}

fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.chars() {
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
