//! The lexicon data model: transcriptions, environments, attributes, words,
//! the segment inventory, and the corpus aggregate.

mod attribute;
mod corpus;
mod environment;
mod inventory;
mod transcription;
mod word;

pub use attribute::{
    Attribute, AttributeRange, AttributeType, AttributeValue, guess_type, sanitize_name,
};
pub use corpus::{Comparison, Corpus, SegmentSpec, SubsetFilter};
pub use environment::{Environment, EnvironmentFilter};
pub use inventory::Inventory;
pub use transcription::{SegmentToken, Transcription};
pub use word::{FREQUENCY_ALIASES, Word, WordToken};
