//! Row emitters: serialize resolved documents.

pub mod jsonl;
pub mod tsv;

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::DocumentTags;

pub use jsonl::{JsonlEmitter, SentenceRecord};
pub use tsv::{TsvEmitter, HEADER};

/// Writes the resolved tags of one document to a byte sink.
pub trait Emitter: Send + Sync {
    /// File extension of the produced format, without dot.
    fn extension(&self) -> &'static str;

    /// Serialize `doc` into `out`.
    fn write_document(&self, doc: &DocumentTags, out: &mut dyn Write) -> Result<()>;
}

/// Output format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Tab-separated columns, blank line between sentences.
    #[default]
    Tsv,
    /// One JSON object per sentence.
    Jsonl,
}

impl OutputFormat {
    /// Build the emitter for this format. `header` only affects TSV.
    pub fn emitter(self, header: bool) -> Box<dyn Emitter> {
        match self {
            Self::Tsv => Box::new(TsvEmitter::new(header)),
            Self::Jsonl => Box::new(JsonlEmitter),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tsv => write!(f, "tsv"),
            Self::Jsonl => write!(f, "jsonl"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tsv" => Ok(Self::Tsv),
            "jsonl" => Ok(Self::Jsonl),
            other => Err(format!("unknown output format: {other} (expected tsv or jsonl)")),
        }
    }
}
