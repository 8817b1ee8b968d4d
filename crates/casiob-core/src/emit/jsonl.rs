use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{DocumentTags, ResolvedTag, SentenceTags};

use super::Emitter;

/// One sentence as parallel tag columns, the layout of token-classification
/// datasets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceRecord {
    pub tokens: Vec<String>,
    pub ne_coarse: Vec<String>,
    pub ne_fine: Vec<String>,
    pub ne_fine_comp: Vec<String>,
    pub ne_nested: Vec<String>,
    pub nel_ids: Vec<String>,
}

impl From<&SentenceTags> for SentenceRecord {
    fn from(sentence: &SentenceTags) -> Self {
        Self {
            tokens: column(sentence, |t| t.token_text.clone()),
            ne_coarse: column(sentence, |t| t.coarse.to_string()),
            ne_fine: column(sentence, |t| t.fine.to_string()),
            ne_fine_comp: column(sentence, |t| t.component_str().to_string()),
            ne_nested: column(sentence, |t| t.nested.to_string()),
            nel_ids: column(sentence, |t| t.linking_str().to_string()),
        }
    }
}

fn column(sentence: &SentenceTags, field: impl Fn(&ResolvedTag) -> String) -> Vec<String> {
    sentence.tags.iter().map(field).collect()
}

/// One JSON object per non-empty sentence, newline-terminated.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonlEmitter;

impl Emitter for JsonlEmitter {
    fn extension(&self) -> &'static str {
        "jsonl"
    }

    fn write_document(&self, doc: &DocumentTags, out: &mut dyn Write) -> Result<()> {
        for sentence in doc.sentences.iter().filter(|s| !s.is_empty()) {
            let json = serde_json::to_string(&SentenceRecord::from(sentence))?;
            writeln!(out, "{json}")?;
        }
        Ok(())
    }
}
