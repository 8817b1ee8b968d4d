//! Plain JSON annotation documents.
//!
//! ```json
//! {
//!   "text": "Berlin is a city.",
//!   "sentences": [{"begin": 0, "end": 17}],
//!   "tokens": [{"begin": 0, "end": 6}, {"begin": 7, "end": 9}],
//!   "entities": [{"begin": 0, "end": 6, "value": "LOC",
//!                 "identifier": "http://www.wikidata.org/entity/Q64"}]
//! }
//! ```
//!
//! Offsets count Unicode scalar values unless `"offset_unit": "utf16"` is given.

use serde::Deserialize;

use crate::error::{CasiobError, Result};
use crate::types::{Document, Entity, Span, Token};

use super::text::{OffsetUnit, SofaText};
use super::AnnotationSource;

#[derive(Debug, Deserialize)]
struct JsonDocument {
    text: String,
    #[serde(default = "default_unit")]
    offset_unit: OffsetUnit,
    #[serde(default)]
    sentences: Vec<JsonSpan>,
    #[serde(default)]
    tokens: Vec<JsonSpan>,
    #[serde(default)]
    entities: Vec<JsonEntity>,
}

fn default_unit() -> OffsetUnit {
    OffsetUnit::Char
}

#[derive(Debug, Deserialize)]
struct JsonSpan {
    begin: usize,
    end: usize,
}

#[derive(Debug, Deserialize)]
struct JsonEntity {
    begin: usize,
    end: usize,
    #[serde(default)]
    value: String,
    #[serde(default)]
    identifier: Option<String>,
}

/// Annotation source for the JSON document format above.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSource;

impl JsonSource {
    pub fn new() -> Self {
        Self
    }
}

impl AnnotationSource for JsonSource {
    fn name(&self) -> &'static str {
        "json"
    }

    fn parse(&self, id: &str, content: &str) -> Result<Document> {
        let raw: JsonDocument = serde_json::from_str(content)?;
        let text = SofaText::new(raw.text, raw.offset_unit);

        let sentences = raw
            .sentences
            .iter()
            .map(|s| Span::new(s.begin, s.end))
            .collect::<Result<Vec<_>>>()?;

        let tokens = raw
            .tokens
            .iter()
            .map(|t| {
                let span = Span::new(t.begin, t.end)?;
                let covered = text
                    .covered(span.begin, span.end)
                    .ok_or_else(|| CasiobError::InvalidOffset {
                        element: "token".into(),
                        value: span.to_string(),
                    })?;
                Ok(Token::new(span, covered))
            })
            .collect::<Result<Vec<_>>>()?;

        let entities = raw
            .entities
            .into_iter()
            .map(|e| {
                let entity = Entity::new(Span::new(e.begin, e.end)?, e.value);
                Ok(match e.identifier {
                    Some(uri) => entity.with_linking_uri(uri),
                    None => entity,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Document::new(id, sentences, tokens, entities))
    }
}
