use std::fmt;

use serde::{Deserialize, Serialize};

use crate::resolver::bio_tags::BioTag;

use super::anomaly::Anomaly;

/// Literal used for every empty output column.
pub const OUTSIDE: &str = "O";

/// The resolved output fields of one token.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolvedTag {
    pub token_text: String,
    /// `B-`/`I-` + first segment of the primary entity's label.
    pub coarse: BioTag,
    /// `B-`/`I-` + full label of the primary entity.
    pub fine: BioTag,
    /// Raw label of a covering `COMP` entity; no positional prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    pub nested: BioTag,
    /// Identifier taken from the primary entity's linking URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linking_id: Option<String>,
}

impl ResolvedTag {
    /// A token with no covering entity.
    #[must_use]
    pub fn outside(token_text: impl Into<String>) -> Self {
        Self {
            token_text: token_text.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn component_str(&self) -> &str {
        self.component.as_deref().unwrap_or(OUTSIDE)
    }

    #[must_use]
    pub fn linking_str(&self) -> &str {
        self.linking_id.as_deref().unwrap_or(OUTSIDE)
    }

    /// Returns `true` if no field carries any annotation.
    #[must_use]
    pub fn is_outside(&self) -> bool {
        self.coarse.is_outside()
            && self.fine.is_outside()
            && self.nested.is_outside()
            && self.component.is_none()
            && self.linking_id.is_none()
    }
}

impl fmt::Display for ResolvedTag {
    /// The tab-separated output row, without line terminator.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.token_text,
            self.coarse,
            self.fine,
            self.component_str(),
            self.nested,
            self.linking_str()
        )
    }
}

/// All resolved tokens of one sentence plus the anomalies found in it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SentenceTags {
    pub tags: Vec<ResolvedTag>,
    pub anomalies: Vec<Anomaly>,
}

impl SentenceTags {
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Resolution result for a whole document, grouped by sentence in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentTags {
    pub document_id: String,
    pub sentences: Vec<SentenceTags>,
}

impl DocumentTags {
    /// Total number of resolved tokens.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(SentenceTags::len).sum()
    }

    /// Anomalies of all sentences, in order.
    pub fn anomalies(&self) -> impl Iterator<Item = &Anomaly> {
        self.sentences.iter().flat_map(|s| s.anomalies.iter())
    }
}
