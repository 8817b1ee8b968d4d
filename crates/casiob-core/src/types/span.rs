use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CasiobError, Result};

/// Prefix marking component entities (sub-parts of a larger mention).
pub const COMPONENT_PREFIX: &str = "COMP";

/// Half-open character interval `[begin, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub begin: usize,
    pub end: usize,
}

impl Span {
    /// Creates a span, rejecting `end < begin`.
    pub fn new(begin: usize, end: usize) -> Result<Self> {
        if end < begin {
            return Err(CasiobError::InvalidSpan { begin, end });
        }
        Ok(Self { begin, end })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// `true` if `other` lies entirely within `self`.
    #[must_use]
    pub fn contains(&self, other: &Span) -> bool {
        self.begin <= other.begin && self.end >= other.end
    }

    /// `true` if the two spans share at least one position. A zero-width
    /// span intersects a span that strictly contains its position.
    #[must_use]
    pub fn intersects(&self, other: &Span) -> bool {
        if other.is_empty() {
            return self.begin <= other.begin && other.begin < self.end;
        }
        self.begin < other.end && other.begin < self.end
    }

    /// Ordering used by UIMA annotation indexes: begin ascending, then the
    /// wider span first.
    #[must_use]
    pub fn index_order(&self, other: &Span) -> std::cmp::Ordering {
        self.begin
            .cmp(&other.begin)
            .then_with(|| other.end.cmp(&self.end))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.begin, self.end)
    }
}

/// A token with its covered text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub span: Span,
    pub text: String,
}

impl Token {
    pub fn new(span: Span, text: impl Into<String>) -> Self {
        Self {
            span,
            text: text.into(),
        }
    }
}

/// A named-entity annotation.
///
/// `label` is the dotted type hierarchy (`PERS.ind.fict`); its first segment
/// is the coarse category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub span: Span,
    pub label: String,
    /// External linking URI, e.g. `http://www.wikidata.org/entity/Q64`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linking_uri: Option<String>,
}

impl Entity {
    pub fn new(span: Span, label: impl Into<String>) -> Self {
        Self {
            span,
            label: label.into(),
            linking_uri: None,
        }
    }

    /// Attach a linking URI. Empty strings are kept as `None`.
    #[must_use]
    pub fn with_linking_uri(mut self, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        self.linking_uri = (!uri.is_empty()).then_some(uri);
        self
    }

    /// Component entities describe a part of a larger mention.
    #[must_use]
    pub fn is_component(&self) -> bool {
        self.label.starts_with(COMPONENT_PREFIX)
    }

    /// Portion of the label before the first `.`, or the whole label.
    #[must_use]
    pub fn coarse_label(&self) -> &str {
        self.label
            .split_once('.')
            .map_or(self.label.as_str(), |(coarse, _)| coarse)
    }
}
