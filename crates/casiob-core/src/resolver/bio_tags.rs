//! # BIO Tags for Named Entity Recognition
//!
//! Defines the tag values emitted per token. Uses the BIO (Begin-Inside-Outside)
//! tagging scheme over free-form entity labels such as `PERS` or `LOC.adm.town`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A BIO tag carrying the entity label it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum BioTag {
    /// First token of an entity.
    Begin(String),
    /// Any following token of the same entity.
    Inside(String),
    /// Token outside any entity.
    #[default]
    Outside,
}

impl BioTag {
    /// `Begin` if the token starts where the entity starts, `Inside` otherwise.
    pub fn at(token_begin: usize, entity_begin: usize, label: impl Into<String>) -> Self {
        if token_begin == entity_begin {
            BioTag::Begin(label.into())
        } else {
            BioTag::Inside(label.into())
        }
    }

    /// Check if this is a "Begin" tag.
    pub fn is_begin(&self) -> bool {
        matches!(self, BioTag::Begin(_))
    }

    /// Check if this is an "Inside" tag.
    pub fn is_inside(&self) -> bool {
        matches!(self, BioTag::Inside(_))
    }

    pub fn is_outside(&self) -> bool {
        matches!(self, BioTag::Outside)
    }

    /// The entity label, without the `B-`/`I-` prefix.
    pub fn label(&self) -> Option<&str> {
        match self {
            BioTag::Begin(label) | BioTag::Inside(label) => Some(label),
            BioTag::Outside => None,
        }
    }

    /// Check if transitioning from `from` tag to `to` tag is valid.
    ///
    /// An `I-x` may only continue a `B-x` or `I-x`.
    pub fn is_valid_transition(from: &BioTag, to: &BioTag) -> bool {
        match to {
            BioTag::Inside(label) => from.label() == Some(label.as_str()),
            BioTag::Begin(_) | BioTag::Outside => true,
        }
    }

    /// Check a whole tag column for transition violations.
    pub fn is_valid_sequence<'a>(tags: impl IntoIterator<Item = &'a BioTag>) -> bool {
        let mut prev = &BioTag::Outside;
        for tag in tags {
            if !Self::is_valid_transition(prev, tag) {
                return false;
            }
            prev = tag;
        }
        true
    }
}

impl fmt::Display for BioTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BioTag::Begin(label) => write!(f, "B-{label}"),
            BioTag::Inside(label) => write!(f, "I-{label}"),
            BioTag::Outside => write!(f, "O"),
        }
    }
}

impl FromStr for BioTag {
    type Err = std::convert::Infallible;

    /// Anything that is not `B-x`/`I-x` reads as `O`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if let Some(label) = s.strip_prefix("B-") {
            BioTag::Begin(label.to_string())
        } else if let Some(label) = s.strip_prefix("I-") {
            BioTag::Inside(label.to_string())
        } else {
            BioTag::Outside
        })
    }
}

impl From<BioTag> for String {
    fn from(tag: BioTag) -> Self {
        tag.to_string()
    }
}

impl From<String> for BioTag {
    fn from(s: String) -> Self {
        match s.parse::<BioTag>() {
            Ok(tag) => tag,
            Err(never) => match never {},
        }
    }
}
