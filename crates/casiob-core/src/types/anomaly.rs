use std::fmt;

use serde::{Deserialize, Serialize};

use super::span::Span;

/// What went wrong while resolving a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// Covering entities exist but none spans the whole outer extent.
    MissingPrimary,
    /// More than one entity spans the outer extent exactly.
    AmbiguousPrimary,
    /// A linking URI lacks the expected prefix or has no identifier after it.
    MalformedLink,
    /// A covering entity has an empty type label.
    UntypedEntity,
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPrimary => write!(f, "missing primary entity"),
            Self::AmbiguousPrimary => write!(f, "ambiguous primary entity"),
            Self::MalformedLink => write!(f, "malformed linking URI"),
            Self::UntypedEntity => write!(f, "untyped entity"),
        }
    }
}

/// A resolution failure that was recovered locally.
///
/// Bounds and snippet always describe the token being resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anomaly {
    pub document_id: String,
    pub snippet: String,
    pub begin: usize,
    pub end: usize,
    pub kind: AnomalyKind,
}

impl Anomaly {
    pub fn new(
        document_id: impl Into<String>,
        snippet: impl Into<String>,
        span: Span,
        kind: AnomalyKind,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            snippet: snippet.into(),
            begin: span.begin,
            end: span.end,
            kind,
        }
    }

    /// `true` if both records would produce the same anomaly log line.
    #[must_use]
    pub fn same_record(&self, other: &Anomaly) -> bool {
        self.document_id == other.document_id
            && self.snippet == other.snippet
            && self.begin == other.begin
            && self.end == other.end
    }

    /// Tab-separated anomaly log line, without terminator.
    #[must_use]
    pub fn to_log_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}",
            self.document_id, self.snippet, self.begin, self.end
        )
    }
}

/// Append `anomaly` unless it repeats the last recorded entry.
pub fn push_deduplicated(anomalies: &mut Vec<Anomaly>, anomaly: Anomaly) {
    if anomalies
        .last()
        .is_some_and(|last| last.same_record(&anomaly))
    {
        return;
    }
    anomalies.push(anomaly);
}
