pub mod anomaly;
pub mod document;
pub mod span;
pub mod tag;

pub use anomaly::{Anomaly, AnomalyKind};
pub use document::{Document, SentenceGroup};
pub use span::{Entity, Span, Token, COMPONENT_PREFIX};
pub use tag::{DocumentTags, ResolvedTag, SentenceTags, OUTSIDE};
