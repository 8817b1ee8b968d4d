//! # casiob Core
//!
//! Converts nested named-entity annotations into flat per-token IOB tags for
//! sequence-labelling training. Provides the annotation data model, the tag
//! resolver, UIMA CAS XMI and JSON readers, TSV/JSONL writers and a batch
//! converter.
//!
//! ## Quick Start
//!
//! ```rust
//! use casiob_core::{Document, Entity, Span, TagResolver, Token};
//!
//! let tokens = vec![
//!     Token::new(Span::new(0, 3).unwrap(), "Dr."),
//!     Token::new(Span::new(4, 9).unwrap(), "Frank"),
//! ];
//! let entities = vec![
//!     Entity::new(Span::new(0, 9).unwrap(), "PERS.ind")
//!         .with_linking_uri("http://www.wikidata.org/entity/Q42"),
//!     Entity::new(Span::new(0, 3).unwrap(), "COMP.title"),
//! ];
//! let doc = Document::new("doc.xmi", vec![Span::new(0, 9).unwrap()], tokens, entities);
//!
//! let tags = TagResolver::default().resolve_document(&doc).unwrap();
//! let first = &tags.sentences[0].tags[0];
//! assert_eq!(first.to_string(), "Dr.\tB-PERS\tB-PERS.ind\tCOMP.title\tO\tQ42");
//! ```
pub mod convert;
pub mod emit;
pub mod error;
pub mod resolver;
pub mod source;
pub mod types;

// Re-export primary API
pub use convert::{
    AnomalyLog, ConversionReport, ConvertConfig, Converter, FileFailure, FileReport,
    DEFAULT_ANOMALY_LOG, DEFAULT_PATTERN,
};
pub use emit::{Emitter, JsonlEmitter, OutputFormat, TsvEmitter};
pub use error::{CasiobError, Result};
pub use resolver::{BioTag, LinkId, LinkResolver, TagResolver, WIKIDATA_ENTITY_PREFIX};
pub use source::{source_for_path, AnnotationSource, JsonSource, OffsetUnit, TypeSystem, XmiSource};
pub use types::{
    Anomaly, AnomalyKind, Document, DocumentTags, Entity, ResolvedTag, SentenceTags, Span, Token,
};
