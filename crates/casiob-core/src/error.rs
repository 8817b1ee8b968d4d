use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading, resolving or emitting a document.
///
/// Anomalies found while resolving individual tokens are *not* errors; they
/// are collected as [`crate::types::Anomaly`] values and never abort a run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CasiobError {
    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The XMI or TypeSystem document is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A JSON document could not be decoded, or a JSONL row could not be encoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A span ends before it begins.
    #[error("invalid span [{begin}, {end}): end precedes begin")]
    InvalidSpan {
        /// Start offset.
        begin: usize,
        /// End offset.
        end: usize,
    },

    /// A token handed to the resolver is not contained in its sentence.
    #[error("token [{token_begin}, {token_end}) lies outside sentence [{sentence_begin}, {sentence_end})")]
    TokenOutsideSentence {
        /// Token start offset.
        token_begin: usize,
        /// Token end offset.
        token_end: usize,
        /// Sentence start offset.
        sentence_begin: usize,
        /// Sentence end offset.
        sentence_end: usize,
    },

    /// A token of the document is not covered by any sentence.
    #[error("token {text:?} at [{begin}, {end}) is not contained in any sentence")]
    OrphanToken {
        /// Covered text of the token.
        text: String,
        /// Token start offset.
        begin: usize,
        /// Token end offset.
        end: usize,
    },

    /// The XMI document has no `cas:Sofa` element carrying the text.
    #[error("document has no sofa string")]
    MissingSofa,

    /// An annotation element lacks a required attribute.
    #[error("<{element}> is missing attribute `{attribute}`")]
    MissingAttribute {
        /// Fully qualified UIMA type name of the element.
        element: String,
        /// Name of the missing attribute.
        attribute: &'static str,
    },

    /// An offset attribute is not a non-negative integer, or points past the text.
    #[error("invalid offset {value:?} in <{element}>")]
    InvalidOffset {
        /// Fully qualified UIMA type name of the element.
        element: String,
        /// The raw attribute value.
        value: String,
    },

    /// No annotation source handles this file.
    #[error("unsupported input file: {0}")]
    UnsupportedInput(PathBuf),

    /// Input and output must both be files or both be directories.
    #[error("input {input} and output {output} must both be files or both be directories")]
    PathKindMismatch {
        /// Input path.
        input: PathBuf,
        /// Output path.
        output: PathBuf,
    },
}

/// Result type alias for casiob operations.
pub type Result<T> = std::result::Result<T, CasiobError>;
