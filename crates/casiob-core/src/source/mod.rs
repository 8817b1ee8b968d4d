//! Annotation sources: readers that turn annotated files into [`Document`]s.

pub mod json;
pub mod text;
pub mod typesystem;
pub mod xmi;

use std::path::Path;

use crate::error::{CasiobError, Result};
use crate::types::Document;

pub use json::JsonSource;
pub use text::{OffsetUnit, SofaText};
pub use typesystem::TypeSystem;
pub use xmi::XmiSource;

/// Supplies the sentences, tokens and entities of one document.
pub trait AnnotationSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Parse the serialized document `content`, identified by `id`.
    fn parse(&self, id: &str, content: &str) -> Result<Document>;

    /// Read and parse a file; its file name becomes the document id.
    fn load(&self, path: &Path) -> Result<Document> {
        let content = std::fs::read_to_string(path)?;
        let id = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        self.parse(&id, &content)
    }
}

/// Pick a source by file extension: `.xmi` or `.json`.
pub fn source_for_path(path: &Path, typesystem: &TypeSystem) -> Result<Box<dyn AnnotationSource>> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match ext.as_deref() {
        Some("xmi") => Ok(Box::new(XmiSource::new().with_typesystem(typesystem.clone()))),
        Some("json") => Ok(Box::new(JsonSource::new())),
        _ => Err(CasiobError::UnsupportedInput(path.to_path_buf())),
    }
}
