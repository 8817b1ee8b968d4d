//! # casiob
//!
//! Converts UIMA CAS XMI annotations with nested named entities into
//! IOB-tagged TSV or JSONL training data.
//!
//! This crate re-exports the public API of [`casiob_core`].
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use casiob::{ConvertConfig, Converter, DEFAULT_ANOMALY_LOG};
//!
//! let mut converter = Converter::new(ConvertConfig::new().with_anomaly_log(DEFAULT_ANOMALY_LOG));
//! let report = converter.convert_path(Path::new("corpus/xmi"), Path::new("corpus/tsv")).unwrap();
//! println!("{} tokens, {} anomalies", report.token_count(), report.anomalies().count());
//! ```
pub use casiob_core::*;
