//! Batch conversion: annotation files in, tagged files out.
//!
//! A [`Converter`] ties an [`AnnotationSource`], the [`TagResolver`] and an
//! [`Emitter`] together. Documents are independent; a document that fails to
//! load or resolve is reported and the batch carries on with the next one.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::emit::{Emitter, OutputFormat};
use crate::error::{CasiobError, Result};
use crate::resolver::{LinkResolver, TagResolver, WIKIDATA_ENTITY_PREFIX};
use crate::source::{source_for_path, TypeSystem};
use crate::types::{Anomaly, Document, DocumentTags};

/// Default file name of the anomaly log.
pub const DEFAULT_ANOMALY_LOG: &str = "entities_without_tags.txt";

/// Default extension of input files picked up in folder mode.
pub const DEFAULT_PATTERN: &str = "xmi";

/// Configuration for the converter.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Write the column header (TSV only)
    pub header: bool,
    /// Output format
    pub format: OutputFormat,
    /// Prefix stripped from linking URIs
    pub link_prefix: String,
    /// Extension of the input files converted in folder mode
    pub pattern: String,
    /// Supertype declarations used to select custom annotation types
    pub typesystem: TypeSystem,
    /// Where anomaly records are appended; `None` disables the log
    pub anomaly_log: Option<PathBuf>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            header: true,
            format: OutputFormat::Tsv,
            link_prefix: WIKIDATA_ENTITY_PREFIX.to_string(),
            pattern: DEFAULT_PATTERN.to_string(),
            typesystem: TypeSystem::default(),
            anomaly_log: None,
        }
    }
}

impl ConvertConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the header line.
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the prefix stripped from linking URIs.
    pub fn with_link_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.link_prefix = prefix.into();
        self
    }

    /// Set the input extension for folder mode. A leading dot is ignored.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        self.pattern = pattern.trim_start_matches('.').to_string();
        self
    }

    pub fn with_typesystem(mut self, typesystem: TypeSystem) -> Self {
        self.typesystem = typesystem;
        self
    }

    /// Append anomaly records to `path`.
    pub fn with_anomaly_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.anomaly_log = Some(path.into());
        self
    }
}

/// Outcome of one converted file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub sentences: usize,
    pub tokens: usize,
    pub anomalies: Vec<Anomaly>,
}

/// A file that could not be converted.
#[derive(Debug)]
pub struct FileFailure {
    pub input: PathBuf,
    pub error: CasiobError,
}

/// Outcome of a whole run, in input order.
#[derive(Debug, Default)]
pub struct ConversionReport {
    pub converted: Vec<FileReport>,
    pub failed: Vec<FileFailure>,
}

impl ConversionReport {
    /// `true` if no document failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn token_count(&self) -> usize {
        self.converted.iter().map(|r| r.tokens).sum()
    }

    pub fn anomalies(&self) -> impl Iterator<Item = &Anomaly> {
        self.converted.iter().flat_map(|r| r.anomalies.iter())
    }

    fn record(&mut self, input: PathBuf, outcome: Result<FileReport>) {
        match outcome {
            Ok(report) => self.converted.push(report),
            Err(error) => {
                warn!(input = %input.display(), %error, "conversion failed");
                self.failed.push(FileFailure { input, error });
            }
        }
    }
}

/// Append-only anomaly sink.
///
/// One tab-separated record per line. A record identical to the previously
/// written one is skipped.
#[derive(Debug)]
pub struct AnomalyLog {
    path: PathBuf,
    last: Option<Anomaly>,
}

impl AnomalyLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `anomalies`, returning how many lines were written.
    ///
    /// The file is only created once there is something to write.
    pub fn append<'a>(&mut self, anomalies: impl IntoIterator<Item = &'a Anomaly>) -> Result<usize> {
        let mut lines = Vec::new();
        for anomaly in anomalies {
            if self.last.as_ref().is_some_and(|last| last.same_record(anomaly)) {
                continue;
            }
            warn!(
                document = %anomaly.document_id,
                snippet = %anomaly.snippet,
                begin = anomaly.begin,
                end = anomaly.end,
                kind = %anomaly.kind,
                "unresolved token"
            );
            lines.push(anomaly.to_log_line());
            self.last = Some(anomaly.clone());
        }
        if lines.is_empty() {
            return Ok(0);
        }

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut out = BufWriter::new(file);
        for line in &lines {
            writeln!(out, "{line}")?;
        }
        out.flush()?;
        Ok(lines.len())
    }
}

/// Converts annotated documents into tagged output files.
pub struct Converter {
    config: ConvertConfig,
    resolver: TagResolver,
    emitter: Box<dyn Emitter>,
    anomaly_log: Option<AnomalyLog>,
}

impl Converter {
    /// Create a converter with the given configuration.
    pub fn new(config: ConvertConfig) -> Self {
        let resolver = TagResolver::new(LinkResolver::new(config.link_prefix.clone()));
        let emitter = config.format.emitter(config.header);
        let anomaly_log = config.anomaly_log.clone().map(AnomalyLog::new);
        Self {
            config,
            resolver,
            emitter,
            anomaly_log,
        }
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Resolve `document` and write it to `out`.
    pub fn convert_document(&self, document: &Document, out: &mut dyn Write) -> Result<DocumentTags> {
        let tags = self.resolver.resolve_document(document)?;
        self.emitter.write_document(&tags, out)?;
        Ok(tags)
    }

    /// Convert one file and append its anomalies to the log.
    pub fn convert_file(&mut self, input: &Path, output: &Path) -> Result<FileReport> {
        let report = self.convert_one(input, output)?;
        self.log_anomalies(&report.anomalies)?;
        Ok(report)
    }

    /// Convert every matching file in `input_dir` into `output_dir`.
    ///
    /// Files are processed in file-name order. Failing files are recorded in
    /// the report and do not stop the run.
    pub fn convert_folder(&mut self, input_dir: &Path, output_dir: &Path) -> Result<ConversionReport> {
        let inputs = self.matching_files(input_dir)?;
        fs::create_dir_all(output_dir)?;
        info!(
            input = %input_dir.display(),
            files = inputs.len(),
            pattern = %self.config.pattern,
            "converting folder"
        );

        let jobs: Vec<(PathBuf, PathBuf)> = inputs
            .into_iter()
            .map(|input| {
                let output = self.output_path(&input, output_dir);
                (input, output)
            })
            .collect();

        #[cfg(feature = "parallel")]
        let outcomes: Vec<Result<FileReport>> = {
            use rayon::prelude::*;
            jobs.par_iter()
                .map(|(input, output)| self.convert_one(input, output))
                .collect()
        };
        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<Result<FileReport>> = jobs
            .iter()
            .map(|(input, output)| self.convert_one(input, output))
            .collect();

        let mut report = ConversionReport::default();
        for ((input, _), outcome) in jobs.into_iter().zip(outcomes) {
            if let Ok(file) = &outcome {
                self.log_anomalies(&file.anomalies)?;
            }
            report.record(input, outcome);
        }
        Ok(report)
    }

    /// Convert a file into a file, or a directory into a directory.
    ///
    /// A directory output that does not exist yet is created.
    ///
    /// # Errors
    ///
    /// Returns `CasiobError::PathKindMismatch` when one path is a directory
    /// and the other is not, and the error of a single failing file in file
    /// mode.
    pub fn convert_path(&mut self, input: &Path, output: &Path) -> Result<ConversionReport> {
        let mismatch = || CasiobError::PathKindMismatch {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
        };

        if input.is_dir() {
            if output.exists() && !output.is_dir() {
                return Err(mismatch());
            }
            return self.convert_folder(input, output);
        }
        if output.is_dir() {
            return Err(mismatch());
        }

        let mut report = ConversionReport::default();
        report.converted.push(self.convert_file(input, output)?);
        Ok(report)
    }

    fn convert_one(&self, input: &Path, output: &Path) -> Result<FileReport> {
        let source = source_for_path(input, &self.config.typesystem)?;
        let document = source.load(input)?;
        debug!(input = %input.display(), source = source.name(), "loaded document");

        // A document that fails to resolve must not leave an output file behind.
        let tags = self.resolver.resolve_document(&document)?;
        let mut out = BufWriter::new(File::create(output)?);
        self.emitter.write_document(&tags, &mut out)?;
        out.flush()?;

        let anomalies: Vec<Anomaly> = tags.anomalies().cloned().collect();
        info!(
            input = %input.display(),
            output = %output.display(),
            tokens = tags.token_count(),
            anomalies = anomalies.len(),
            "converted"
        );
        Ok(FileReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            sentences: tags.sentences.len(),
            tokens: tags.token_count(),
            anomalies,
        })
    }

    fn log_anomalies(&mut self, anomalies: &[Anomaly]) -> Result<()> {
        if let Some(log) = self.anomaly_log.as_mut() {
            log.append(anomalies)?;
        }
        Ok(())
    }

    fn matching_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let matches = path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(&self.config.pattern));
            if matches && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn output_path(&self, input: &Path, output_dir: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map_or_else(|| "output".into(), |s| s.to_string_lossy());
        output_dir.join(format!("{stem}.{}", self.emitter.extension()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnomalyKind, Entity, Span, Token};

    fn berlin() -> Document {
        let tokens = vec![
            Token::new(Span { begin: 0, end: 6 }, "Berlin"),
            Token::new(Span { begin: 7, end: 9 }, "is"),
        ];
        let entities = vec![Entity::new(Span { begin: 0, end: 6 }, "LOC")
            .with_linking_uri("http://www.wikidata.org/entity/Q64")];
        Document::new("berlin.json", vec![Span { begin: 0, end: 9 }], tokens, entities)
    }

    #[test]
    fn test_config_builder() {
        let config = ConvertConfig::new()
            .with_header(false)
            .with_format(OutputFormat::Jsonl)
            .with_link_prefix("https://example.org/kb/")
            .with_pattern(".json")
            .with_anomaly_log("anomalies.txt");
        assert!(!config.header);
        assert_eq!(config.format, OutputFormat::Jsonl);
        assert_eq!(config.link_prefix, "https://example.org/kb/");
        assert_eq!(config.pattern, "json");
        assert_eq!(config.anomaly_log.as_deref(), Some(Path::new("anomalies.txt")));
    }

    #[test]
    fn test_config_defaults() {
        let config = ConvertConfig::default();
        assert!(config.header);
        assert_eq!(config.format, OutputFormat::Tsv);
        assert_eq!(config.link_prefix, WIKIDATA_ENTITY_PREFIX);
        assert_eq!(config.pattern, DEFAULT_PATTERN);
        assert!(config.anomaly_log.is_none());
    }

    #[test]
    fn test_convert_document_writes_rows() {
        let converter = Converter::new(ConvertConfig::new().with_header(false));
        let mut out = Vec::new();
        let tags = converter.convert_document(&berlin(), &mut out).unwrap();
        assert_eq!(tags.token_count(), 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Berlin\tB-LOC\tB-LOC\tO\tO\tQ64\nis\tO\tO\tO\tO\tO\n"
        );
    }

    #[test]
    fn test_custom_link_prefix() {
        let converter = Converter::new(
            ConvertConfig::new()
                .with_header(false)
                .with_link_prefix("http://www.wikidata.org/"),
        );
        let mut out = Vec::new();
        converter.convert_document(&berlin(), &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("Berlin\tB-LOC\tB-LOC\tO\tO\tentity/Q64\n"));
    }

    #[test]
    fn test_anomaly_log_skips_repeated_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_ANOMALY_LOG);
        let mut log = AnomalyLog::new(&path);

        let first = Anomaly::new("a.xmi", "Berlin", Span { begin: 0, end: 6 }, AnomalyKind::MissingPrimary);
        let again = Anomaly::new("a.xmi", "Berlin", Span { begin: 0, end: 6 }, AnomalyKind::MalformedLink);
        let other = Anomaly::new("a.xmi", "Mitte", Span { begin: 7, end: 12 }, AnomalyKind::MissingPrimary);

        assert_eq!(log.append([&first, &again]).unwrap(), 1);
        // The repeat check spans separate appends.
        assert_eq!(log.append([&again, &other]).unwrap(), 1);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "a.xmi\tBerlin\t0\t6\na.xmi\tMitte\t7\t12\n");
    }

    #[test]
    fn test_anomaly_log_not_created_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_ANOMALY_LOG);
        let mut log = AnomalyLog::new(&path);
        assert_eq!(log.append(std::iter::empty()).unwrap(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_output_path_uses_emitter_extension() {
        let converter = Converter::new(ConvertConfig::new().with_format(OutputFormat::Jsonl));
        assert_eq!(
            converter.output_path(Path::new("in/doc_01.xmi"), Path::new("out")),
            Path::new("out/doc_01.jsonl")
        );
    }

    #[test]
    fn test_failed_document_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        fs::create_dir(&input).unwrap();
        fs::write(
            input.join("orphan.json"),
            r#"{"text": "ab cd", "sentences": [{"begin": 0, "end": 2}],
                "tokens": [{"begin": 0, "end": 2}, {"begin": 3, "end": 5}]}"#,
        )
        .unwrap();

        let mut converter = Converter::new(ConvertConfig::new().with_pattern("json"));
        let report = converter.convert_folder(&input, &output).unwrap();

        assert_eq!(report.failed.len(), 1);
        assert!(matches!(report.failed[0].error, CasiobError::OrphanToken { begin: 3, .. }));
        assert!(!output.join("orphan.tsv").exists());
    }

    #[test]
    fn test_path_kind_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("doc.xmi");
        fs::write(&file, "").unwrap();

        let mut converter = Converter::new(ConvertConfig::new());
        let err = converter.convert_path(&file, dir.path()).unwrap_err();
        assert!(matches!(err, CasiobError::PathKindMismatch { .. }));
        let err = converter.convert_path(dir.path(), &file).unwrap_err();
        assert!(matches!(err, CasiobError::PathKindMismatch { .. }));
    }
}
