//! casiob command-line converter
//!
//! Converts a UIMA CAS XMI file (or a folder of them) into IOB-tagged TSV.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use casiob::{
    ConvertConfig, Converter, OutputFormat, TypeSystem, DEFAULT_ANOMALY_LOG, DEFAULT_PATTERN,
    WIKIDATA_ENTITY_PREFIX,
};

/// TypeSystem file picked up from the working directory when present
const DEFAULT_TYPESYSTEM: &str = "TypeSystem.xml";

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "casiob")]
#[command(about = "Convert UIMA CAS XMI annotations into IOB-tagged TSV")]
#[command(version)]
struct Cli {
    /// Input file, or folder of input files
    input: PathBuf,

    /// Output file, or output folder
    output: PathBuf,

    /// UIMA TypeSystem.xml declaring custom annotation types
    #[arg(short, long, env = "CASIOB_TYPESYSTEM")]
    typesystem: Option<PathBuf>,

    /// Omit the column header line
    #[arg(long)]
    no_header: bool,

    /// Output format
    #[arg(short, long, default_value_t = OutputFormat::Tsv)]
    format: OutputFormat,

    /// File that unresolved tokens are appended to
    #[arg(short, long, env = "CASIOB_ANOMALY_LOG", default_value = DEFAULT_ANOMALY_LOG)]
    anomaly_log: PathBuf,

    /// Prefix stripped from linking URIs
    #[arg(short, long, env = "CASIOB_LINK_PREFIX", default_value = WIKIDATA_ENTITY_PREFIX)]
    link_prefix: String,

    /// Extension of the files converted in folder mode
    #[arg(short, long, default_value = DEFAULT_PATTERN)]
    pattern: String,
}

impl Cli {
    /// Explicit `--typesystem`, else `./TypeSystem.xml` if it exists.
    fn typesystem_path(&self) -> Option<PathBuf> {
        self.typesystem.clone().or_else(|| {
            let default = PathBuf::from(DEFAULT_TYPESYSTEM);
            default.is_file().then_some(default)
        })
    }

    fn config(&self) -> Result<ConvertConfig> {
        let typesystem = match self.typesystem_path() {
            Some(path) => load_typesystem(&path)?,
            None => TypeSystem::default(),
        };
        Ok(ConvertConfig::new()
            .with_header(!self.no_header)
            .with_format(self.format)
            .with_link_prefix(self.link_prefix.clone())
            .with_pattern(self.pattern.clone())
            .with_typesystem(typesystem)
            .with_anomaly_log(self.anomaly_log.clone()))
    }
}

fn load_typesystem(path: &Path) -> Result<TypeSystem> {
    let typesystem = TypeSystem::from_path(path)
        .with_context(|| format!("Failed to read type system {}", path.display()))?;
    info!(path = %path.display(), types = typesystem.len(), "Loaded type system");
    Ok(typesystem)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut converter = Converter::new(cli.config()?);

    let report = converter
        .convert_path(&cli.input, &cli.output)
        .with_context(|| {
            format!(
                "Failed to convert {} into {}",
                cli.input.display(),
                cli.output.display()
            )
        })?;

    info!(
        files = report.converted.len(),
        tokens = report.token_count(),
        anomalies = report.anomalies().count(),
        "Conversion finished"
    );

    if !report.is_success() {
        for failure in &report.failed {
            warn!(input = %failure.input.display(), error = %failure.error, "Not converted");
        }
        bail!("{} document(s) could not be converted", report.failed.len());
    }
    Ok(())
}
