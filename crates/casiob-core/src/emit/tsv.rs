use std::io::Write;

use crate::error::Result;
use crate::types::DocumentTags;

use super::Emitter;

/// Column header of the TSV format.
pub const HEADER: &str = "TOKEN\tNE-COARSE\tNE-FINE\tNE-FINE-COMP\tNE-NESTED\tNEL-WikidataQID";

/// Tab-separated rows, one per token, with a blank line after each sentence.
///
/// Lines are joined with `\n`; the last line (the final sentence's blank
/// separator) carries no terminator.
#[derive(Debug, Clone, Copy)]
pub struct TsvEmitter {
    header: bool,
}

impl Default for TsvEmitter {
    fn default() -> Self {
        Self { header: true }
    }
}

impl TsvEmitter {
    pub fn new(header: bool) -> Self {
        Self { header }
    }
}

/// Writes `\n` between lines but not after the last one.
struct JoinedLines<'w> {
    out: &'w mut dyn Write,
    first: bool,
}

impl JoinedLines<'_> {
    fn line(&mut self, line: impl std::fmt::Display) -> std::io::Result<()> {
        if !self.first {
            self.out.write_all(b"\n")?;
        }
        self.first = false;
        write!(self.out, "{line}")
    }
}

impl Emitter for TsvEmitter {
    fn extension(&self) -> &'static str {
        "tsv"
    }

    fn write_document(&self, doc: &DocumentTags, out: &mut dyn Write) -> Result<()> {
        let mut lines = JoinedLines { out, first: true };
        if self.header {
            lines.line(HEADER)?;
        }
        for sentence in &doc.sentences {
            for tag in &sentence.tags {
                lines.line(tag)?;
            }
            lines.line("")?;
        }
        Ok(())
    }
}
