//! Writing a built table out, and reading a JSON table back in.

use std::io::{BufWriter, Read, Write};
use std::path::Path;

use iprange::IntervalSet;
use serde::Deserialize;

use crate::error::Error;

/// The shape of the generated table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One `lo hi` pair per line.
    Text,
    /// A JSON array of `[lo, hi]` pairs.
    Json,
    /// A Rust source file declaring `pub static RANGES: &[(u32, u32)]`.
    Rust,
}

/// Writes `set` to `writer` in the requested format.
pub fn emit<W: Write>(set: &IntervalSet, format: OutputFormat, mut writer: W) -> Result<(), Error> {
    match format {
        OutputFormat::Text => {
            for interval in set {
                writeln!(writer, "{} {}", interval.lo(), interval.hi())?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut writer, set)?;
            writeln!(writer)?;
        }
        OutputFormat::Rust => {
            writeln!(writer, "// Generated by cnlist. Half-open [lo, hi) IPv4 ranges.")?;
            writeln!(writer, "pub static RANGES: &[(u32, u32)] = &[")?;
            for interval in set {
                writeln!(writer, "    ({}, {}),", interval.lo(), interval.hi())?;
            }
            writeln!(writer, "];")?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Writes `set` to the file at `path`. The table goes to a temporary file in
/// the same directory first, which replaces `path` only once it is complete.
pub fn write_table(set: &IntervalSet, format: OutputFormat, path: &Path) -> Result<(), Error> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    emit(set, format, BufWriter::new(file.as_file_mut()))?;
    file.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Reads a table previously written with [`OutputFormat::Json`]. The
/// intervals are validated exactly as [`IntervalSet::build`] would.
pub fn load_table<R: Read>(reader: R) -> Result<IntervalSet, Error> {
    Ok(serde_json::from_reader(reader)?)
}
