//! Readers for the allocation feeds the address table is generated from.
//!
//! Three formats are supported:
//!
//! - **sized**: `<start> <size>` per line, e.g. a pre-filtered extract of
//!   the APNIC delegated file (`1.0.1.0 256`)
//! - **csv**: `start,end,country,...` rows as published by IP2Location
//!   (`"16777216","16777471","US","United States of America"`)
//! - **apnic**: the raw RIR delegated statistics file
//!   (`apnic|CN|ipv4|1.0.1.0|256|20110414|allocated`)
//!
//! Readers only parse; country filtering happens in the normalizer.

use std::io::{BufRead, BufReader, Read};
use std::net::Ipv4Addr;

use iprange::RawRange;
use serde::Deserialize;
use tracing::debug;

use crate::error::Error;

/// The layout of an input feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Whitespace separated `start size` lines.
    Sized,
    /// `start,end,country` rows with an inclusive end address.
    Csv,
    /// RIR delegated statistics (`registry|cc|type|start|value|...`).
    Apnic,
}

/// Parses an IPv4 address given either as an integer or in dotted form.
pub fn parse_address(field: &str) -> Result<u32, String> {
    let field = field.trim();
    if let Ok(value) = field.parse::<u32>() {
        return Ok(value);
    }
    field
        .parse::<Ipv4Addr>()
        .map(u32::from)
        .map_err(|_| format!("'{field}' is neither an IPv4 address nor a 32-bit integer"))
}

/// Reads every record of `reader` in the given format.
#[tracing::instrument(skip(reader))]
pub fn read_records<R: Read>(reader: R, format: SourceFormat) -> Result<Vec<RawRange>, Error> {
    let records = match format {
        SourceFormat::Sized => read_sized(BufReader::new(reader))?,
        SourceFormat::Csv => read_csv(reader)?,
        SourceFormat::Apnic => read_apnic(BufReader::new(reader))?,
    };
    debug!(records = records.len(), "read address records");
    Ok(records)
}

/// Reads `start size` lines. Blank lines and `#` comments are skipped.
pub fn read_sized<R: BufRead>(reader: R) -> Result<Vec<RawRange>, Error> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parse_err = |reason: String| Error::Parse { line: index + 1, reason };
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [start, size] = fields[..] else {
            return Err(parse_err(format!(
                "expected '<start> <size>', got {} fields",
                fields.len()
            )));
        };

        let start = parse_address(start).map_err(parse_err)?;
        let size = size
            .parse::<u32>()
            .map_err(|err| parse_err(format!("invalid size '{size}': {err}")))?;
        records.push(RawRange::sized(start, size));
    }
    Ok(records)
}

/// Reads `start,end,country,...` rows. Fields may be quoted; anything past
/// the third field is ignored.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawRange>, Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (index, row) in csv_reader.records().enumerate() {
        let row = row?;
        let line = row
            .position()
            .map(|position| position.line() as usize)
            .unwrap_or(index + 1);
        let parse_err = |reason: String| Error::Parse { line, reason };

        if row.len() < 3 {
            return Err(parse_err(format!(
                "expected 'start,end,country', got {} fields",
                row.len()
            )));
        }

        let start = parse_address(&row[0]).map_err(parse_err)?;
        let end = parse_address(&row[1]).map_err(parse_err)?;
        records.push(RawRange::tagged(start, end, &row[2]));
    }
    Ok(records)
}

/// Reads the `ipv4` rows of an RIR delegated statistics file. The version
/// header, summary lines, comments and other address families are skipped.
pub fn read_apnic<R: BufRead>(reader: R) -> Result<Vec<RawRange>, Error> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parse_err = |reason: String| Error::Parse { line: index + 1, reason };
        let fields: Vec<&str> = line.split('|').collect();
        if fields.len() < 6 {
            return Err(parse_err(format!(
                "expected at least 6 '|' separated fields, got {}",
                fields.len()
            )));
        }

        // registry|cc|type|start|value|date|status
        let (country, kind, start, value) = (fields[1], fields[2], fields[3], fields[4]);
        if kind != "ipv4" || country == "*" || fields[5] == "summary" {
            continue;
        }

        let start = parse_address(start).map_err(parse_err)?;
        let size = value
            .parse::<u32>()
            .map_err(|err| parse_err(format!("invalid address count '{value}': {err}")))?;
        records.push(RawRange::sized(start, size).with_country(country));
    }
    Ok(records)
}
