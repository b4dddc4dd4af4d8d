//! Feed in, table out.

use std::io::Read;

use iprange::{IntervalSet, Normalizer};
use tracing::info;

use crate::error::Error;
use crate::source::{self, SourceFormat};

/// Reads every record of `reader`, normalizes them and builds the table.
#[tracing::instrument(skip(reader, normalizer), fields(country = normalizer.country()))]
pub fn build_set<R: Read>(
    reader: R,
    format: SourceFormat,
    normalizer: &Normalizer,
) -> Result<IntervalSet, Error> {
    let records = source::read_records(reader, format)?;
    let record_count = records.len();

    let intervals = normalizer.normalize(records)?;
    let set = IntervalSet::build(intervals)?;

    info!(
        records = record_count,
        intervals = set.len(),
        addresses = set.address_count(),
        "built address table"
    );

    Ok(set)
}
