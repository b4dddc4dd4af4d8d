//! Top-level error type for the cnlist tool

/// Errors raised while reading records, building the table or writing it out.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading the input or writing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV reader could not decode a row.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A JSON table could not be read or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record of the input feed was malformed.
    #[error("line {line}: {reason}")]
    Parse {
        /// The 1-based line number of the offending record.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// The records did not form a valid address table, or a query was not
    /// an IPv4 address.
    #[error(transparent)]
    Range(#[from] iprange::Error),

    /// The configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A query argument was not an IP address.
    #[error("invalid IP address '{0}'")]
    InvalidAddress(String),
}
