/// Configuration error variants.
#[derive(Debug, thiserror::Error)]
pub enum CnlistConfigError {
    /// Country codes are two ASCII letters, as used by the RIR feeds.
    #[error("Invalid country code '{0}': expected two ASCII letters, e.g. 'CN'")]
    InvalidCountryCode(String),
}
