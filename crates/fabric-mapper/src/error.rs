use thiserror::Error;

/// A fatal configuration error raised while building a mapper.
///
/// Every variant is detected eagerly at construction; no translation call
/// can fail once construction has succeeded. None of these are recovered
/// from automatically — an auto-repaired mapping could silently corrupt
/// every simulated memory access.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(transparent)]
    Range(#[from] fabric_range::RangeMapError),

    #[error(transparent)]
    Matrix(#[from] fabric_gf2::MatrixError),

    #[error("matrix and its supplied inverse do not multiply to the identity")]
    NotInverse,
}
