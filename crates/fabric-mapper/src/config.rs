use fabric_gf2::BitMatrix;
use fabric_range::{AddrRange, RangeMap};

use crate::error::ConfigError;
use crate::strategy::MapStrategy;

/// Declarative mapper configuration, validated by [`StrategyConfig::build`].
///
/// Consumed once at construction time; the resulting [`MapStrategy`] is
/// immutable for the mapper's lifetime. Defaults follow the original
/// parameter surface: no configuration means the identity strategy, and an
/// unset matrix (or inverse) means the identity matrix, so the default
/// matrix transform is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "strategy", rename_all = "snake_case")
)]
pub enum StrategyConfig {
    /// Pass addresses through unchanged.
    #[default]
    Identity,

    /// Interval-offset remapping. The two lists must be the same length,
    /// pairwise size-equal, with pairwise-disjoint originals. Remapped
    /// ranges may repeat for aliasing.
    Range {
        original_ranges: Vec<AddrRange>,
        remapped_ranges: Vec<AddrRange>,
    },

    /// Bitwise linear remapping over GF(2). `rows`/`inverse_rows` hold the
    /// `bit_width` row masks of the matrix and its inverse; an empty list
    /// stands for the identity matrix.
    Matrix {
        #[cfg_attr(feature = "serde", serde(default = "default_bit_width"))]
        bit_width: u8,
        #[cfg_attr(feature = "serde", serde(default))]
        rows: Vec<u64>,
        #[cfg_attr(feature = "serde", serde(default))]
        inverse_rows: Vec<u64>,
    },
}

#[cfg(feature = "serde")]
fn default_bit_width() -> u8 {
    64
}

impl StrategyConfig {
    /// Validate the configuration and build the translation strategy.
    ///
    /// All invariants are checked here, eagerly: range-table pairing and
    /// disjointness, matrix width bounds and row masks, and the inverse
    /// pairing contract. See [`ConfigError`].
    pub fn build(self) -> Result<MapStrategy, ConfigError> {
        match self {
            StrategyConfig::Identity => Ok(MapStrategy::Identity),
            StrategyConfig::Range {
                original_ranges,
                remapped_ranges,
            } => Ok(MapStrategy::Range(RangeMap::new(
                original_ranges,
                remapped_ranges,
            )?)),
            StrategyConfig::Matrix {
                bit_width,
                rows,
                inverse_rows,
            } => {
                let forward = build_matrix(bit_width, rows)?;
                let inverse = build_matrix(bit_width, inverse_rows)?;
                MapStrategy::matrix(forward, inverse)
            }
        }
    }
}

fn build_matrix(bit_width: u8, rows: Vec<u64>) -> Result<BitMatrix, ConfigError> {
    if rows.is_empty() {
        // Unset in the configuration: default to the identity transform.
        // Validate the width through `from_rows` so an out-of-range width
        // still fails instead of panicking in `identity`.
        if !(1..=64).contains(&bit_width) {
            return Err(fabric_gf2::MatrixError::WidthOutOfRange { n: bit_width }.into());
        }
        return Ok(BitMatrix::identity(bit_width));
    }
    Ok(BitMatrix::from_rows(bit_width, rows)?)
}
