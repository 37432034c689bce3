use fabric_gf2::{verify_inverse, BitMatrix};
use fabric_range::{AddrRange, RangeMap};

use crate::error::ConfigError;

/// Which way an address is crossing the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Upstream request heading downstream (original → remapped space).
    Forward,
    /// Remapped space back to original space.
    Reverse,
}

/// The translation capability of a mapper, fixed for its lifetime.
///
/// A tagged variant rather than a trait-object hierarchy: the set of
/// strategies is closed and each one is a small immutable value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MapStrategy {
    /// Pass every address through unchanged.
    #[default]
    Identity,
    /// Interval-offset remapping over a validated range table.
    Range(RangeMap),
    /// Bitwise linear remapping over GF(2).
    Matrix {
        forward: BitMatrix,
        inverse: BitMatrix,
    },
}

impl MapStrategy {
    /// Build the matrix strategy from a forward matrix and its inverse.
    ///
    /// The pair is verified to multiply to the identity in both orders; a
    /// failed pairing is a fatal misconfiguration, since address corruption
    /// from a bad matrix cannot be detected later from individual results.
    pub fn matrix(forward: BitMatrix, inverse: BitMatrix) -> Result<Self, ConfigError> {
        if !verify_inverse(&forward, &inverse) {
            return Err(ConfigError::NotInverse);
        }
        Ok(MapStrategy::Matrix { forward, inverse })
    }

    /// Translate a single address in the given direction.
    ///
    /// Total over the full address domain: the range strategy passes
    /// unmapped addresses through unchanged, and the matrix strategy is
    /// defined on every `n`-bit value.
    pub fn translate(&self, addr: u64, direction: Direction) -> u64 {
        match (self, direction) {
            (MapStrategy::Identity, _) => addr,
            (MapStrategy::Range(map), Direction::Forward) => map.translate_forward(addr),
            (MapStrategy::Range(map), Direction::Reverse) => map.translate_reverse(addr),
            (MapStrategy::Matrix { forward, .. }, Direction::Forward) => forward.apply(addr),
            (MapStrategy::Matrix { inverse, .. }, Direction::Reverse) => inverse.apply(addr),
        }
    }

    /// Map remapped-space ranges back into the address space advertised
    /// upstream of the boundary.
    ///
    /// The range strategy clips each intersecting pair back into original
    /// space, preserving aliased duplicates. The matrix strategy cannot map
    /// intervals onto intervals, so it answers conservatively with the full
    /// `n`-bit covering span whenever the query is non-empty; membership is
    /// guaranteed, interval minimality is not. At the full 64-bit width the
    /// span saturates to `[0, u64::MAX)` (see [`AddrRange::span_of_bits`]),
    /// so the single topmost address is not advertised.
    pub fn translate_ranges_reverse(&self, query: &[AddrRange]) -> Vec<AddrRange> {
        match self {
            MapStrategy::Identity => query.iter().filter(|q| !q.is_empty()).copied().collect(),
            MapStrategy::Range(map) => map.translate_ranges_reverse(query),
            MapStrategy::Matrix { forward, .. } => {
                if query.iter().any(|q| !q.is_empty()) {
                    vec![AddrRange::span_of_bits(forward.width())]
                } else {
                    Vec::new()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range_strategy() -> MapStrategy {
        MapStrategy::Range(
            RangeMap::new(
                vec![AddrRange::new(0x1000, 0x2000)],
                vec![AddrRange::new(0x9000, 0xA000)],
            )
            .unwrap(),
        )
    }

    #[test]
    fn identity_is_the_default() {
        let strategy = MapStrategy::default();
        for addr in [0u64, 0x1234, u64::MAX] {
            assert_eq!(strategy.translate(addr, Direction::Forward), addr);
            assert_eq!(strategy.translate(addr, Direction::Reverse), addr);
        }
    }

    #[test]
    fn range_strategy_dispatches_both_directions() {
        let strategy = range_strategy();
        assert_eq!(strategy.translate(0x1500, Direction::Forward), 0x9500);
        assert_eq!(strategy.translate(0x9500, Direction::Reverse), 0x1500);
        assert_eq!(strategy.translate(0x3000, Direction::Forward), 0x3000);
    }

    #[test]
    fn matrix_strategy_requires_a_real_inverse() {
        let m = BitMatrix::from_rows(4, vec![0b0001, 0b0011, 0b0110, 0b1100]).unwrap();
        assert_eq!(
            MapStrategy::matrix(m.clone(), BitMatrix::identity(4)).unwrap_err(),
            ConfigError::NotInverse,
        );

        let inv = BitMatrix::from_rows(4, vec![0b0001, 0b0011, 0b0111, 0b1111]).unwrap();
        let strategy = MapStrategy::matrix(m, inv).unwrap();
        for addr in 0u64..16 {
            let fwd = strategy.translate(addr, Direction::Forward);
            assert_eq!(strategy.translate(fwd, Direction::Reverse), addr);
        }
    }

    #[test]
    fn matrix_reverse_ranges_answer_with_covering_span() {
        let strategy =
            MapStrategy::matrix(BitMatrix::identity(16), BitMatrix::identity(16)).unwrap();
        let out = strategy.translate_ranges_reverse(&[AddrRange::new(0x10, 0x20)]);
        assert_eq!(out, vec![AddrRange::new(0, 1 << 16)]);
        assert!(strategy.translate_ranges_reverse(&[]).is_empty());
        assert!(strategy
            .translate_ranges_reverse(&[AddrRange::new(0x10, 0x10)])
            .is_empty());
    }

    #[test]
    fn identity_reverse_ranges_echo_the_query() {
        let strategy = MapStrategy::Identity;
        let query = [AddrRange::new(0, 0x100), AddrRange::new(0x200, 0x300)];
        assert_eq!(strategy.translate_ranges_reverse(&query), query.to_vec());
    }
}
