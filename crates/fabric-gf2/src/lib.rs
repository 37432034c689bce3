#![forbid(unsafe_code)]

//! Square bit matrices over GF(2) for linear address transforms.
//!
//! A [`BitMatrix`] represents a linear map `f(x) = M·x (mod 2)` on `n`-bit
//! addresses, stored as `n` row masks of `n` bits each. Arithmetic is
//! carry-free: addition is XOR, multiplication is AND. Applying a matrix to
//! an address computes, for each output bit `j`, the parity of
//! `rows[j] & addr`.
//!
//! The mapper pairs a matrix with a caller-supplied inverse. Whether the pair
//! actually multiplies to the identity (in both orders) is checked with
//! [`verify_inverse`] at configuration time; an uninvertible pairing silently
//! corrupts every translated address and is impossible to detect later from
//! individual results, so it must never reach a running mapper.

use thiserror::Error;

/// Why a [`BitMatrix`] could not be built.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatrixError {
    #[error("bit width must be 1..=64 (got {n})")]
    WidthOutOfRange { n: u8 },

    #[error("expected {n} rows, got {rows}")]
    RowCountMismatch { n: u8, rows: usize },

    #[error("row {index} mask {row:#x} selects bits outside the {n}-bit width")]
    RowExceedsWidth { index: usize, row: u64, n: u8 },
}

/// An `n × n` matrix over GF(2), `1 <= n <= 64`.
///
/// Row `j` is a mask over the input bits contributing (by XOR) to output bit
/// `j`. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    n: u8,
    rows: Vec<u64>,
}

impl BitMatrix {
    /// The identity transform: row `i` has only bit `i` set.
    #[track_caller]
    pub fn identity(n: u8) -> Self {
        assert!((1..=64).contains(&n), "bit width must be 1..=64 (got {n})");
        Self {
            n,
            rows: (0..n).map(|i| 1u64 << i).collect(),
        }
    }

    /// Validate and build a matrix from its row masks.
    ///
    /// Fails if `n` is out of `1..=64`, if the row count differs from `n`, or
    /// if any row selects input bits at positions `>= n`.
    pub fn from_rows(n: u8, rows: Vec<u64>) -> Result<Self, MatrixError> {
        if !(1..=64).contains(&n) {
            return Err(MatrixError::WidthOutOfRange { n });
        }
        if rows.len() != usize::from(n) {
            return Err(MatrixError::RowCountMismatch { n, rows: rows.len() });
        }
        let width_mask = if n == 64 { u64::MAX } else { (1u64 << n) - 1 };
        for (index, &row) in rows.iter().enumerate() {
            if row & !width_mask != 0 {
                return Err(MatrixError::RowExceedsWidth { index, row, n });
            }
        }
        Ok(Self { n, rows })
    }

    /// The matrix dimension (address width in bits).
    #[inline]
    pub fn width(&self) -> u8 {
        self.n
    }

    /// The row masks, row `j` first.
    #[inline]
    pub fn rows(&self) -> &[u64] {
        &self.rows
    }

    /// Matrix-vector multiply over GF(2).
    ///
    /// Output bit `j` is the parity of `rows[j] & addr` (the XOR-reduction of
    /// the selected input bits). Input bits at positions `>= n` cannot be
    /// selected by a valid row mask and never influence the result.
    pub fn apply(&self, addr: u64) -> u64 {
        let mut out = 0u64;
        for (j, &row) in self.rows.iter().enumerate() {
            if (row & addr).count_ones() & 1 == 1 {
                out |= 1u64 << j;
            }
        }
        out
    }

    /// GF(2) matrix product `self · rhs`.
    ///
    /// Row `i` of the product is the XOR of the rows of `rhs` selected by row
    /// `i` of `self`.
    #[track_caller]
    pub fn mul(&self, rhs: &BitMatrix) -> BitMatrix {
        assert_eq!(
            self.n, rhs.n,
            "matrix dimensions differ ({} vs {})",
            self.n, rhs.n
        );
        let rows = self
            .rows
            .iter()
            .map(|&lhs_row| {
                let mut acc = 0u64;
                let mut bits = lhs_row;
                while bits != 0 {
                    let j = bits.trailing_zeros() as usize;
                    acc ^= rhs.rows[j];
                    bits &= bits - 1;
                }
                acc
            })
            .collect();
        BitMatrix { n: self.n, rows }
    }

    /// True when this matrix is the identity.
    pub fn is_identity(&self) -> bool {
        self.rows
            .iter()
            .enumerate()
            .all(|(i, &row)| row == 1u64 << i)
    }
}

/// Check that `inverse` really is the two-sided inverse of `matrix`.
///
/// Both products are formed: over GF(2) a one-sided inverse of a square
/// matrix is necessarily two-sided, but checking both orders keeps the
/// contract self-evident and costs nothing at configuration time.
pub fn verify_inverse(matrix: &BitMatrix, inverse: &BitMatrix) -> bool {
    matrix.width() == inverse.width()
        && matrix.mul(inverse).is_identity()
        && inverse.mul(matrix).is_identity()
}
