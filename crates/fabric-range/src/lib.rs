#![forbid(unsafe_code)]

//! Address intervals and the original→remapped interval table used by the
//! fabric boundary mapper.
//!
//! [`AddrRange`] is a half-open `[start, end)` interval of 64-bit addresses.
//! [`RangeMap`] pairs an ordered list of pairwise-disjoint *original* ranges
//! with equally-sized *remapped* ranges and translates addresses between the
//! two spaces:
//!
//! - forward: an address inside `original[i]` moves to the same offset inside
//!   `remapped[i]`; addresses outside every original range pass through
//!   unchanged.
//! - reverse: remapped-space ranges are clipped back into original space, one
//!   output entry per intersecting pair. The same remapped range may back
//!   several originals (aliasing), so a single query range can legitimately
//!   produce several original ranges.
//!
//! The table is validated once at construction and immutable afterwards; all
//! translation calls are total.

use std::ops::Range;

use thiserror::Error;

/// A half-open `[start, end)` range of physical addresses.
///
/// `start <= end` always holds for values produced by this crate. Empty
/// ranges (`start == end`) are representable but rejected as configuration
/// entries by [`RangeMap::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AddrRange {
    pub start: u64,
    pub end: u64,
}

impl AddrRange {
    /// Build a range from its bounds.
    #[track_caller]
    pub fn new(start: u64, end: u64) -> Self {
        assert!(start <= end, "invalid range: start {start:#x} > end {end:#x}");
        Self { start, end }
    }

    /// Build a range from a base address and a byte size.
    #[track_caller]
    pub fn with_size(start: u64, size: u64) -> Self {
        let end = start
            .checked_add(size)
            .unwrap_or_else(|| panic!("range overflows: start {start:#x} size {size:#x}"));
        Self { start, end }
    }

    /// The covering span of an `n`-bit address space, `[0, 2^n)`.
    ///
    /// At `n == 64` the exclusive end is not representable in a `u64`; the
    /// span saturates to `[0, u64::MAX)`, losing only the topmost address.
    #[track_caller]
    pub fn span_of_bits(n: u8) -> Self {
        assert!((1..=64).contains(&n), "bit width must be 1..=64 (got {n})");
        let end = if n == 64 { u64::MAX } else { 1u64 << n };
        Self { start: 0, end }
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.start && addr < self.end
    }

    /// True when the two ranges share at least one address.
    #[inline]
    pub fn overlaps(&self, other: &AddrRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The common sub-range of two ranges, or `None` when they are disjoint.
    pub fn intersection(&self, other: &AddrRange) -> Option<AddrRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(AddrRange { start, end })
    }
}

impl From<Range<u64>> for AddrRange {
    #[track_caller]
    fn from(r: Range<u64>) -> Self {
        AddrRange::new(r.start, r.end)
    }
}

impl std::fmt::Display for AddrRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:#x}, {:#x})", self.start, self.end)
    }
}

/// Why a [`RangeMap`] could not be built.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeMapError {
    #[error("original and remapped range lists differ in length ({original} vs {remapped})")]
    LengthMismatch { original: usize, remapped: usize },

    #[error("range pair {index} contains an inverted range (start > end)")]
    InvertedRange { index: usize },

    #[error("range pair {index} contains an empty range")]
    EmptyRange { index: usize },

    #[error(
        "range pair {index} differs in size (original {original:#x} bytes, \
         remapped {remapped:#x} bytes)"
    )]
    SizeMismatch {
        index: usize,
        original: u64,
        remapped: u64,
    },

    #[error("original ranges {first} and {second} overlap")]
    OverlappingOriginals { first: usize, second: usize },
}

/// An immutable table mapping disjoint original address ranges onto
/// equally-sized remapped ranges.
///
/// Remapped ranges may repeat or overlap: several originals aliasing onto one
/// physical window is legal and intentional. Original ranges must not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeMap {
    pairs: Vec<(AddrRange, AddrRange)>,
}

impl RangeMap {
    /// Validate and build a table from two equal-length range lists.
    ///
    /// Fails if the lists differ in length, if any entry is empty, if a pair
    /// differs in size, or if the original ranges are not pairwise disjoint.
    pub fn new(
        original: Vec<AddrRange>,
        remapped: Vec<AddrRange>,
    ) -> Result<Self, RangeMapError> {
        if original.len() != remapped.len() {
            return Err(RangeMapError::LengthMismatch {
                original: original.len(),
                remapped: remapped.len(),
            });
        }

        for (index, (orig, rem)) in original.iter().zip(&remapped).enumerate() {
            // The fields of `AddrRange` are public (and deserializable), so an
            // inverted range can reach this constructor without ever passing
            // through `AddrRange::new`. Catch it here before `size()` can
            // underflow.
            if orig.end < orig.start || rem.end < rem.start {
                return Err(RangeMapError::InvertedRange { index });
            }
            if orig.is_empty() || rem.is_empty() {
                return Err(RangeMapError::EmptyRange { index });
            }
            if orig.size() != rem.size() {
                return Err(RangeMapError::SizeMismatch {
                    index,
                    original: orig.size(),
                    remapped: rem.size(),
                });
            }
        }

        for (i, a) in original.iter().enumerate() {
            for (j, b) in original.iter().enumerate().skip(i + 1) {
                if a.overlaps(b) {
                    return Err(RangeMapError::OverlappingOriginals { first: i, second: j });
                }
            }
        }

        let pairs = original.into_iter().zip(remapped).collect();
        Ok(Self { pairs })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The configured `(original, remapped)` pairs, in configuration order.
    #[inline]
    pub fn pairs(&self) -> &[(AddrRange, AddrRange)] {
        &self.pairs
    }

    /// Translate an original-space address into remapped space.
    ///
    /// An address outside every configured original range passes through
    /// unchanged; that is the documented policy for unmapped addresses, not
    /// an error.
    pub fn translate_forward(&self, addr: u64) -> u64 {
        for (orig, rem) in &self.pairs {
            if orig.contains(addr) {
                return rem.start + (addr - orig.start);
            }
        }
        addr
    }

    /// Translate a remapped-space address back into original space.
    ///
    /// When aliasing maps several originals onto one remapped window the
    /// lookup is ambiguous; the first matching pair in configuration order
    /// wins. Unmatched addresses pass through unchanged.
    pub fn translate_reverse(&self, addr: u64) -> u64 {
        for (orig, rem) in &self.pairs {
            if rem.contains(addr) {
                return orig.start + (addr - rem.start);
            }
        }
        addr
    }

    /// Translate remapped-space query ranges back into original space.
    ///
    /// For every configured pair whose remapped range intersects a query
    /// range, the intersecting portion is clipped back into the original
    /// range. Duplicate outputs are preserved: aliased pairs represent
    /// genuinely distinct original regions and each is advertised separately.
    pub fn translate_ranges_reverse(&self, query: &[AddrRange]) -> Vec<AddrRange> {
        let mut out = Vec::new();
        for (orig, rem) in &self.pairs {
            for q in query {
                if let Some(hit) = rem.intersection(q) {
                    let start = orig.start + (hit.start - rem.start);
                    out.push(AddrRange {
                        start,
                        end: start + hit.size(),
                    });
                }
            }
        }
        out
    }
}
