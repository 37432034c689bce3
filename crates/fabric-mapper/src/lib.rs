#![forbid(unsafe_code)]

//! The fabric address-translation boundary.
//!
//! An [`AddrMapper`] sits between two sides of a simulated interconnect and
//! rewrites the address of every request crossing from the upstream side to
//! the downstream side. Three interchangeable translation strategies exist:
//!
//! - identity (the default): addresses pass through unchanged;
//! - interval-offset remapping over a validated [`fabric_range::RangeMap`];
//! - bitwise linear remapping through a [`fabric_gf2::BitMatrix`] and its
//!   verified inverse.
//!
//! Responses travel back upstream unmodified (correlation is by transaction
//! id, never by address), and snoop requests crossing in the downstream-to-
//! upstream direction are deliberately exempt from translation. When the
//! downstream side asks which addresses this boundary reaches, the upstream
//! side's native ranges are pushed backwards through the active strategy.
//!
//! All configuration is validated eagerly; once a mapper is built, every
//! translation call is a pure, total function of the input address.

mod config;
mod error;
mod mapper;
mod strategy;

pub use config::StrategyConfig;
pub use error::ConfigError;
pub use mapper::{AddrMapper, DownstreamPort, Packet, UpstreamPort};
pub use strategy::{Direction, MapStrategy};

pub use fabric_gf2::{BitMatrix, MatrixError};
pub use fabric_range::{AddrRange, RangeMap, RangeMapError};
