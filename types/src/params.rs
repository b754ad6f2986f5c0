//! Fixed protocol parameters.

use crate::amount::{Amount, GWEI};

/// The minimum accepted contribution: 10 gwei.
///
/// A fixed parameter of the vault, not configurable at runtime.
/// Contributions strictly below this threshold are rejected in full.
pub const MIN_CONTRIBUTION: Amount = Amount::new(10 * GWEI);
