//! Native value amount type.
//!
//! Amounts are represented as fixed-point integers (u128) to avoid floating-point errors.
//! The smallest unit is 1 raw (wei-granularity). Higher denominations are defined below.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// One gwei expressed in raw units.
pub const GWEI: u128 = 1_000_000_000;

/// One whole native unit (ether-granularity) expressed in raw units.
pub const NATIVE_UNIT: u128 = 1_000_000_000_000_000_000;

/// A non-negative quantity of native value.
///
/// Internally stored as raw units (u128) for precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Construct an amount from whole gwei.
    pub fn from_gwei(gwei: u128) -> Self {
        Self(gwei * GWEI)
    }

    /// Construct an amount from whole native units.
    pub fn from_native(units: u128) -> Self {
        Self(units * NATIVE_UNIT)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl Add for Amount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} raw", self.0)
    }
}
