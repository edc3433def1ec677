//! # Value Objects
//!
//! The exact unit-conversion scale and small aggregate values.

use primitive_types::U512;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use shared_types::{DecimalU256, U256};
use std::fmt;

use super::errors::ReconciliationError;
use super::invariants::{DEFAULT_SCALE_DENOMINATOR, DEFAULT_SCALE_NUMERATOR};

/// Exact rational conversion from withdrawal-source units to claim-token
/// units.
///
/// `apply` multiplies before dividing, through a 512-bit intermediate, and
/// floors the result.
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    /// Multiplier.
    #[serde_as(as = "DecimalU256")]
    numerator: U256,
    /// Divisor, never zero.
    #[serde_as(as = "DecimalU256")]
    denominator: U256,
}

impl Default for Scale {
    fn default() -> Self {
        Self {
            numerator: U256::from(DEFAULT_SCALE_NUMERATOR),
            denominator: U256::from(DEFAULT_SCALE_DENOMINATOR),
        }
    }
}

impl Scale {
    /// Create a scale.
    ///
    /// # Errors
    /// - `InvalidScale` if `denominator` is zero
    pub fn new(numerator: U256, denominator: U256) -> Result<Self, ReconciliationError> {
        if denominator.is_zero() {
            return Err(ReconciliationError::InvalidScale {
                numerator,
                denominator,
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// The identity scale.
    pub fn identity() -> Self {
        Self {
            numerator: U256::one(),
            denominator: U256::one(),
        }
    }

    /// Numerator.
    pub fn numerator(&self) -> U256 {
        self.numerator
    }

    /// Denominator.
    pub fn denominator(&self) -> U256 {
        self.denominator
    }

    /// `floor(amount × numerator / denominator)`, saturating at `U256::MAX`.
    pub fn apply(&self, amount: U256) -> U256 {
        Self::mul_div(amount, self.numerator, self.denominator)
    }

    /// `floor(amount × denominator / numerator)`: token units back to source
    /// units. Zero numerator yields zero.
    pub fn invert(&self, amount: U256) -> U256 {
        if self.numerator.is_zero() {
            return U256::zero();
        }
        Self::mul_div(amount, self.denominator, self.numerator)
    }

    fn mul_div(amount: U256, mul: U256, div: U256) -> U256 {
        let product: U512 = amount.full_mul(mul);
        let quotient = product / U512::from(div);
        U256::try_from(quotient).unwrap_or(U256::MAX)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Withdrawals that fall outside every claim window.
#[serde_as]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributionGap {
    /// Number of withdrawal details.
    pub count: usize,
    /// Their scaled sum, in token units.
    #[serde_as(as = "DecimalU256")]
    pub scaled_sum: U256,
}

impl AttributionGap {
    /// Add one scaled detail.
    pub fn add(&mut self, scaled: U256) {
        self.count += 1;
        self.scaled_sum = self.scaled_sum.saturating_add(scaled);
    }

    /// True if nothing fell in the gap.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Cumulative claimed vs accumulated amounts.
#[serde_as]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogTotals {
    /// Σ claimed.
    #[serde_as(as = "DecimalU256")]
    pub claimed: U256,
    /// Σ withdrawals accumulated (token units).
    #[serde_as(as = "DecimalU256")]
    pub accumulated: U256,
}

impl LogTotals {
    /// True if both sums agree.
    pub fn is_balanced(&self) -> bool {
        self.claimed == self.accumulated
    }

    /// `accumulated - claimed` when withdrawals exceed claims.
    pub fn unclaimed(&self) -> Option<U256> {
        (self.accumulated > self.claimed).then(|| self.accumulated - self.claimed)
    }

    /// `claimed - accumulated` when claims exceed withdrawals.
    pub fn overclaimed(&self) -> Option<U256> {
        (self.claimed > self.accumulated).then(|| self.claimed - self.accumulated)
    }
}
