//! Exact distinct-count arithmetic for values up to `2^126`.
//!
//! Distinct counts in the large-scale simulation exceed `u64` (the top of the
//! evaluated range is 10^21 and transition thresholds reach past `2^64 * e`),
//! while full bignum arithmetic is unnecessary. `WideCounter` covers the
//! `[0, 2^126)` range with two 63-bit limbs and supports exactly the
//! operations the simulation needs: increment, decrement, addition,
//! floor/ceil construction from `f64`, ordering, and exact decimal rendering
//! for reports.

use std::fmt::{self, Debug, Display, Formatter};

/// Value of one `high` limb unit, `2^63`.
const LIMB_BASE: u64 = 1 << 63;
/// Bit mask selecting the `low` limb, `2^63 - 1`.
const LIMB_MASK: u64 = LIMB_BASE - 1;
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
const TWO_POW_MINUS_63: f64 = 1.0 / TWO_POW_63;
const TWO_POW_126: f64 = TWO_POW_63 * TWO_POW_63;

/// Exact unsigned integer in `[0, 2^126)` represented as `high * 2^63 + low`.
///
/// Both limbs stay strictly below `2^63` after every operation, so limb
/// arithmetic never overflows `u64` and the derived lexicographic ordering on
/// `(high, low)` equals the numeric ordering.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WideCounter {
    high: u64,
    low: u64,
}

impl WideCounter {
    pub const ZERO: WideCounter = WideCounter { high: 0, low: 0 };

    #[inline]
    pub fn zero() -> Self {
        Self::ZERO
    }

    /// Create a counter from a native integer. Any `u64` is accepted; values
    /// at or above `2^63` spill into the high limb.
    #[inline]
    pub fn from_u64(value: u64) -> Self {
        Self {
            high: value >> 63,
            low: value & LIMB_MASK,
        }
    }

    /// Create a counter from a `u128`.
    ///
    /// # Panics
    ///
    /// Panics if `value >= 2^126`.
    pub fn from_u128(value: u128) -> Self {
        assert!(value < 1 << 126, "value must be below 2^126");
        Self {
            high: (value >> 63) as u64,
            low: (value as u64) & LIMB_MASK,
        }
    }

    /// Largest integer counter not greater than `value`.
    ///
    /// # Panics
    ///
    /// Panics if `value` is negative, NaN, or at least `2^126`.
    pub fn floor(value: f64) -> Self {
        assert!(value >= 0.0, "value must be non-negative, got {value}");
        Self::from_integral(value.floor())
    }

    /// Smallest integer counter not less than `value`.
    ///
    /// # Panics
    ///
    /// Panics if `value` is negative, NaN, or rounds up to at least `2^126`.
    pub fn ceil(value: f64) -> Self {
        assert!(value >= 0.0, "value must be non-negative, got {value}");
        Self::from_integral(value.ceil())
    }

    /// Split an integral float into limbs.
    ///
    /// For `value >= 2^63` the decomposition `high = trunc(value * 2^-63)`,
    /// `low = value - high * 2^63` is exact. Scaling by `2^-63` only changes
    /// the exponent, and `high * 2^63` shares the mantissa bits of `value`,
    /// so the subtraction cancels without rounding. Both limbs land in
    /// `[0, 2^63)`.
    fn from_integral(value: f64) -> Self {
        assert!(value < TWO_POW_126, "value must be below 2^126, got {value}");
        let counter = if value >= TWO_POW_63 {
            let high = (value * TWO_POW_MINUS_63) as u64;
            let low = (value - high as f64 * TWO_POW_63) as u64;
            Self { high, low }
        } else {
            Self {
                high: 0,
                low: value as u64,
            }
        };
        debug_assert!(counter.high < LIMB_BASE && counter.low < LIMB_BASE);
        counter
    }

    /// Add one.
    #[inline]
    pub fn increment(&mut self) {
        self.low += 1;
        if self.low == LIMB_BASE {
            self.low = 0;
            self.high += 1;
        }
    }

    /// Subtract one.
    ///
    /// # Panics
    ///
    /// Panics if the counter is zero.
    #[inline]
    pub fn decrement(&mut self) {
        assert!(self.is_positive(), "cannot decrement zero");
        if self.low == 0 {
            self.high -= 1;
            self.low = LIMB_MASK;
        } else {
            self.low -= 1;
        }
    }

    /// Add another counter exactly.
    #[inline]
    pub fn add(&mut self, rhs: Self) {
        // Both low limbs are below 2^63, so their sum fits u64 and the carry
        // is bit 63 of the sum.
        self.low += rhs.low;
        self.high += rhs.high + (self.low >> 63);
        self.low &= LIMB_MASK;
        debug_assert!(self.high < LIMB_BASE);
    }

    /// Add a native integer exactly; the addend is split across both limbs.
    #[inline]
    pub fn add_u64(&mut self, rhs: u64) {
        self.low += rhs & LIMB_MASK;
        self.high += (rhs >> 63) + (self.low >> 63);
        self.low &= LIMB_MASK;
        debug_assert!(self.high < LIMB_BASE);
    }

    /// Nearest-float approximation of the counter value.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.high as f64 * TWO_POW_63 + self.low as f64
    }

    /// Exact value as `u128`; `2^126 - 1` fits comfortably.
    #[inline]
    pub fn as_u128(&self) -> u128 {
        (u128::from(self.high) << 63) | u128::from(self.low)
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.high > 0 || self.low > 0
    }
}

impl Display for WideCounter {
    /// Exact decimal rendering, used verbatim in report rows.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.as_u128(), f)
    }
}

impl Debug for WideCounter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string())
    }
}
