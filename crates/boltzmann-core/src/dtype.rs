use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Scalar type stored in matrices and parameter vectors.
/// Implemented for `f32` and `f64`.
pub trait Float:
    Copy
    + Clone
    + Default
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Sum
    + Serialize
    + for<'de> Deserialize<'de>
    + 'static
{
    const ZERO: Self;
    const ONE: Self;
    const HALF: Self;

    fn from_f64(v: f64) -> Self;
    fn to_f64(self) -> f64;
    fn from_usize(v: usize) -> Self;

    fn abs(self) -> Self;
    fn exp(self) -> Self;
    fn ln(self) -> Self;
    fn ln_1p(self) -> Self;
    fn max(self, other: Self) -> Self;
    fn is_finite(self) -> bool;
    fn signum(self) -> Self;

    /// Logistic function `1 / (1 + e^-x)`.
    #[inline]
    fn sigmoid(self) -> Self {
        Self::ONE / (Self::ONE + (-self).exp())
    }

    /// `ln(1 + e^x)` without overflowing for large `x`.
    #[inline]
    fn softplus(self) -> Self {
        self.max(Self::ZERO) + (-self.abs()).exp().ln_1p()
    }
}

macro_rules! impl_float {
    ($t:ident) => {
        impl Float for $t {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            const HALF: Self = 0.5;

            #[inline] fn from_f64(v: f64) -> Self { v as $t }
            #[inline] fn to_f64(self) -> f64 { self as f64 }
            #[inline] fn from_usize(v: usize) -> Self { v as $t }
            #[inline] fn abs(self) -> Self { $t::abs(self) }
            #[inline] fn exp(self) -> Self { $t::exp(self) }
            #[inline] fn ln(self) -> Self { $t::ln(self) }
            #[inline] fn ln_1p(self) -> Self { $t::ln_1p(self) }
            #[inline] fn max(self, other: Self) -> Self { $t::max(self, other) }
            #[inline] fn is_finite(self) -> bool { $t::is_finite(self) }
            #[inline] fn signum(self) -> Self { $t::signum(self) }
        }
    };
}

impl_float!(f32);
impl_float!(f64);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sigmoid() {
        assert_relative_eq!(Float::sigmoid(0.0f64), 0.5);
        assert!(Float::sigmoid(-30.0f64) > 0.0);
        assert!(Float::sigmoid(30.0f32) <= 1.0);
    }

    #[test]
    fn test_softplus_matches_naive_form() {
        for &x in &[-5.0f64, -0.5, 0.0, 0.5, 3.0] {
            assert_relative_eq!(x.softplus(), (1.0 + x.exp()).ln(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_softplus_large_input() {
        // naive ln(1 + e^x) overflows to inf here
        let x = 1000.0f64;
        assert!(x.softplus().is_finite());
        assert_relative_eq!(x.softplus(), 1000.0);
        assert_relative_eq!((-1000.0f64).softplus(), 0.0);
    }
}
