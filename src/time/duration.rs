use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use az::Cast;
use fixed::types::I96F32;

use crate::datastructures::common::TimeInterval;

/// A span of time that can also be negative
///
/// Unlike [`core::time::Duration`] this is a signed fixed-point quantity with
/// sub-nanosecond resolution, matching the precision of the correction fields
/// carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Duration {
    /// Time in nanoseconds
    inner: I96F32,
}

impl Duration {
    /// A duration of zero length
    pub const ZERO: Duration = Duration {
        inner: I96F32::ZERO,
    };

    /// Create an instance with the given amount of seconds
    pub fn from_secs(secs: i64) -> Self {
        let inner = I96F32::from_num(secs) * 1_000_000_000i128;
        Self { inner }
    }

    /// Create an instance with the given amount of milliseconds
    pub fn from_millis(millis: i64) -> Self {
        let inner = I96F32::from_num(millis) * 1_000_000i128;
        Self { inner }
    }

    /// Create an instance with the given amount of microseconds
    pub fn from_micros(micros: i64) -> Self {
        let inner = I96F32::from_num(micros) * 1_000i128;
        Self { inner }
    }

    /// Create an instance with the given amount of nanoseconds
    pub fn from_nanos(nanos: i64) -> Self {
        let inner = I96F32::from_num(nanos);
        Self { inner }
    }

    /// Create an instance with the given amount of nanoseconds, losing no
    /// precision
    pub fn from_fixed_nanos<F: Into<I96F32>>(nanos: F) -> Self {
        Self {
            inner: nanos.into(),
        }
    }

    /// Get the total amount of nanoseconds
    pub fn nanos(&self) -> I96F32 {
        self.inner
    }

    /// Get the total amount of nanoseconds, rounded to an integer
    pub fn nanos_rounded(&self) -> i128 {
        self.inner.round().cast()
    }

    /// Get the total amount of seconds
    pub fn secs(&self) -> i64 {
        (self.inner / 1_000_000_000i128).to_num()
    }
}

impl From<TimeInterval> for Duration {
    fn from(interval: TimeInterval) -> Self {
        Self::from_fixed_nanos(interval.0)
    }
}

impl Neg for Duration {
    type Output = Duration;

    fn neg(self) -> Self::Output {
        Self { inner: -self.inner }
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Self) -> Self::Output {
        Duration {
            inner: self.inner + rhs.inner,
        }
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Duration {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        self + -rhs
    }
}

impl SubAssign for Duration {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<i64> for Duration {
    type Output = Duration;

    fn mul(self, rhs: i64) -> Self::Output {
        Duration {
            inner: self.inner * i128::from(rhs),
        }
    }
}

impl Div<i64> for Duration {
    type Output = Duration;

    fn div(self, rhs: i64) -> Self::Output {
        Duration {
            inner: self.inner / i128::from(rhs),
        }
    }
}
