use core::ops::{Add, AddAssign, Sub};

use fixed::types::{I48F16, I96F32, U96F32};

use super::Duration;
use crate::datastructures::common::TimeInterval;

/// A point in time in the PTP timescale, measured in nanoseconds since the
/// epoch with sub-nanosecond resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Time {
    /// Time in nanoseconds
    inner: U96F32,
}

impl Time {
    /// Create an instance with the given amount of seconds since the epoch
    pub fn from_secs(secs: u64) -> Self {
        let inner = U96F32::from_num(secs) * 1_000_000_000u128;
        Self { inner }
    }

    /// Create an instance with the given amount of milliseconds since the
    /// epoch
    pub fn from_millis(millis: u64) -> Self {
        let inner = U96F32::from_num(millis) * 1_000_000u128;
        Self { inner }
    }

    /// Create an instance with the given amount of nanoseconds since the
    /// epoch
    pub fn from_nanos(nanos: u64) -> Self {
        let inner = U96F32::from_num(nanos);
        Self { inner }
    }

    /// Create an instance with the given amount of nanoseconds since the
    /// epoch, losing no precision
    pub fn from_fixed_nanos<F: Into<U96F32>>(nanos: F) -> Self {
        Self {
            inner: nanos.into(),
        }
    }

    /// The whole seconds of this timestamp
    pub fn secs(&self) -> u64 {
        (self.inner / 1_000_000_000u128).to_num()
    }

    /// The nanoseconds beyond the last whole second
    pub fn subsec_nanos(&self) -> u32 {
        let whole_seconds = U96F32::from_num(self.secs()) * 1_000_000_000u128;
        (self.inner - whole_seconds).to_num()
    }

    /// The total number of nanoseconds
    pub fn nanos(&self) -> U96F32 {
        self.inner
    }

    /// The sub-nanosecond part, as a wire format correction interval
    pub fn subnano(&self) -> TimeInterval {
        let fraction = self.inner.frac();
        // The fractional bits of U96F32 align with I48F16 after dropping the
        // lowest 16 bits.
        TimeInterval(I48F16::from_bits((fraction.to_bits() >> 16) as i64))
    }
}

impl Add<Duration> for Time {
    type Output = Time;

    fn add(self, rhs: Duration) -> Self::Output {
        if rhs.nanos().is_negative() {
            Time {
                inner: self
                    .inner
                    .saturating_sub(U96F32::from_num(-rhs.nanos())),
            }
        } else {
            Time {
                inner: self.inner.saturating_add(U96F32::from_num(rhs.nanos())),
            }
        }
    }
}

impl AddAssign<Duration> for Time {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

impl Sub for Time {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        Duration::from_fixed_nanos(
            I96F32::from_num(self.inner) - I96F32::from_num(rhs.inner),
        )
    }
}

impl core::fmt::Display for Time {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:09}", self.secs(), self.subsec_nanos())
    }
}
