use core::time::Duration;

/// The cap applied to the exponent before computing a period, far outside
/// any sane configuration but small enough that the math cannot overflow.
const MAX_LOG_SECONDS: i8 = 62;
const MIN_LOG_SECONDS: i8 = -30;

/// The pacing of a periodic PTP message stream.
///
/// The wire format expresses message rates as the base two logarithm of the
/// period in seconds (the `logMessageInterval` convention), so that is what
/// this type stores. Negative values are sub-second periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    log_seconds: i8,
}

impl Interval {
    /// The pacing with a period of 2^`log_seconds` seconds
    pub const fn from_log_seconds(log_seconds: i8) -> Self {
        Self { log_seconds }
    }

    /// The exponent as it appears in the `logMessageInterval` field
    pub const fn log_seconds(self) -> i8 {
        self.log_seconds
    }

    /// The length of one period.
    ///
    /// Computed with integer shifts, saturating at both ends of the exponent
    /// range, so even a hostile `logMessageInterval` taken from the wire
    /// cannot overflow or panic here.
    pub fn period(self) -> Duration {
        if self.log_seconds >= 0 {
            let shift = self.log_seconds.min(MAX_LOG_SECONDS) as u32;
            Duration::from_secs(1u64 << shift)
        } else {
            let shift = (-(self.log_seconds.max(MIN_LOG_SECONDS) as i32)) as u32;
            Duration::from_nanos(1_000_000_000u64 >> shift)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_doubles_per_step() {
        assert_eq!(Interval::from_log_seconds(0).period(), Duration::from_secs(1));
        assert_eq!(Interval::from_log_seconds(1).period(), Duration::from_secs(2));
        assert_eq!(Interval::from_log_seconds(4).period(), Duration::from_secs(16));
    }

    #[test]
    fn negative_exponents_are_fractions_of_a_second() {
        assert_eq!(
            Interval::from_log_seconds(-1).period(),
            Duration::from_millis(500)
        );
        assert_eq!(
            Interval::from_log_seconds(-3).period(),
            Duration::from_millis(125)
        );
    }

    #[test]
    fn extreme_exponents_do_not_panic() {
        assert_eq!(
            Interval::from_log_seconds(127).period(),
            Duration::from_secs(1 << 62)
        );
        assert!(Interval::from_log_seconds(-128).period() <= Duration::from_nanos(1));
    }

    #[test]
    fn exponent_round_trips() {
        for log_seconds in [-7, 0, 1, 13] {
            assert_eq!(
                Interval::from_log_seconds(log_seconds).log_seconds(),
                log_seconds
            );
        }
    }
}
