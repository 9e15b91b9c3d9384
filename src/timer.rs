//! Definition of the abstract one-shot timer used by a port
//!
//! Each port owns two of these, created during initialization: the announce
//! receipt timer and the delay request timer. On Linux the natural
//! implementation is a `timerfd` on the monotonic clock.

use core::time::Duration;

use crate::transport::RawFd;

/// A one-shot timer backed by a pollable descriptor
///
/// The descriptor becomes readable when the timer expires; the external
/// multiplexer reports it like any other descriptor of the port's
/// [`FdArray`](crate::transport::FdArray). Dropping a timer releases the
/// descriptor.
pub trait Timer: Sized {
    type Error: std::error::Error;

    /// Create a new, disarmed timer.
    fn create() -> Result<Self, Self::Error>;

    /// The descriptor to poll for expirations.
    fn fd(&self) -> RawFd;

    /// Arm the timer to fire once after `timeout`.
    ///
    /// Arming is idempotent: a new deadline replaces the previous one, and a
    /// not-yet-consumed expiration is cleared (`timerfd` semantics).
    fn arm(&mut self, timeout: Duration) -> Result<(), Self::Error>;

    /// Disable a pending fire.
    fn disarm(&mut self) -> Result<(), Self::Error>;
}

#[cfg(test)]
pub mod test {
    use std::sync::atomic::{AtomicI32, Ordering};

    use super::*;

    /// A timer that only records what the port does with it. "Firing" it is
    /// the test calling `Port::event` with the timer's descriptor index.
    #[derive(Debug)]
    pub struct TestTimer {
        fd: RawFd,
        pub armed: Option<Duration>,
        pub arm_count: usize,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("test timer failure")]
    pub struct TestTimerError;

    static NEXT_FD: AtomicI32 = AtomicI32::new(200);

    impl Timer for TestTimer {
        type Error = TestTimerError;

        fn create() -> Result<Self, Self::Error> {
            Ok(TestTimer {
                fd: NEXT_FD.fetch_add(1, Ordering::Relaxed),
                armed: None,
                arm_count: 0,
            })
        }

        fn fd(&self) -> RawFd {
            self.fd
        }

        fn arm(&mut self, timeout: Duration) -> Result<(), Self::Error> {
            self.armed = Some(timeout);
            self.arm_count += 1;
            Ok(())
        }

        fn disarm(&mut self) -> Result<(), Self::Error> {
            self.armed = None;
            Ok(())
        }
    }
}
