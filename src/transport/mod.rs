//! Definitions of the abstract network transport of a port
//!
//! A transport provides two channels into the same PTP network: the *event*
//! channel whose messages are hardware timestamped on egress and ingress
//! (UDP port 319 for the IP transports), and the *general* channel which is
//! not (UDP port 320). The concrete implementations live outside this crate;
//! the `test` module has an in-memory one for the engine tests.

use std::time::Instant;

use crate::time::Time;


/// An OS-level pollable descriptor, as registered with the multiplexer
pub type RawFd = i32;

/// Index of the event (time critical) socket in a port's [`FdArray`]
pub const FD_EVENT: usize = 0;
/// Index of the general socket in a port's [`FdArray`]
pub const FD_GENERAL: usize = 1;
/// Index of the announce receipt timer in a port's [`FdArray`]
pub const FD_ANNOUNCE_TIMER: usize = 2;
/// Index of the delay request timer in a port's [`FdArray`]
pub const FD_DELAY_TIMER: usize = 3;
/// The number of descriptors belonging to one port
pub const N_POLLFD: usize = 4;

/// The descriptors associated with one port, at fixed indices
///
/// The external multiplexer polls all of these and reports the index of a
/// ready descriptor to [`Port::event`](crate::port::Port::event).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FdArray {
    pub fd: [RawFd; N_POLLFD],
}

impl Default for FdArray {
    fn default() -> Self {
        Self {
            fd: [-1; N_POLLFD],
        }
    }
}

/// How the transport should timestamp event messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimestampingMode {
    /// Timestamps are taken by the network hardware
    Hardware,
    /// Timestamps are taken by the kernel when it hands off the packet
    Software,
}

/// An ingress timestamp: the packet timestamp itself plus the monotonic host
/// time at which it was captured
///
/// The host time is what message aging (the foreign master qualification
/// window) is measured against; the packet time feeds the servo.
#[derive(Debug, Clone, Copy)]
pub struct RxTimestamp {
    pub ts: Time,
    pub host: Instant,
}

/// Abstraction over the sockets of one port
pub trait Transport {
    type Error: std::error::Error;

    /// Open the transport on the named interface and fill in the socket
    /// descriptors at [`FD_EVENT`] and [`FD_GENERAL`].
    fn open(
        &mut self,
        interface: &str,
        timestamping: TimestampingMode,
        fda: &mut FdArray,
    ) -> Result<(), Self::Error>;

    /// Close the sockets and reset their descriptor slots.
    fn close(&mut self, fda: &mut FdArray);

    /// Send a message. `event` selects the event channel and makes the
    /// transport report the egress timestamp of the message.
    fn send(
        &mut self,
        fda: &FdArray,
        event: bool,
        data: &[u8],
    ) -> Result<Option<Time>, Self::Error>;

    /// Receive a message from the given descriptor.
    fn recv(&mut self, fd: RawFd, buffer: &mut [u8]) -> Result<(usize, RxTimestamp), Self::Error>;
}
