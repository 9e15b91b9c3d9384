//! Time as the protocol sees it
//!
//! PTP carries absolute time ([`Time`]) and spans of it ([`Duration`]) as
//! nanosecond counts with fractional bits, and paces its message streams in
//! log2 seconds ([`Interval`]). The [`std::time`] types fit none of those
//! shapes, so the engine brings its own.

mod duration;
mod instant;
mod interval;

pub use duration::Duration;
pub use instant::Time;
pub use interval::Interval;
