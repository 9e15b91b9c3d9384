//! Field types shared by several message bodies and datasets

mod clock_accuracy;
mod clock_identity;
mod clock_quality;
mod port_identity;
mod time_interval;
mod time_source;
mod timestamp;

pub use clock_accuracy::*;
pub use clock_identity::*;
pub use clock_quality::*;
pub use port_identity::*;
pub use time_interval::*;
pub use time_source::*;
pub use timestamp::*;
