//! Configuration of a port
//!
//! The values here are the static part of the PortDS dataset. Dynamic fields
//! (the current state, the adopted delay request interval) are kept by
//! [`Port`](crate::port::Port) itself.

use crate::time::Interval;

/// How a port measures the propagation delay toward its master.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum DelayMechanism {
    /// The delay request/response exchange with the master itself. The
    /// carried pacing is the PortDS logMinDelayReqInterval.
    E2E { interval: Interval },
    // The peer delay mechanism is out of scope for this crate
}

/// Configuration items of the PTP PortDS dataset
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PortConfig {
    pub delay_mechanism: DelayMechanism,
    /// The pacing of our own announce messages, and the unit of the announce
    /// receipt timeout. Corresponds with PortDS logAnnounceInterval.
    pub announce_interval: Interval,
    /// How many announce intervals without an announce from the current
    /// master pass before the port gives up on it.
    pub announce_receipt_timeout: u8,
    /// Corresponds with PortDS logSyncInterval.
    pub sync_interval: Interval,
    /// Corresponds with PortDS logMinPdelayReqInterval. Carried for profiles
    /// that use the peer delay mechanism; unused by an E2E port.
    pub min_pdelay_req_interval: Interval,
    // Version is always 2, so not stored (versionNumber, minorVersionNumber)
}

impl PortConfig {
    /// The configured floor for the delay request pacing
    pub fn min_delay_req_interval(&self) -> Interval {
        let DelayMechanism::E2E { interval } = self.delay_mechanism;
        interval
    }
}

/// The default initialization values of *IEEE1588-2019 appendix A.9.4.2*
impl Default for PortConfig {
    fn default() -> Self {
        Self {
            delay_mechanism: DelayMechanism::E2E {
                interval: Interval::from_log_seconds(0),
            },
            announce_interval: Interval::from_log_seconds(1),
            announce_receipt_timeout: 3,
            sync_interval: Interval::from_log_seconds(0),
            min_pdelay_req_interval: Interval::from_log_seconds(2),
        }
    }
}
