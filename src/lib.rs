//! `oclock` is the per-port protocol engine of an IEEE 1588-2008 (PTP
//! version 2) ordinary clock.
//!
//! For a single network interface it listens for the time-distribution
//! traffic of its PTP domain, qualifies and ranks the foreign masters it
//! hears ([`bmc`]), feeds the clock servo with Sync/Follow_Up and
//! Delay_Req/Delay_Resp timing samples while the port follows a master, and
//! answers delay request probes while it is one ([`port`]).
//!
//! Everything around that stays outside the crate, behind small traits: the
//! clock aggregate owning the servo and the cross-port best master decision
//! ([`Clock`]), the network transport with its hardware timestamps
//! ([`transport::Transport`]), the one-shot timers ([`timer::Timer`]) and
//! the descriptor multiplexer, which polls a port's [`transport::FdArray`]
//! and hands ready descriptor indices to [`Port::event`].
//!
//! The engine is synchronous and single threaded: one thread services all
//! ports of an instance, processing one ready descriptor at a time and
//! feeding the resulting [`fsm::FsmEvent`] back into [`Port::dispatch`].

pub mod bmc;
pub mod clock;
pub mod config;
pub mod datastructures;
pub mod fsm;
pub mod port;
pub mod time;
pub mod timer;
pub mod transport;

pub use clock::Clock;
pub use config::{DelayMechanism, PortConfig};
pub use fsm::{ptp_fsm, ptp_slave_fsm, FsmEvent, PortState};
pub use port::Port;
