//! Abstraction of a network [`Port`] of an ordinary clock
//!
//! A [`Port`] is the per-interface protocol engine: it qualifies and ranks
//! the foreign masters heard on its network segment, feeds the clock servo
//! with (t1, t2) and (t3, t4) timing samples while the port is a slave, and
//! answers delay request probes while it is a master.
//!
//! The port does not run by itself. An external multiplexer polls the
//! descriptors of [`FdArray`] and hands the index of a ready descriptor to
//! [`Port::event`]; the [`FsmEvent`] coming back out of that (and out of the
//! clock's best master decision) goes into [`Port::dispatch`], which applies
//! the configured transition function and the per-state timer policy. Within
//! one port, events are strictly processed in arrival order and a state
//! transition takes effect before the next event is read.

use std::time::Instant;

use crate::{
    bmc::{foreign_master::ForeignMasterList, ComparisonDataset, ForeignMaster},
    clock::Clock,
    config::PortConfig,
    datastructures::{
        common::{PortIdentity, TimeInterval},
        messages::{
            AnnounceMessage, DelayRespMessage, FollowUpMessage, Header, Message, MessageBody,
            SyncMessage, MAX_DATA_LEN, VERSION_PTP,
        },
        WireFormatError,
    },
    fsm::{FsmEvent, PortState, StateMachine},
    time::{Interval, Time},
    timer::Timer,
    transport::{
        FdArray, TimestampingMode, Transport, FD_ANNOUNCE_TIMER, FD_DELAY_TIMER,
    },
};

mod sequence_id;

use sequence_id::SequenceIdGenerator;

/// Failures of the engine that are worth reporting to the caller
///
/// Most protocol irregularities are not errors: an unknown sender, a stale
/// sequence id or a message in the wrong state is normal in a network with
/// many clocks and is silently ignored. What remains surfaces either as this
/// error or, at the [`Port::event`] boundary, as a
/// [`FsmEvent::FaultDetected`].
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("failed to open the transport")]
    TransportOpen,
    #[error("failed to create or arm a timer")]
    Timer,
    #[error("send failed")]
    Send,
    #[error("message could not be encoded")]
    WireFormat(#[from] WireFormatError),
}

/// A two-step Sync waiting for its Follow_Up
#[derive(Debug, Clone, Copy)]
struct LastSync {
    header: Header,
    ingress: Time,
}

/// A Follow_Up waiting for its Sync
#[derive(Debug, Clone, Copy)]
struct LastFollowUp {
    header: Header,
    body: FollowUpMessage,
}

/// The delay request whose response we are waiting for
///
/// The sequence id inside the retained header is in host order, like
/// everything else on this side of the codec; the wire conversion happens
/// only at (de)serialization time.
#[derive(Debug, Clone, Copy)]
struct OutstandingDelayReq {
    header: Header,
    egress: Time,
}

/// A single port of a PTP ordinary clock
///
/// # Generics
/// A [`Port`] is generic over:
/// * **`C`**: The [`Clock`] aggregate shared by the ports of the instance
/// * **`T`**: The network [`Transport`] of this port
/// * **`F`**: The [`Timer`] flavor backing the two port timers
///
/// A port is created in the INITIALIZING state by [`Port::open`] and comes
/// alive with `port.dispatch(FsmEvent::Initialize)`, which opens the
/// transport, creates the timers and leaves the port LISTENING.
#[derive(Debug)]
pub struct Port<C, T, F> {
    name: String,
    clock: C,
    transport: T,
    timestamping: TimestampingMode,
    fda: FdArray,
    announce_timer: Option<F>,
    delay_timer: Option<F>,
    foreign_masters: ForeignMasterList,
    /// The selection of the last [`Port::compute_best`] run; key into
    /// `foreign_masters`
    best: Option<PortIdentity>,
    last_sync: Option<LastSync>,
    last_follow_up: Option<LastFollowUp>,
    delay_req: Option<OutstandingDelayReq>,
    seqnum: SequenceIdGenerator,
    port_identity: PortIdentity,
    state: PortState,
    config: PortConfig,
    /// The delay request pacing currently in effect. Starts out as the
    /// configured value; the master may override it via Delay_Resp.
    min_delay_req_interval: Interval,
    fsm: StateMachine,
    packet_buffer: [u8; MAX_DATA_LEN],
}

impl<C: Clock, T: Transport, F: Timer> Port<C, T, F> {
    /// Create a port on the named interface.
    ///
    /// The port starts out uninitialized in the INITIALIZING state; dispatch
    /// [`FsmEvent::Initialize`] to bring it up.
    pub fn open(
        name: &str,
        transport: T,
        timestamping: TimestampingMode,
        port_number: u16,
        config: PortConfig,
        clock: C,
        fsm: StateMachine,
    ) -> Self {
        let port_identity = PortIdentity {
            clock_identity: clock.identity(),
            port_number,
        };

        Port {
            name: name.to_owned(),
            clock,
            transport,
            timestamping,
            fda: FdArray::default(),
            announce_timer: None,
            delay_timer: None,
            foreign_masters: ForeignMasterList::default(),
            best: None,
            last_sync: None,
            last_follow_up: None,
            delay_req: None,
            seqnum: SequenceIdGenerator::new(),
            port_identity,
            state: PortState::Initializing,
            min_delay_req_interval: config.min_delay_req_interval(),
            config,
            fsm,
            packet_buffer: [0; MAX_DATA_LEN],
        }
    }

    /// Close the transport and release the timer descriptors.
    pub fn close(mut self) {
        if self.announce_timer.is_some() || self.delay_timer.is_some() {
            self.transport.close(&mut self.fda);
        }

        self.announce_timer = None;
        self.delay_timer = None;
    }

    /// The current protocol state of the port
    pub fn state(&self) -> PortState {
        self.state
    }

    /// The identity of this port
    pub fn identity(&self) -> PortIdentity {
        self.port_identity
    }

    fn number(&self) -> u16 {
        self.port_identity.port_number
    }

    /// Apply `event` to the state machine and act on the resulting
    /// transition.
    ///
    /// A transition into INITIALIZING is special: initialization runs
    /// immediately, so after this returns the port is either LISTENING or
    /// FAULTY, never INITIALIZING.
    pub fn dispatch(&mut self, event: FsmEvent) {
        let next = (self.fsm)(self.state, event);

        if next == PortState::Initializing {
            match self.initialize() {
                Ok(()) => self.change_state(PortState::Listening, event),
                Err(error) => {
                    log::error!("port {}: initialization failed: {}", self.number(), error);
                    self.change_state(PortState::Faulty, event);
                }
            }
            return;
        }

        if next == self.state {
            return;
        }

        match next {
            PortState::Initializing | PortState::Faulty | PortState::Disabled => {
                self.clear_announce_tmo();
                self.clear_delay_tmo();
            }
            PortState::Listening | PortState::Passive => {
                self.set_announce_tmo();
                self.clear_delay_tmo();
            }
            PortState::PreMaster | PortState::Master | PortState::GrandMaster => {
                self.clear_announce_tmo();
                self.clear_delay_tmo();
            }
            PortState::Uncalibrated | PortState::Slave => {
                self.set_announce_tmo();
                self.set_delay_tmo();
            }
        }

        self.change_state(next, event);
    }

    fn change_state(&mut self, next: PortState, event: FsmEvent) {
        if next != self.state {
            log::info!(
                "port {}: {} to {} on {}",
                self.number(),
                self.state,
                next,
                event
            );
        }

        self.state = next;
    }

    /// Handle one ready descriptor of this port.
    ///
    /// `fd_index` is the index into the port's [`FdArray`] that the external
    /// multiplexer found ready. The returned event drives
    /// [`Port::dispatch`]; a [`FsmEvent::StateDecisionEvent`] asks the clock
    /// aggregate to re-run the best master clock algorithm.
    pub fn event(&mut self, fd_index: usize) -> FsmEvent {
        match fd_index {
            FD_ANNOUNCE_TIMER => {
                // The current master has fallen silent beyond its
                // qualification window
                if let Some(best) = self.best {
                    if let Some(record) = self.foreign_masters.get_mut(best) {
                        record.clear();
                    }
                }

                self.set_announce_tmo();
                FsmEvent::AnnounceReceiptTimeoutExpires
            }

            FD_DELAY_TIMER => {
                self.set_delay_tmo();
                match self.delay_request() {
                    Ok(()) => FsmEvent::None,
                    Err(_) => FsmEvent::FaultDetected,
                }
            }

            _ => self.network_event(fd_index),
        }
    }

    fn network_event(&mut self, fd_index: usize) -> FsmEvent {
        let Some(&fd) = self.fda.fd.get(fd_index) else {
            log::error!("port {}: unknown descriptor index {}", self.number(), fd_index);
            return FsmEvent::None;
        };

        let (count, timestamp) = match self.transport.recv(fd, &mut self.packet_buffer) {
            Ok(result) => result,
            Err(error) => {
                log::error!("port {}: recv message failed: {}", self.number(), error);
                return FsmEvent::FaultDetected;
            }
        };

        let message = match Message::deserialize(&self.packet_buffer[..count]) {
            Ok(message) => message,
            Err(error) => {
                log::warn!("port {}: could not parse message: {}", self.number(), error);
                return FsmEvent::None;
            }
        };

        if message.header.version_ptp != VERSION_PTP {
            log::debug!(
                "port {}: ignoring ptp version {} message",
                self.number(),
                message.header.version_ptp
            );
            return FsmEvent::None;
        }

        // Only process messages from our own domain
        if message.header.domain_number != self.clock.domain_number() {
            return FsmEvent::None;
        }

        match message.body {
            MessageBody::Sync(body) => {
                self.process_sync(message.header, body, timestamp.ts);
                FsmEvent::None
            }
            MessageBody::FollowUp(body) => {
                self.process_follow_up(message.header, body);
                FsmEvent::None
            }
            MessageBody::DelayReq(_) => match self.process_delay_req(message.header, timestamp.ts)
            {
                Ok(()) => FsmEvent::None,
                Err(_) => FsmEvent::FaultDetected,
            },
            MessageBody::DelayResp(body) => {
                self.process_delay_resp(message.header, body);
                FsmEvent::None
            }
            MessageBody::Announce(body) => {
                if self.process_announce(body, timestamp.host) {
                    FsmEvent::StateDecisionEvent
                } else {
                    FsmEvent::None
                }
            }
            MessageBody::Other(_) => FsmEvent::None,
        }
    }

    /// Re-select the best foreign master candidate of this port.
    ///
    /// Any previous selection is invalidated; candidates that lose the
    /// comparison are disqualified until they reach the announce threshold
    /// again.
    pub fn compute_best(&mut self) -> Option<&ForeignMaster> {
        self.best = self.foreign_masters.compute_best(&self.clock, Instant::now());
        self.best.and_then(|sender| self.foreign_masters.get(sender))
    }

    /// The dataset of the best foreign master selected by the last
    /// [`Port::compute_best`] run, if any
    pub fn best_foreign(&self) -> Option<&ComparisonDataset> {
        self.best
            .and_then(|sender| self.foreign_masters.get(sender))
            .and_then(|record| record.dataset())
    }

    fn process_announce(&mut self, announce: AnnounceMessage, arrived: Instant) -> bool {
        match self.state {
            PortState::Initializing | PortState::Faulty | PortState::Disabled => false,

            PortState::Listening
            | PortState::PreMaster
            | PortState::Master
            | PortState::GrandMaster
            | PortState::Passive => {
                self.foreign_masters
                    .add_foreign_master(announce, arrived, arrived)
            }

            PortState::Uncalibrated | PortState::Slave => match self.best {
                Some(best) if announce.header.source_port_identity == best => {
                    // A fresh announce from the current master also resets
                    // the receipt timeout
                    self.set_announce_tmo();
                    self.foreign_masters
                        .update_current_master(best, announce, arrived, arrived)
                }
                _ => self
                    .foreign_masters
                    .add_foreign_master(announce, arrived, arrived),
            },
        }
    }

    fn process_sync(&mut self, header: Header, sync: SyncMessage, ingress: Time) {
        match self.state {
            PortState::Uncalibrated | PortState::Slave => (),
            _ => return,
        }

        if header.source_port_identity != self.clock.parent_identity() {
            return;
        }

        if !header.flag_field.two_step_flag {
            // One-step: the sync itself carries its origin time
            self.clock.synchronize(
                sync.origin_timestamp.into(),
                ingress,
                header.correction_field,
                TimeInterval::default(),
                TimeInterval::default(),
            );
            return;
        }

        match self.last_follow_up {
            Some(follow_up) if follow_up.header.sequence_id == header.sequence_id => {
                self.clock.synchronize(
                    follow_up.body.precise_origin_timestamp.into(),
                    ingress,
                    header.correction_field,
                    follow_up.header.correction_field,
                    TimeInterval::default(),
                );
            }
            _ => {
                self.last_sync = Some(LastSync { header, ingress });
            }
        }
    }

    fn process_follow_up(&mut self, header: Header, body: FollowUpMessage) {
        match self.state {
            PortState::Uncalibrated | PortState::Slave => (),
            _ => return,
        }

        if header.source_port_identity != self.clock.parent_identity() {
            return;
        }

        match self.last_sync {
            Some(sync) if sync.header.sequence_id == header.sequence_id => {
                // Guard against a follow up that pairs by sequence id but
                // comes from somewhere else than the sync did
                if sync.header.source_port_identity != header.source_port_identity {
                    return;
                }

                self.clock.synchronize(
                    body.precise_origin_timestamp.into(),
                    sync.ingress,
                    sync.header.correction_field,
                    header.correction_field,
                    TimeInterval::default(),
                );
            }
            _ => {
                self.last_follow_up = Some(LastFollowUp { header, body });
            }
        }
    }

    /// Answer a delay request probe. Only a master answers; in every other
    /// state the request is somebody else's business and not an error.
    fn process_delay_req(&mut self, header: Header, ingress: Time) -> Result<(), PortError> {
        match self.state {
            PortState::Master | PortState::GrandMaster => (),
            _ => return Ok(()),
        }

        let response = Message::delay_resp(
            header,
            ingress,
            self.port_identity,
            self.min_delay_req_interval,
        );

        let length = response.serialize(&mut self.packet_buffer)?;

        match self
            .transport
            .send(&self.fda, false, &self.packet_buffer[..length])
        {
            Ok(_) => Ok(()),
            Err(error) => {
                log::error!(
                    "port {}: failed to send delay response: {}",
                    self.number(),
                    error
                );
                Err(PortError::Send)
            }
        }
    }

    /// Send a delay request on the event channel and retain it until its
    /// response arrives or a newer request supersedes it.
    fn delay_request(&mut self) -> Result<(), PortError> {
        let message = Message::delay_req(
            self.clock.domain_number(),
            self.port_identity,
            self.seqnum.generate(),
        );

        let length = message.serialize(&mut self.packet_buffer)?;

        match self
            .transport
            .send(&self.fda, true, &self.packet_buffer[..length])
        {
            Ok(Some(egress)) => {
                self.delay_req = Some(OutstandingDelayReq {
                    header: message.header,
                    egress,
                });
                Ok(())
            }
            Ok(None) => {
                log::error!(
                    "port {}: transport reported no egress timestamp for delay request",
                    self.number()
                );
                Err(PortError::Send)
            }
            Err(error) => {
                log::error!(
                    "port {}: failed to send delay request: {}",
                    self.number(),
                    error
                );
                Err(PortError::Send)
            }
        }
    }

    fn process_delay_resp(&mut self, header: Header, body: DelayRespMessage) {
        let Some(request) = self.delay_req else {
            return;
        };

        match self.state {
            PortState::Uncalibrated | PortState::Slave => (),
            _ => return,
        }

        // The response must address our request; both ids are compared in
        // host order
        if body.requesting_port_identity != request.header.source_port_identity {
            return;
        }

        if header.sequence_id != request.header.sequence_id {
            return;
        }

        self.clock.path_delay(
            request.egress,
            body.receive_timestamp.into(),
            header.correction_field,
        );

        // The response consumes the outstanding request, so a duplicate
        // response is ignored
        self.delay_req = None;

        if header.log_message_interval != self.min_delay_req_interval.log_seconds() {
            // The master may instruct us to widen our request pacing; clamp
            // the advertised value to a sane range before adopting it
            let adopted = header.log_message_interval.clamp(-10, 10);
            log::info!(
                "port {}: minimum delay request interval {} -> {}",
                self.number(),
                self.min_delay_req_interval.log_seconds(),
                adopted
            );
            self.min_delay_req_interval = Interval::from_log_seconds(adopted);
        }
    }

    /// Bring the port up: create the timers, open the transport, install the
    /// descriptors at their fixed slots, start the announce timeout and
    /// register the descriptor set with the clock.
    ///
    /// On failure everything acquired so far is released again; a later
    /// initialization starts from scratch. Re-initialization also discards a
    /// delay request interval adopted from a master.
    fn initialize(&mut self) -> Result<(), PortError> {
        if self.announce_timer.is_some() || self.delay_timer.is_some() {
            self.transport.close(&mut self.fda);
            self.announce_timer = None;
            self.delay_timer = None;
        }

        self.min_delay_req_interval = self.config.min_delay_req_interval();
        self.best = None;
        self.last_sync = None;
        self.last_follow_up = None;
        self.delay_req = None;

        let announce_timer = F::create().map_err(|error| {
            log::error!("port {}: failed to create timer: {}", self.number(), error);
            PortError::Timer
        })?;

        let delay_timer = F::create().map_err(|error| {
            log::error!("port {}: failed to create timer: {}", self.number(), error);
            PortError::Timer
        })?;

        let mut fda = FdArray::default();
        self.transport
            .open(&self.name, self.timestamping, &mut fda)
            .map_err(|error| {
                log::error!(
                    "port {}: failed to open transport on {}: {}",
                    self.number(),
                    self.name,
                    error
                );
                PortError::TransportOpen
            })?;

        fda.fd[FD_ANNOUNCE_TIMER] = announce_timer.fd();
        fda.fd[FD_DELAY_TIMER] = delay_timer.fd();

        self.fda = fda;
        self.announce_timer = Some(announce_timer);
        self.delay_timer = Some(delay_timer);

        if !self.set_announce_tmo() {
            self.transport.close(&mut self.fda);
            self.announce_timer = None;
            self.delay_timer = None;
            return Err(PortError::Timer);
        }

        self.clock.install_fda(self.port_identity, &self.fda);

        Ok(())
    }

    /// Arm the announce receipt timeout. Returns false if arming failed.
    fn set_announce_tmo(&mut self) -> bool {
        let timeout = self
            .config
            .announce_interval
            .period()
            .saturating_mul(self.config.announce_receipt_timeout as u32);

        let Some(timer) = &mut self.announce_timer else {
            return true;
        };

        match timer.arm(timeout) {
            Ok(()) => true,
            Err(error) => {
                log::error!(
                    "port {}: failed to arm announce timer: {}",
                    self.port_identity.port_number,
                    error
                );
                false
            }
        }
    }

    fn clear_announce_tmo(&mut self) {
        if let Some(timer) = &mut self.announce_timer {
            if let Err(error) = timer.disarm() {
                log::error!(
                    "port {}: failed to clear announce timer: {}",
                    self.port_identity.port_number,
                    error
                );
            }
        }
    }

    /// Arm the delay request timer to twice the current minimum request
    /// interval.
    fn set_delay_tmo(&mut self) {
        let timeout =
            Interval::from_log_seconds(self.min_delay_req_interval.log_seconds().saturating_add(1))
                .period();

        if let Some(timer) = &mut self.delay_timer {
            if let Err(error) = timer.arm(timeout) {
                log::error!(
                    "port {}: failed to arm delay timer: {}",
                    self.port_identity.port_number,
                    error
                );
            }
        }
    }

    fn clear_delay_tmo(&mut self) {
        if let Some(timer) = &mut self.delay_timer {
            if let Err(error) = timer.disarm() {
                log::error!(
                    "port {}: failed to clear delay timer: {}",
                    self.port_identity.port_number,
                    error
                );
            }
        }
    }
}
