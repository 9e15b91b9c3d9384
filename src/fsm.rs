//! The protocol state machine of a port
//!
//! The transition functions in this module are pure: they map a (state,
//! event) pair to the next state and nothing else. All side effects of a
//! transition (timer policy, port initialization) live in
//! [`Port::dispatch`](crate::port::Port::dispatch), which consumes one of
//! these functions. This keeps the nine-state machine reusable across port
//! flavors: an ordinary clock uses [`ptp_fsm`], a slave-only clock uses
//! [`ptp_slave_fsm`].

/// The protocol state of a port, as defined in *IEEE1588-2019 section 9.2.5*
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortState {
    Initializing,
    Faulty,
    Disabled,
    Listening,
    PreMaster,
    Master,
    GrandMaster,
    Passive,
    Uncalibrated,
    Slave,
}

impl core::fmt::Display for PortState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            PortState::Initializing => "INITIALIZING",
            PortState::Faulty => "FAULTY",
            PortState::Disabled => "DISABLED",
            PortState::Listening => "LISTENING",
            PortState::PreMaster => "PRE_MASTER",
            PortState::Master => "MASTER",
            PortState::GrandMaster => "GRAND_MASTER",
            PortState::Passive => "PASSIVE",
            PortState::Uncalibrated => "UNCALIBRATED",
            PortState::Slave => "SLAVE",
        };
        f.write_str(name)
    }
}

/// An event driving the port state machine
///
/// Most of these are produced by [`Port::event`](crate::port::Port::event);
/// the `Rs*` recommended-state events and `MasterClockSelected` are delivered
/// by the clock aggregator after it has run the best master clock algorithm
/// in response to a `StateDecisionEvent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FsmEvent {
    None,
    Powerup,
    Initialize,
    DesignatedEnabled,
    DesignatedDisabled,
    FaultCleared,
    FaultDetected,
    StateDecisionEvent,
    QualificationTimeoutExpires,
    AnnounceReceiptTimeoutExpires,
    SynchronizationFault,
    MasterClockSelected,
    RsMaster,
    RsGrandMaster,
    RsSlave,
    RsPassive,
}

impl core::fmt::Display for FsmEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            FsmEvent::None => "NONE",
            FsmEvent::Powerup => "POWERUP",
            FsmEvent::Initialize => "INITIALIZE",
            FsmEvent::DesignatedEnabled => "DESIGNATED_ENABLED",
            FsmEvent::DesignatedDisabled => "DESIGNATED_DISABLED",
            FsmEvent::FaultCleared => "FAULT_CLEARED",
            FsmEvent::FaultDetected => "FAULT_DETECTED",
            FsmEvent::StateDecisionEvent => "STATE_DECISION_EVENT",
            FsmEvent::QualificationTimeoutExpires => "QUALIFICATION_TIMEOUT_EXPIRES",
            FsmEvent::AnnounceReceiptTimeoutExpires => "ANNOUNCE_RECEIPT_TIMEOUT_EXPIRES",
            FsmEvent::SynchronizationFault => "SYNCHRONIZATION_FAULT",
            FsmEvent::MasterClockSelected => "MASTER_CLOCK_SELECTED",
            FsmEvent::RsMaster => "RS_MASTER",
            FsmEvent::RsGrandMaster => "RS_GRAND_MASTER",
            FsmEvent::RsSlave => "RS_SLAVE",
            FsmEvent::RsPassive => "RS_PASSIVE",
        };
        f.write_str(name)
    }
}

/// A pure transition function consumed by the port driver
pub type StateMachine = fn(PortState, FsmEvent) -> PortState;

/// The state machine for an ordinary clock that may become master
///
/// Unhandled (state, event) pairs leave the state unchanged. Note that
/// `StateDecisionEvent` is never consumed here: the clock aggregator turns it
/// into one of the `Rs*` events.
pub fn ptp_fsm(state: PortState, event: FsmEvent) -> PortState {
    use FsmEvent as Ev;
    use PortState as Ps;

    if let Ev::Initialize | Ev::Powerup = event {
        return Ps::Initializing;
    }

    match state {
        Ps::Initializing => match event {
            Ev::FaultDetected => Ps::Faulty,
            _ => state,
        },
        Ps::Faulty => match event {
            Ev::DesignatedDisabled => Ps::Disabled,
            Ev::FaultCleared => Ps::Initializing,
            _ => state,
        },
        Ps::Disabled => match event {
            Ev::DesignatedEnabled => Ps::Initializing,
            _ => state,
        },
        Ps::Listening => match event {
            Ev::DesignatedDisabled => Ps::Disabled,
            Ev::FaultDetected => Ps::Faulty,
            Ev::AnnounceReceiptTimeoutExpires => Ps::Master,
            Ev::RsMaster => Ps::PreMaster,
            Ev::RsGrandMaster => Ps::GrandMaster,
            Ev::RsSlave => Ps::Uncalibrated,
            Ev::RsPassive => Ps::Passive,
            _ => state,
        },
        Ps::PreMaster => match event {
            Ev::DesignatedDisabled => Ps::Disabled,
            Ev::FaultDetected => Ps::Faulty,
            Ev::QualificationTimeoutExpires => Ps::Master,
            Ev::RsSlave => Ps::Uncalibrated,
            Ev::RsPassive => Ps::Passive,
            _ => state,
        },
        Ps::Master | Ps::GrandMaster => match event {
            Ev::DesignatedDisabled => Ps::Disabled,
            Ev::FaultDetected => Ps::Faulty,
            Ev::RsSlave => Ps::Uncalibrated,
            Ev::RsPassive => Ps::Passive,
            _ => state,
        },
        Ps::Passive => match event {
            Ev::DesignatedDisabled => Ps::Disabled,
            Ev::FaultDetected => Ps::Faulty,
            Ev::AnnounceReceiptTimeoutExpires => Ps::Master,
            Ev::RsMaster => Ps::PreMaster,
            Ev::RsGrandMaster => Ps::GrandMaster,
            Ev::RsSlave => Ps::Uncalibrated,
            _ => state,
        },
        Ps::Uncalibrated => match event {
            Ev::DesignatedDisabled => Ps::Disabled,
            Ev::FaultDetected => Ps::Faulty,
            Ev::AnnounceReceiptTimeoutExpires => Ps::Master,
            Ev::MasterClockSelected => Ps::Slave,
            Ev::RsMaster => Ps::PreMaster,
            Ev::RsGrandMaster => Ps::GrandMaster,
            Ev::RsPassive => Ps::Passive,
            _ => state,
        },
        Ps::Slave => match event {
            Ev::DesignatedDisabled => Ps::Disabled,
            Ev::FaultDetected => Ps::Faulty,
            Ev::AnnounceReceiptTimeoutExpires => Ps::Master,
            Ev::SynchronizationFault => Ps::Uncalibrated,
            Ev::RsMaster => Ps::PreMaster,
            Ev::RsGrandMaster => Ps::GrandMaster,
            // A different master was selected for this port
            Ev::RsSlave => Ps::Uncalibrated,
            Ev::RsPassive => Ps::Passive,
            _ => state,
        },
    }
}

/// The state machine for a slave-only clock
///
/// A slave-only port never enters one of the master states. Where the
/// ordinary machine falls back to MASTER it returns to LISTENING, and a
/// recommendation to be master parks the port in PASSIVE.
pub fn ptp_slave_fsm(state: PortState, event: FsmEvent) -> PortState {
    use FsmEvent as Ev;
    use PortState as Ps;

    if let Ev::Initialize | Ev::Powerup = event {
        return Ps::Initializing;
    }

    match state {
        Ps::Initializing => match event {
            Ev::FaultDetected => Ps::Faulty,
            _ => state,
        },
        Ps::Faulty => match event {
            Ev::DesignatedDisabled => Ps::Disabled,
            Ev::FaultCleared => Ps::Initializing,
            _ => state,
        },
        Ps::Disabled => match event {
            Ev::DesignatedEnabled => Ps::Initializing,
            _ => state,
        },
        Ps::Listening => match event {
            Ev::DesignatedDisabled => Ps::Disabled,
            Ev::FaultDetected => Ps::Faulty,
            Ev::RsSlave => Ps::Uncalibrated,
            Ev::RsMaster | Ev::RsGrandMaster | Ev::RsPassive => Ps::Passive,
            _ => state,
        },
        Ps::Passive => match event {
            Ev::DesignatedDisabled => Ps::Disabled,
            Ev::FaultDetected => Ps::Faulty,
            Ev::AnnounceReceiptTimeoutExpires => Ps::Listening,
            Ev::RsSlave => Ps::Uncalibrated,
            _ => state,
        },
        Ps::Uncalibrated => match event {
            Ev::DesignatedDisabled => Ps::Disabled,
            Ev::FaultDetected => Ps::Faulty,
            Ev::AnnounceReceiptTimeoutExpires => Ps::Listening,
            Ev::MasterClockSelected => Ps::Slave,
            Ev::RsMaster | Ev::RsGrandMaster | Ev::RsPassive => Ps::Passive,
            _ => state,
        },
        Ps::Slave => match event {
            Ev::DesignatedDisabled => Ps::Disabled,
            Ev::FaultDetected => Ps::Faulty,
            Ev::AnnounceReceiptTimeoutExpires => Ps::Listening,
            Ev::SynchronizationFault => Ps::Uncalibrated,
            Ev::RsSlave => Ps::Uncalibrated,
            Ev::RsMaster | Ev::RsGrandMaster | Ev::RsPassive => Ps::Passive,
            _ => state,
        },
        // Master states are unreachable on a slave-only port
        Ps::PreMaster | Ps::Master | Ps::GrandMaster => match event {
            Ev::DesignatedDisabled => Ps::Disabled,
            Ev::FaultDetected => Ps::Faulty,
            _ => state,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_always_wins() {
        for state in [
            PortState::Faulty,
            PortState::Disabled,
            PortState::Listening,
            PortState::Master,
            PortState::Slave,
        ] {
            assert_eq!(ptp_fsm(state, FsmEvent::Initialize), PortState::Initializing);
            assert_eq!(ptp_fsm(state, FsmEvent::Powerup), PortState::Initializing);
            assert_eq!(
                ptp_slave_fsm(state, FsmEvent::Initialize),
                PortState::Initializing
            );
        }
    }

    #[test]
    fn ordinary_clock_becomes_master_without_announcements() {
        assert_eq!(
            ptp_fsm(PortState::Listening, FsmEvent::AnnounceReceiptTimeoutExpires),
            PortState::Master
        );
        assert_eq!(
            ptp_fsm(PortState::Slave, FsmEvent::AnnounceReceiptTimeoutExpires),
            PortState::Master
        );
    }

    #[test]
    fn slave_only_clock_returns_to_listening() {
        assert_eq!(
            ptp_slave_fsm(PortState::Slave, FsmEvent::AnnounceReceiptTimeoutExpires),
            PortState::Listening
        );
        assert_eq!(
            ptp_slave_fsm(PortState::Listening, FsmEvent::AnnounceReceiptTimeoutExpires),
            PortState::Listening
        );
        assert_eq!(
            ptp_slave_fsm(PortState::Listening, FsmEvent::RsMaster),
            PortState::Passive
        );
    }

    #[test]
    fn slave_path() {
        let mut state = PortState::Listening;
        state = ptp_fsm(state, FsmEvent::RsSlave);
        assert_eq!(state, PortState::Uncalibrated);
        state = ptp_fsm(state, FsmEvent::MasterClockSelected);
        assert_eq!(state, PortState::Slave);
        state = ptp_fsm(state, FsmEvent::SynchronizationFault);
        assert_eq!(state, PortState::Uncalibrated);
    }

    #[test]
    fn fault_and_recovery() {
        let state = ptp_fsm(PortState::Slave, FsmEvent::FaultDetected);
        assert_eq!(state, PortState::Faulty);
        assert_eq!(
            ptp_fsm(state, FsmEvent::FaultCleared),
            PortState::Initializing
        );
        assert_eq!(
            ptp_fsm(PortState::Faulty, FsmEvent::DesignatedDisabled),
            PortState::Disabled
        );
        assert_eq!(
            ptp_fsm(PortState::Disabled, FsmEvent::DesignatedEnabled),
            PortState::Initializing
        );
    }

    #[test]
    fn state_decision_event_is_not_consumed() {
        for state in [PortState::Listening, PortState::Master, PortState::Slave] {
            assert_eq!(ptp_fsm(state, FsmEvent::StateDecisionEvent), state);
            assert_eq!(ptp_slave_fsm(state, FsmEvent::StateDecisionEvent), state);
        }
    }
}
