//! Tracking and qualification of the foreign masters seen by one port

use std::time::Instant;

use arrayvec::ArrayVec;

use super::ComparisonDataset;
use crate::{
    clock::Clock,
    datastructures::{common::PortIdentity, messages::AnnounceMessage},
    time::Interval,
};

/// An announce message only counts while it is younger than this many of
/// its sender's announce intervals.
const FOREIGN_MASTER_TIME_WINDOW: u32 = 4;

/// A candidate qualifies once this many of its announce messages sit inside
/// the window.
pub(crate) const FOREIGN_MASTER_THRESHOLD: usize = 2;

/// Cap on the announce history kept per candidate
const MAX_ANNOUNCE_MESSAGES: usize = 8;

/// Cap on the number of candidates tracked at once
const MAX_FOREIGN_MASTERS: usize = 8;

/// An announce message together with the monotonic host time of its arrival
#[derive(Debug, Clone, Copy)]
pub(crate) struct TimestampedAnnounce {
    pub(crate) message: AnnounceMessage,
    pub(crate) arrived: Instant,
}

impl TimestampedAnnounce {
    /// A message is current while it is younger than
    /// [`FOREIGN_MASTER_TIME_WINDOW`] of its sender's announce intervals.
    ///
    /// All of the window math saturates, so a hostile logMessageInterval
    /// cannot make it overflow.
    fn is_current(&self, now: Instant) -> bool {
        let interval = Interval::from_log_seconds(self.message.header.log_message_interval);
        let window = interval.period().saturating_mul(FOREIGN_MASTER_TIME_WINDOW);

        now.saturating_duration_since(self.arrived) < window
    }
}

/// Did an announce message advertise something else than its predecessor?
///
/// Compares the fields that feed the comparison dataset, which is what
/// decides whether the best master clock algorithm needs to be re-run.
fn announce_differs(a: &AnnounceMessage, b: &AnnounceMessage) -> bool {
    a.grandmaster_priority_1 != b.grandmaster_priority_1
        || a.grandmaster_clock_quality != b.grandmaster_clock_quality
        || a.grandmaster_priority_2 != b.grandmaster_priority_2
        || a.grandmaster_identity != b.grandmaster_identity
        || a.steps_removed != b.steps_removed
}

/// One remote master candidate
#[derive(Debug)]
pub struct ForeignMaster {
    sender: PortIdentity,
    /// Recent announce messages, newest first
    messages: ArrayVec<TimestampedAnnounce, MAX_ANNOUNCE_MESSAGES>,
    /// Filled in from the newest message when the candidate is considered
    /// for selection
    dataset: Option<ComparisonDataset>,
}

impl ForeignMaster {
    fn new(sender: PortIdentity) -> Self {
        Self {
            sender,
            messages: ArrayVec::new(),
            dataset: None,
        }
    }

    /// The identity of the remote port this candidate was heard from
    pub fn sender(&self) -> PortIdentity {
        self.sender
    }

    /// The dataset materialized at the last selection this candidate
    /// qualified for
    pub fn dataset(&self) -> Option<&ComparisonDataset> {
        self.dataset.as_ref()
    }

    pub(crate) fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Drop the entire announce history, disqualifying the candidate until
    /// it reaches the threshold again.
    pub(crate) fn clear(&mut self) {
        self.messages.clear();
    }

    /// First drop the excess beyond the qualification threshold, then every
    /// message that has aged out of the qualification window. The newest
    /// messages survive.
    pub(crate) fn prune(&mut self, now: Instant) {
        while self.messages.len() > FOREIGN_MASTER_THRESHOLD {
            self.messages.pop();
        }

        while let Some(oldest) = self.messages.last() {
            if oldest.is_current(now) {
                break;
            }
            self.messages.pop();
        }
    }

    /// Prepend a message. The caller prunes before or after as appropriate.
    fn add(&mut self, message: TimestampedAnnounce) {
        if self.messages.is_full() {
            self.messages.pop();
        }
        self.messages.insert(0, message);
    }

    fn newest(&self) -> Option<&TimestampedAnnounce> {
        self.messages.first()
    }
}

/// All foreign master candidates of one port
#[derive(Debug, Default)]
pub(crate) struct ForeignMasterList {
    records: ArrayVec<ForeignMaster, MAX_FOREIGN_MASTERS>,
}

impl ForeignMasterList {
    pub(crate) fn get(&self, sender: PortIdentity) -> Option<&ForeignMaster> {
        self.records.iter().find(|fm| fm.sender == sender)
    }

    pub(crate) fn get_mut(&mut self, sender: PortIdentity) -> Option<&mut ForeignMaster> {
        self.records.iter_mut().find(|fm| fm.sender == sender)
    }

    /// Admit a received announce message.
    ///
    /// Returns true when the message should trigger a state decision: either
    /// it is the one that first qualifies its sender, or it advertises
    /// something else than the sender's previous announce.
    pub(crate) fn add_foreign_master(
        &mut self,
        message: AnnounceMessage,
        arrived: Instant,
        now: Instant,
    ) -> bool {
        let sender = message.header.source_port_identity;

        let Some(index) = self.records.iter().position(|fm| fm.sender == sender) else {
            // The first announce from a new source does not count toward
            // qualification, see 9.5.3(b)
            log::info!("new foreign master {}", sender);

            if self.records.is_full() {
                log::warn!("too many foreign masters, dropping announce from {}", sender);
                return false;
            }

            let mut record = ForeignMaster::new(sender);
            record.add(TimestampedAnnounce { message, arrived });
            self.records.insert(0, record);
            return false;
        };

        let record = &mut self.records[index];
        record.prune(now);

        // True when this is the message that first qualifies the record
        let broke_threshold = record.message_count() == FOREIGN_MASTER_THRESHOLD - 1;

        record.add(TimestampedAnnounce { message, arrived });

        let diff = match record.messages.get(1) {
            Some(previous) => announce_differs(&message, &previous.message),
            None => false,
        };

        broke_threshold || diff
    }

    /// The fast path for an announce from the already selected master:
    /// freshen its record and report whether the advertisement changed.
    pub(crate) fn update_current_master(
        &mut self,
        best: PortIdentity,
        message: AnnounceMessage,
        arrived: Instant,
        now: Instant,
    ) -> bool {
        let Some(index) = self.records.iter().position(|fm| fm.sender == best) else {
            return self.add_foreign_master(message, arrived, now);
        };

        let record = &mut self.records[index];
        record.prune(now);
        record.add(TimestampedAnnounce { message, arrived });

        match record.messages.get(1) {
            Some(previous) => announce_differs(&message, &previous.message),
            None => false,
        }
    }

    /// Select the best qualified candidate of this port, pruning along the
    /// way. The loser of every comparison has its message history cleared:
    /// it will re-qualify if it keeps sending, but a candidate that dries up
    /// does not linger as qualified.
    pub(crate) fn compute_best<C: Clock>(
        &mut self,
        clock: &C,
        now: Instant,
    ) -> Option<PortIdentity> {
        let mut best: Option<(usize, ComparisonDataset)> = None;

        for i in 0..self.records.len() {
            let parent_identity = clock.parent_identity();
            let record = &mut self.records[i];

            record.prune(now);

            if record.message_count() < FOREIGN_MASTER_THRESHOLD {
                continue;
            }

            let Some(newest) = record.newest() else {
                continue;
            };

            let candidate = ComparisonDataset::from_announce_message(&newest.message, parent_identity);
            record.dataset = Some(candidate);

            match best {
                None => best = Some((i, candidate)),
                Some((current, current_dataset)) => {
                    if clock.dataset_comparison(&candidate, &current_dataset)
                        == core::cmp::Ordering::Greater
                    {
                        self.records[current].clear();
                        best = Some((i, candidate));
                    } else {
                        self.records[i].clear();
                    }
                }
            }
        }

        best.map(|(i, _)| self.records[i].sender)
    }
}
