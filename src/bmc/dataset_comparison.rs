//! Ranking of candidate datasets, *IEEE1588-2019 section 9.3.4*

use core::cmp::Ordering;

use crate::datastructures::{
    common::{ClockIdentity, ClockQuality, PortIdentity},
    messages::AnnounceMessage,
};

/// The data distilled from an announce message that candidate masters are
/// ranked by.
///
/// The port materializes one of these for every qualified foreign master
/// when it selects its best candidate, and feeds pairs of them to
/// [`Clock::dataset_comparison`](crate::clock::Clock::dataset_comparison).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ComparisonDataset {
    pub priority_1: u8,
    pub grandmaster_identity: ClockIdentity,
    pub quality: ClockQuality,
    pub priority_2: u8,
    pub steps_removed: u16,
    /// The port that sent the announce message
    pub sender: PortIdentity,
    /// The parent identity of the clock of the port that received it
    pub receiver: PortIdentity,
}

impl ComparisonDataset {
    /// Distill a received announce message, on behalf of the clock whose
    /// current parent identity is `receiver`.
    pub(crate) fn from_announce_message(
        message: &AnnounceMessage,
        receiver: PortIdentity,
    ) -> Self {
        Self {
            priority_1: message.grandmaster_priority_1,
            grandmaster_identity: message.grandmaster_identity,
            quality: message.grandmaster_clock_quality,
            priority_2: message.grandmaster_priority_2,
            steps_removed: message.steps_removed,
            sender: message.header.source_port_identity,
            receiver,
        }
    }

    /// Rank `self` against `other`; [`Ordering::Greater`] means `self` is
    /// the better candidate.
    ///
    /// Candidates advertising different grandmasters are ranked on the
    /// advertised priorities and clock quality. Candidates advertising the
    /// same grandmaster describe different network paths to it, and are
    /// ranked on path length instead. [`Ordering::Equal`] comes out of the
    /// pathological cases of the standard (two announces that describe the
    /// same thing); either choice is then acceptable.
    pub fn compare(&self, other: &Self) -> Ordering {
        if self.grandmaster_identity == other.grandmaster_identity {
            self.compare_paths(other)
        } else {
            self.compare_grandmasters(other)
        }
    }

    /// On the wire every one of these fields encodes "better" as a smaller
    /// number, so the whole rank inverts one lexicographic key comparison.
    fn rank_key(&self) -> (u8, u8, u8, u16, u8, ClockIdentity) {
        (
            self.priority_1,
            self.quality.clock_class,
            self.quality.clock_accuracy.to_primitive(),
            self.quality.offset_scaled_log_variance,
            self.priority_2,
            self.grandmaster_identity,
        )
    }

    fn compare_grandmasters(&self, other: &Self) -> Ordering {
        other.rank_key().cmp(&self.rank_key())
    }

    /// Both candidates lead to the same grandmaster, pick the shorter path.
    fn compare_paths(&self, other: &Self) -> Ordering {
        let distance = self.steps_removed as i32 - other.steps_removed as i32;

        if distance.abs() > 1 {
            // Clearly different path lengths, fewer steps win
            return other.steps_removed.cmp(&self.steps_removed);
        }

        match distance {
            1 => {
                // We sit one hop further away than the other path. When the
                // announce was relayed back to us by our own clock the two
                // describe the same route and neither is preferable.
                if self.sender.clock_identity == self.receiver.clock_identity {
                    Ordering::Equal
                } else {
                    Ordering::Less
                }
            }
            -1 => {
                if other.sender.clock_identity == other.receiver.clock_identity {
                    Ordering::Equal
                } else {
                    Ordering::Greater
                }
            }
            _ => {
                // Same distance, break the tie on the identities along the
                // path, lower values first
                let near = (self.sender.clock_identity, self.receiver.port_number);
                let far = (other.sender.clock_identity, other.receiver.port_number);
                far.cmp(&near)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastructures::common::ClockAccuracy;

    fn candidate(grandmaster: u8) -> ComparisonDataset {
        ComparisonDataset {
            priority_1: 128,
            grandmaster_identity: ClockIdentity([grandmaster; 8]),
            quality: ClockQuality::default(),
            priority_2: 128,
            steps_removed: 0,
            sender: PortIdentity::default(),
            receiver: PortIdentity::default(),
        }
    }

    #[track_caller]
    fn assert_wins(winner: &ComparisonDataset, loser: &ComparisonDataset) {
        assert_eq!(winner.compare(loser), Ordering::Greater);
        assert_eq!(loser.compare(winner), Ordering::Less);
    }

    #[test]
    fn priority_1_outranks_quality() {
        let mut a = candidate(1);
        let mut b = candidate(2);

        a.priority_1 = 10;
        b.priority_1 = 20;
        // Even a grandmaster with a far better clock loses on priority_1
        b.quality.clock_class = 6;
        b.quality.clock_accuracy = ClockAccuracy::NS25;

        assert_wins(&a, &b);
    }

    #[test]
    fn quality_fields_rank_in_order() {
        let mut a = candidate(1);
        let mut b = candidate(2);

        a.quality.clock_class = 6;
        a.quality.clock_accuracy = ClockAccuracy::MS1;
        b.quality.clock_class = 7;
        b.quality.clock_accuracy = ClockAccuracy::NS25;
        assert_wins(&a, &b);

        b.quality.clock_class = 6;
        assert_wins(&b, &a);

        b.quality.clock_accuracy = ClockAccuracy::MS1;
        a.quality.offset_scaled_log_variance = 0x100;
        b.quality.offset_scaled_log_variance = 0x200;
        assert_wins(&a, &b);

        b.quality.offset_scaled_log_variance = 0x100;
        a.priority_2 = 5;
        b.priority_2 = 4;
        assert_wins(&b, &a);
    }

    #[test]
    fn grandmaster_identity_breaks_full_ties() {
        let a = candidate(1);
        let b = candidate(2);

        assert_wins(&a, &b);
    }

    #[test]
    fn fewer_steps_removed_wins() {
        let mut a = candidate(1);
        let mut b = candidate(1);

        a.steps_removed = 2;
        b.steps_removed = 5;

        assert_wins(&a, &b);
    }

    #[test]
    fn one_step_apart_prefers_the_shorter_path() {
        let near = candidate(1);
        let mut far = candidate(1);

        far.steps_removed = 1;
        far.sender.clock_identity = ClockIdentity([9; 8]);
        far.receiver.clock_identity = ClockIdentity([7; 8]);

        assert_wins(&near, &far);
    }

    #[test]
    fn announce_looped_back_through_own_clock_is_no_better() {
        let mut a = candidate(1);
        let mut b = candidate(1);

        b.steps_removed = 1;
        b.sender.clock_identity = ClockIdentity([9; 8]);
        b.receiver.clock_identity = ClockIdentity([9; 8]);

        assert_eq!(a.compare(&b), Ordering::Equal);
        assert_eq!(b.compare(&a), Ordering::Equal);

        a.steps_removed = 1;
        b.steps_removed = 0;
        a.sender = b.sender;
        a.receiver = b.receiver;

        assert_eq!(a.compare(&b), Ordering::Equal);
    }

    #[test]
    fn equal_distance_falls_back_to_path_identities() {
        let mut a = candidate(1);
        let mut b = candidate(1);

        a.sender.clock_identity = ClockIdentity([3; 8]);
        b.sender.clock_identity = ClockIdentity([4; 8]);
        assert_wins(&a, &b);

        b.sender.clock_identity = ClockIdentity([3; 8]);
        a.receiver.port_number = 1;
        b.receiver.port_number = 2;
        assert_wins(&a, &b);

        b.receiver.port_number = 1;
        assert_eq!(a.compare(&b), Ordering::Equal);
    }
}
