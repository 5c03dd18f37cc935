//! Live ticket availability view.
//!
//! A read-only projection over one raffle's watch feed: for any number in
//! `[1, total_tickets]` it answers whether the number is available, and if
//! not, its status. The view is advisory - the store's conditional batch
//! write at commit time is the arbiter of who wins a race.

use crate::store::TicketSet;
use crate::types::{TicketNumber, TicketStatus};
use tokio::sync::watch;

/// Live availability view for one raffle.
///
/// Cheap to clone; every read consults the watch channel's current
/// snapshot, so freshness is bounded only by channel delivery.
#[derive(Clone)]
pub struct AvailabilityView {
    total_tickets: u32,
    receiver: watch::Receiver<TicketSet>,
}

impl AvailabilityView {
    /// Creates a view over a raffle's ticket feed
    #[must_use]
    pub const fn new(total_tickets: u32, receiver: watch::Receiver<TicketSet>) -> Self {
        Self {
            total_tickets,
            receiver,
        }
    }

    /// The size of the raffle's number space
    #[must_use]
    pub const fn total_tickets(&self) -> u32 {
        self.total_tickets
    }

    /// The latest ticket snapshot
    #[must_use]
    pub fn snapshot(&self) -> TicketSet {
        self.receiver.borrow().clone()
    }

    /// Status of one number, `None` if it is available
    #[must_use]
    pub fn status_of(&self, number: TicketNumber) -> Option<TicketStatus> {
        self.receiver.borrow().get(&number).map(|t| t.status)
    }

    /// Whether one number is currently available
    #[must_use]
    pub fn is_available(&self, number: TicketNumber) -> bool {
        number.0 >= 1
            && number.0 <= self.total_tickets
            && !self.receiver.borrow().contains_key(&number)
    }

    /// All available numbers, ascending
    #[must_use]
    pub fn available_numbers(&self) -> Vec<TicketNumber> {
        let taken = self.receiver.borrow().clone();
        (1..=self.total_tickets)
            .map(TicketNumber)
            .filter(|n| !taken.contains_key(n))
            .collect()
    }

    /// How many numbers are currently available
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // taken set is bounded by the u32 number space
    pub fn available_count(&self) -> u32 {
        self.total_tickets - self.receiver.borrow().len() as u32
    }

    /// How many numbers are taken, by status: `(pending, sold)`
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // taken set is bounded by the u32 number space
    pub fn taken_counts(&self) -> (u32, u32) {
        let snapshot = self.receiver.borrow();
        let pending = snapshot
            .values()
            .filter(|t| t.status == TicketStatus::Pending)
            .count() as u32;
        let sold = snapshot
            .values()
            .filter(|t| t.status == TicketStatus::Sold)
            .count() as u32;
        (pending, sold)
    }
}
