//! In-memory ticket store for development and testing.
//!
//! Mutations take a single process-wide lock, apply the conditional batch
//! against the current ticket map, and publish a fresh snapshot on the
//! raffle's watch channel, giving the same observable semantics as a
//! document store with transactional batch writes.

use super::{StoreError, StoreResult, TicketSet, TicketStore};
use crate::types::{BuyerInfo, Raffle, RaffleId, Ticket, TicketNumber, TicketStatus};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

/// One raffle's record plus its live ticket feed.
struct RaffleRecord {
    raffle: Raffle,
    tickets: BTreeMap<TicketNumber, Ticket>,
    feed: watch::Sender<TicketSet>,
}

impl RaffleRecord {
    fn new(raffle: Raffle) -> Self {
        let (feed, _) = watch::channel(Arc::new(BTreeMap::new()));
        Self {
            raffle,
            tickets: BTreeMap::new(),
            feed,
        }
    }

    /// Publish the current ticket map to all live subscribers.
    fn publish(&self) {
        // send only fails when no receiver exists, which is fine: the
        // current value is still updated for future subscribers.
        let _ = self.feed.send(Arc::new(self.tickets.clone()));
    }
}

/// In-memory [`TicketStore`] implementation.
///
/// Development and test backend; a production deployment substitutes a
/// document-database implementation behind the same trait.
#[derive(Default)]
pub struct InMemoryTicketStore {
    inner: Mutex<HashMap<RaffleId, RaffleRecord>>,
}

impl InMemoryTicketStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared() -> Arc<dyn TicketStore> {
        Arc::new(Self::new())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, HashMap<RaffleId, RaffleRecord>>> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("ticket store lock poisoned".to_string()))
    }

    fn do_create_raffle(&self, raffle: Raffle) -> StoreResult<()> {
        let mut inner = self.lock()?;
        tracing::info!(raffle_id = %raffle.id, total_tickets = raffle.total_tickets, "Raffle created");
        inner.insert(raffle.id, RaffleRecord::new(raffle));
        Ok(())
    }

    fn do_get_raffle(&self, raffle_id: RaffleId) -> StoreResult<Raffle> {
        let inner = self.lock()?;
        inner
            .get(&raffle_id)
            .map(|rec| rec.raffle.clone())
            .ok_or(StoreError::RaffleNotFound(raffle_id))
    }

    fn do_list_raffles(&self) -> StoreResult<Vec<Raffle>> {
        let inner = self.lock()?;
        let mut raffles: Vec<Raffle> = inner.values().map(|rec| rec.raffle.clone()).collect();
        raffles.sort_by_key(|r| r.created_at);
        Ok(raffles)
    }

    fn do_active_raffle(&self) -> StoreResult<Option<Raffle>> {
        let inner = self.lock()?;
        Ok(inner
            .values()
            .find(|rec| rec.raffle.is_active)
            .map(|rec| rec.raffle.clone()))
    }

    fn do_activate_raffle(&self, raffle_id: RaffleId) -> StoreResult<()> {
        let mut inner = self.lock()?;
        if !inner.contains_key(&raffle_id) {
            return Err(StoreError::RaffleNotFound(raffle_id));
        }
        // Deactivate-all-then-activate in one critical section: at most one
        // raffle is ever observed active.
        for rec in inner.values_mut() {
            rec.raffle.is_active = rec.raffle.id == raffle_id;
        }
        tracing::info!(raffle_id = %raffle_id, "Raffle activated");
        Ok(())
    }

    fn do_watch_tickets(&self, raffle_id: RaffleId) -> StoreResult<watch::Receiver<TicketSet>> {
        let inner = self.lock()?;
        let rec = inner
            .get(&raffle_id)
            .ok_or(StoreError::RaffleNotFound(raffle_id))?;
        let receiver = rec.feed.subscribe();
        // The channel's current value may predate this subscription if no
        // write happened since creation; refresh it.
        rec.publish();
        Ok(receiver)
    }

    fn do_list_tickets(&self, raffle_id: RaffleId) -> StoreResult<Vec<Ticket>> {
        let inner = self.lock()?;
        let rec = inner
            .get(&raffle_id)
            .ok_or(StoreError::RaffleNotFound(raffle_id))?;
        Ok(rec.tickets.values().cloned().collect())
    }

    fn do_reserve_pending(
        &self,
        raffle_id: RaffleId,
        numbers: Vec<TicketNumber>,
        buyer: BuyerInfo,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut inner = self.lock()?;
        let rec = inner
            .get_mut(&raffle_id)
            .ok_or(StoreError::RaffleNotFound(raffle_id))?;

        // Validate the whole batch before touching anything.
        let taken: Vec<TicketNumber> = numbers
            .iter()
            .copied()
            .filter(|n| rec.tickets.contains_key(n))
            .collect();
        if !taken.is_empty() {
            tracing::warn!(
                raffle_id = %raffle_id,
                numbers = ?taken,
                buyer_email = %buyer.email,
                "Reservation batch rejected, numbers already taken"
            );
            return Err(StoreError::Conflict { numbers: taken });
        }

        for number in &numbers {
            rec.tickets
                .insert(*number, Ticket::pending(*number, buyer.clone(), now));
        }
        tracing::info!(
            raffle_id = %raffle_id,
            numbers = ?numbers,
            buyer_email = %buyer.email,
            "Reservation batch committed"
        );
        rec.publish();
        Ok(())
    }

    fn do_mark_sold(
        &self,
        raffle_id: RaffleId,
        numbers: Vec<TicketNumber>,
        buyer: BuyerInfo,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut inner = self.lock()?;
        let rec = inner
            .get_mut(&raffle_id)
            .ok_or(StoreError::RaffleNotFound(raffle_id))?;

        // Validate the whole batch before touching anything. Absent and
        // pending numbers are writable; a number sold to the same buyer is
        // a redelivered notification and skipped.
        let conflicting: Vec<TicketNumber> = numbers
            .iter()
            .copied()
            .filter(|n| {
                rec.tickets.get(n).is_some_and(|t| {
                    t.status == TicketStatus::Sold && t.buyer.email != buyer.email
                })
            })
            .collect();
        if !conflicting.is_empty() {
            tracing::warn!(
                raffle_id = %raffle_id,
                numbers = ?conflicting,
                buyer_email = %buyer.email,
                "Sold batch rejected, numbers sold to another buyer"
            );
            return Err(StoreError::Conflict {
                numbers: conflicting,
            });
        }

        for number in &numbers {
            match rec.tickets.get(number) {
                Some(existing) if existing.status == TicketStatus::Sold => {
                    // Same buyer, redelivery: no-op keeps the write idempotent.
                }
                existing => {
                    let reserved_at = existing.and_then(|t| t.reserved_at);
                    let mut ticket = Ticket::sold(*number, buyer.clone(), now);
                    ticket.reserved_at = reserved_at;
                    rec.tickets.insert(*number, ticket);
                }
            }
        }
        tracing::info!(
            raffle_id = %raffle_id,
            numbers = ?numbers,
            buyer_email = %buyer.email,
            "Sold batch committed"
        );
        rec.publish();
        Ok(())
    }

    fn do_confirm_buyer(
        &self,
        raffle_id: RaffleId,
        buyer_email: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<TicketNumber>> {
        let mut inner = self.lock()?;
        let rec = inner
            .get_mut(&raffle_id)
            .ok_or(StoreError::RaffleNotFound(raffle_id))?;

        let mut confirmed = Vec::new();
        for ticket in rec.tickets.values_mut() {
            if ticket.status == TicketStatus::Pending && ticket.buyer.email == buyer_email {
                ticket.status = TicketStatus::Sold;
                ticket.purchased_at = Some(now);
                confirmed.push(ticket.number);
            }
        }
        if !confirmed.is_empty() {
            tracing::info!(
                raffle_id = %raffle_id,
                numbers = ?confirmed,
                buyer_email = %buyer_email,
                "Buyer group confirmed"
            );
            rec.publish();
        }
        Ok(confirmed)
    }

    fn do_cancel_buyer(
        &self,
        raffle_id: RaffleId,
        buyer_email: &str,
    ) -> StoreResult<Vec<TicketNumber>> {
        let mut inner = self.lock()?;
        let rec = inner
            .get_mut(&raffle_id)
            .ok_or(StoreError::RaffleNotFound(raffle_id))?;

        let freed: Vec<TicketNumber> = rec
            .tickets
            .values()
            .filter(|t| t.status == TicketStatus::Pending && t.buyer.email == buyer_email)
            .map(|t| t.number)
            .collect();
        for number in &freed {
            rec.tickets.remove(number);
        }
        if !freed.is_empty() {
            tracing::info!(
                raffle_id = %raffle_id,
                numbers = ?freed,
                buyer_email = %buyer_email,
                "Buyer group cancelled, numbers returned to pool"
            );
            rec.publish();
        }
        Ok(freed)
    }
}

impl TicketStore for InMemoryTicketStore {
    fn create_raffle(
        &self,
        raffle: Raffle,
    ) -> Pin<Box<dyn Future<Output = StoreResult<()>> + Send + '_>> {
        let result = self.do_create_raffle(raffle);
        Box::pin(async move { result })
    }

    fn get_raffle(
        &self,
        raffle_id: RaffleId,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Raffle>> + Send + '_>> {
        let result = self.do_get_raffle(raffle_id);
        Box::pin(async move { result })
    }

    fn list_raffles(&self) -> Pin<Box<dyn Future<Output = StoreResult<Vec<Raffle>>> + Send + '_>> {
        let result = self.do_list_raffles();
        Box::pin(async move { result })
    }

    fn active_raffle(
        &self,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Option<Raffle>>> + Send + '_>> {
        let result = self.do_active_raffle();
        Box::pin(async move { result })
    }

    fn activate_raffle(
        &self,
        raffle_id: RaffleId,
    ) -> Pin<Box<dyn Future<Output = StoreResult<()>> + Send + '_>> {
        let result = self.do_activate_raffle(raffle_id);
        Box::pin(async move { result })
    }

    fn watch_tickets(
        &self,
        raffle_id: RaffleId,
    ) -> Pin<Box<dyn Future<Output = StoreResult<watch::Receiver<TicketSet>>> + Send + '_>> {
        let result = self.do_watch_tickets(raffle_id);
        Box::pin(async move { result })
    }

    fn list_tickets(
        &self,
        raffle_id: RaffleId,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Vec<Ticket>>> + Send + '_>> {
        let result = self.do_list_tickets(raffle_id);
        Box::pin(async move { result })
    }

    fn reserve_pending(
        &self,
        raffle_id: RaffleId,
        numbers: Vec<TicketNumber>,
        buyer: BuyerInfo,
        now: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = StoreResult<()>> + Send + '_>> {
        let result = self.do_reserve_pending(raffle_id, numbers, buyer, now);
        Box::pin(async move { result })
    }

    fn mark_sold(
        &self,
        raffle_id: RaffleId,
        numbers: Vec<TicketNumber>,
        buyer: BuyerInfo,
        now: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = StoreResult<()>> + Send + '_>> {
        let result = self.do_mark_sold(raffle_id, numbers, buyer, now);
        Box::pin(async move { result })
    }

    fn confirm_buyer(
        &self,
        raffle_id: RaffleId,
        buyer_email: String,
        now: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Vec<TicketNumber>>> + Send + '_>> {
        let result = self.do_confirm_buyer(raffle_id, &buyer_email, now);
        Box::pin(async move { result })
    }

    fn cancel_buyer(
        &self,
        raffle_id: RaffleId,
        buyer_email: String,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Vec<TicketNumber>>> + Send + '_>> {
        let result = self.do_cancel_buyer(raffle_id, &buyer_email);
        Box::pin(async move { result })
    }
}
