//! Ticket store collaborator.
//!
//! The store is the only shared mutable resource and the final arbiter of
//! who wins a race for a number: availability reads are advisory live
//! projections, while every mutation goes through an atomic all-or-nothing
//! conditional batch that re-checks the expected absent/pending state at
//! commit time.
//!
//! # Implementations
//!
//! - [`InMemoryTicketStore`]: development and test implementation
//! - A document-database implementation is a deployment concern behind the
//!   same trait
//!
//! # Dyn Compatibility
//!
//! The trait uses explicit `Pin<Box<dyn Future>>` returns instead of
//! `async fn` to enable trait object usage (`Arc<dyn TicketStore>`). This is
//! required for the effect system, where reducers create effects that
//! capture the store.

mod memory;

pub use memory::InMemoryTicketStore;

use crate::types::{BuyerInfo, Raffle, RaffleId, Ticket, TicketNumber};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

/// Snapshot of all persisted tickets for one raffle, keyed by number.
///
/// A number with no entry is available. Shared via `Arc` so the watch
/// channel can fan a snapshot out to many sessions cheaply.
pub type TicketSet = Arc<BTreeMap<TicketNumber, Ticket>>;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during ticket store operations.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// The referenced raffle does not exist.
    #[error("raffle not found: {0}")]
    RaffleNotFound(RaffleId),

    /// A conditional batch was rejected because one or more target numbers
    /// were not in the expected state. Nothing was committed.
    #[error("conflicting ticket numbers: {numbers:?}")]
    Conflict {
        /// The offending numbers
        numbers: Vec<TicketNumber>,
    },

    /// The store backend is unreachable or in a broken state.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Ticket store abstraction over a document database.
///
/// # Consistency contract
///
/// - `watch_tickets` is a live-subscription read: a fresh [`TicketSet`]
///   snapshot is published on every write to the raffle.
/// - `reserve_pending` and `mark_sold` are atomic multi-record conditional
///   writes: they succeed only if every target number is in the expected
///   state, else fail with [`StoreError::Conflict`] and no partial effect.
/// - `confirm_buyer` / `cancel_buyer` update or delete one buyer's whole
///   pending group as a unit.
/// - `activate_raffle` deactivates every other raffle in the same batch,
///   maintaining the single-active invariant.
pub trait TicketStore: Send + Sync {
    /// Persist a new raffle record.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the backend cannot be reached.
    fn create_raffle(
        &self,
        raffle: Raffle,
    ) -> Pin<Box<dyn Future<Output = StoreResult<()>> + Send + '_>>;

    /// Load one raffle by id.
    ///
    /// # Errors
    ///
    /// Returns `RaffleNotFound` if no such raffle exists.
    fn get_raffle(
        &self,
        raffle_id: RaffleId,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Raffle>> + Send + '_>>;

    /// List all raffles, creation order.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the backend cannot be reached.
    fn list_raffles(&self) -> Pin<Box<dyn Future<Output = StoreResult<Vec<Raffle>>> + Send + '_>>;

    /// The raffle currently flagged active, if any.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the backend cannot be reached.
    fn active_raffle(
        &self,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Option<Raffle>>> + Send + '_>>;

    /// Activate one raffle and deactivate all others in a single batch.
    ///
    /// # Errors
    ///
    /// Returns `RaffleNotFound` if the target raffle does not exist.
    fn activate_raffle(
        &self,
        raffle_id: RaffleId,
    ) -> Pin<Box<dyn Future<Output = StoreResult<()>> + Send + '_>>;

    /// Subscribe to the live ticket set for a raffle.
    ///
    /// The receiver's current value is always the latest snapshot; a new
    /// snapshot is published on every write.
    ///
    /// # Errors
    ///
    /// Returns `RaffleNotFound` if no such raffle exists.
    fn watch_tickets(
        &self,
        raffle_id: RaffleId,
    ) -> Pin<Box<dyn Future<Output = StoreResult<watch::Receiver<TicketSet>>> + Send + '_>>;

    /// Point-in-time list of all persisted tickets for a raffle.
    ///
    /// # Errors
    ///
    /// Returns `RaffleNotFound` if no such raffle exists.
    fn list_tickets(
        &self,
        raffle_id: RaffleId,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Vec<Ticket>>> + Send + '_>>;

    /// Atomically persist a batch of numbers as `Pending` for one buyer.
    ///
    /// Every number must be absent at commit time; this re-check, not the
    /// caller's availability view, decides who wins a race.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` naming every number that is no longer absent;
    /// nothing is committed in that case.
    fn reserve_pending(
        &self,
        raffle_id: RaffleId,
        numbers: Vec<TicketNumber>,
        buyer: BuyerInfo,
        now: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = StoreResult<()>> + Send + '_>>;

    /// Atomically mark a batch of numbers as `Sold` for one buyer.
    ///
    /// The payment-gateway path: absent or pending numbers become sold in
    /// one batch. Idempotent under webhook redelivery - a number already
    /// sold to the same buyer is a no-op; sold to a different buyer fails
    /// the whole batch.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` naming the numbers sold to a different buyer.
    fn mark_sold(
        &self,
        raffle_id: RaffleId,
        numbers: Vec<TicketNumber>,
        buyer: BuyerInfo,
        now: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = StoreResult<()>> + Send + '_>>;

    /// Move all of one buyer's pending tickets to `Sold` as a unit.
    ///
    /// Returns the confirmed numbers (empty if the buyer has no pending
    /// tickets).
    ///
    /// # Errors
    ///
    /// Returns `RaffleNotFound` if no such raffle exists.
    fn confirm_buyer(
        &self,
        raffle_id: RaffleId,
        buyer_email: String,
        now: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Vec<TicketNumber>>> + Send + '_>>;

    /// Delete all of one buyer's pending tickets as a unit, returning the
    /// freed numbers to the available pool.
    ///
    /// Sold tickets are never touched.
    ///
    /// # Errors
    ///
    /// Returns `RaffleNotFound` if no such raffle exists.
    fn cancel_buyer(
        &self,
        raffle_id: RaffleId,
        buyer_email: String,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Vec<TicketNumber>>> + Send + '_>>;
}
