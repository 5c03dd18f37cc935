//! Reservation transaction service.
//!
//! One commit path shared by the HTTP handlers and the selection reducer:
//! validate locally, then persist the whole selection as `Pending` in a
//! single atomic batch. The store's conditional write settles races; a
//! rejected batch surfaces as [`StorefrontError::ConflictingReservation`]
//! with a prompt to re-select, never an automatic retry.

use crate::error::StorefrontError;
use crate::metrics;
use crate::store::TicketStore;
use crate::types::{BuyerInfo, Raffle, Selection, TicketNumber};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long a pending bank-transfer reservation is honored.
///
/// Communicated to the buyer; expiry is judged administratively, nothing
/// purges automatically.
#[must_use]
pub fn hold_duration() -> Duration {
    Duration::hours(24)
}

/// Outcome of a committed reservation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationReceipt {
    /// The committed numbers, ascending
    pub numbers: Vec<TicketNumber>,
    /// When the bank-transfer hold lapses
    pub hold_expires_at: DateTime<Utc>,
}

/// Commit a finalized selection as a pending reservation.
///
/// # Errors
///
/// - [`StorefrontError::Validation`] for an empty selection, numbers
///   outside the raffle's range, or invalid buyer contact fields - all
///   caught before any store interaction
/// - [`StorefrontError::ConflictingReservation`] when the atomic batch is
///   rejected; nothing was committed
/// - [`StorefrontError::CollaboratorUnavailable`] when the store is down
pub async fn commit(
    store: &dyn TicketStore,
    raffle: &Raffle,
    selection: &Selection,
    buyer: &BuyerInfo,
    now: DateTime<Utc>,
) -> Result<ReservationReceipt, StorefrontError> {
    buyer.validate().map_err(StorefrontError::Validation)?;

    if selection.is_empty() {
        return Err(StorefrontError::Validation(
            "cannot reserve an empty selection".to_string(),
        ));
    }
    let numbers = selection.numbers();
    if let Some(outside) = numbers.iter().find(|n| !raffle.contains(**n)) {
        return Err(StorefrontError::Validation(format!(
            "ticket number {outside} is outside the range 1..={}",
            raffle.total_tickets
        )));
    }

    let outcome = store
        .reserve_pending(raffle.id, numbers.clone(), buyer.clone(), now)
        .await;

    match outcome {
        Ok(()) => {
            metrics::record_reservation_committed(selection.count());
            tracing::info!(
                raffle_id = %raffle.id,
                numbers = ?numbers,
                buyer_email = %buyer.email,
                "Reservation committed"
            );
            Ok(ReservationReceipt {
                numbers,
                hold_expires_at: now + hold_duration(),
            })
        }
        Err(err) => {
            let err = StorefrontError::from(err);
            if matches!(err, StorefrontError::ConflictingReservation { .. }) {
                metrics::record_reservation_conflict();
            }
            Err(err)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::InMemoryTicketStore;
    use crate::types::{Money, Package, RaffleId, SelectionOrigin, TicketStatus};

    fn sample_raffle() -> Raffle {
        Raffle {
            id: RaffleId::new(),
            product_name: "Motorcycle".to_string(),
            title: "Win a motorcycle".to_string(),
            description: String::new(),
            image_url: None,
            total_tickets: 100,
            is_active: true,
            packages: vec![Package::new("normal".to_string(), Money::from_pesos(150), 1, 0)],
            created_at: Utc::now(),
        }
    }

    fn selection(values: &[u32]) -> Selection {
        Selection::from_numbers(
            values.iter().copied().map(TicketNumber),
            SelectionOrigin::Manual,
        )
    }

    fn ana() -> BuyerInfo {
        BuyerInfo::new("Ana".to_string(), "ana@example.com".to_string())
    }

    #[tokio::test]
    async fn commit_persists_pending_tickets_with_buyer_fields() {
        let store = InMemoryTicketStore::new();
        let raffle = sample_raffle();
        store.create_raffle(raffle.clone()).await.unwrap();

        let now = Utc::now();
        let receipt = commit(&store, &raffle, &selection(&[3, 7, 9]), &ana(), now)
            .await
            .unwrap();

        assert_eq!(
            receipt.numbers,
            vec![TicketNumber(3), TicketNumber(7), TicketNumber(9)]
        );
        assert_eq!(receipt.hold_expires_at, now + Duration::hours(24));

        let tickets = store.list_tickets(raffle.id).await.unwrap();
        assert_eq!(tickets.len(), 3);
        for ticket in tickets {
            assert_eq!(ticket.status, TicketStatus::Pending);
            assert_eq!(ticket.buyer.email, "ana@example.com");
            assert_eq!(ticket.reserved_at, Some(now));
        }
    }

    #[tokio::test]
    async fn invalid_buyer_fails_before_any_store_write() {
        let store = InMemoryTicketStore::new();
        let raffle = sample_raffle();
        store.create_raffle(raffle.clone()).await.unwrap();

        let bad_buyer = BuyerInfo::new(String::new(), "ana@example.com".to_string());
        let err = commit(&store, &raffle, &selection(&[1]), &bad_buyer, Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, StorefrontError::Validation(_)));
        assert!(store.list_tickets(raffle.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn out_of_range_number_is_rejected_locally() {
        let store = InMemoryTicketStore::new();
        let raffle = sample_raffle();
        store.create_raffle(raffle.clone()).await.unwrap();

        let err = commit(&store, &raffle, &selection(&[101]), &ana(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StorefrontError::Validation(_)));
    }

    #[tokio::test]
    async fn lost_race_surfaces_as_conflicting_reservation() {
        let store = InMemoryTicketStore::new();
        let raffle = sample_raffle();
        store.create_raffle(raffle.clone()).await.unwrap();

        commit(&store, &raffle, &selection(&[7]), &ana(), Utc::now())
            .await
            .unwrap();

        let bea = BuyerInfo::new("Bea".to_string(), "bea@example.com".to_string());
        let err = commit(&store, &raffle, &selection(&[6, 7]), &bea, Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StorefrontError::ConflictingReservation { ref numbers } if numbers == &vec![TicketNumber(7)]
        ));
        // Nothing partial: Bea's 6 was not committed.
        assert_eq!(store.list_tickets(raffle.id).await.unwrap().len(), 1);
    }
}
