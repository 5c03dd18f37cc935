//! Card checkout flow.
//!
//! Two halves: [`create_checkout`] opens a hosted gateway session for the
//! buyer's current selection, and [`handle_notification`] applies the
//! gateway's asynchronous payment notification by marking the tickets sold.
//! Notifications are delivered at-least-once, so the sold write is
//! idempotent per buyer.

use crate::error::StorefrontError;
use crate::metrics;
use crate::payment_gateway::{
    CheckoutMetadata, CheckoutRequest, CheckoutSession, LineItem, PaymentGateway,
    PaymentNotification,
};
use crate::pricing;
use crate::store::TicketStore;
use crate::types::{BuyerInfo, Money, Raffle, Selection, TicketNumber};
use chrono::{DateTime, Utc};

/// Build one line item per ticket, distributing the quote total.
///
/// The gateway wants per-item amounts, but the tiered quote prices the
/// batch as a whole. Split the total evenly per ticket in centavos and put
/// the division remainder on the first item so the items always sum back
/// to the quoted total.
#[must_use]
pub fn build_line_items(raffle: &Raffle, numbers: &[TicketNumber], total: Money) -> Vec<LineItem> {
    let count = numbers.len() as u64;
    if count == 0 {
        return Vec::new();
    }
    let base = total.centavos() / count;
    let remainder = total.centavos() % count;

    numbers
        .iter()
        .enumerate()
        .map(|(i, number)| LineItem {
            name: format!("Boleto #{number} - {}", raffle.title),
            unit_amount_centavos: if i == 0 { base + remainder } else { base },
            quantity: 1,
        })
        .collect()
}

/// Open a hosted checkout session for the buyer's selection.
///
/// Validates the buyer, prices the selection, and hands the gateway one
/// line item per ticket plus metadata that will come back verbatim in the
/// payment notification. No ticket state changes here: numbers are only
/// written when the notification arrives.
///
/// # Errors
///
/// - [`StorefrontError::Validation`] for an invalid buyer, empty or
///   out-of-range selection
/// - [`StorefrontError::CollaboratorUnavailable`] when the gateway fails
pub async fn create_checkout(
    gateway: &dyn PaymentGateway,
    raffle: &Raffle,
    selection: &Selection,
    buyer: &BuyerInfo,
    single_ticket_price: Money,
) -> Result<CheckoutSession, StorefrontError> {
    buyer.validate().map_err(StorefrontError::Validation)?;
    if let Some(outside) = selection.numbers().iter().find(|n| !raffle.contains(**n)) {
        return Err(StorefrontError::Validation(format!(
            "ticket number {outside} is outside this raffle"
        )));
    }

    let quote = pricing::quote(selection, &raffle.packages, single_ticket_price)?;
    let numbers = selection.numbers();
    let metadata = CheckoutMetadata::encode(raffle.id, &numbers, buyer)
        .map_err(StorefrontError::Validation)?;

    let session = gateway
        .create_checkout_session(CheckoutRequest {
            line_items: build_line_items(raffle, &numbers, quote.total),
            metadata,
            customer_email: buyer.email.clone(),
        })
        .await
        .map_err(|e| StorefrontError::CollaboratorUnavailable(e.to_string()))?;

    tracing::info!(
        raffle_id = %raffle.id,
        session_id = %session.session_id,
        buyer_email = %buyer.email,
        tickets = numbers.len(),
        total = %quote.total,
        "Checkout session created"
    );

    Ok(session)
}

/// Apply a gateway payment notification: mark the paid numbers sold.
///
/// Idempotent under redelivery - numbers already sold to the same buyer
/// are a no-op, so replaying the same notification returns the same
/// numbers without error. A number sold to a different buyer rejects the
/// whole notification and commits nothing.
///
/// # Errors
///
/// - [`StorefrontError::Validation`] for malformed metadata or numbers
///   outside the raffle's range
/// - [`StorefrontError::ConflictingReservation`] when a number is already
///   sold to a different buyer
/// - [`StorefrontError::NotFound`] for an unknown raffle
pub async fn handle_notification(
    store: &dyn TicketStore,
    notification: &PaymentNotification,
    now: DateTime<Utc>,
) -> Result<Vec<TicketNumber>, StorefrontError> {
    let numbers = notification.metadata.decode_numbers().map_err(|e| {
        metrics::record_payment_notification("rejected");
        StorefrontError::Validation(format!("malformed notification metadata: {e}"))
    })?;
    let buyer = notification.metadata.buyer();
    buyer.validate().map_err(|e| {
        metrics::record_payment_notification("rejected");
        StorefrontError::Validation(e)
    })?;

    // The metadata is authenticated but still external input; it must
    // never write a number outside the raffle's space.
    let raffle_id = notification.metadata.raffle_id;
    let raffle = store.get_raffle(raffle_id).await.map_err(|e| {
        metrics::record_payment_notification("rejected");
        StorefrontError::from(e)
    })?;
    if let Some(outside) = numbers.iter().find(|n| !raffle.contains(**n)) {
        metrics::record_payment_notification("rejected");
        return Err(StorefrontError::Validation(format!(
            "ticket number {outside} is outside this raffle"
        )));
    }

    match store
        .mark_sold(raffle_id, numbers.clone(), buyer.clone(), now)
        .await
    {
        Ok(()) => {
            #[allow(clippy::cast_possible_truncation)]
            let quantity = numbers.len() as u32;
            metrics::record_payment_notification("applied");
            metrics::record_tickets_sold(quantity, notification.amount_centavos);
            tracing::info!(
                raffle_id = %raffle_id,
                session_id = %notification.session_id,
                buyer_email = %buyer.email,
                ?numbers,
                "Payment notification applied"
            );
            Ok(numbers)
        }
        Err(err) => {
            metrics::record_payment_notification("rejected");
            tracing::warn!(
                raffle_id = %raffle_id,
                session_id = %notification.session_id,
                error = %err,
                "Payment notification rejected"
            );
            Err(err.into())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::payment_gateway::MockPaymentGateway;
    use crate::store::InMemoryTicketStore;
    use crate::types::{Package, RaffleId, SelectionOrigin, TicketStatus};

    fn sample_raffle() -> Raffle {
        Raffle {
            id: RaffleId::new(),
            product_name: "Motorcycle".to_string(),
            title: "Win a motorcycle".to_string(),
            description: String::new(),
            image_url: None,
            total_tickets: 100,
            is_active: true,
            packages: vec![
                Package::new("normal".to_string(), Money::from_pesos(150), 1, 0),
                Package::new("5x".to_string(), Money::from_pesos(500), 5, 1),
            ],
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

    #[test]
    fn line_items_sum_back_to_the_quote_total() {
        let raffle = sample_raffle();
        let numbers: Vec<TicketNumber> = (1..=7).map(TicketNumber).collect();
        // 7 manual tickets quote to 650 pesos (one 5X tier + one single).
        let items = build_line_items(&raffle, &numbers, Money::from_pesos(650));

        assert_eq!(items.len(), 7);
        let sum: u64 = items.iter().map(|i| i.unit_amount_centavos).sum();
        assert_eq!(sum, Money::from_pesos(650).centavos());
        // Remainder lands on the first item only.
        assert!(items[0].unit_amount_centavos >= items[1].unit_amount_centavos);
        assert!(items[1..].iter().all(|i| i.unit_amount_centavos == items[1].unit_amount_centavos));
    }

    #[tokio::test]
    async fn checkout_session_does_not_touch_ticket_state() {
        let store = InMemoryTicketStore::new();
        let raffle = sample_raffle();
        store.create_raffle(raffle.clone()).await.unwrap();
        let gateway = MockPaymentGateway::new();

        let session = create_checkout(
            &gateway,
            &raffle,
            &selection(&[3, 7, 9]),
            &ana(),
            Money::from_pesos(150),
        )
        .await
        .unwrap();

        assert!(session.session_id.starts_with("mock_cs_"));
        assert!(store.list_tickets(raffle.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn notification_marks_numbers_sold() {
        let store = InMemoryTicketStore::new();
        let raffle = sample_raffle();
        store.create_raffle(raffle.clone()).await.unwrap();

        let metadata = CheckoutMetadata::encode(
            raffle.id,
            &[TicketNumber(3), TicketNumber(7)],
            &ana(),
        )
        .unwrap();
        let notification = PaymentNotification {
            session_id: "mock_cs_test".to_string(),
            metadata,
            amount_centavos: 30_000,
        };

        let sold = handle_notification(&store, &notification, Utc::now())
            .await
            .unwrap();
        assert_eq!(sold, vec![TicketNumber(3), TicketNumber(7)]);

        let tickets = store.list_tickets(raffle.id).await.unwrap();
        assert!(tickets.iter().all(|t| t.status == TicketStatus::Sold));
    }

    #[tokio::test]
    async fn redelivered_notification_is_a_no_op() {
        let store = InMemoryTicketStore::new();
        let raffle = sample_raffle();
        store.create_raffle(raffle.clone()).await.unwrap();

        let metadata =
            CheckoutMetadata::encode(raffle.id, &[TicketNumber(5)], &ana()).unwrap();
        let notification = PaymentNotification {
            session_id: "mock_cs_test".to_string(),
            metadata,
            amount_centavos: 15_000,
        };

        let first = handle_notification(&store, &notification, Utc::now())
            .await
            .unwrap();
        let second = handle_notification(&store, &notification, Utc::now())
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(store.list_tickets(raffle.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn notification_with_out_of_range_numbers_writes_nothing() {
        let store = InMemoryTicketStore::new();
        let raffle = sample_raffle();
        store.create_raffle(raffle.clone()).await.unwrap();

        // The number space is 1..=100; 999 must never be persisted.
        let metadata = CheckoutMetadata::encode(
            raffle.id,
            &[TicketNumber(3), TicketNumber(999)],
            &ana(),
        )
        .unwrap();
        let notification = PaymentNotification {
            session_id: "mock_cs_test".to_string(),
            metadata,
            amount_centavos: 30_000,
        };

        let err = handle_notification(&store, &notification, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StorefrontError::Validation(_)));
        assert!(store.list_tickets(raffle.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn notification_for_another_buyers_ticket_is_rejected() {
        let store = InMemoryTicketStore::new();
        let raffle = sample_raffle();
        store.create_raffle(raffle.clone()).await.unwrap();

        let bea = BuyerInfo::new("Bea".to_string(), "bea@example.com".to_string());
        store
            .mark_sold(raffle.id, vec![TicketNumber(5)], bea, Utc::now())
            .await
            .unwrap();

        let metadata =
            CheckoutMetadata::encode(raffle.id, &[TicketNumber(5)], &ana()).unwrap();
        let notification = PaymentNotification {
            session_id: "mock_cs_test".to_string(),
            metadata,
            amount_centavos: 15_000,
        };

        let err = handle_notification(&store, &notification, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StorefrontError::ConflictingReservation { .. }));
    }
}
