//! Payment gateway collaborator.
//!
//! Abstraction over a hosted card-checkout service: session creation takes
//! per-ticket line items plus metadata, and the gateway later delivers an
//! asynchronous notification carrying that metadata back verbatim. The
//! mock implementation always succeeds and is used in development and
//! tests.

use crate::types::{BuyerInfo, RaffleId, TicketNumber};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Payment gateway result
pub type GatewayResult<T> = Result<T, PaymentGatewayError>;

/// Payment gateway error
#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    /// The gateway credential/config is missing or invalid
    #[error("gateway credentials missing or invalid: {0}")]
    Credentials(String),
    /// The gateway rejected the session request
    #[error("gateway rejected the request: {0}")]
    Rejected(String),
    /// The gateway did not answer in time
    #[error("gateway timeout")]
    Timeout,
    /// Any other gateway failure
    #[error("gateway error: {0}")]
    Other(String),
}

/// Checkout metadata round-tripped verbatim through the gateway.
///
/// Ticket numbers travel as a JSON array string because the gateway treats
/// every metadata value as an opaque string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutMetadata {
    /// Raffle the tickets belong to
    pub raffle_id: RaffleId,
    /// JSON-encoded array of ticket numbers, e.g. `"[3,7,9]"`
    pub ticket_numbers: String,
    /// Buyer display name
    pub buyer_name: String,
    /// Buyer email
    pub buyer_email: String,
}

impl CheckoutMetadata {
    /// Build metadata for a checkout session.
    ///
    /// # Errors
    ///
    /// Returns an error message if the numbers cannot be JSON-encoded.
    pub fn encode(
        raffle_id: RaffleId,
        numbers: &[TicketNumber],
        buyer: &BuyerInfo,
    ) -> Result<Self, String> {
        let raw: Vec<u32> = numbers.iter().map(|n| n.0).collect();
        let ticket_numbers = serde_json::to_string(&raw).map_err(|e| e.to_string())?;
        Ok(Self {
            raffle_id,
            ticket_numbers,
            buyer_name: buyer.name.clone(),
            buyer_email: buyer.email.clone(),
        })
    }

    /// Decode the ticket numbers carried in the metadata.
    ///
    /// # Errors
    ///
    /// Returns an error message when the field is not a JSON number array.
    pub fn decode_numbers(&self) -> Result<Vec<TicketNumber>, String> {
        let raw: Vec<u32> =
            serde_json::from_str(&self.ticket_numbers).map_err(|e| e.to_string())?;
        Ok(raw.into_iter().map(TicketNumber).collect())
    }

    /// The buyer info carried in the metadata
    #[must_use]
    pub fn buyer(&self) -> BuyerInfo {
        BuyerInfo::new(self.buyer_name.clone(), self.buyer_email.clone())
    }
}

/// One line of a checkout session: a single ticket at its unit price.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Display name, e.g. "Boleto #7 - Win a motorcycle"
    pub name: String,
    /// Unit price in centavos
    pub unit_amount_centavos: u64,
    /// Always 1 for ticket line items
    pub quantity: u32,
}

/// Request to open a hosted checkout session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Per-ticket line items; their amounts sum to the quote total
    pub line_items: Vec<LineItem>,
    /// Metadata the gateway round-trips to the notification
    pub metadata: CheckoutMetadata,
    /// Pre-filled customer email
    pub customer_email: String,
}

/// A created checkout session: the redirect handle for the buyer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Gateway session identifier
    pub session_id: String,
    /// Hosted checkout URL to redirect the buyer to
    pub redirect_url: String,
}

/// Asynchronous payment notification delivered by the gateway.
///
/// At-least-once delivery: the same notification may arrive more than
/// once, so the sold write it triggers must be idempotent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentNotification {
    /// Gateway session the payment belongs to
    pub session_id: String,
    /// The original checkout metadata, returned verbatim
    pub metadata: CheckoutMetadata,
    /// Amount actually charged, in centavos
    pub amount_centavos: u64,
}

/// Payment gateway trait
///
/// Abstraction over hosted-checkout processors. Uses explicit boxed
/// futures for trait object usage inside effects.
pub trait PaymentGateway: Send + Sync {
    /// Open a hosted checkout session.
    ///
    /// # Errors
    ///
    /// Returns a [`PaymentGatewayError`] if the gateway declines or is
    /// unreachable.
    fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<CheckoutSession>> + Send>>;
}

/// Mock payment gateway (always succeeds, for development).
#[derive(Clone, Debug, Default)]
pub struct MockPaymentGateway;

impl MockPaymentGateway {
    /// Creates a new mock payment gateway
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared() -> Arc<dyn PaymentGateway> {
        Arc::new(Self::new())
    }
}

impl PaymentGateway for MockPaymentGateway {
    fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<CheckoutSession>> + Send>> {
        Box::pin(async move {
            let session_id = format!("mock_cs_{}", Uuid::new_v4());
            let total: u64 = request
                .line_items
                .iter()
                .map(|item| item.unit_amount_centavos * u64::from(item.quantity))
                .sum();

            tracing::info!(
                session_id = %session_id,
                raffle_id = %request.metadata.raffle_id,
                buyer_email = %request.metadata.buyer_email,
                total_centavos = total,
                "Mock checkout session created"
            );

            Ok(CheckoutSession {
                redirect_url: format!("https://checkout.example.com/pay/{session_id}"),
                session_id,
            })
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn metadata_numbers_round_trip_as_a_json_string() {
        let buyer = BuyerInfo::new("Ana".to_string(), "ana@example.com".to_string());
        let numbers = vec![TicketNumber(3), TicketNumber(7), TicketNumber(9)];
        let metadata = CheckoutMetadata::encode(RaffleId::new(), &numbers, &buyer).unwrap();

        assert_eq!(metadata.ticket_numbers, "[3,7,9]");
        assert_eq!(metadata.decode_numbers().unwrap(), numbers);
        assert_eq!(metadata.buyer(), buyer);
    }

    #[test]
    fn malformed_metadata_numbers_fail_to_decode() {
        let metadata = CheckoutMetadata {
            raffle_id: RaffleId::new(),
            ticket_numbers: "not json".to_string(),
            buyer_name: "Ana".to_string(),
            buyer_email: "ana@example.com".to_string(),
        };
        assert!(metadata.decode_numbers().is_err());
    }

    #[tokio::test]
    async fn mock_gateway_returns_a_redirect_handle() {
        let gateway = MockPaymentGateway::new();
        let buyer = BuyerInfo::new("Ana".to_string(), "ana@example.com".to_string());
        let metadata =
            CheckoutMetadata::encode(RaffleId::new(), &[TicketNumber(1)], &buyer).unwrap();

        let session = gateway
            .create_checkout_session(CheckoutRequest {
                line_items: vec![LineItem {
                    name: "Boleto #1".to_string(),
                    unit_amount_centavos: 15_000,
                    quantity: 1,
                }],
                metadata,
                customer_email: "ana@example.com".to_string(),
            })
            .await
            .unwrap();

        assert!(session.session_id.starts_with("mock_cs_"));
        assert!(session.redirect_url.contains(&session.session_id));
    }
}
