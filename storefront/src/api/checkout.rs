//! Card checkout endpoints.
//!
//! - POST /api/raffles/:id/checkout-session - open a hosted checkout
//! - POST /api/webhook - gateway payment notification (shared-secret auth)

use crate::error::AppError;
use crate::payment_gateway::PaymentNotification;
use crate::payments;
use crate::server::state::AppState;
use crate::types::{BuyerInfo, RaffleId, Selection, SelectionOrigin, TicketNumber};
use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Header carrying the webhook shared secret.
const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// Request to open a hosted checkout session.
#[derive(Debug, Deserialize)]
pub struct CheckoutSessionRequest {
    /// The numbers being bought
    pub numbers: Vec<u32>,
    /// Package code when the set came from an unmodified package draw
    pub package_code: Option<String>,
    /// Buyer display name
    pub buyer_name: String,
    /// Buyer email
    pub buyer_email: String,
}

/// A created checkout session.
#[derive(Debug, Serialize)]
pub struct CheckoutSessionResponse {
    /// Gateway session identifier
    pub session_id: String,
    /// Hosted checkout URL to redirect the buyer to
    pub redirect_url: String,
}

/// Result of applying a payment notification.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// The numbers marked sold
    pub numbers: Vec<TicketNumber>,
}

/// Open a hosted checkout session for a selection.
///
/// Ticket state is untouched here; the numbers are only written when the
/// gateway's payment notification arrives.
pub async fn create_checkout_session(
    Path(raffle_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<CheckoutSessionRequest>,
) -> Result<Json<CheckoutSessionResponse>, AppError> {
    let raffle_id = RaffleId::from_uuid(raffle_id);
    let raffle = state
        .store
        .get_raffle(raffle_id)
        .await
        .map_err(crate::error::StorefrontError::from)?;

    let origin = match request.package_code {
        Some(code) => SelectionOrigin::Package { code },
        None => SelectionOrigin::Manual,
    };
    let selection =
        Selection::from_numbers(request.numbers.into_iter().map(TicketNumber), origin);
    let buyer = BuyerInfo::new(request.buyer_name, request.buyer_email);

    let session = payments::create_checkout(
        state.gateway.as_ref(),
        &raffle,
        &selection,
        &buyer,
        state.config.pricing.single_ticket_price,
    )
    .await?;

    Ok(Json(CheckoutSessionResponse {
        session_id: session.session_id,
        redirect_url: session.redirect_url,
    }))
}

/// Apply a gateway payment notification.
///
/// Authenticated by the `x-webhook-secret` header against the configured
/// shared secret. With no secret configured the endpoint refuses all
/// notifications rather than accepting them unauthenticated.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(notification): Json<PaymentNotification>,
) -> Result<Json<WebhookResponse>, AppError> {
    let Some(expected) = state.config.gateway.webhook_secret.as_deref() else {
        return Err(AppError::unavailable("webhook secret not configured"));
    };
    let presented = headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());
    if presented != Some(expected) {
        return Err(AppError::unauthorized("invalid webhook secret"));
    }

    let numbers =
        payments::handle_notification(state.store.as_ref(), &notification, state.clock.now())
            .await?;
    Ok(Json(WebhookResponse { numbers }))
}
