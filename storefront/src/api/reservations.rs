//! Reservation endpoints.
//!
//! - POST /api/raffles/:id/reservations - commit a selection as a pending
//!   reservation (the bank-transfer path)

use crate::error::AppError;
use crate::reservations;
use crate::server::state::AppState;
use crate::types::{BuyerInfo, RaffleId, Selection, SelectionOrigin, TicketNumber};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to reserve a set of numbers for a buyer.
#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    /// The numbers to reserve
    pub numbers: Vec<u32>,
    /// Buyer display name
    pub buyer_name: String,
    /// Buyer email
    pub buyer_email: String,
}

/// A committed reservation.
#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    /// The reserved numbers, ascending
    pub numbers: Vec<TicketNumber>,
    /// When the payment hold lapses
    pub hold_expires_at: DateTime<Utc>,
    /// Bank-transfer instructions shown to the buyer
    pub instructions: String,
}

/// Commit a selection as a pending reservation.
///
/// Atomic all-or-nothing: if any requested number was taken since the
/// buyer selected it, the whole request fails with 409 and nothing is
/// reserved.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/raffles/$RAFFLE/reservations \
///   -H 'Content-Type: application/json' \
///   -d '{"numbers": [3, 7, 9], "buyer_name": "Ana", "buyer_email": "ana@example.com"}'
/// ```
pub async fn create_reservation(
    Path(raffle_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>), AppError> {
    let raffle_id = RaffleId::from_uuid(raffle_id);
    let raffle = state
        .store
        .get_raffle(raffle_id)
        .await
        .map_err(crate::error::StorefrontError::from)?;

    let selection = Selection::from_numbers(
        request.numbers.into_iter().map(TicketNumber),
        SelectionOrigin::Manual,
    );
    let buyer = BuyerInfo::new(request.buyer_name, request.buyer_email);

    let receipt = reservations::commit(
        state.store.as_ref(),
        &raffle,
        &selection,
        &buyer,
        state.clock.now(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ReservationResponse {
            instructions: format!(
                "Transfer the total for your tickets and reply with the receipt; \
                 your numbers are held until {}.",
                receipt.hold_expires_at.format("%Y-%m-%d %H:%M UTC")
            ),
            numbers: receipt.numbers,
            hold_expires_at: receipt.hold_expires_at,
        }),
    ))
}
