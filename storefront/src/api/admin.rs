//! Back-office endpoints.
//!
//! Raffle lifecycle, ticket bookkeeping, and the winner draw:
//! - POST /api/admin/raffles - create a raffle
//! - GET  /api/admin/raffles - list all raffles
//! - POST /api/admin/raffles/:id/activate - make one raffle active
//! - GET  /api/admin/raffles/:id/tickets - list tickets, optional status filter
//! - POST /api/admin/raffles/:id/confirm - confirm a buyer's pending group
//! - POST /api/admin/raffles/:id/cancel - cancel a buyer's pending group
//! - POST /api/admin/raffles/:id/draw - draw the winner

use crate::admin::{self, DrawResult, RaffleDraft};
use crate::error::AppError;
use crate::server::state::AppState;
use crate::types::{Raffle, RaffleId, Ticket, TicketNumber, TicketStatus};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Request / Response Types
// ============================================================================

/// Status filter for the ticket list.
#[derive(Debug, Deserialize)]
pub struct TicketListQuery {
    /// `pending` or `sold`; omitted means all
    pub status: Option<String>,
}

/// Target of a confirm or cancel operation.
#[derive(Debug, Deserialize)]
pub struct BuyerActionRequest {
    /// The buyer whose pending group to act on
    pub buyer_email: String,
    /// Must be `true`; these operations are irreversible
    pub confirm: bool,
}

/// Request to draw the winner.
#[derive(Debug, Deserialize)]
pub struct DrawRequest {
    /// Must be `true`; the draw is irreversible
    pub confirm: bool,
}

/// Numbers affected by a confirm or cancel.
#[derive(Debug, Serialize)]
pub struct BuyerActionResponse {
    /// The affected numbers, ascending
    pub numbers: Vec<TicketNumber>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a raffle. The new raffle starts inactive.
pub async fn create_raffle(
    State(state): State<AppState>,
    Json(draft): Json<RaffleDraft>,
) -> Result<Json<Raffle>, AppError> {
    let raffle = admin::create_raffle(state.store.as_ref(), draft, state.clock.now()).await?;
    Ok(Json(raffle))
}

/// List all raffles, creation order.
pub async fn list_raffles(State(state): State<AppState>) -> Result<Json<Vec<Raffle>>, AppError> {
    let raffles = state
        .store
        .list_raffles()
        .await
        .map_err(crate::error::StorefrontError::from)?;
    Ok(Json(raffles))
}

/// Make one raffle the active storefront raffle.
pub async fn activate_raffle(
    Path(raffle_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<()>, AppError> {
    admin::activate_raffle(state.store.as_ref(), RaffleId::from_uuid(raffle_id)).await?;
    Ok(Json(()))
}

/// List a raffle's tickets, optionally filtered by status.
pub async fn list_tickets(
    Path(raffle_id): Path<Uuid>,
    Query(query): Query<TicketListQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Ticket>>, AppError> {
    let status = match query.status.as_deref() {
        None => None,
        Some("pending") => Some(TicketStatus::Pending),
        Some("sold") => Some(TicketStatus::Sold),
        Some(other) => {
            return Err(AppError::bad_request(format!(
                "unknown status '{other}'; expected 'pending' or 'sold'"
            )));
        },
    };
    let tickets =
        admin::list_tickets(state.store.as_ref(), RaffleId::from_uuid(raffle_id), status).await?;
    Ok(Json(tickets))
}

/// Confirm a buyer's whole pending group as paid.
pub async fn confirm_buyer(
    Path(raffle_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<BuyerActionRequest>,
) -> Result<Json<BuyerActionResponse>, AppError> {
    let numbers = admin::confirm_buyer(
        state.store.as_ref(),
        RaffleId::from_uuid(raffle_id),
        &request.buyer_email,
        state.config.pricing.single_ticket_price,
        state.clock.now(),
        request.confirm,
    )
    .await?;
    Ok(Json(BuyerActionResponse { numbers }))
}

/// Cancel a buyer's whole pending group, freeing the numbers.
pub async fn cancel_buyer(
    Path(raffle_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<BuyerActionRequest>,
) -> Result<Json<BuyerActionResponse>, AppError> {
    let numbers = admin::cancel_buyer(
        state.store.as_ref(),
        RaffleId::from_uuid(raffle_id),
        &request.buyer_email,
        request.confirm,
    )
    .await?;
    Ok(Json(BuyerActionResponse { numbers }))
}

/// Draw the winner uniformly from the sold tickets.
pub async fn draw_winner(
    Path(raffle_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<DrawRequest>,
) -> Result<Json<DrawResult>, AppError> {
    let result = admin::draw_winner(
        state.store.as_ref(),
        state.random.as_ref(),
        RaffleId::from_uuid(raffle_id),
        request.confirm,
    )
    .await?;
    Ok(Json(result))
}
