//! Storefront browse endpoints.
//!
//! Read queries plus the two stateless selection helpers:
//! - GET /api/raffle - the active raffle with its packages and counts
//! - GET /api/raffles/:id/availability - number-level availability
//! - POST /api/raffles/:id/allocate - draw random numbers for a package or quantity
//! - POST /api/raffles/:id/quote - price an explicit set of numbers

use crate::allocation;
use crate::error::AppError;
use crate::pricing;
use crate::server::state::AppState;
use crate::types::{
    Package, PromotionHint, Quote, Raffle, RaffleId, Selection, SelectionOrigin, Ticket,
    TicketNumber, TicketStatus,
};
use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

// ============================================================================
// Response Types
// ============================================================================

/// The active raffle as shown on the storefront.
#[derive(Debug, Serialize)]
pub struct RaffleResponse {
    /// Raffle ID
    pub id: RaffleId,
    /// Prize name
    pub product_name: String,
    /// Storefront title
    pub title: String,
    /// Longer description
    pub description: String,
    /// Prize image URL
    pub image_url: Option<String>,
    /// Size of the number space
    pub total_tickets: u32,
    /// Purchasable bundles
    pub packages: Vec<Package>,
    /// Numbers still available
    pub available: u32,
    /// Numbers reserved pending payment
    pub pending: u32,
    /// Numbers sold
    pub sold: u32,
}

/// Number-level availability for one raffle.
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    /// Raffle ID
    pub raffle_id: RaffleId,
    /// Size of the number space
    pub total_tickets: u32,
    /// Numbers still available, ascending
    pub available_numbers: Vec<TicketNumber>,
    /// Numbers reserved pending payment
    pub pending: u32,
    /// Numbers sold
    pub sold: u32,
}

/// A priced selection, as returned by allocate and quote.
#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    /// The selected numbers, ascending
    pub numbers: Vec<TicketNumber>,
    /// Package code when the selection is package-bound
    pub package_code: Option<String>,
    /// The price breakdown
    pub quote: Quote,
    /// Upsell nudge, when one applies
    pub promotion_hint: Option<PromotionHint>,
}

// ============================================================================
// Request Types
// ============================================================================

/// Request to draw random numbers. Exactly one of the two fields is set.
#[derive(Debug, Deserialize)]
pub struct AllocateRequest {
    /// Draw a package's full ticket count, bound to the package price
    pub package_code: Option<String>,
    /// Draw an ad-hoc quantity at tiered pricing
    pub quantity: Option<u32>,
}

/// Request to price an explicit set of numbers.
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    /// The numbers to price
    pub numbers: Vec<u32>,
    /// Package code when the set came from an unmodified package draw
    pub package_code: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Get the active raffle, the storefront's landing query.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/api/raffle
/// ```
pub async fn get_active_raffle(
    State(state): State<AppState>,
) -> Result<Json<RaffleResponse>, AppError> {
    let raffle = state
        .store
        .active_raffle()
        .await
        .map_err(crate::error::StorefrontError::from)?
        .ok_or_else(|| AppError::not_found("no active raffle"))?;

    let tickets = state
        .store
        .list_tickets(raffle.id)
        .await
        .map_err(crate::error::StorefrontError::from)?;
    let (pending, sold) = count_statuses(&tickets);

    #[allow(clippy::cast_possible_truncation)]
    let taken = tickets.len() as u32;
    Ok(Json(RaffleResponse {
        id: raffle.id,
        product_name: raffle.product_name,
        title: raffle.title,
        description: raffle.description,
        image_url: raffle.image_url,
        total_tickets: raffle.total_tickets,
        packages: raffle.packages,
        available: raffle.total_tickets.saturating_sub(taken),
        pending,
        sold,
    }))
}

/// Get number-level availability for one raffle.
pub async fn get_availability(
    Path(raffle_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let raffle_id = RaffleId::from_uuid(raffle_id);
    let (raffle, tickets) = load_raffle(&state, raffle_id).await?;
    let (pending, sold) = count_statuses(&tickets);

    Ok(Json(AvailabilityResponse {
        raffle_id,
        total_tickets: raffle.total_tickets,
        available_numbers: available_numbers(&raffle, &tickets),
        pending,
        sold,
    }))
}

/// Draw random numbers for a package or an ad-hoc quantity.
///
/// The draw is advisory: nothing is reserved until the selection is
/// submitted, so two buyers can be handed overlapping numbers and the
/// reservation commit decides who keeps them.
pub async fn allocate(
    Path(raffle_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<AllocateRequest>,
) -> Result<Json<SelectionResponse>, AppError> {
    let raffle_id = RaffleId::from_uuid(raffle_id);
    let (raffle, tickets) = load_raffle(&state, raffle_id).await?;
    let pool = available_numbers(&raffle, &tickets);

    let selection = match (&request.package_code, request.quantity) {
        (Some(code), None) => {
            let package = raffle
                .package(code)
                .ok_or_else(|| AppError::not_found(format!("package '{code}'")))?;
            allocation::allocate_package(&pool, package, state.random.as_ref())?
        },
        (None, Some(quantity)) => {
            allocation::allocate_quantity(&pool, quantity, state.random.as_ref())?
        },
        _ => {
            return Err(AppError::bad_request(
                "provide exactly one of package_code or quantity",
            ));
        },
    };

    selection_response(&raffle, &selection, &state)
}

/// Price an explicit set of numbers at tiered (or package) pricing.
pub async fn quote(
    Path(raffle_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<SelectionResponse>, AppError> {
    let raffle_id = RaffleId::from_uuid(raffle_id);
    let (raffle, _tickets) = load_raffle(&state, raffle_id).await?;

    let origin = match request.package_code {
        Some(code) => SelectionOrigin::Package { code },
        None => SelectionOrigin::Manual,
    };
    let selection =
        Selection::from_numbers(request.numbers.into_iter().map(TicketNumber), origin);
    if let Some(outside) = selection.numbers().iter().find(|n| !raffle.contains(**n)) {
        return Err(AppError::validation(format!(
            "ticket number {outside} is outside this raffle"
        )));
    }

    selection_response(&raffle, &selection, &state)
}

// ============================================================================
// Helpers
// ============================================================================

async fn load_raffle(
    state: &AppState,
    raffle_id: RaffleId,
) -> Result<(Raffle, Vec<Ticket>), AppError> {
    let raffle = state
        .store
        .get_raffle(raffle_id)
        .await
        .map_err(crate::error::StorefrontError::from)?;
    let tickets = state
        .store
        .list_tickets(raffle_id)
        .await
        .map_err(crate::error::StorefrontError::from)?;
    Ok((raffle, tickets))
}

fn available_numbers(raffle: &Raffle, tickets: &[Ticket]) -> Vec<TicketNumber> {
    let taken: BTreeSet<TicketNumber> = tickets.iter().map(|t| t.number).collect();
    (1..=raffle.total_tickets)
        .map(TicketNumber)
        .filter(|n| !taken.contains(n))
        .collect()
}

fn count_statuses(tickets: &[Ticket]) -> (u32, u32) {
    #[allow(clippy::cast_possible_truncation)]
    let pending = tickets
        .iter()
        .filter(|t| t.status == TicketStatus::Pending)
        .count() as u32;
    #[allow(clippy::cast_possible_truncation)]
    let sold = tickets
        .iter()
        .filter(|t| t.status == TicketStatus::Sold)
        .count() as u32;
    (pending, sold)
}

fn selection_response(
    raffle: &Raffle,
    selection: &Selection,
    state: &AppState,
) -> Result<Json<SelectionResponse>, AppError> {
    let quote = pricing::quote(
        selection,
        &raffle.packages,
        state.config.pricing.single_ticket_price,
    )?;
    let package_code = match selection.origin() {
        SelectionOrigin::Package { code } => Some(code.clone()),
        SelectionOrigin::Manual => None,
    };
    Ok(Json(SelectionResponse {
        numbers: selection.numbers(),
        package_code,
        quote,
        promotion_hint: pricing::promotion_hint(selection, &raffle.packages),
    }))
}
