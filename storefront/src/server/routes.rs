//! Router configuration for the storefront.
//!
//! Builds the complete Axum router with all endpoints.

use super::health::{health_check, readiness_check};
use super::state::AppState;
use crate::api::{admin, availability, checkout, reservations};
use axum::{
    Router,
    routing::{get, post},
};

/// Build the complete Axum router.
///
/// Configures all routes:
/// - Health checks
/// - Storefront browse endpoints (active raffle, availability, allocate, quote)
/// - Reservation and checkout endpoints
/// - Gateway webhook
/// - Back-office endpoints under /api/admin
///
/// # Arguments
///
/// - `state`: Application state to share with handlers
pub fn build_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/raffles", post(admin::create_raffle))
        .route("/raffles", get(admin::list_raffles))
        .route("/raffles/:id/activate", post(admin::activate_raffle))
        .route("/raffles/:id/tickets", get(admin::list_tickets))
        .route("/raffles/:id/confirm", post(admin::confirm_buyer))
        .route("/raffles/:id/cancel", post(admin::cancel_buyer))
        .route("/raffles/:id/draw", post(admin::draw_winner));

    let api_routes = Router::new()
        // Storefront browse
        .route("/raffle", get(availability::get_active_raffle))
        .route(
            "/raffles/:id/availability",
            get(availability::get_availability),
        )
        .route("/raffles/:id/allocate", post(availability::allocate))
        .route("/raffles/:id/quote", post(availability::quote))
        // Purchase paths
        .route(
            "/raffles/:id/reservations",
            post(reservations::create_reservation),
        )
        .route(
            "/raffles/:id/checkout-session",
            post(checkout::create_checkout_session),
        )
        .route("/webhook", post(checkout::webhook))
        // Back office
        .nest("/admin", admin_routes);

    Router::new()
        // Health checks (no authentication)
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // API routes under /api prefix
        .nest("/api", api_routes)
        .with_state(state)
}
