//! Business metrics for the raffle storefront.
//!
//! This module provides Prometheus metrics for tracking business operations:
//! - Reservations (committed, conflicted, cancelled)
//! - Payments (notifications, revenue)
//! - Tickets (sold, available)
//! - Raffles (created)
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `rifa_reservations_total{status}` - Total reservation attempts by status
//! - `rifa_payment_notifications_total{status}` - Webhook notifications by outcome
//! - `rifa_payment_revenue_centavos_total` - Total revenue in centavos
//! - `rifa_tickets_sold_total` - Total tickets sold
//! - `rifa_raffles_created_total` - Total raffles created
//!
//! ## Gauges
//! - `rifa_tickets_available` - Current available tickets per raffle

use metrics::{describe_counter, describe_gauge};

/// Initialize and register all business metrics descriptions.
///
/// This should be called once at application startup, before any metrics are recorded.
pub fn register_business_metrics() {
    // Reservation metrics
    describe_counter!(
        "rifa_reservations_total",
        "Total number of reservation attempts by status (committed, conflicted, cancelled)"
    );

    // Payment metrics
    describe_counter!(
        "rifa_payment_notifications_total",
        "Total webhook payment notifications by outcome (applied, duplicate, rejected)"
    );
    describe_counter!(
        "rifa_payment_revenue_centavos_total",
        "Total revenue from confirmed payments in centavos"
    );

    // Ticket metrics
    describe_counter!("rifa_tickets_sold_total", "Total number of tickets sold");
    describe_gauge!(
        "rifa_tickets_available",
        "Current number of available tickets per raffle"
    );

    // Raffle metrics
    describe_counter!(
        "rifa_raffles_created_total",
        "Total number of raffles created"
    );

    tracing::info!("Business metrics registered");
}

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record a committed reservation batch.
///
/// # Arguments
///
/// * `quantity` - Number of tickets in the batch
pub fn record_reservation_committed(quantity: u32) {
    metrics::counter!("rifa_reservations_total", "status" => "committed").increment(1);
    tracing::debug!(quantity, "Recorded reservation_committed metric");
}

/// Record a reservation attempt lost to a conflicting batch.
pub fn record_reservation_conflict() {
    metrics::counter!("rifa_reservations_total", "status" => "conflicted").increment(1);
    tracing::debug!("Recorded reservation_conflict metric");
}

/// Record an admin cancellation of a pending group.
///
/// # Arguments
///
/// * `quantity` - Number of tickets released back to the pool
pub fn record_reservation_cancelled(quantity: u32) {
    metrics::counter!("rifa_reservations_total", "status" => "cancelled").increment(1);
    tracing::debug!(quantity, "Recorded reservation_cancelled metric");
}

/// Record tickets confirmed as sold, with the revenue they brought in.
///
/// # Arguments
///
/// * `quantity` - Number of tickets sold
/// * `revenue_centavos` - Amount charged in centavos
pub fn record_tickets_sold(quantity: u32, revenue_centavos: u64) {
    metrics::counter!("rifa_tickets_sold_total").increment(u64::from(quantity));
    metrics::counter!("rifa_payment_revenue_centavos_total").increment(revenue_centavos);
    tracing::debug!(quantity, revenue_centavos, "Recorded tickets_sold metric");
}

/// Record a webhook payment notification outcome.
///
/// # Arguments
///
/// * `outcome` - One of "applied", "duplicate", "rejected"
pub fn record_payment_notification(outcome: &'static str) {
    metrics::counter!("rifa_payment_notifications_total", "status" => outcome).increment(1);
    tracing::debug!(outcome, "Recorded payment_notification metric");
}

/// Record a raffle created.
pub fn record_raffle_created() {
    metrics::counter!("rifa_raffles_created_total").increment(1);
    tracing::debug!("Recorded raffle_created metric");
}

/// Update the available tickets gauge for a raffle.
///
/// # Arguments
///
/// * `raffle_id` - Raffle ID as string
/// * `available` - Current number of available tickets
pub fn update_tickets_available(raffle_id: &str, available: i64) {
    #[allow(clippy::cast_precision_loss)]
    metrics::gauge!("rifa_tickets_available", "raffle_id" => raffle_id.to_owned())
        .set(available as f64);
    tracing::debug!(raffle_id, available, "Updated tickets_available metric");
}
