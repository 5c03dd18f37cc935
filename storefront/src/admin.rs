//! Back-office operations.
//!
//! Raffle lifecycle (create, activate), bank-transfer bookkeeping
//! (confirm or cancel one buyer's pending group as a unit), ticket listing
//! with status filters, and the winner draw. The confirm/cancel/draw
//! operations are manual and irreversible, so they require an explicit
//! confirmation flag and abort without it.

use crate::error::StorefrontError;
use crate::metrics;
use crate::store::TicketStore;
use crate::types::{Money, Package, Raffle, RaffleId, Ticket, TicketNumber, TicketStatus};
use chrono::{DateTime, Utc};
use rifa_core::environment::RandomSource;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// Raffle Lifecycle
// ============================================================================

/// Everything needed to create a raffle, before validation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RaffleDraft {
    /// Prize / product name
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
}

impl RaffleDraft {
    /// Check the draft's internal consistency.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule as a message: the number space and
    /// every package price must be positive, every package must carry at
    /// least one paid ticket, and package sizes must be distinct so the
    /// tiered pricing decomposition is unambiguous.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if self.total_tickets == 0 {
            return Err("total_tickets must be positive".to_string());
        }
        let mut sizes = HashSet::new();
        for package in &self.packages {
            if package.code.trim().is_empty() {
                return Err("package code must not be empty".to_string());
            }
            if package.price.is_zero() {
                return Err(format!("package '{}' must have a positive price", package.code));
            }
            if package.paid_tickets == 0 {
                return Err(format!(
                    "package '{}' must include at least one paid ticket",
                    package.code
                ));
            }
            if !sizes.insert(package.total_tickets()) {
                return Err(format!(
                    "package '{}' duplicates the total ticket count of another package",
                    package.code
                ));
            }
        }
        Ok(())
    }
}

/// Create a raffle from a validated draft. The new raffle starts inactive.
///
/// # Errors
///
/// Returns [`StorefrontError::Validation`] for an inconsistent draft, or a
/// store error if persistence fails.
pub async fn create_raffle(
    store: &dyn TicketStore,
    draft: RaffleDraft,
    now: DateTime<Utc>,
) -> Result<Raffle, StorefrontError> {
    draft.validate().map_err(StorefrontError::Validation)?;

    let raffle = Raffle {
        id: RaffleId::new(),
        product_name: draft.product_name,
        title: draft.title,
        description: draft.description,
        image_url: draft.image_url,
        total_tickets: draft.total_tickets,
        is_active: false,
        packages: draft.packages,
        created_at: now,
    };

    store.create_raffle(raffle.clone()).await?;
    metrics::record_raffle_created();
    tracing::info!(raffle_id = %raffle.id, title = %raffle.title, "Raffle created");
    Ok(raffle)
}

/// Make one raffle the active storefront raffle, deactivating all others.
///
/// # Errors
///
/// Returns [`StorefrontError::NotFound`] for an unknown raffle.
pub async fn activate_raffle(
    store: &dyn TicketStore,
    raffle_id: RaffleId,
) -> Result<(), StorefrontError> {
    store.activate_raffle(raffle_id).await?;
    tracing::info!(raffle_id = %raffle_id, "Raffle activated");
    Ok(())
}

// ============================================================================
// Ticket Listing
// ============================================================================

/// List a raffle's persisted tickets, optionally filtered by status,
/// ascending by number.
///
/// # Errors
///
/// Returns [`StorefrontError::NotFound`] for an unknown raffle.
pub async fn list_tickets(
    store: &dyn TicketStore,
    raffle_id: RaffleId,
    status: Option<TicketStatus>,
) -> Result<Vec<Ticket>, StorefrontError> {
    let mut tickets = store.list_tickets(raffle_id).await?;
    if let Some(wanted) = status {
        tickets.retain(|t| t.status == wanted);
    }
    tickets.sort_by_key(|t| t.number);
    Ok(tickets)
}

// ============================================================================
// Manual Bank-Transfer Bookkeeping
// ============================================================================

/// Confirm one buyer's entire pending group as paid.
///
/// Manual and irreversible: `confirm` must be `true` or the operation
/// aborts without touching anything.
///
/// # Errors
///
/// - [`StorefrontError::ManualActionAborted`] when `confirm` is `false`
/// - [`StorefrontError::NotFound`] when the buyer has no pending tickets
pub async fn confirm_buyer(
    store: &dyn TicketStore,
    raffle_id: RaffleId,
    buyer_email: &str,
    unit_price: Money,
    now: DateTime<Utc>,
    confirm: bool,
) -> Result<Vec<TicketNumber>, StorefrontError> {
    if !confirm {
        return Err(StorefrontError::ManualActionAborted);
    }

    let confirmed = store
        .confirm_buyer(raffle_id, buyer_email.to_string(), now)
        .await?;
    if confirmed.is_empty() {
        return Err(StorefrontError::NotFound(format!(
            "no pending tickets for {buyer_email}"
        )));
    }

    #[allow(clippy::cast_possible_truncation)]
    let quantity = confirmed.len() as u32;
    metrics::record_tickets_sold(quantity, unit_price.multiply(quantity).centavos());
    tracing::info!(
        raffle_id = %raffle_id,
        buyer_email,
        numbers = ?confirmed,
        "Pending group confirmed as sold"
    );
    Ok(confirmed)
}

/// Cancel one buyer's entire pending group, freeing the numbers.
///
/// Used when a bank transfer never arrives (typically after the 24h hold
/// lapses). Sold tickets are never touched.
///
/// # Errors
///
/// - [`StorefrontError::ManualActionAborted`] when `confirm` is `false`
/// - [`StorefrontError::NotFound`] when the buyer has no pending tickets
pub async fn cancel_buyer(
    store: &dyn TicketStore,
    raffle_id: RaffleId,
    buyer_email: &str,
    confirm: bool,
) -> Result<Vec<TicketNumber>, StorefrontError> {
    if !confirm {
        return Err(StorefrontError::ManualActionAborted);
    }

    let freed = store
        .cancel_buyer(raffle_id, buyer_email.to_string())
        .await?;
    if freed.is_empty() {
        return Err(StorefrontError::NotFound(format!(
            "no pending tickets for {buyer_email}"
        )));
    }

    #[allow(clippy::cast_possible_truncation)]
    let quantity = freed.len() as u32;
    metrics::record_reservation_cancelled(quantity);
    tracing::info!(
        raffle_id = %raffle_id,
        buyer_email,
        numbers = ?freed,
        "Pending group cancelled, numbers freed"
    );
    Ok(freed)
}

// ============================================================================
// Winner Draw
// ============================================================================

/// The winning ticket of a draw.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawResult {
    /// The winning number
    pub number: TicketNumber,
    /// Who holds it
    pub buyer_name: String,
    /// Winner contact email
    pub buyer_email: String,
}

/// Draw a winner uniformly from the raffle's sold tickets.
///
/// Pending tickets are not eligible. Requires the explicit confirmation
/// flag like the other manual operations.
///
/// # Errors
///
/// - [`StorefrontError::ManualActionAborted`] when `confirm` is `false`
/// - [`StorefrontError::NotFound`] when the raffle has no sold tickets
pub async fn draw_winner(
    store: &dyn TicketStore,
    random: &dyn RandomSource,
    raffle_id: RaffleId,
    confirm: bool,
) -> Result<DrawResult, StorefrontError> {
    if !confirm {
        return Err(StorefrontError::ManualActionAborted);
    }

    let sold = list_tickets(store, raffle_id, Some(TicketStatus::Sold)).await?;
    if sold.is_empty() {
        return Err(StorefrontError::NotFound(
            "no sold tickets to draw from".to_string(),
        ));
    }

    let winner = &sold[random.pick_index(sold.len())];
    tracing::info!(
        raffle_id = %raffle_id,
        number = %winner.number,
        buyer_email = %winner.buyer.email,
        "Winner drawn"
    );
    Ok(DrawResult {
        number: winner.number,
        buyer_name: winner.buyer.name.clone(),
        buyer_email: winner.buyer.email.clone(),
    })
}
