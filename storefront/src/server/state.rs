//! Application state for the storefront HTTP server.
//!
//! Contains all shared resources needed by HTTP handlers: the ticket
//! store, the payment gateway, the injected clock and random source, and
//! the loaded configuration.

use crate::config::Config;
use crate::payment_gateway::PaymentGateway;
use crate::store::TicketStore;
use rifa_core::environment::{Clock, RandomSource};
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply via Arc) for each request. Handlers never reach for
/// ambient time or randomness; they go through the injected trait objects
/// so the whole HTTP surface is deterministic under test.
#[derive(Clone)]
pub struct AppState {
    /// Ticket store, the single source of truth for tickets and raffles
    pub store: Arc<dyn TicketStore>,

    /// Payment gateway for hosted card checkout
    pub gateway: Arc<dyn PaymentGateway>,

    /// Time source
    pub clock: Arc<dyn Clock>,

    /// Uniform randomness for allocation and the winner draw
    pub random: Arc<dyn RandomSource>,

    /// Loaded configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        store: Arc<dyn TicketStore>,
        gateway: Arc<dyn PaymentGateway>,
        clock: Arc<dyn Clock>,
        random: Arc<dyn RandomSource>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            store,
            gateway,
            clock,
            random,
            config,
        }
    }
}
