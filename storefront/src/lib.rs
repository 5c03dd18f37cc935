//! Raffle Storefront - a single-prize sweepstake ticket shop
//!
//! One raffle is active at a time; buyers pick numbered tickets out of a
//! fixed number space, pay by bank transfer (a 24h pending hold) or by
//! hosted card checkout, and an admin eventually draws the winner from
//! the sold tickets.
//!
//! # Architecture
//!
//! ```text
//! Buyer session (reducer):
//! ┌──────────────────────────────────────────────────────┐
//! │  SelectionReducer: browse → select → submit          │
//! │  state mutation pure, commit as a Future effect      │
//! └──────────────────────────────────────────────────────┘
//!          │ allocate / toggle            │ commit
//!          ▼                              ▼
//! ┌─────────────────────┐       ┌─────────────────────────┐
//! │  AvailabilityView   │◄──────│  TicketStore            │
//! │  (watch projection) │ feed  │  (atomic cond. batches) │
//! └─────────────────────┘       └─────────────────────────┘
//!                                        ▲
//!                      webhook           │
//! ┌─────────────────────┐  notification  │
//! │  PaymentGateway     │────────────────┘
//! │  (hosted checkout)  │
//! └─────────────────────┘
//! ```
//!
//! # Key Invariants
//!
//! - The store's conditional batch write is the single arbiter of who
//!   wins a race for a number; availability reads are advisory.
//! - Reservations are all-or-nothing: a batch with one lost number
//!   commits nothing.
//! - At most one raffle is active at any time.
//! - Random allocation and the winner draw are uniform, via an injected
//!   [`rifa_core::environment::RandomSource`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod admin;
pub mod allocation;
pub mod api;
pub mod availability;
pub mod config;
pub mod error;
pub mod metrics;
pub mod payment_gateway;
pub mod payments;
pub mod pricing;
pub mod reservations;
pub mod server;
pub mod session;
pub mod store;
pub mod types;

pub use availability::AvailabilityView;
pub use config::Config;
pub use error::{AppError, StorefrontError};
pub use payment_gateway::{MockPaymentGateway, PaymentGateway};
pub use session::{SelectionAction, SelectionReducer, SelectionState};
pub use store::{InMemoryTicketStore, TicketStore};
pub use types::*;
