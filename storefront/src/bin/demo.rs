//! Selection session demo.
//!
//! Drives one buyer session through the reducer runtime against the
//! in-memory store: create and activate a raffle, draw a package's
//! numbers, drop one, pick another by hand, then submit the reservation.
//!
//! ```bash
//! cargo run --bin demo
//! ```

use rifa_core::environment::{Clock, SystemClock, ThreadRngSource};
use rifa_runtime::Store;
use rifa_storefront::admin::{self, RaffleDraft};
use rifa_storefront::availability::AvailabilityView;
use rifa_storefront::session::{
    SelectionAction, SelectionEnvironment, SelectionPhase, SelectionReducer, SelectionState,
};
use rifa_storefront::store::{InMemoryTicketStore, TicketStore};
use rifa_storefront::types::{BuyerInfo, Money, Package, TicketNumber};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "demo=info,rifa_storefront=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let clock = Arc::new(SystemClock);
    let store: Arc<dyn TicketStore> = InMemoryTicketStore::shared();

    // Seed a raffle the way the back office would.
    let raffle = admin::create_raffle(
        store.as_ref(),
        RaffleDraft {
            product_name: "Motorcycle".to_string(),
            title: "Win a motorcycle".to_string(),
            description: "One winner takes the bike.".to_string(),
            image_url: None,
            total_tickets: 100,
            packages: vec![
                Package::new("normal".to_string(), Money::from_pesos(150), 1, 0),
                Package::new("5x".to_string(), Money::from_pesos(500), 5, 1),
                Package::new("vip10".to_string(), Money::from_pesos(1000), 10, 0),
            ],
        },
        clock.now(),
    )
    .await?;
    admin::activate_raffle(store.as_ref(), raffle.id).await?;

    let availability =
        AvailabilityView::new(raffle.total_tickets, store.watch_tickets(raffle.id).await?);
    info!(available = availability.available_count(), "Raffle open");

    let env = SelectionEnvironment {
        clock,
        random: Arc::new(ThreadRngSource),
        store: Arc::clone(&store),
        raffle: raffle.clone(),
        availability,
    };
    let session = Store::new(SelectionState::default(), SelectionReducer::new(), env);

    // Draw the 5X package (6 tickets), then tweak the selection by hand.
    session
        .send(SelectionAction::ChoosePackage {
            code: "5x".to_string(),
        })
        .await;
    let numbers = session.state(|s| s.selection.numbers()).await;
    info!(?numbers, "Package drawn");

    if let Some(first) = numbers.first().copied() {
        session
            .send(SelectionAction::ToggleNumber { number: first })
            .await;
    }
    session
        .send(SelectionAction::ToggleNumber {
            number: TicketNumber(42),
        })
        .await;

    // Submit; the commit runs as an effect and feeds the receipt back in.
    session
        .send(SelectionAction::SubmitReservation {
            buyer: BuyerInfo::new("Ana".to_string(), "ana@example.com".to_string()),
        })
        .await;

    let (phase, receipt, error) = session
        .state(|s| (s.phase, s.receipt.clone(), s.last_error.clone()))
        .await;
    match (phase, receipt) {
        (SelectionPhase::Reserved, Some(receipt)) => {
            info!(
                numbers = ?receipt.numbers,
                hold_expires_at = %receipt.hold_expires_at,
                "Reservation committed"
            );
        },
        _ => {
            info!(?error, "Reservation did not commit");
        },
    }

    Ok(())
}
