//! Buyer selection session.
//!
//! One reducer owns the whole browse-select-reserve flow: package and
//! quantity allocation, manual number toggling, and the reservation
//! submit. State mutation is synchronous and pure; the only I/O is the
//! reservation commit, expressed as a `Future` effect whose outcome feeds
//! back in as an action.

use crate::allocation;
use crate::availability::AvailabilityView;
use crate::reservations::{self, ReservationReceipt};
use crate::store::TicketStore;
use crate::types::{BuyerInfo, Raffle, Selection, TicketNumber};
use rifa_core::environment::{Clock, RandomSource};
use rifa_core::{SmallVec, async_effect, effect::Effect, reducer::Reducer, smallvec};
use std::sync::Arc;

// ============================================================================
// State
// ============================================================================

/// Where the session is in the reserve flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SelectionPhase {
    /// Building a selection
    #[default]
    Browsing,
    /// A reservation commit is in flight; further submits are rejected
    Submitting,
    /// The reservation committed; the receipt is available
    Reserved,
}

/// State of one buyer's selection session.
#[derive(Clone, Debug, Default)]
pub struct SelectionState {
    /// The numbers currently selected
    pub selection: Selection,
    /// Flow phase
    pub phase: SelectionPhase,
    /// Receipt of a committed reservation, once phase is `Reserved`
    pub receipt: Option<ReservationReceipt>,
    /// Last user-visible error, cleared on the next successful action
    pub last_error: Option<String>,
}

// ============================================================================
// Actions
// ============================================================================

/// Everything a selection session can receive: buyer commands plus the
/// feedback events produced by the commit effect.
#[derive(Clone, Debug)]
pub enum SelectionAction {
    /// Allocate a package's worth of random numbers
    ChoosePackage {
        /// Package code, e.g. `"5x"`
        code: String,
    },
    /// Allocate an ad-hoc quantity of random numbers
    RequestQuantity {
        /// How many tickets
        quantity: u32,
    },
    /// Add or remove one number by hand
    ToggleNumber {
        /// The number to toggle
        number: TicketNumber,
    },
    /// Drop the whole selection and start over
    ClearSelection,
    /// Submit the current selection as a pending reservation
    SubmitReservation {
        /// Buyer contact info
        buyer: BuyerInfo,
    },
    /// Feedback: the commit succeeded
    ReservationCommitted {
        /// The committed receipt
        receipt: ReservationReceipt,
    },
    /// Feedback: the commit was rejected
    ReservationRejected {
        /// User-visible rejection message
        message: String,
    },
}

// ============================================================================
// Environment
// ============================================================================

/// Injected dependencies for a selection session.
pub struct SelectionEnvironment {
    /// Time source
    pub clock: Arc<dyn Clock>,
    /// Uniform randomness for allocation
    pub random: Arc<dyn RandomSource>,
    /// The ticket store, used only by the commit effect
    pub store: Arc<dyn TicketStore>,
    /// The raffle the session is shopping in
    pub raffle: Raffle,
    /// Live availability view over the raffle's ticket feed
    pub availability: AvailabilityView,
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the selection session.
#[derive(Clone, Copy, Debug, Default)]
pub struct SelectionReducer;

impl SelectionReducer {
    /// Creates a new selection reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for SelectionReducer {
    type State = SelectionState;
    type Action = SelectionAction;
    type Environment = SelectionEnvironment;

    fn reduce(
        &self,
        state: &mut SelectionState,
        action: SelectionAction,
        env: &SelectionEnvironment,
    ) -> SmallVec<[Effect<SelectionAction>; 4]> {
        match action {
            SelectionAction::ChoosePackage { code } => {
                if state.phase == SelectionPhase::Submitting {
                    return smallvec![Effect::None];
                }
                let Some(package) = env.raffle.package(&code) else {
                    state.last_error = Some(format!("unknown package '{code}'"));
                    return smallvec![Effect::None];
                };
                let pool = env.availability.available_numbers();
                match allocation::allocate_package(&pool, package, env.random.as_ref()) {
                    Ok(selection) => {
                        state.selection = selection;
                        state.phase = SelectionPhase::Browsing;
                        state.receipt = None;
                        state.last_error = None;
                    },
                    Err(err) => state.last_error = Some(err.to_string()),
                }
                smallvec![Effect::None]
            },

            SelectionAction::RequestQuantity { quantity } => {
                if state.phase == SelectionPhase::Submitting {
                    return smallvec![Effect::None];
                }
                let pool = env.availability.available_numbers();
                match allocation::allocate_quantity(&pool, quantity, env.random.as_ref()) {
                    Ok(selection) => {
                        state.selection = selection;
                        state.phase = SelectionPhase::Browsing;
                        state.receipt = None;
                        state.last_error = None;
                    },
                    Err(err) => state.last_error = Some(err.to_string()),
                }
                smallvec![Effect::None]
            },

            SelectionAction::ToggleNumber { number } => {
                if state.phase == SelectionPhase::Submitting {
                    return smallvec![Effect::None];
                }
                let snapshot = env.availability.snapshot();
                match allocation::toggle_number(
                    &state.selection,
                    number,
                    &snapshot,
                    env.raffle.total_tickets,
                ) {
                    Ok(selection) => {
                        state.selection = selection;
                        state.last_error = None;
                    },
                    Err(err) => state.last_error = Some(err.to_string()),
                }
                smallvec![Effect::None]
            },

            SelectionAction::ClearSelection => {
                if state.phase == SelectionPhase::Submitting {
                    return smallvec![Effect::None];
                }
                *state = SelectionState::default();
                smallvec![Effect::None]
            },

            SelectionAction::SubmitReservation { buyer } => {
                if state.phase == SelectionPhase::Submitting {
                    state.last_error = Some("a reservation is already in flight".to_string());
                    return smallvec![Effect::None];
                }
                if state.selection.is_empty() {
                    state.last_error = Some("select at least one ticket first".to_string());
                    return smallvec![Effect::None];
                }
                if let Err(message) = buyer.validate() {
                    state.last_error = Some(message);
                    return smallvec![Effect::None];
                }

                state.phase = SelectionPhase::Submitting;
                state.last_error = None;

                let store = Arc::clone(&env.store);
                let raffle = env.raffle.clone();
                let selection = state.selection.clone();
                let now = env.clock.now();
                smallvec![async_effect! {
                    let outcome =
                        reservations::commit(store.as_ref(), &raffle, &selection, &buyer, now)
                            .await;
                    Some(match outcome {
                        Ok(receipt) => SelectionAction::ReservationCommitted { receipt },
                        Err(err) => SelectionAction::ReservationRejected {
                            message: err.to_string(),
                        },
                    })
                }]
            },

            SelectionAction::ReservationCommitted { receipt } => {
                state.phase = SelectionPhase::Reserved;
                state.receipt = Some(receipt);
                state.last_error = None;
                smallvec![Effect::None]
            },

            SelectionAction::ReservationRejected { message } => {
                // Back to browsing; the selection is kept so the buyer can
                // drop the lost numbers and resubmit.
                state.phase = SelectionPhase::Browsing;
                state.receipt = None;
                state.last_error = Some(message);
                smallvec![Effect::None]
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::{InMemoryTicketStore, TicketSet};
    use crate::types::{Money, Package, RaffleId, SelectionOrigin};
    use chrono::Utc;
    use rifa_runtime::Store;
    use rifa_testing::{FirstKRandom, ReducerTest, assertions, test_clock};
    use tokio::sync::watch;

    fn sample_raffle() -> Raffle {
        Raffle {
            id: RaffleId::new(),
            product_name: "Motorcycle".to_string(),
            title: "Win a motorcycle".to_string(),
            description: String::new(),
            image_url: None,
            total_tickets: 10,
            is_active: true,
            packages: vec![
                Package::new("normal".to_string(), Money::from_pesos(150), 1, 0),
                Package::new("5x".to_string(), Money::from_pesos(500), 5, 1),
            ],
            created_at: Utc::now(),
        }
    }

    fn offline_env(raffle: Raffle) -> SelectionEnvironment {
        let (_sender, receiver) = watch::channel(TicketSet::default());
        SelectionEnvironment {
            clock: Arc::new(test_clock()),
            random: Arc::new(FirstKRandom),
            store: Arc::new(InMemoryTicketStore::new()),
            availability: AvailabilityView::new(raffle.total_tickets, receiver),
            raffle,
        }
    }

    fn ana() -> BuyerInfo {
        BuyerInfo::new("Ana".to_string(), "ana@example.com".to_string())
    }

    #[test]
    fn choose_package_allocates_its_full_ticket_count() {
        ReducerTest::new(SelectionReducer::new())
            .with_env(offline_env(sample_raffle()))
            .given_state(SelectionState::default())
            .when_action(SelectionAction::ChoosePackage {
                code: "5x".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.selection.count(), 6);
                assert_eq!(
                    state.selection.origin(),
                    &SelectionOrigin::Package {
                        code: "5x".to_string()
                    }
                );
                assert!(state.last_error.is_none());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn unknown_package_sets_an_error_without_touching_the_selection() {
        ReducerTest::new(SelectionReducer::new())
            .with_env(offline_env(sample_raffle()))
            .given_state(SelectionState::default())
            .when_action(SelectionAction::ChoosePackage {
                code: "vip99".to_string(),
            })
            .then_state(|state| {
                assert!(state.selection.is_empty());
                assert!(state.last_error.as_deref().unwrap().contains("vip99"));
            })
            .run();
    }

    #[test]
    fn toggling_a_selected_number_removes_it_and_drops_the_package_binding() {
        let initial = SelectionState {
            selection: Selection::from_numbers(
                (1..=6).map(TicketNumber),
                SelectionOrigin::Package {
                    code: "5x".to_string(),
                },
            ),
            ..SelectionState::default()
        };

        ReducerTest::new(SelectionReducer::new())
            .with_env(offline_env(sample_raffle()))
            .given_state(initial)
            .when_action(SelectionAction::ToggleNumber {
                number: TicketNumber(3),
            })
            .then_state(|state| {
                assert_eq!(state.selection.count(), 5);
                assert!(!state.selection.contains(TicketNumber(3)));
                assert_eq!(state.selection.origin(), &SelectionOrigin::Manual);
            })
            .run();
    }

    #[test]
    fn submit_with_an_empty_selection_is_rejected_locally() {
        ReducerTest::new(SelectionReducer::new())
            .with_env(offline_env(sample_raffle()))
            .given_state(SelectionState::default())
            .when_action(SelectionAction::SubmitReservation { buyer: ana() })
            .then_state(|state| {
                assert_eq!(state.phase, SelectionPhase::Browsing);
                assert!(state.last_error.is_some());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn submit_moves_to_submitting_and_produces_a_commit_effect() {
        let initial = SelectionState {
            selection: Selection::from_numbers([TicketNumber(7)], SelectionOrigin::Manual),
            ..SelectionState::default()
        };

        ReducerTest::new(SelectionReducer::new())
            .with_env(offline_env(sample_raffle()))
            .given_state(initial)
            .when_action(SelectionAction::SubmitReservation { buyer: ana() })
            .then_state(|state| {
                assert_eq!(state.phase, SelectionPhase::Submitting);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn resubmitting_while_in_flight_produces_no_effect() {
        let initial = SelectionState {
            selection: Selection::from_numbers([TicketNumber(7)], SelectionOrigin::Manual),
            phase: SelectionPhase::Submitting,
            ..SelectionState::default()
        };

        ReducerTest::new(SelectionReducer::new())
            .with_env(offline_env(sample_raffle()))
            .given_state(initial)
            .when_action(SelectionAction::SubmitReservation { buyer: ana() })
            .then_state(|state| {
                assert_eq!(state.phase, SelectionPhase::Submitting);
                assert!(state.last_error.is_some());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[tokio::test]
    async fn full_submit_round_trip_through_the_runtime() {
        let raffle = sample_raffle();
        let store = InMemoryTicketStore::new();
        store.create_raffle(raffle.clone()).await.unwrap();
        let store: Arc<dyn TicketStore> = Arc::new(store);
        let receiver = store.watch_tickets(raffle.id).await.unwrap();

        let env = SelectionEnvironment {
            clock: Arc::new(test_clock()),
            random: Arc::new(FirstKRandom),
            store: Arc::clone(&store),
            availability: AvailabilityView::new(raffle.total_tickets, receiver),
            raffle: raffle.clone(),
        };
        let runtime = Store::new(SelectionState::default(), SelectionReducer::new(), env);

        runtime
            .send(SelectionAction::RequestQuantity { quantity: 3 })
            .await;
        runtime
            .send(SelectionAction::SubmitReservation { buyer: ana() })
            .await;

        let (phase, receipt) = runtime
            .state(|s| (s.phase, s.receipt.clone()))
            .await;
        assert_eq!(phase, SelectionPhase::Reserved);
        let receipt = receipt.unwrap();
        assert_eq!(receipt.numbers.len(), 3);
        assert_eq!(store.list_tickets(raffle.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn lost_race_feeds_back_as_a_rejection() {
        let raffle = sample_raffle();
        let store = InMemoryTicketStore::new();
        store.create_raffle(raffle.clone()).await.unwrap();
        // Someone else already holds 1.
        store
            .reserve_pending(
                raffle.id,
                vec![TicketNumber(1)],
                BuyerInfo::new("Bea".to_string(), "bea@example.com".to_string()),
                Utc::now(),
            )
            .await
            .unwrap();

        let store: Arc<dyn TicketStore> = Arc::new(store);
        // A stale feed that still shows every number available.
        let (_sender, receiver) = watch::channel(TicketSet::default());
        let env = SelectionEnvironment {
            clock: Arc::new(test_clock()),
            random: Arc::new(FirstKRandom),
            store: Arc::clone(&store),
            availability: AvailabilityView::new(raffle.total_tickets, receiver),
            raffle: raffle.clone(),
        };
        let runtime = Store::new(SelectionState::default(), SelectionReducer::new(), env);

        runtime
            .send(SelectionAction::RequestQuantity { quantity: 2 })
            .await;
        runtime
            .send(SelectionAction::SubmitReservation { buyer: ana() })
            .await;

        let (phase, error) = runtime
            .state(|s| (s.phase, s.last_error.clone()))
            .await;
        assert_eq!(phase, SelectionPhase::Browsing);
        assert!(error.unwrap().contains("no longer available"));
    }
}
