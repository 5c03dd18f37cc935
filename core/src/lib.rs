//! # Rifa Core
//!
//! Core traits and types for the rifa storefront architecture.
//!
//! The storefront is built as a set of composable reducers over explicit
//! state, with all side effects expressed as values and all external
//! dependencies injected through an environment of trait objects.
//!
//! ## Core Concepts
//!
//! - **State**: owned, `Clone`-able domain state for one feature
//! - **Action**: every input a reducer can receive (commands and the
//!   feedback events produced by effects)
//! - **Reducer**: pure function `(State, Action, Environment) → Effects`
//! - **Effect**: a description of a side effect, executed by the runtime
//! - **Environment**: injected dependencies (clock, randomness, stores)
//!
//! ## Example
//!
//! ```ignore
//! use rifa_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = CounterEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CounterState,
//!         action: CounterAction,
//!         env: &CounterEnvironment,
//!     ) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         match action {
//!             CounterAction::Increment => {
//!                 state.count += 1;
//!                 smallvec![Effect::None]
//!             }
//!         }
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

pub mod effect;
pub mod environment;
pub mod reducer;

mod effect_macros;
