//! # Rifa Runtime
//!
//! Runtime implementation for the rifa storefront architecture.
//!
//! This crate provides the [`Store`] runtime that coordinates reducer
//! execution and effect handling: an action is reduced while holding a
//! write lock on the state, and the returned effects are then executed,
//! with any actions they produce fed back into the reducer.
//!
//! ## Example
//!
//! ```ignore
//! use rifa_runtime::Store;
//!
//! let store = Store::new(initial_state, MyReducer, environment);
//!
//! // Send an action and run its effects to completion
//! store.send(Action::DoSomething).await;
//!
//! // Read state
//! let value = store.state(|s| s.some_field.clone()).await;
//! ```

use rifa_core::{effect::Effect, reducer::Reducer};
use std::sync::Arc;
use tokio::sync::RwLock;

/// The Store runtime - manages state and executes effects.
///
/// Each buyer session holds one `Store`; the session model is cooperative
/// (browser-style): a single logical flow of actions per store, with
/// suspension at every collaborator call. Concurrent `send` calls
/// serialize at the state lock.
///
/// # Type Parameters
///
/// - `S`: state type
/// - `A`: action type
/// - `E`: environment type
/// - `R`: reducer implementation
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: R,
    environment: E,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync,
    A: std::fmt::Debug + Send + 'static,
    S: Send + Sync,
    E: Send + Sync,
{
    /// Create a new store with initial state, reducer, and environment.
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer,
            environment,
        }
    }

    /// Send an action to the store and run its effects to completion.
    ///
    /// 1. Acquires the write lock on state
    /// 2. Calls the reducer with `(state, action, environment)`
    /// 3. Executes the returned effects, awaiting each in turn
    /// 4. Actions produced by effects are fed back into the reducer
    ///
    /// Effects run after the state lock is released, so effect futures may
    /// themselves call back into the store's collaborators.
    pub async fn send(&self, action: A) {
        tracing::debug!(action = ?action, "Reducing action");
        let effects = {
            let mut state = self.state.write().await;
            self.reducer.reduce(&mut state, action, &self.environment)
        };

        for effect in effects {
            self.execute_effect(effect).await;
        }
    }

    /// Read the current state through a projection function.
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        f(&state)
    }

    /// Execute one effect, feeding produced actions back into the reducer.
    ///
    /// `Parallel` effects are awaited in arbitrary completion order via
    /// `join_all`; `Sequential` effects strictly in order. `Delay` sleeps
    /// before dispatching its action.
    async fn execute_effect(&self, effect: Effect<A>) {
        match effect {
            Effect::None => {},
            Effect::Future(future) => {
                if let Some(action) = future.await {
                    Box::pin(self.send(action)).await;
                }
            },
            Effect::Delay { duration, action } => {
                tracing::trace!(?duration, "Delaying action");
                tokio::time::sleep(duration).await;
                Box::pin(self.send(*action)).await;
            },
            Effect::Sequential(effects) => {
                for inner in effects {
                    Box::pin(self.execute_effect(inner)).await;
                }
            },
            Effect::Parallel(effects) => {
                // Futures resolve concurrently; feedback actions still
                // serialize at the state lock.
                let resolved = futures::future::join_all(effects.into_iter().map(|inner| async {
                    match inner {
                        Effect::Future(future) => future.await,
                        other => {
                            Box::pin(self.execute_effect(other)).await;
                            None
                        },
                    }
                }))
                .await;

                for action in resolved.into_iter().flatten() {
                    Box::pin(self.send(action)).await;
                }
            },
        }
    }
}
