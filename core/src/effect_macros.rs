//! Declarative macros for ergonomic effect construction.

/// Create an `Effect::Future` from an async block.
///
/// # Example
///
/// ```rust,ignore
/// use rifa_core::async_effect;
///
/// async_effect! {
///     let outcome = store.reserve_pending(raffle_id, numbers, buyer, now).await;
///     Some(SelectionAction::from_commit_outcome(outcome))
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Delay` for scheduling delayed actions.
///
/// # Example
///
/// ```rust,ignore
/// use rifa_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_secs(30),
///     action: SelectionAction::ClearSelection
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}
