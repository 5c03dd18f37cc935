//! Error taxonomy for the storefront and its HTTP mapping.
//!
//! All collaborator failures are caught at the boundary of the operation
//! that invoked them and converted to one [`StorefrontError`] kind; none
//! leave partially-applied store state (batch writes are all-or-nothing).
//! [`AppError`] bridges the taxonomy to Axum responses.

use crate::store::StoreError;
use crate::types::TicketNumber;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Domain error taxonomy.
///
/// Every kind resolves to returning control to the buyer or admin; none is
/// fatal to the process.
#[derive(Debug, Clone, Error)]
pub enum StorefrontError {
    /// Requested quantity or package exceeds the available numbers.
    /// User-correctable: lower the quantity.
    #[error("requested {requested} tickets but only {available} are available")]
    InsufficientInventory {
        /// Tickets the buyer asked for
        requested: u32,
        /// Tickets currently available
        available: u32,
    },

    /// Atomic commit rejected: numbers were claimed between selection and
    /// commit. The buyer must re-select; no automatic retry.
    #[error("tickets no longer available: {}", display_numbers(numbers))]
    ConflictingReservation {
        /// The numbers that were already taken
        numbers: Vec<TicketNumber>,
    },

    /// Missing or invalid input, caught before any store interaction.
    #[error("{0}")]
    Validation(String),

    /// Store or gateway call failed, or required config is absent.
    #[error("collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    /// An irreversible admin action was submitted without explicit
    /// confirmation; nothing was executed.
    #[error("action requires explicit confirmation; nothing was changed")]
    ManualActionAborted,

    /// A referenced raffle, package, or ticket group does not exist.
    #[error("{0} not found")]
    NotFound(String),
}

fn display_numbers(numbers: &[TicketNumber]) -> String {
    numbers
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<StoreError> for StorefrontError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { numbers } => Self::ConflictingReservation { numbers },
            StoreError::RaffleNotFound(id) => Self::NotFound(format!("raffle {id}")),
            StoreError::Unavailable(message) => Self::CollaboratorUnavailable(message),
        }
    }
}

/// Application error type for HTTP handlers.
///
/// Wraps domain errors with an HTTP status, a stable machine-readable
/// `code`, and a user-facing message, and implements `IntoResponse`.
///
/// # Examples
///
/// ```ignore
/// async fn handler() -> Result<Json<Data>, AppError> {
///     let raffle = state.store.get_raffle(id).await
///         .map_err(StorefrontError::from)?;
///     Ok(Json(raffle))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
        }
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            message.into(),
            "BAD_REQUEST".to_string(),
        )
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            message.into(),
            "UNAUTHORIZED".to_string(),
        )
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            message.into(),
            "NOT_FOUND".to_string(),
        )
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message.into(), "CONFLICT".to_string())
    }

    /// Create a 422 Unprocessable Entity error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            message.into(),
            "VALIDATION_ERROR".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }

    /// Create a 503 Service Unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            message.into(),
            "SERVICE_UNAVAILABLE".to_string(),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

impl From<StorefrontError> for AppError {
    fn from(err: StorefrontError) -> Self {
        let message = err.to_string();
        match err {
            StorefrontError::InsufficientInventory { .. } => Self::new(
                StatusCode::BAD_REQUEST,
                message,
                "INSUFFICIENT_INVENTORY".to_string(),
            ),
            StorefrontError::ConflictingReservation { .. } => Self::new(
                StatusCode::CONFLICT,
                format!("{message}; please re-select your numbers"),
                "CONFLICTING_RESERVATION".to_string(),
            ),
            StorefrontError::Validation(_) => Self::validation(message),
            StorefrontError::CollaboratorUnavailable(_) => Self::unavailable(message),
            StorefrontError::ManualActionAborted => Self::new(
                StatusCode::CONFLICT,
                message,
                "ACTION_ABORTED".to_string(),
            ),
            StorefrontError::NotFound(_) => Self::not_found(message),
        }
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = %self.status,
                code = %self.code,
                message = %self.message,
                "Request failed"
            );
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}
