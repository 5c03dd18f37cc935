//! HTTP API endpoints.
//!
//! Thin handlers over the domain services: they extract, call one
//! service, and translate [`crate::error::StorefrontError`] into
//! [`crate::error::AppError`] responses. No business rules live here.

pub mod admin;
pub mod availability;
pub mod checkout;
pub mod reservations;
