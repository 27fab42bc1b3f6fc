//! # coredata-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the JSON REST API under `/api/v1` (`event`, `reading`,
//!   `valuedescriptor`, `ping`) plus `/health`
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map [`CoreDataError`](coredata_domain::error::CoreDataError) variants to
//!   status codes
//!
//! ## Dependency rule
//! Depends on `coredata-app` (for port traits and services) and `coredata-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use state::{AppState, Backend};
