//! # coredata-domain
//!
//! Pure domain model for the coredata telemetry-ingestion core.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Events** (timestamped ingestion units grouping readings)
//! - Define **Readings** (single named measurement values)
//! - Define **Value descriptors** (the registered definition a reading's name
//!   must satisfy) together with format-string and value checks
//! - Define the read-only view of **Devices** owned by the external directory
//! - Define the transient **side-effect** messages emitted after ingestion
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod device;
pub mod event;
pub mod reading;
pub mod side_effect;
pub mod value_descriptor;
