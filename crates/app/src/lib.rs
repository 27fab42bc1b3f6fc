//! # coredata-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `EventRepository`, `ReadingRepository`, `ValueDescriptorRepository`: the store
//!   - `DeviceDirectory`: the external device/service directory
//!   - `EventTransport`: the outbound message transport
//!   - `SideEffectEmitter`: the producer side of the side-effect bus
//! - Define **driving/inbound ports** as use-case structs:
//!   - `DeviceResolver`: turn a caller token into a canonical device
//!   - `EventService`: ingestion, queries, cascade deletes
//!   - `ReadingService`: reading CRUD and bounded queries
//!   - `ValueDescriptorService`: descriptor registry and integrity rules
//! - Provide **in-process infrastructure** (side-effect bus, publisher wrapper)
//!   that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `coredata-domain` only (plus `tokio` for channels and tasks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod publisher;
pub mod services;
pub mod settings;
pub mod side_effects;

#[cfg(test)]
pub(crate) mod testing;
