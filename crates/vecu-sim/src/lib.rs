//! vecu-sim - Simulated vehicle behavior
//!
//! Owns the canonical vehicle state and everything that reads it:
//!
//! - [`state`] - the single mutable vehicle-state snapshot
//! - [`cycle`] - the four-phase driving cycle advancing that state per tick
//! - [`broadcast`] - catch-up-free periodic broadcast scheduling
//! - [`diag`] - table-driven OBD-II Mode 01 request handling
//! - [`config`] - simulator configuration (TOML/YAML)
//!
//! The state is owned by one simulation loop and passed by reference into
//! the tick function, the codec views and the diagnostic handler; there is
//! no shared mutable state and no locking.

pub mod broadcast;
pub mod config;
pub mod cycle;
pub mod diag;
pub mod state;

pub use broadcast::Broadcaster;
pub use config::{BroadcastConfig, ConfigError, SimConfig};
pub use state::VehicleState;
