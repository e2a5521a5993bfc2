//! Local fallback persistence
//!
//! Client-scoped key/value snapshot store used only to bridge network
//! outages and to feed the one-time migration of legacy local data.

pub mod snapshot;

pub use snapshot::LocalCache;
