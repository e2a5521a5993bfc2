//! Data-access and consistency layer for a personal seen-media tracker.
//!
//! Keeps a collection of watched movies and series consistent between an
//! authoritative remote media API and a local fallback snapshot, performs a
//! one-time migration of legacy local-only data into the remote store, and
//! caches the short-lived bearer token used by the series metadata provider.

pub mod cache;
pub mod library;
pub mod remote;
pub mod search;
