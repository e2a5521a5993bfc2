//! Remote media API client

pub mod client;
pub mod errors;
pub mod types;

pub use client::{ApiClient, MediaStore};
pub use errors::StoreError;
pub use types::*;
