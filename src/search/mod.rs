//! Metadata search providers
//!
//! Movie search is unauthenticated; series search requires a bearer token
//! obtained through a login exchange and cached for its validity window.

pub mod omdb;
pub mod token;
pub mod tvdb;

pub use omdb::OmdbClient;
pub use token::TokenCache;
pub use tvdb::TvdbClient;

use serde::{Deserialize, Serialize};

/// A single search result from either provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    /// Provider-side identifier (IMDb id for movies, TVDB id for series)
    pub external_id: String,
    pub title: String,
    pub year: String,
    pub poster: String,
}

/// Metadata provider error types
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Login exchange rejected or unreachable. Fatal for the current call;
    /// no token is cached and the caller must retry explicitly.
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider error ({0}): {1}")]
    Provider(u16, String),

    #[error("Malformed provider response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SearchError::Malformed(err.to_string())
        } else {
            SearchError::Network(err.to_string())
        }
    }
}
