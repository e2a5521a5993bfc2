//! OMDb movie search
//!
//! Unauthenticated provider; the API key travels as a query parameter.
//! OMDb signals "no results" and its own errors in-band with
//! `Response: "False"`, which maps to an empty hit list, not an error.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{SearchError, SearchHit};

const OMDB_URL: &str = "https://www.omdbapi.com/";

/// HTTP client timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// OMDb search response envelope (fields are PascalCase on the wire)
#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Search", default)]
    search: Vec<OmdbEntry>,
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbEntry {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year")]
    year: String,
    #[serde(rename = "Poster")]
    poster: String,
    #[serde(rename = "imdbID")]
    imdb_id: String,
}

/// Client for the OMDb movie search API
pub struct OmdbClient {
    http_client: Client,
    api_key: String,
}

impl OmdbClient {
    pub fn new(api_key: &str) -> Result<Self, SearchError> {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SearchError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key: api_key.to_string(),
        })
    }

    /// Search movies by title
    pub async fn search_movies(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        let response = self
            .http_client
            .get(OMDB_URL)
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("s", query),
                ("type", "movie"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Provider(status, body));
        }

        let body: OmdbSearchResponse = response.json().await?;
        let hits = hits_from_response(body);
        debug!(query = query, count = hits.len(), "OMDb movie search");
        Ok(hits)
    }
}

fn hits_from_response(body: OmdbSearchResponse) -> Vec<SearchHit> {
    if body.response != "True" {
        // "Movie not found!" and friends arrive here with an HTTP 200
        debug!(error = ?body.error, "OMDb reported no results");
        return Vec::new();
    }

    body.search
        .into_iter()
        .map(|e| SearchHit {
            external_id: e.imdb_id,
            title: e.title,
            year: e.year,
            poster: e.poster,
        })
        .collect()
}
