//! TVDB series search
//!
//! Authenticated provider: a login exchange trades the API key for a bearer
//! token, cached in a [`TokenCache`] for its validity window so repeated
//! searches share one exchange.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use super::token::{TokenCache, TOKEN_VALIDITY};
use super::{SearchError, SearchHit};

const TVDB_URL: &str = "https://api4.thetvdb.com/v4";

/// HTTP client timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Response from the /login exchange
#[derive(Debug, Deserialize)]
struct LoginResponse {
    status: String,
    #[serde(default)]
    data: Option<LoginData>,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    token: String,
}

/// Response envelope for /search
#[derive(Debug, Deserialize)]
struct SearchResponse {
    status: String,
    #[serde(default)]
    data: Vec<TvdbSearchResult>,
}

#[derive(Debug, Deserialize)]
struct TvdbSearchResult {
    #[serde(rename = "objectID")]
    object_id: String,
    name: String,
    #[serde(default)]
    year: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
}

/// Client for the TVDB series search API
pub struct TvdbClient {
    http_client: Client,
    api_key: String,
    token: TokenCache,
}

impl TvdbClient {
    pub fn new(api_key: &str) -> Result<Self, SearchError> {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SearchError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key: api_key.to_string(),
            token: TokenCache::new(TOKEN_VALIDITY),
        })
    }

    /// Exchange the API key for a bearer token
    async fn login(&self) -> Result<String, SearchError> {
        info!("Logging in to TVDB");
        let response = self
            .http_client
            .post(format!("{}/login", TVDB_URL))
            .json(&serde_json::json!({ "apikey": self.api_key }))
            .send()
            .await
            .map_err(|e| SearchError::Auth(format!("Login exchange unreachable: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Auth(format!("Login rejected ({}): {}", status, body)));
        }

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Auth(format!("Malformed login response: {}", e)))?;

        match (body.status.as_str(), body.data) {
            ("success", Some(data)) => Ok(data.token),
            _ => Err(SearchError::Auth("Login response carried no token".to_string())),
        }
    }

    /// Search series by name, logging in first if no valid token is cached
    pub async fn search_shows(&self, query: &str) -> Result<Vec<SearchHit>, SearchError> {
        let token = self.token.get_or_refresh(|| self.login()).await?;

        let response = self
            .http_client
            .get(format!("{}/search", TVDB_URL))
            .query(&[("query", query), ("type", "series")])
            .bearer_auth(&token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Provider(status, body));
        }

        let body: SearchResponse = response.json().await?;
        if body.status != "success" {
            return Err(SearchError::Provider(200, format!("status: {}", body.status)));
        }

        let hits: Vec<SearchHit> = body
            .data
            .into_iter()
            .map(|r| SearchHit {
                external_id: r.object_id,
                title: r.name,
                year: r.year.unwrap_or_default(),
                poster: r.image_url.unwrap_or_default(),
            })
            .collect();
        debug!(query = query, count = hits.len(), "TVDB series search");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_login_response() {
        let json = r#"{"status":"success","data":{"token":"eyJhbGciOi.abc.def"}}"#;
        let body: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.status, "success");
        assert_eq!(body.data.unwrap().token, "eyJhbGciOi.abc.def");
    }

    #[test]
    fn test_parse_login_failure_without_token() {
        let json = r#"{"status":"failure","message":"InvalidAPIKey"}"#;
        let body: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.status, "failure");
        assert!(body.data.is_none());
    }

    #[test]
    fn test_parse_search_results() {
        let json = r#"{
            "status": "success",
            "data": [
                {
                    "objectID": "series-121361",
                    "name": "Game of Thrones",
                    "year": "2011",
                    "image_url": "https://example.com/got.jpg",
                    "type": "series"
                },
                {
                    "objectID": "series-999999",
                    "name": "Obscure Pilot",
                    "type": "series"
                }
            ]
        }"#;
        let body: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.status, "success");
        assert_eq!(body.data.len(), 2);
        assert_eq!(body.data[0].object_id, "series-121361");
        // Missing year/image_url deserialize as absent, not as an error
        assert!(body.data[1].year.is_none());
        assert!(body.data[1].image_url.is_none());
    }
}
