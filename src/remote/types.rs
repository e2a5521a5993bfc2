//! Media record types and natural-key derivation
//!
//! Defines the wire format shared with the media API (camelCase JSON) and
//! the (kind, external id) natural key used for de-duplication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a record is a movie or a series.
///
/// Movies carry an IMDb id, series a TVDB id; the pair (kind, external id)
/// is the natural key of the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Movie => write!(f, "movie"),
            MediaKind::Series => write!(f, "series"),
        }
    }
}

/// A persisted media record as returned by the remote store.
///
/// `id` is a surrogate assigned at creation and used only for removal;
/// `added_at` is assigned by the store and never mutated. The display
/// fields (`title`, `year`, `poster`) are not part of the identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: String,
    /// IMDb id, present for movies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    /// TVDB id, present for series
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvdb_id: Option<String>,
    pub title: String,
    pub year: String,
    pub poster: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub added_at: DateTime<Utc>,
}

/// A candidate record submitted to the store; the store assigns
/// `id` and `added_at` on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvdb_id: Option<String>,
    pub title: String,
    pub year: String,
    pub poster: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

/// Outcome of submitting a draft to the store.
///
/// A natural-key collision is a distinct outcome rather than an error so
/// callers can show "already in your list" instead of a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    /// The store accepted the draft; carries the persisted record.
    Added(MediaItem),
    /// A record with the same natural key already exists; nothing mutated.
    Conflict,
}

impl MediaDraft {
    /// Draft for a movie identified by IMDb id
    pub fn movie(imdb_id: &str, title: &str, year: &str, poster: &str) -> Self {
        Self {
            imdb_id: Some(imdb_id.to_string()),
            tvdb_id: None,
            title: title.to_string(),
            year: year.to_string(),
            poster: poster.to_string(),
            kind: MediaKind::Movie,
        }
    }

    /// Draft for a series identified by TVDB id
    pub fn series(tvdb_id: &str, title: &str, year: &str, poster: &str) -> Self {
        Self {
            imdb_id: None,
            tvdb_id: Some(tvdb_id.to_string()),
            title: title.to_string(),
            year: year.to_string(),
            poster: poster.to_string(),
            kind: MediaKind::Series,
        }
    }

    /// External id matching this draft's kind, if present
    pub fn external_id(&self) -> Option<&str> {
        match self.kind {
            MediaKind::Movie => self.imdb_id.as_deref(),
            MediaKind::Series => self.tvdb_id.as_deref(),
        }
    }

    /// Natural key used for de-duplication.
    ///
    /// Falls back to the title when the external id is missing, matching the
    /// store's own duplicate check for id-less records.
    pub fn natural_key(&self) -> String {
        format!("{}:{}", self.kind, self.external_id().unwrap_or(&self.title))
    }
}

impl MediaItem {
    /// External id matching this record's kind, if present
    pub fn external_id(&self) -> Option<&str> {
        match self.kind {
            MediaKind::Movie => self.imdb_id.as_deref(),
            MediaKind::Series => self.tvdb_id.as_deref(),
        }
    }

    /// Natural key used for de-duplication (see [`MediaDraft::natural_key`])
    pub fn natural_key(&self) -> String {
        format!("{}:{}", self.kind, self.external_id().unwrap_or(&self.title))
    }

    /// Strip the store-assigned fields, yielding a draft that can be
    /// re-submitted (used when migrating legacy records).
    pub fn to_draft(&self) -> MediaDraft {
        MediaDraft {
            imdb_id: match self.kind {
                MediaKind::Movie => self.imdb_id.clone(),
                MediaKind::Series => None,
            },
            tvdb_id: match self.kind {
                MediaKind::Series => self.tvdb_id.clone(),
                MediaKind::Movie => None,
            },
            title: self.title.clone(),
            year: self.year.clone(),
            poster: self.poster.clone(),
            kind: self.kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_movie_item() {
        let json = r#"{
            "id": "4f2e8c1a-9b3d-4e5f-8a7b-6c5d4e3f2a1b",
            "imdbId": "tt0111161",
            "tvdbId": null,
            "title": "The Shawshank Redemption",
            "year": "1994",
            "poster": "https://example.com/shawshank.jpg",
            "type": "movie",
            "addedAt": "2024-05-01T12:00:00.000Z"
        }"#;
        let item: MediaItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.kind, MediaKind::Movie);
        assert_eq!(item.imdb_id.as_deref(), Some("tt0111161"));
        assert_eq!(item.tvdb_id, None);
        assert_eq!(item.external_id(), Some("tt0111161"));
        assert_eq!(item.natural_key(), "movie:tt0111161");
    }

    #[test]
    fn test_deserialize_series_item() {
        let json = r#"{
            "id": "a1b2c3d4",
            "tvdbId": "121361",
            "title": "Game of Thrones",
            "year": "2011",
            "poster": "https://example.com/got.jpg",
            "type": "series",
            "addedAt": "2024-05-02T08:30:00Z"
        }"#;
        let item: MediaItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.kind, MediaKind::Series);
        assert_eq!(item.natural_key(), "series:121361");
    }

    #[test]
    fn test_serialize_movie_draft_omits_absent_ids() {
        let draft = MediaDraft::movie("tt0111161", "The Shawshank Redemption", "1994", "p.jpg");
        let json = serde_json::to_string(&draft).unwrap();
        assert!(json.contains(r#""imdbId":"tt0111161""#));
        assert!(json.contains(r#""type":"movie""#));
        // Absent tvdbId must not be sent at all
        assert!(!json.contains("tvdbId"));
    }

    #[test]
    fn test_natural_key_falls_back_to_title() {
        let draft = MediaDraft {
            imdb_id: None,
            tvdb_id: None,
            title: "Untitled Pilot".to_string(),
            year: "2020".to_string(),
            poster: String::new(),
            kind: MediaKind::Series,
        };
        assert_eq!(draft.natural_key(), "series:Untitled Pilot");
    }

    #[test]
    fn test_to_draft_strips_surrogate_fields() {
        let json = r#"{
            "id": "xyz",
            "imdbId": "tt0068646",
            "title": "The Godfather",
            "year": "1972",
            "poster": "g.jpg",
            "type": "movie",
            "addedAt": "2023-11-20T00:00:00Z"
        }"#;
        let item: MediaItem = serde_json::from_str(json).unwrap();
        let draft = item.to_draft();
        assert_eq!(draft.natural_key(), item.natural_key());
        let round = serde_json::to_value(&draft).unwrap();
        assert!(round.get("id").is_none());
        assert!(round.get("addedAt").is_none());
    }
}
