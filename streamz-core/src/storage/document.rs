//! Row type of the `videos` metadata table

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the videos table as stored by the managed database.
///
/// Columns are snake_case; the nested JSON columns (`creator`, `token`,
/// `coordinates`) keep the camelCase keys the upload tooling writes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoDocument {
    pub id: String,
    pub video_id: String,
    pub filename: String,
    pub storage_path: String,
    pub location_id: String,
    pub location_name: String,
    pub country: String,
    pub coordinates: Coordinates,
    pub creator: Creator,
    pub thumbnail_url: Option<String>,
    pub duration: f64,
    pub views: u64,
    pub likes: u64,
    pub virality_score: f64,
    pub token: TokenInfo,
    pub betting_pool: f64,
    pub paid_to_post: f64,
    pub categories: Vec<String>,
    pub stream_tags: Vec<String>,
    pub xp_earned: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Creator {
    pub id: String,
    pub username: String,
    pub avatar: String,
    pub xp_points: u64,
    pub total_earnings: f64,
}

/// Location token market snapshot attached to a video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TokenInfo {
    pub symbol: String,
    pub price: f64,
    #[serde(rename = "change24h")]
    pub change_24h: f64,
    pub volume: f64,
    pub holders: u64,
    pub market_cap: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_database_row() {
        let row = serde_json::json!({
            "id": "7d0c9a52-1b7e-4d5e-9f57-3c1f1f7f1a10",
            "video_id": "bali-001",
            "filename": "bali_sunrise.mp4",
            "storage_path": "bali/bali_sunrise.mp4",
            "location_id": "bali",
            "location_name": "Bali",
            "country": "Indonesia",
            "coordinates": { "lat": -8.3405, "lng": 115.092 },
            "creator": { "id": "u1", "username": "wanderer", "avatar": "a.png", "xpPoints": 1200, "totalEarnings": 45.5 },
            "thumbnail_url": null,
            "duration": 14.2,
            "views": 1000,
            "likes": 87,
            "virality_score": 0.72,
            "token": { "symbol": "BALI", "price": 1.02, "change24h": -5.5, "volume": 158800, "holders": 5000, "marketCap": 5100000 },
            "betting_pool": 250.0,
            "paid_to_post": 12.5,
            "categories": ["beach"],
            "stream_tags": ["sunrise", "surf"],
            "xp_earned": 40,
            "created_at": "2024-05-01T12:00:00+00:00",
            "updated_at": "2024-05-02T08:30:00+00:00"
        });

        let document: VideoDocument = serde_json::from_value(row).unwrap();
        assert_eq!(document.storage_path, "bali/bali_sunrise.mp4");
        assert_eq!(document.creator.xp_points, 1200);
        assert_eq!(document.token.change_24h, -5.5);
        assert_eq!(document.token.market_cap, 5_100_000.0);
        assert!(document.thumbnail_url.is_none());
        assert_eq!(document.stream_tags, vec!["sunrise", "surf"]);
    }

    #[test]
    fn test_missing_columns_default() {
        let document: VideoDocument =
            serde_json::from_value(serde_json::json!({ "id": "x", "storage_path": "x.mp4" }))
                .unwrap();
        assert_eq!(document.id, "x");
        assert_eq!(document.views, 0);
        assert!(document.categories.is_empty());
    }
}
