//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for the media server endpoints.
//!
//! When API routes or request formats change, update only this file.
#![allow(dead_code)]

use super::constants::*;
use reqwest::Response;
use serde_json::Value;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    // ========================================================================
    // Generic Resource Endpoints
    // ========================================================================

    /// GET /api/{plural}
    pub async fn list(&self, plural: &str) -> Response {
        self.client
            .get(self.url(&format!("/{}", plural)))
            .send()
            .await
            .expect("List request failed")
    }

    /// GET /api/{plural}/{id}
    pub async fn get(&self, plural: &str, id: i64) -> Response {
        self.client
            .get(self.url(&format!("/{}/{}", plural, id)))
            .send()
            .await
            .expect("Get request failed")
    }

    /// POST /api/{plural}
    pub async fn create(&self, plural: &str, body: &Value) -> Response {
        self.client
            .post(self.url(&format!("/{}", plural)))
            .json(body)
            .send()
            .await
            .expect("Create request failed")
    }

    /// PUT /api/{plural}/{id}
    pub async fn update(&self, plural: &str, id: i64, body: &Value) -> Response {
        self.client
            .put(self.url(&format!("/{}/{}", plural, id)))
            .json(body)
            .send()
            .await
            .expect("Update request failed")
    }

    /// DELETE /api/{plural}/{id}
    pub async fn delete(&self, plural: &str, id: i64) -> Response {
        self.client
            .delete(self.url(&format!("/{}/{}", plural, id)))
            .send()
            .await
            .expect("Delete request failed")
    }

    // ========================================================================
    // Typed Shortcuts
    // ========================================================================

    pub async fn get_user(&self, id: i64) -> Response {
        self.get("users", id).await
    }

    pub async fn delete_user(&self, id: i64) -> Response {
        self.delete("users", id).await
    }

    pub async fn delete_artist(&self, id: i64) -> Response {
        self.delete("artists", id).await
    }

    pub async fn delete_album(&self, id: i64) -> Response {
        self.delete("albums", id).await
    }

    pub async fn delete_song(&self, id: i64) -> Response {
        self.delete("songs", id).await
    }

    pub async fn delete_playlist(&self, id: i64) -> Response {
        self.delete("playlists", id).await
    }

    // ========================================================================
    // Relationship Endpoints
    // ========================================================================

    /// GET /api/playlists/{id}/songs
    pub async fn get_playlist_songs(&self, playlist_id: i64) -> Response {
        self.client
            .get(self.url(&format!("/playlists/{}/songs", playlist_id)))
            .send()
            .await
            .expect("Get playlist songs request failed")
    }

    /// POST /api/playlists/{id}/songs
    pub async fn add_playlist_song(&self, playlist_id: i64, song_id: i64) -> Response {
        self.client
            .post(self.url(&format!("/playlists/{}/songs", playlist_id)))
            .json(&serde_json::json!({ "song_id": song_id }))
            .send()
            .await
            .expect("Add playlist song request failed")
    }

    /// GET /api/users/{id}/likes
    pub async fn get_likes(&self, user_id: i64) -> Response {
        self.client
            .get(self.url(&format!("/users/{}/likes", user_id)))
            .send()
            .await
            .expect("Get likes request failed")
    }

    /// POST /api/users/{id}/follows
    pub async fn follow(&self, user_id: i64, followed_id: i64) -> Response {
        self.client
            .post(self.url(&format!("/users/{}/follows", user_id)))
            .json(&serde_json::json!({ "followed_id": followed_id }))
            .send()
            .await
            .expect("Follow request failed")
    }

    /// GET /api/users/{id}/notifications
    pub async fn get_notifications(&self, user_id: i64) -> Response {
        self.client
            .get(self.url(&format!("/users/{}/notifications", user_id)))
            .send()
            .await
            .expect("Get notifications request failed")
    }

    /// GET /api/users/{id}/activity
    pub async fn get_activity(&self, user_id: i64) -> Response {
        self.client
            .get(self.url(&format!("/users/{}/activity", user_id)))
            .send()
            .await
            .expect("Get activity request failed")
    }

    /// GET /api/comments?content_type=..&content_id=..
    pub async fn get_comments(&self, content_type: &str, content_id: i64) -> Response {
        self.client
            .get(self.url("/comments"))
            .query(&[
                ("content_type", content_type.to_string()),
                ("content_id", content_id.to_string()),
            ])
            .send()
            .await
            .expect("Get comments request failed")
    }

    // ========================================================================
    // Server
    // ========================================================================

    /// GET /
    pub async fn get_home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }
}
