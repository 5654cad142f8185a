// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 PhimHub contributors

use crate::cache::{CacheMetadata, CatalogCache};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from the PhimHub HTTP API, split so callers can tell transport
/// failures from server-side rejections (401 handling, retry decisions).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ApiError::Status { status, .. }
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
        )
    }
}

fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: Value = Deserialize::deserialize(deserializer)?;

    match value {
        Value::Array(arr) => {
            let strings: Vec<String> = arr
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect();
            if strings.is_empty() {
                Ok(None)
            } else {
                Ok(Some(strings))
            }
        }
        Value::String(s) => {
            if s.is_empty() {
                Ok(None)
            } else {
                // Older servers send a comma-joined string
                Ok(Some(s.split(',').map(|p| p.trim().to_string()).collect()))
            }
        }
        Value::Null => Ok(None),
        _ => Err(D::Error::custom("Expected string or array")),
    }
}

fn deserialize_optional_number_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: Value = Deserialize::deserialize(deserializer)?;

    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Err(D::Error::custom("Expected string, number, or null")),
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: Value = Deserialize::deserialize(deserializer)?;

    match value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| D::Error::custom("Expected non-negative id")),
        // Some endpoints stringify ids
        Value::String(s) => s.parse().map_err(D::Error::custom),
        _ => Err(D::Error::custom("Expected number or string id")),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: u64,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub backdrop_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_number_as_string")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_number_as_string")]
    pub rating: Option<String>,
    #[serde(default)]
    pub views: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub added_at: Option<String>,
}

impl Movie {
    /// "series" movies carry episodes; everything else plays as a single file.
    pub fn is_series(&self) -> bool {
        self.kind.as_deref() == Some("series")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub season: Option<u32>,
    #[serde(default)]
    pub episode_num: Option<u32>,
    #[serde(default)]
    pub link_m3u8: Option<String>,
    #[serde(default)]
    pub link_embed: Option<String>,
    #[serde(default)]
    pub server_name: Option<String>,
    #[serde(default)]
    pub duration_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub movie: Movie,
    #[serde(default)]
    pub episodes: Vec<Episode>,
    #[serde(default)]
    pub directors: Vec<Person>,
    #[serde(default)]
    pub actors: Vec<Person>,
    #[serde(default)]
    pub trailer_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomList {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub item_count: Option<u64>,
    #[serde(default)]
    pub items: Option<Vec<Movie>>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchEntry {
    #[serde(deserialize_with = "deserialize_id")]
    pub movie_id: u64,
    #[serde(default)]
    pub movie_name: Option<String>,
    #[serde(default)]
    pub episode: Option<u32>,
    #[serde(default)]
    pub position_secs: u64,
    #[serde(default)]
    pub duration_secs: Option<u64>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WatchProgressBody {
    pub position_secs: u64,
    pub duration_secs: Option<u64>,
    pub episode: Option<u32>,
}

/// One fetched page, regardless of which wire shape delivered it.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// The server has grown a `{ items, total }` envelope; older deployments
/// still answer with the bare `{ data }` shape and no total. Decoded as a
/// union at the boundary so nothing downstream sniffs response shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PageEnvelope<T> {
    Paged { items: Vec<T>, total: u64 },
    Legacy { data: Vec<T> },
}

impl<T> PageEnvelope<T> {
    pub fn into_page(self) -> Page<T> {
        match self {
            PageEnvelope::Paged { items, total } => Page { items, total },
            PageEnvelope::Legacy { data } => {
                let total = data.len() as u64;
                Page { items: data, total }
            }
        }
    }
}

/// Filter for whose-role the people selection endpoint searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersonRole {
    Actor,
    Director,
}

impl PersonRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonRole::Actor => "actor",
            PersonRole::Director => "director",
        }
    }

    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "actor" | "actors" => Ok(Self::Actor),
            "director" | "directors" => Ok(Self::Director),
            _ => anyhow::bail!("Invalid role: {}. Use 'actor' or 'director'", s),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MovieQuery {
    pub q: Option<String>,
    pub genre: Option<String>,
    pub country: Option<String>,
    pub kind: Option<String>,
    pub limit: u64,
    pub offset: u64,
}

impl MovieQuery {
    fn cache_key(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}",
            self.q.as_deref().unwrap_or(""),
            self.genre.as_deref().unwrap_or(""),
            self.country.as_deref().unwrap_or(""),
            self.kind.as_deref().unwrap_or(""),
            self.limit,
            self.offset
        )
    }
}

#[derive(Debug)]
pub struct PhimHubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    server_name: Option<String>,
    pub cache: CatalogCache,
    pub server_hash: String,
    show_progress: AtomicBool,
}

impl PhimHubClient {
    pub fn new(
        server_url: String,
        token: Option<String>,
        server_name: Option<String>,
    ) -> Result<Self> {
        let url = reqwest::Url::parse(&server_url).with_context(|| "Invalid server URL")?;

        let base_url = if let Some(port) = url.port() {
            format!(
                "{}://{}:{}",
                url.scheme(),
                url.host_str().unwrap_or("localhost"),
                port
            )
        } else {
            format!(
                "{}://{}",
                url.scheme(),
                url.host_str().unwrap_or("localhost")
            )
        };

        let mut cache = CatalogCache::new()?;
        let server_hash = cache.get_server_hash(&base_url)?;

        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .user_agent("phimhub-cli")
                .build()?,
            base_url,
            token,
            server_name,
            cache,
            server_hash,
            show_progress: AtomicBool::new(false),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn server_name(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn enable_progress(&self) {
        self.show_progress.store(true, Ordering::Relaxed);
    }

    pub fn disable_progress(&self) {
        self.show_progress.store(false, Ordering::Relaxed);
    }

    fn api_url(&self, path: &str, query: &[(&str, String)]) -> String {
        let mut url = format!("{}/api{}", self.base_url, path);
        let mut sep = '?';
        for (key, value) in query {
            url.push(sep);
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
            sep = '&';
        }
        url
    }

    fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.show_progress.load(Ordering::Relaxed) {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed_precise}] {bytes}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        // Unauthenticated requests are still sent; the server decides access.
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read_body(
        &self,
        response: reqwest::Response,
        pb: Option<&ProgressBar>,
    ) -> Result<String, ApiError> {
        let mut body = Vec::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = futures_util::StreamExt::next(&mut stream).await {
            let chunk = chunk_result?;
            body.extend_from_slice(&chunk);
            if let Some(pb) = pb {
                pb.set_position(body.len() as u64);
            }
        }

        String::from_utf8(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn decode<T>(&self, text: &str) -> Result<T, ApiError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if text.trim().is_empty() {
            return Err(ApiError::Decode("empty response from server".to_string()));
        }

        serde_json::from_str(text).map_err(|e| {
            // Include a window around the failing byte; provider responses
            // are large and the offset alone is useless in a log.
            let line_num = e.line();
            let col_num = e.column();
            let mut byte_pos = 0;
            for (i, line) in text.lines().enumerate() {
                if i + 1 == line_num {
                    byte_pos += col_num.saturating_sub(1);
                    break;
                }
                byte_pos += line.len() + 1;
            }
            let start = byte_pos.saturating_sub(100);
            let end = std::cmp::min(byte_pos + 100, text.len());
            let context = text[start..end].replace(['\n', '\r'], " ");

            let message = format!(
                "JSON parsing failed at line {}, column {}: ...{}... ({})",
                line_num, col_num, context, e
            );
            warn!("{}", message);
            ApiError::Decode(message)
        })
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Error bodies are either `{ "message": "..." }` or free text.
        let message = match response.text().await {
            Ok(text) => serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                .unwrap_or(text),
            Err(_) => String::new(),
        };

        Err(ApiError::Status { status, message })
    }

    pub async fn get<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = self.api_url(path, query);
        debug!("GET {}", url);

        let pb = self.spinner("Fetching...");

        let response = self.apply_auth(self.client.get(&url)).send().await?;
        let response = Self::check_status(response).await?;
        let text = self.read_body(response, pb.as_ref()).await?;

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        self.decode(&text)
    }

    async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: for<'de> Deserialize<'de>,
        B: Serialize + ?Sized,
    {
        let url = self.api_url(path, &[]);
        debug!("POST {}", url);

        let response = self
            .apply_auth(self.client.post(&url))
            .json(body)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let text = response.text().await?;
        self.decode(&text)
    }

    async fn put<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.api_url(path, &[]);
        debug!("PUT {}", url);

        let response = self
            .apply_auth(self.client.put(&url))
            .json(body)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.api_url(path, &[]);
        debug!("DELETE {}", url);

        let response = self.apply_auth(self.client.delete(&url)).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// Raw GET for the `api` subcommand: no deserialization, no caching.
    pub async fn get_raw(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let value = self.get::<Value>(path, query).await?;
        Ok(value)
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let auth: AuthResponse = self.post("/auth/login", &body).await?;
        self.token = Some(auth.token.clone());
        Ok(auth)
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        self.get("/auth/me", &[]).await
    }

    pub async fn get_genres(&self) -> Result<Vec<Genre>> {
        if let Ok(Some(cached)) = self
            .cache
            .get_cached::<Vec<Genre>>(&self.server_hash, "genres", None)
            .await
        {
            if !cached.is_expired() {
                return Ok(cached.data);
            }
        }

        let genres: Vec<Genre> = self.get("/genres", &[]).await?;

        let metadata = CacheMetadata::new(self.base_url.clone(), self.server_name.clone(), 86400);
        if let Err(e) = self
            .cache
            .store_cache(&self.server_hash, "genres", None, genres.clone(), metadata)
            .await
        {
            warn!("Failed to cache genres: {}", e);
        }

        Ok(genres)
    }

    pub async fn get_movies(&self, query: &MovieQuery) -> Result<Page<Movie>> {
        let cache_key = query.cache_key();
        if let Ok(Some(cached)) = self
            .cache
            .get_cached::<Vec<Movie>>(&self.server_hash, "movies", Some(&cache_key))
            .await
        {
            if !cached.is_expired() {
                let total = cached.metadata.total.unwrap_or(cached.data.len() as u64);
                return Ok(Page {
                    items: cached.data,
                    total,
                });
            }
        }

        let page = self.fetch_movies(query).await?;

        let mut metadata =
            CacheMetadata::new(self.base_url.clone(), self.server_name.clone(), 1800);
        metadata.total = Some(page.total);
        if let Err(e) = self
            .cache
            .store_cache(
                &self.server_hash,
                "movies",
                Some(&cache_key),
                page.items.clone(),
                metadata,
            )
            .await
        {
            warn!("Failed to cache movie page: {}", e);
        }

        Ok(page)
    }

    /// Uncached movie page fetch; the TUI search session calls this directly
    /// so stale pages never satisfy a live query.
    pub async fn fetch_movies(&self, query: &MovieQuery) -> Result<Page<Movie>, ApiError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(q) = &query.q {
            params.push(("q", q.clone()));
        }
        if let Some(genre) = &query.genre {
            params.push(("genre", genre.clone()));
        }
        if let Some(country) = &query.country {
            params.push(("country", country.clone()));
        }
        if let Some(kind) = &query.kind {
            params.push(("type", kind.clone()));
        }
        params.push(("limit", query.limit.to_string()));
        params.push(("offset", query.offset.to_string()));

        let envelope: PageEnvelope<Movie> = self.get("/movies", &params).await?;
        Ok(envelope.into_page())
    }

    pub async fn get_movie(&self, movie_id: u64) -> Result<MovieDetail> {
        let cache_key = format!("movie_{}", movie_id);
        if let Ok(Some(cached)) = self
            .cache
            .get_cached::<MovieDetail>(&self.server_hash, &cache_key, None)
            .await
        {
            if !cached.is_expired() {
                return Ok(cached.data);
            }
        }

        let detail: MovieDetail = self.get(&format!("/movies/{}", movie_id), &[]).await?;

        let metadata = CacheMetadata::new(self.base_url.clone(), self.server_name.clone(), 3600);
        if let Err(e) = self
            .cache
            .store_cache(
                &self.server_hash,
                &cache_key,
                None,
                detail.clone(),
                metadata,
            )
            .await
        {
            warn!("Failed to cache movie detail: {}", e);
        }

        Ok(detail)
    }

    /// People selection search. Never cached: results feed a live search
    /// session and staleness there is worse than an extra round-trip.
    pub async fn search_people(
        &self,
        role: PersonRole,
        q: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Page<Person>, ApiError> {
        let params = [
            ("role", role.as_str().to_string()),
            ("q", q.to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ];

        let envelope: PageEnvelope<Person> = self.get("/people/selection", &params).await?;
        Ok(envelope.into_page())
    }

    pub async fn get_favorites(&self) -> Result<Vec<Movie>, ApiError> {
        self.get("/favorites", &[]).await
    }

    pub async fn add_favorite(&self, movie_id: u64) -> Result<(), ApiError> {
        let body = serde_json::json!({ "movie_id": movie_id });
        let _: Value = self.post("/favorites", &body).await?;
        Ok(())
    }

    pub async fn remove_favorite(&self, movie_id: u64) -> Result<(), ApiError> {
        self.delete(&format!("/favorites/{}", movie_id)).await
    }

    pub async fn get_custom_lists(&self) -> Result<Vec<CustomList>, ApiError> {
        self.get("/custom-lists", &[]).await
    }

    pub async fn create_custom_list(&self, name: &str) -> Result<CustomList, ApiError> {
        let body = serde_json::json!({ "name": name });
        self.post("/custom-lists", &body).await
    }

    pub async fn add_to_list(&self, list_id: u64, movie_id: u64) -> Result<(), ApiError> {
        let body = serde_json::json!({ "movie_id": movie_id });
        let _: Value = self
            .post(&format!("/custom-lists/{}/items", list_id), &body)
            .await?;
        Ok(())
    }

    pub async fn remove_from_list(&self, list_id: u64, movie_id: u64) -> Result<(), ApiError> {
        self.delete(&format!("/custom-lists/{}/items/{}", list_id, movie_id))
            .await
    }

    pub async fn delete_list(&self, list_id: u64) -> Result<(), ApiError> {
        self.delete(&format!("/custom-lists/{}", list_id)).await
    }

    pub async fn get_watch_history(&self) -> Result<Vec<WatchEntry>, ApiError> {
        self.get("/watch-history", &[]).await
    }

    pub async fn push_watch_progress(
        &self,
        movie_id: u64,
        body: &WatchProgressBody,
    ) -> Result<(), ApiError> {
        self.put(&format!("/watch-history/{}", movie_id), body).await
    }

    /// Resolve the playable HLS URL for a movie, preferring direct m3u8
    /// links over embeds.
    pub fn stream_url(detail: &MovieDetail, episode: Option<u32>) -> Option<String> {
        let pick = |ep: &Episode| ep.link_m3u8.clone().or_else(|| ep.link_embed.clone());

        match episode {
            Some(num) => detail
                .episodes
                .iter()
                .find(|ep| ep.episode_num == Some(num))
                .and_then(pick),
            None => detail.episodes.first().and_then(pick),
        }
    }

    pub async fn clear_cache(&self) -> Result<()> {
        self.cache.clear_server_cache(&self.server_hash).await
    }

    /// Re-fetch the slow-moving catalog entries so the TUI starts warm.
    pub async fn refresh_cache(&self) -> Result<()> {
        self.clear_cache().await?;
        self.get_genres().await?;
        self.get_movies(&MovieQuery {
            limit: 50,
            ..Default::default()
        })
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_envelope_prefers_new_shape() {
        let json = r#"{ "items": [{"id": 1, "name": "A"}], "total": 42 }"#;
        let envelope: PageEnvelope<Person> = serde_json::from_str(json).unwrap();
        let page = envelope.into_page();
        assert_eq!(page.total, 42);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "A");
    }

    #[test]
    fn page_envelope_legacy_defaults_total_to_len() {
        let json = r#"{ "data": [{"id": 1, "name": "A"}, {"id": 2, "name": "B"}] }"#;
        let envelope: PageEnvelope<Person> = serde_json::from_str(json).unwrap();
        let page = envelope.into_page();
        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 2);
    }

    #[test]
    fn ids_decode_from_number_or_string() {
        let p: Person = serde_json::from_str(r#"{"id": 7, "name": "N"}"#).unwrap();
        assert_eq!(p.id, 7);
        let p: Person = serde_json::from_str(r#"{"id": "7", "name": "N"}"#).unwrap();
        assert_eq!(p.id, 7);
    }

    #[test]
    fn genres_decode_from_string_or_array() {
        let m: Movie =
            serde_json::from_str(r#"{"id": 1, "name": "M", "genres": ["Action", "Drama"]}"#)
                .unwrap();
        assert_eq!(m.genres, Some(vec!["Action".into(), "Drama".into()]));

        let m: Movie =
            serde_json::from_str(r#"{"id": 1, "name": "M", "genres": "Action, Drama"}"#).unwrap();
        assert_eq!(m.genres, Some(vec!["Action".into(), "Drama".into()]));
    }
}
