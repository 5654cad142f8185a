// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 PhimHub contributors

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::fs as async_fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    pub created_at: u64,
    pub ttl_seconds: u64,
    pub server_url: String,
    pub server_name: Option<String>,
    /// Paged responses store the server-reported total alongside the items.
    #[serde(default)]
    pub total: Option<u64>,
}

impl CacheMetadata {
    pub fn new(server_url: String, server_name: Option<String>, ttl_seconds: u64) -> Self {
        Self {
            created_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_secs(),
            ttl_seconds,
            server_url,
            server_name,
            total: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        now > self.created_at + self.ttl_seconds
    }

    pub fn time_until_expiry(&self) -> Duration {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let expiry_time = self.created_at + self.ttl_seconds;
        if now < expiry_time {
            Duration::from_secs(expiry_time - now)
        } else {
            Duration::ZERO
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub metadata: CacheMetadata,
    pub data: T,
}

impl<T> CachedData<T> {
    pub fn new(data: T, metadata: CacheMetadata) -> Self {
        Self { metadata, data }
    }

    pub fn is_expired(&self) -> bool {
        self.metadata.is_expired()
    }
}

/// On-disk cache for catalog responses (genres, movie pages, movie detail),
/// one subdirectory per server. Favorites, lists, and watch history are
/// never stored here.
#[derive(Debug)]
pub struct CatalogCache {
    cache_dir: PathBuf,
    server_index: HashMap<String, String>,
}

impl CatalogCache {
    pub fn new() -> Result<Self> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine cache directory"))?
            .join("phimhub");

        let mut cache = Self {
            cache_dir,
            server_index: HashMap::new(),
        };

        cache.ensure_cache_dir_exists()?;
        cache.load_server_index()?;

        Ok(cache)
    }

    fn ensure_cache_dir_exists(&self) -> Result<()> {
        let servers_dir = self.cache_dir.join("servers");
        if !servers_dir.exists() {
            fs::create_dir_all(&servers_dir).with_context(|| {
                format!(
                    "Failed to create cache directory: {}",
                    servers_dir.display()
                )
            })?;
        }
        Ok(())
    }

    fn load_server_index(&mut self) -> Result<()> {
        let index_path = self.cache_dir.join("index.json");
        if index_path.exists() {
            let content = fs::read_to_string(&index_path)
                .with_context(|| format!("Failed to read server index: {}", index_path.display()))?;
            self.server_index = serde_json::from_str(&content)
                .with_context(|| "Failed to parse server index JSON")?;
        }
        Ok(())
    }

    fn save_server_index(&self) -> Result<()> {
        let index_path = self.cache_dir.join("index.json");
        let content = serde_json::to_string_pretty(&self.server_index)
            .with_context(|| "Failed to serialize server index")?;
        fs::write(&index_path, content)
            .with_context(|| format!("Failed to write server index: {}", index_path.display()))?;
        Ok(())
    }

    pub fn get_server_hash(&mut self, server_url: &str) -> Result<String> {
        if let Some(hash) = self.server_index.get(server_url) {
            return Ok(hash.clone());
        }

        let mut hasher = Sha256::new();
        hasher.update(server_url.as_bytes());
        let hash = format!("{:x}", hasher.finalize())[..16].to_string();

        self.server_index
            .insert(server_url.to_string(), hash.clone());
        self.save_server_index()?;

        let server_dir = self.cache_dir.join("servers").join(&hash);
        if !server_dir.exists() {
            fs::create_dir_all(&server_dir).with_context(|| {
                format!(
                    "Failed to create server cache directory: {}",
                    server_dir.display()
                )
            })?;
        }

        Ok(hash)
    }

    fn get_cache_path(
        &self,
        server_hash: &str,
        cache_type: &str,
        sub_key: Option<&str>,
    ) -> PathBuf {
        let filename = if let Some(key) = sub_key {
            let mut hasher = Sha256::new();
            hasher.update(key.as_bytes());
            let key_hash = format!("{:x}", hasher.finalize())[..8].to_string();
            format!("{}_{}.json", cache_type, key_hash)
        } else {
            format!("{}.json", cache_type)
        };

        self.cache_dir
            .join("servers")
            .join(server_hash)
            .join(filename)
    }

    pub async fn get_cached<T>(
        &self,
        server_hash: &str,
        cache_type: &str,
        sub_key: Option<&str>,
    ) -> Result<Option<CachedData<T>>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let cache_path = self.get_cache_path(server_hash, cache_type, sub_key);

        if !cache_path.exists() {
            return Ok(None);
        }

        let content = async_fs::read_to_string(&cache_path)
            .await
            .with_context(|| format!("Failed to read cache file: {}", cache_path.display()))?;

        let cached_data: CachedData<T> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse cache JSON: {}", cache_path.display()))?;

        Ok(Some(cached_data))
    }

    pub async fn store_cache<T>(
        &self,
        server_hash: &str,
        cache_type: &str,
        sub_key: Option<&str>,
        data: T,
        metadata: CacheMetadata,
    ) -> Result<()>
    where
        T: Serialize,
    {
        let cache_path = self.get_cache_path(server_hash, cache_type, sub_key);

        if let Some(parent) = cache_path.parent() {
            if !parent.exists() {
                async_fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create cache directory: {}", parent.display())
                })?;
            }
        }

        let cached_data = CachedData::new(data, metadata);
        let content = serde_json::to_string_pretty(&cached_data)
            .with_context(|| "Failed to serialize cache data")?;

        async_fs::write(&cache_path, content)
            .await
            .with_context(|| format!("Failed to write cache file: {}", cache_path.display()))?;

        Ok(())
    }

    pub async fn clear_server_cache(&self, server_hash: &str) -> Result<()> {
        let server_dir = self.cache_dir.join("servers").join(server_hash);
        if server_dir.exists() {
            async_fs::remove_dir_all(&server_dir)
                .await
                .with_context(|| {
                    format!(
                        "Failed to remove server cache directory: {}",
                        server_dir.display()
                    )
                })?;
        }
        Ok(())
    }

    pub async fn clear_all_cache(&self) -> Result<()> {
        let servers_dir = self.cache_dir.join("servers");
        if servers_dir.exists() {
            async_fs::remove_dir_all(&servers_dir)
                .await
                .with_context(|| {
                    format!(
                        "Failed to remove servers cache directory: {}",
                        servers_dir.display()
                    )
                })?;
        }
        self.ensure_cache_dir_exists()?;
        Ok(())
    }

    pub fn list_cached_servers(&self) -> Vec<(String, String)> {
        self.server_index
            .iter()
            .map(|(url, hash)| (url.clone(), hash.clone()))
            .collect()
    }
}
