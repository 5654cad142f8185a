// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 PhimHub contributors

use crate::config::Config;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchProgress {
    pub movie_id: u64,
    pub movie_name: String,
    pub episode: Option<u32>,
    pub position_secs: u64,
    pub duration_secs: Option<u64>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryData {
    pub entries: Vec<WatchProgress>,
}

/// Local playback progress, one file per server, stored in the config
/// directory so resume still works when the server is unreachable.
#[derive(Debug)]
pub struct WatchHistoryStore {
    history_dir: PathBuf,
}

impl WatchHistoryStore {
    pub fn new() -> Result<Self> {
        let config_dir = Config::ensure_config_dir()?;
        let history_dir = config_dir.join("history");

        if !history_dir.exists() {
            fs::create_dir_all(&history_dir).with_context(|| {
                format!(
                    "Failed to create history directory: {}",
                    history_dir.display()
                )
            })?;
        }

        Ok(Self { history_dir })
    }

    fn history_path(&self, server_hash: &str) -> PathBuf {
        self.history_dir.join(format!("{}.json", server_hash))
    }

    /// Entries for one server, most recently watched first, one per movie.
    pub fn get_entries(&self, server_hash: &str) -> Result<Vec<WatchProgress>> {
        let path = self.history_path(server_hash);

        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read history file: {}", path.display()))?;

        let data: HistoryData =
            serde_json::from_str(&content).with_context(|| "Failed to parse history JSON")?;

        let mut entries = data.entries;
        entries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(entries)
    }

    fn save_entries(&self, server_hash: &str, entries: Vec<WatchProgress>) -> Result<()> {
        let path = self.history_path(server_hash);
        let data = HistoryData { entries };

        let content =
            serde_json::to_string_pretty(&data).with_context(|| "Failed to serialize history")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write history file: {}", path.display()))?;

        Ok(())
    }

    /// Record progress for a movie. The movie keeps a single entry; the
    /// latest position wins.
    pub fn record(&self, server_hash: &str, progress: WatchProgress) -> Result<()> {
        let mut entries = self.get_entries(server_hash)?;
        entries.retain(|e| e.movie_id != progress.movie_id);
        entries.push(progress);
        self.save_entries(server_hash, entries)
    }

    pub fn get_progress(&self, server_hash: &str, movie_id: u64) -> Result<Option<WatchProgress>> {
        let entries = self.get_entries(server_hash)?;
        Ok(entries.into_iter().find(|e| e.movie_id == movie_id))
    }

    pub fn remove(&self, server_hash: &str, movie_id: u64) -> Result<()> {
        let mut entries = self.get_entries(server_hash)?;
        entries.retain(|e| e.movie_id != movie_id);
        self.save_entries(server_hash, entries)
    }

    pub fn clear(&self, server_hash: &str) -> Result<()> {
        let path = self.history_path(server_hash);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove history file: {}", path.display()))?;
        }
        Ok(())
    }
}
