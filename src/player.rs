// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 PhimHub contributors

use crate::config::PlayerConfig;
use anyhow::{Context, Result};
use rand::Rng;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const HLS_RETRIES: u32 = 3;

pub struct Player {
    config: PlayerConfig,
    current_process: Arc<Mutex<Option<Child>>>,
}

impl Clone for Player {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            current_process: Arc::new(Mutex::new(None)),
        }
    }
}

impl Player {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            config,
            current_process: Arc::new(Mutex::new(None)),
        }
    }

    fn command_works(command: &str) -> bool {
        Command::new(command)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// The configured player, or the first working fallback candidate.
    fn resolve_command(&self) -> Result<String> {
        if Self::command_works(&self.config.command) {
            return Ok(self.config.command.clone());
        }

        for candidate in &self.config.fallbacks {
            if candidate != &self.config.command && Self::command_works(candidate) {
                warn!(
                    "Player '{}' not available, falling back to '{}'",
                    self.config.command, candidate
                );
                return Ok(candidate.clone());
            }
        }

        anyhow::bail!(
            "No working player found. Tried '{}' and fallbacks {:?}",
            self.config.command,
            self.config.fallbacks
        )
    }

    pub fn is_available(&self) -> bool {
        self.resolve_command().is_ok()
    }

    fn build_command(&self, command: &str, url: &str) -> Command {
        let mut cmd = Command::new(command);
        // Configured args are tuned for the primary player; fallbacks get
        // only the URL.
        if command == self.config.command {
            for arg in &self.config.args {
                cmd.arg(arg);
            }
        }
        cmd.arg(url);
        cmd
    }

    /// Foreground playback for CLI use. HLS streams often fail on the first
    /// segment request when the origin is cold; retry a bounded number of
    /// times with a short jittered delay before giving up.
    pub async fn play(&self, url: &str) -> Result<()> {
        let command = self.resolve_command()?;
        let is_hls = url.contains(".m3u8");
        let attempts = if is_hls { HLS_RETRIES } else { 1 };

        let mut last_status = None;
        for attempt in 1..=attempts {
            println!("Starting player: {} {}", command, url);

            let status = self
                .build_command(&command, url)
                .status()
                .with_context(|| format!("Failed to execute player command: {}", command))?;

            if status.success() {
                return Ok(());
            }
            last_status = Some(status);

            if attempt < attempts {
                let jitter: u64 = rand::rng().random_range(0..250);
                let delay = Duration::from_millis(500 + jitter);
                warn!(
                    "Player exited with {} on attempt {}/{}, retrying in {:?}",
                    status, attempt, attempts, delay
                );
                tokio::time::sleep(delay).await;
            }
        }

        Err(anyhow::anyhow!(
            "Player process failed with exit code: {}",
            last_status.map(|s| s.to_string()).unwrap_or_default()
        ))
    }

    /// Detached playback with no terminal attachment; used by one-shot
    /// launcher paths that must exit before the player does.
    pub async fn play_detached(&self, url: &str) -> Result<()> {
        let command = self.resolve_command()?;
        let mut cmd = self.build_command(&command, url);

        cmd.stdout(Stdio::null())
            .stderr(Stdio::null())
            .stdin(Stdio::null());

        cmd.spawn()
            .with_context(|| format!("Failed to start player in background: {}", command))?;

        Ok(())
    }

    /// Background playback for TUI mode; any previous playback is stopped
    /// first and the child handle retained for stop/is_playing.
    pub async fn play_tui(&self, url: &str) -> Result<()> {
        {
            let mut process_guard = self.current_process.lock().await;
            if let Some(mut child) = process_guard.take() {
                let _ = child.kill();
            }
        }

        let command = self.resolve_command()?;
        let config_command = self.config.command.clone();
        let config_args = self.config.args.clone();
        let url = url.to_string();
        let url_for_log = url.clone();

        let child = tokio::task::spawn_blocking(move || {
            let mut cmd = Command::new(&command);
            if command == config_command {
                for arg in &config_args {
                    cmd.arg(arg);
                }
            }

            // Keep mpv from touching the terminal the TUI owns.
            if command == "mpv" {
                cmd.arg("--no-terminal");
                cmd.arg("--really-quiet");
                cmd.arg("--force-window=immediate");
                cmd.arg("--keep-open=no");
            }

            cmd.arg(&url);
            cmd.stdout(Stdio::null())
                .stderr(Stdio::null())
                .stdin(Stdio::null());

            cmd.spawn()
        })
        .await
        .with_context(|| "Failed to spawn blocking task")?
        .with_context(|| format!("Failed to start player: {}", self.config.command))?;

        debug!("Player started for {}", url_for_log);

        {
            let mut process_guard = self.current_process.lock().await;
            *process_guard = Some(child);
        }

        Ok(())
    }

    pub async fn stop(&self) -> Result<()> {
        let mut process_guard = self.current_process.lock().await;
        if let Some(mut child) = process_guard.take() {
            // Don't wait; blocking the TUI on player teardown is worse
            // than leaving the kill asynchronous.
            let _ = child.kill();
        }
        Ok(())
    }

    pub async fn is_playing(&self) -> bool {
        let mut process_guard = self.current_process.lock().await;
        if let Some(child) = process_guard.as_mut() {
            match child.try_wait() {
                Ok(Some(_)) => {
                    *process_guard = None;
                    false
                }
                Ok(None) => true,
                Err(_) => {
                    *process_guard = None;
                    false
                }
            }
        } else {
            false
        }
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.stop().await
    }
}
