// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 PhimHub contributors

use crate::api::{PhimHubClient, User};
use crate::auth::TokenStore;
use crate::config::{Config, ServerConfig};
use crate::history::WatchHistoryStore;
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

/// Everything the composition root wires up once and hands to consumers.
/// Session and UI state live here instead of in process-wide singletons,
/// so every reader and writer is explicit.
pub struct AppState {
    pub config: Config,
    pub token_store: TokenStore,
    pub history: WatchHistoryStore,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            token_store: TokenStore::new()?,
            history: WatchHistoryStore::new()?,
        })
    }

    /// Pick a server by name (case-insensitive). With exactly one server
    /// configured and no name given, that server is selected.
    pub fn select_server(&self, name: Option<&str>) -> Result<&ServerConfig> {
        if self.config.servers.is_empty() {
            anyhow::bail!("No servers configured. Please add server details to config.toml.");
        }

        match name {
            Some(name) => self
                .config
                .servers
                .iter()
                .find(|s| {
                    s.url.eq_ignore_ascii_case(name)
                        || s.name
                            .as_ref()
                            .map(|n| n.eq_ignore_ascii_case(name))
                            .unwrap_or(false)
                })
                .ok_or_else(|| anyhow::anyhow!("Server '{}' not found", name)),
            None if self.config.servers.len() == 1 => Ok(&self.config.servers[0]),
            None => anyhow::bail!(
                "Multiple servers configured; pick one with --server or PHIMHUB_SERVER"
            ),
        }
    }

    /// Build an authenticated session against one server, seeding the
    /// client with any stored (and still valid) token.
    pub fn open_session(&self, server_name: Option<&str>) -> Result<ServerSession> {
        let server = self.select_server(server_name)?.clone();

        let mut api = PhimHubClient::new(server.url.clone(), None, server.name.clone())?;

        let token = self.token_store.load(&api.server_hash)?;
        if token.is_some() {
            debug!("Seeding session with stored token for {}", server.display_name());
        }
        api.set_token(token);

        Ok(ServerSession {
            server,
            api: Arc::new(api),
            user: None,
        })
    }
}

/// One connected server: the shared API client plus whatever session
/// facts have been learned so far.
pub struct ServerSession {
    pub server: ServerConfig,
    pub api: Arc<PhimHubClient>,
    user: Option<User>,
}

impl ServerSession {
    pub fn server_hash(&self) -> &str {
        &self.api.server_hash
    }

    pub fn display_name(&self) -> String {
        self.server.display_name()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn set_user(&mut self, user: Option<User>) {
        self.user = user;
    }

    /// Fetch and remember the authenticated user; `None` when the session
    /// has no token or the server rejects it.
    pub async fn load_user(&mut self) -> Option<&User> {
        if self.user.is_none() && self.api.has_token() {
            match self.api.me().await {
                Ok(user) => self.user = Some(user),
                Err(e) => debug!("Could not load user: {}", e),
            }
        }
        self.user.as_ref()
    }
}
