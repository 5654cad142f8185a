use anyhow::Result;
use inquire::Select;

use phimhub::config::Config;
use phimhub::state::{AppState, ServerSession};

pub mod auth;
pub mod cache;
pub mod favorites;
pub mod history;
pub mod lists;
pub mod movies;
pub mod play;
pub mod search;

pub use auth::AuthCommand;
pub use cache::CacheCommand;
pub use favorites::FavoritesCommand;
pub use history::HistoryCommand;
pub use lists::ListsCommand;
pub use movies::MoviesCommand;
pub use play::PlayCommand;
pub use search::SearchCommand;

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!("Invalid format: {}. Use 'text' or 'json'", s),
        }
    }
}

/// Context for command execution with server selection
pub struct CommandContext {
    pub state: AppState,
    pub selected_server: Option<String>,
}

impl CommandContext {
    pub fn new(config: Config, selected_server: Option<String>) -> Result<Self> {
        Ok(Self {
            state: AppState::new(config)?,
            selected_server,
        })
    }

    /// Open a session against the selected server, prompting when several
    /// are configured and none was named.
    pub fn open_session(&self) -> Result<ServerSession> {
        let name = match &self.selected_server {
            Some(name) => Some(name.clone()),
            None if self.state.config.servers.len() > 1 => Some(self.prompt_server_selection()?),
            None => None,
        };
        self.state.open_session(name.as_deref())
    }

    fn prompt_server_selection(&self) -> Result<String> {
        let server_names: Vec<String> = self
            .state
            .config
            .servers
            .iter()
            .map(|s| s.display_name())
            .collect();

        let selection = Select::new("Select server:", server_names).prompt()?;
        Ok(selection)
    }
}

/// Truncate a display string to fit the current terminal, keeping room
/// for the fixed columns around it.
pub fn fit_to_terminal(text: &str, reserved: usize) -> String {
    let width = terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80);
    let budget = width.saturating_sub(reserved).max(10);

    if text.chars().count() <= budget {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(budget.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}
