use super::{CommandContext, OutputFormat, fit_to_terminal};
use anyhow::Result;

fn format_position(secs: u64) -> String {
    format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

pub enum HistoryCommand {
    List { format: OutputFormat },
    Clear,
}

impl HistoryCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let session = context.open_session()?;

        match self {
            Self::List { format } => {
                // Prefer the server's history; fall back to the local file
                // when the server is unreachable or rejects us.
                match session.api.get_watch_history().await {
                    Ok(entries) => match format {
                        OutputFormat::Json => {
                            println!("{}", serde_json::to_string_pretty(&entries)?);
                        }
                        OutputFormat::Text => {
                            if entries.is_empty() {
                                println!("No watch history yet");
                                return Ok(());
                            }
                            for entry in &entries {
                                let name = entry
                                    .movie_name
                                    .clone()
                                    .unwrap_or_else(|| format!("movie {}", entry.movie_id));
                                let episode = entry
                                    .episode
                                    .map(|e| format!(" E{:02}", e))
                                    .unwrap_or_default();
                                println!(
                                    "{:>8}  {}{}  at {}",
                                    entry.movie_id,
                                    fit_to_terminal(&name, 24),
                                    episode,
                                    format_position(entry.position_secs)
                                );
                            }
                        }
                    },
                    Err(e) => {
                        eprintln!("Server history unavailable ({}), showing local history", e);
                        let entries = context.state.history.get_entries(session.server_hash())?;
                        if entries.is_empty() {
                            println!("No local watch history");
                            return Ok(());
                        }
                        for entry in &entries {
                            let episode = entry
                                .episode
                                .map(|e| format!(" E{:02}", e))
                                .unwrap_or_default();
                            println!(
                                "{:>8}  {}{}  at {}  ({})",
                                entry.movie_id,
                                fit_to_terminal(&entry.movie_name, 36),
                                episode,
                                format_position(entry.position_secs),
                                entry.updated_at.format("%Y-%m-%d %H:%M")
                            );
                        }
                    }
                }
            }
            Self::Clear => {
                context.state.history.clear(session.server_hash())?;
                println!("✓ Local watch history cleared for {}", session.display_name());
            }
        }

        Ok(())
    }
}
