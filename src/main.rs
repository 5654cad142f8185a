// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 PhimHub contributors

use anyhow::Result;
use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand};
use std::fs::File;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use phimhub::api::PersonRole;
use phimhub::{Config, Player};

mod cli;
use cli::{
    AuthCommand, CacheCommand, CommandContext, FavoritesCommand, HistoryCommand, ListsCommand,
    MoviesCommand, OutputFormat, PlayCommand, SearchCommand,
};

fn cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Cyan.on_default())
}

#[derive(Parser)]
#[command(name = "phimhub")]
#[command(about = "A terminal client for PhimHub streaming servers")]
#[command(version)]
#[command(styles = cargo_style())]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging to file (phimhub_debug.log)
    #[arg(long, global = true)]
    debug_log: bool,

    /// Server name to use (case-insensitive, or set PHIMHUB_SERVER)
    #[arg(short, long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch interactive TUI (default if no command given)
    Tui,

    /// Log in to a server and store the session token
    Login {
        /// Account email (prompted when omitted)
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Remove the stored session token
    Logout,

    /// Show the authenticated user
    Whoami,

    /// Search the catalog or the people index
    Search {
        /// Search query
        query: String,
        /// Restrict catalog search to a type (movie, series)
        #[arg(short = 't', long)]
        r#type: Option<String>,
        /// Search people instead of titles (actor, director)
        #[arg(long)]
        people: Option<String>,
        /// Page size
        #[arg(long, default_value_t = 50)]
        limit: u64,
        /// Fetch every page, not just the first
        #[arg(long)]
        all: bool,
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Browse the movie catalog
    Movies {
        /// Filter by genre slug
        #[arg(short, long)]
        genre: Option<String>,
        /// Filter by type (movie, series)
        #[arg(short = 't', long)]
        r#type: Option<String>,
        /// 1-based page number
        #[arg(short, long, default_value_t = 1)]
        page: u64,
        /// Page size
        #[arg(long, default_value_t = 50)]
        limit: u64,
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Manage favorites
    #[command(subcommand)]
    Favorites(FavoritesSubcommand),

    /// Manage custom lists
    #[command(subcommand)]
    Lists(ListsSubcommand),

    /// Show or clear watch history
    #[command(subcommand)]
    History(HistorySubcommand),

    /// Play a movie or episode
    Play {
        /// Movie id
        movie_id: u64,
        /// Episode number for series
        #[arg(short, long)]
        episode: Option<u32>,
    },

    /// Manage the catalog cache
    #[command(subcommand)]
    Cache(CacheSubcommand),

    /// Execute raw API calls
    Api {
        /// Endpoint path, e.g. /movies or /genres
        path: String,
        /// Query parameters as key=value pairs
        #[arg(short, long)]
        query: Vec<String>,
    },
}

#[derive(Subcommand)]
enum FavoritesSubcommand {
    /// List favorites
    List {
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Add a movie to favorites
    Add { movie_id: u64 },
    /// Remove a movie from favorites
    Remove { movie_id: u64 },
}

#[derive(Subcommand)]
enum ListsSubcommand {
    /// List custom lists
    List {
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Create a custom list
    Create { name: String },
    /// Add a movie to a list
    Add { list_id: u64, movie_id: u64 },
    /// Remove a movie from a list
    Remove { list_id: u64, movie_id: u64 },
    /// Delete a list
    Delete { list_id: u64 },
}

#[derive(Subcommand)]
enum HistorySubcommand {
    /// Show watch history
    List {
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Clear local watch history
    Clear,
}

#[derive(Subcommand)]
enum CacheSubcommand {
    /// Refresh cache
    Refresh,
    /// Clear cache
    Clear,
}

fn setup_logging(cli: &Cli) -> Result<()> {
    if cli.debug_log {
        let file = File::create("phimhub_debug.log")?;
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_level(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(file_layer)
            .with(
                EnvFilter::from_default_env()
                    .add_directive("phimhub=debug".parse()?)
                    .add_directive("hyper_util=error".parse()?),
            )
            .init();
    } else if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env()
                    .add_directive(tracing::Level::DEBUG.into())
                    .add_directive("hyper_util=error".parse()?),
            )
            .init();
    } else if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("hyper_util=error".parse()?),
            )
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli)?;

    let config_path = Config::default_path();
    let config = if config_path.exists() {
        Config::load(&config_path)?
    } else {
        let config = Config::default();
        if let Ok(dir) = Config::ensure_config_dir() {
            let path = dir.join("config.toml");
            if config.save(&path).is_ok() {
                eprintln!("Wrote example config to {}", path.display());
                eprintln!("Edit it to point at your PhimHub server.");
            }
        }
        config
    };

    let selected_server = cli
        .server
        .clone()
        .or_else(|| std::env::var("PHIMHUB_SERVER").ok());

    let player = Player::new(config.player.clone());

    match cli.command {
        Some(Commands::Tui) | None => {
            phimhub::run_tui(config, player, selected_server).await?;
            return Ok(());
        }
        Some(command) => {
            let context = CommandContext::new(config, selected_server)?;
            run_command(command, context, player).await?;
        }
    }

    Ok(())
}

async fn run_command(command: Commands, context: CommandContext, player: Player) -> Result<()> {
    match command {
        Commands::Login { email } => AuthCommand::Login { email }.execute(context).await,
        Commands::Logout => AuthCommand::Logout.execute(context).await,
        Commands::Whoami => AuthCommand::Whoami.execute(context).await,

        Commands::Search {
            query,
            r#type,
            people,
            limit,
            all,
            format,
        } => {
            let people = people.map(|p| PersonRole::from_str(&p)).transpose()?;
            let cmd = SearchCommand {
                query,
                kind: r#type,
                people,
                format: OutputFormat::from_str(&format)?,
                limit,
                all,
            };
            cmd.execute(context).await
        }

        Commands::Movies {
            genre,
            r#type,
            page,
            limit,
            format,
        } => {
            let cmd = MoviesCommand {
                genre,
                kind: r#type,
                page: page.max(1),
                limit,
                format: OutputFormat::from_str(&format)?,
            };
            cmd.execute(context).await
        }

        Commands::Favorites(sub) => {
            let cmd = match sub {
                FavoritesSubcommand::List { format } => FavoritesCommand::List {
                    format: OutputFormat::from_str(&format)?,
                },
                FavoritesSubcommand::Add { movie_id } => FavoritesCommand::Add { movie_id },
                FavoritesSubcommand::Remove { movie_id } => FavoritesCommand::Remove { movie_id },
            };
            cmd.execute(context).await
        }

        Commands::Lists(sub) => {
            let cmd = match sub {
                ListsSubcommand::List { format } => ListsCommand::List {
                    format: OutputFormat::from_str(&format)?,
                },
                ListsSubcommand::Create { name } => ListsCommand::Create { name },
                ListsSubcommand::Add { list_id, movie_id } => {
                    ListsCommand::Add { list_id, movie_id }
                }
                ListsSubcommand::Remove { list_id, movie_id } => {
                    ListsCommand::Remove { list_id, movie_id }
                }
                ListsSubcommand::Delete { list_id } => ListsCommand::Delete { list_id },
            };
            cmd.execute(context).await
        }

        Commands::History(sub) => {
            let cmd = match sub {
                HistorySubcommand::List { format } => HistoryCommand::List {
                    format: OutputFormat::from_str(&format)?,
                },
                HistorySubcommand::Clear => HistoryCommand::Clear,
            };
            cmd.execute(context).await
        }

        Commands::Play { movie_id, episode } => {
            let cmd = PlayCommand {
                movie_id,
                episode,
                player,
            };
            cmd.execute(context).await
        }

        Commands::Cache(sub) => {
            let cmd = match sub {
                CacheSubcommand::Refresh => CacheCommand::Refresh,
                CacheSubcommand::Clear => CacheCommand::Clear,
            };
            cmd.execute(context).await
        }

        Commands::Api { path, query } => {
            let session = context.open_session()?;
            let params: Vec<(&str, String)> = query
                .iter()
                .filter_map(|pair| {
                    pair.split_once('=')
                        .map(|(k, v)| (k, v.to_string()))
                })
                .collect();
            let path = if path.starts_with('/') {
                path
            } else {
                format!("/{}", path)
            };
            let result = session.api.get_raw(&path, &params).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }

        Commands::Tui => unreachable!("handled in main"),
    }
}
