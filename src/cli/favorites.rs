use super::{CommandContext, OutputFormat, fit_to_terminal};
use anyhow::Result;

pub enum FavoritesCommand {
    List { format: OutputFormat },
    Add { movie_id: u64 },
    Remove { movie_id: u64 },
}

impl FavoritesCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let session = context.open_session()?;

        match self {
            Self::List { format } => {
                let favorites = session.api.get_favorites().await?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&favorites)?);
                    }
                    OutputFormat::Text => {
                        if favorites.is_empty() {
                            println!("No favorites yet");
                            return Ok(());
                        }
                        for movie in &favorites {
                            let year = movie.year.as_deref().unwrap_or("----");
                            println!(
                                "{:>8}  {} ({})",
                                movie.id,
                                fit_to_terminal(&movie.name, 18),
                                year
                            );
                        }
                        eprintln!("{} favorite(s)", favorites.len());
                    }
                }
            }
            Self::Add { movie_id } => {
                session.api.add_favorite(movie_id).await?;
                println!("✓ Added movie {} to favorites", movie_id);
            }
            Self::Remove { movie_id } => {
                session.api.remove_favorite(movie_id).await?;
                println!("✓ Removed movie {} from favorites", movie_id);
            }
        }

        Ok(())
    }
}
