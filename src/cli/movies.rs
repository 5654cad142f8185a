use super::{CommandContext, OutputFormat, fit_to_terminal};
use anyhow::Result;
use serde_json::json;

use phimhub::api::MovieQuery;

pub struct MoviesCommand {
    pub genre: Option<String>,
    pub kind: Option<String>,
    pub page: u64,
    pub limit: u64,
    pub format: OutputFormat,
}

impl MoviesCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let session = context.open_session()?;
        session.api.enable_progress();

        let query = MovieQuery {
            q: None,
            genre: self.genre.clone(),
            country: None,
            kind: self.kind.clone(),
            limit: self.limit,
            offset: self.page.saturating_sub(1) * self.limit,
        };

        let page = session.api.get_movies(&query).await?;
        let total_pages = page.total.div_ceil(self.limit.max(1));

        match self.format {
            OutputFormat::Json => {
                let value = json!({
                    "items": page.items,
                    "total": page.total,
                    "page": self.page,
                    "total_pages": total_pages,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
            OutputFormat::Text => {
                if page.items.is_empty() {
                    println!("No movies on page {}", self.page);
                    return Ok(());
                }
                for movie in &page.items {
                    let kind = movie.kind.as_deref().unwrap_or("movie");
                    let year = movie.year.as_deref().unwrap_or("----");
                    let genres = movie
                        .genres
                        .as_ref()
                        .map(|g| g.join(", "))
                        .unwrap_or_default();
                    println!(
                        "{:>8}  [{}] {} ({})  {}",
                        movie.id,
                        kind,
                        fit_to_terminal(&movie.name, 30 + kind.len() + genres.len()),
                        year,
                        genres
                    );
                }
                eprintln!(
                    "Page {}/{} — {} title(s) total",
                    self.page, total_pages, page.total
                );
            }
        }

        Ok(())
    }
}
