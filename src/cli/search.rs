use super::{CommandContext, OutputFormat, fit_to_terminal};
use anyhow::Result;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use phimhub::api::{Movie, Person, PersonRole};
use phimhub::search::{
    Keyed, MovieSearchSource, PagedSource, PeopleSelectionSource, SearchSession,
};

pub struct SearchCommand {
    pub query: String,
    pub kind: Option<String>,
    pub people: Option<PersonRole>,
    pub format: OutputFormat,
    pub limit: u64,
    pub all: bool,
}

impl SearchCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let session = context.open_session()?;
        eprintln!("Searching on {}...", session.display_name());

        if let Some(role) = self.people {
            let source = Arc::new(PeopleSelectionSource::new(Arc::clone(&session.api), role));
            let results = self.run_session::<Person>(source).await?;
            self.print_people(&results);
        } else {
            let mut source = MovieSearchSource::new(Arc::clone(&session.api));
            source.kind = self.kind.clone();
            let results = self.run_session::<Movie>(Arc::new(source)).await?;
            self.print_movies(&results);
        }

        Ok(())
    }

    /// Drive a search session to completion: one page by default, every
    /// page when --all was given. Same accumulator the TUI scrolls through.
    async fn run_session<T: Keyed + Send + Clone + 'static>(
        &self,
        source: Arc<dyn PagedSource<T>>,
    ) -> Result<SearchResults<T>> {
        let mut session = SearchSession::new(source, self.limit, Duration::ZERO);
        session.set_query(self.query.clone());
        session.settle().await;

        if let Some(error) = session.error() {
            anyhow::bail!("Search failed: {}", error);
        }

        if self.all {
            while session.load_more() {
                session.settle().await;
                if let Some(error) = session.error() {
                    anyhow::bail!(
                        "Search failed after {} of {} results: {}",
                        session.items().len(),
                        session.total(),
                        error
                    );
                }
            }
        }

        Ok(SearchResults {
            items: session.items().to_vec(),
            total: session.total(),
            has_more: session.has_more(),
        })
    }

    fn print_people(&self, results: &SearchResults<Person>) {
        match self.format {
            OutputFormat::Json => {
                let value = json!({
                    "items": &results.items,
                    "total": results.total,
                });
                println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
            }
            OutputFormat::Text => {
                if results.items.is_empty() {
                    println!("No results found for '{}'", self.query);
                    return;
                }
                for person in &results.items {
                    let extra = match (&person.nationality, &person.dob) {
                        (Some(nat), Some(dob)) => format!(" ({}, {})", nat, dob),
                        (Some(nat), None) => format!(" ({})", nat),
                        (None, Some(dob)) => format!(" ({})", dob),
                        (None, None) => String::new(),
                    };
                    println!(
                        "{:>8}  {}{}",
                        person.id,
                        fit_to_terminal(&person.name, 10 + extra.len()),
                        extra
                    );
                }
                self.print_footer(results.items.len(), results.total, results.has_more);
            }
        }
    }

    fn print_movies(&self, results: &SearchResults<Movie>) {
        match self.format {
            OutputFormat::Json => {
                let value = json!({
                    "items": &results.items,
                    "total": results.total,
                });
                println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
            }
            OutputFormat::Text => {
                if results.items.is_empty() {
                    println!("No results found for '{}'", self.query);
                    return;
                }
                for movie in &results.items {
                    let kind = movie.kind.as_deref().unwrap_or("movie");
                    let year = movie.year.as_deref().unwrap_or("----");
                    println!(
                        "{:>8}  [{}] {} ({})",
                        movie.id,
                        kind,
                        fit_to_terminal(&movie.name, 22 + kind.len()),
                        year
                    );
                }
                self.print_footer(results.items.len(), results.total, results.has_more);
            }
        }
    }

    fn print_footer(&self, shown: usize, total: u64, has_more: bool) {
        if has_more {
            eprintln!(
                "Showing {} of {} results (use --all or --limit to fetch more)",
                shown, total
            );
        } else {
            eprintln!("{} result(s)", shown);
        }
    }
}

struct SearchResults<T> {
    items: Vec<T>,
    total: u64,
    has_more: bool,
}
