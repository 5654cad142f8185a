use super::{CommandContext, OutputFormat};
use anyhow::Result;

pub enum ListsCommand {
    List { format: OutputFormat },
    Create { name: String },
    Add { list_id: u64, movie_id: u64 },
    Remove { list_id: u64, movie_id: u64 },
    Delete { list_id: u64 },
}

impl ListsCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let session = context.open_session()?;

        match self {
            Self::List { format } => {
                let lists = session.api.get_custom_lists().await?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&lists)?);
                    }
                    OutputFormat::Text => {
                        if lists.is_empty() {
                            println!("No custom lists yet");
                            return Ok(());
                        }
                        for list in &lists {
                            let count = list
                                .item_count
                                .or_else(|| list.items.as_ref().map(|i| i.len() as u64))
                                .unwrap_or(0);
                            println!("{:>8}  {} ({} item(s))", list.id, list.name, count);
                        }
                    }
                }
            }
            Self::Create { name } => {
                let list = session.api.create_custom_list(&name).await?;
                println!("✓ Created list '{}' (id {})", list.name, list.id);
            }
            Self::Add { list_id, movie_id } => {
                session.api.add_to_list(list_id, movie_id).await?;
                println!("✓ Added movie {} to list {}", movie_id, list_id);
            }
            Self::Remove { list_id, movie_id } => {
                session.api.remove_from_list(list_id, movie_id).await?;
                println!("✓ Removed movie {} from list {}", movie_id, list_id);
            }
            Self::Delete { list_id } => {
                session.api.delete_list(list_id).await?;
                println!("✓ Deleted list {}", list_id);
            }
        }

        Ok(())
    }
}
