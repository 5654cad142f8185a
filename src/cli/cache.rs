use super::CommandContext;
use anyhow::Result;

pub enum CacheCommand {
    Refresh,
    Clear,
}

impl CacheCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let session = context.open_session()?;
        let name = session.display_name();

        match self {
            Self::Refresh => {
                session.api.refresh_cache().await?;
                println!("✓ Cache refreshed for {}", name);
            }
            Self::Clear => {
                eprintln!("Clearing cache for {}...", name);
                session.api.clear_cache().await?;
                println!("Cache cleared for {}", name);
            }
        }

        Ok(())
    }
}
