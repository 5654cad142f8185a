use super::CommandContext;
use anyhow::Result;
use chrono::Utc;

use phimhub::api::{PhimHubClient, WatchProgressBody};
use phimhub::history::WatchProgress;
use phimhub::player::Player;

pub struct PlayCommand {
    pub movie_id: u64,
    pub episode: Option<u32>,
    pub player: Player,
}

impl PlayCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let session = context.open_session()?;
        session.api.enable_progress();

        let detail = session.api.get_movie(self.movie_id).await?;
        let url = PhimHubClient::stream_url(&detail, self.episode).ok_or_else(|| {
            anyhow::anyhow!(
                "No playable source for '{}'{}",
                detail.movie.name,
                self.episode
                    .map(|e| format!(" episode {}", e))
                    .unwrap_or_default()
            )
        })?;

        session.api.disable_progress();

        // Record the watch before handing off; position is refined when
        // the server tracks playback itself.
        let progress = WatchProgress {
            movie_id: self.movie_id,
            movie_name: detail.movie.name.clone(),
            episode: self.episode,
            position_secs: 0,
            duration_secs: None,
            updated_at: Utc::now(),
        };
        if let Err(e) = context
            .state
            .history
            .record(session.server_hash(), progress)
        {
            eprintln!("Warning: failed to record local history: {}", e);
        }

        let body = WatchProgressBody {
            position_secs: 0,
            duration_secs: None,
            episode: self.episode,
        };
        if let Err(e) = session.api.push_watch_progress(self.movie_id, &body).await {
            tracing::debug!("Could not push watch progress: {}", e);
        }

        self.player.play(&url).await
    }
}
