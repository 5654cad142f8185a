use super::CommandContext;
use anyhow::{Context, Result};
use inquire::{Password, Text};

use phimhub::auth::decode_claims;

pub enum AuthCommand {
    Login { email: Option<String> },
    Logout,
    Whoami,
}

impl AuthCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let mut session = context.open_session()?;

        match self {
            Self::Login { email } => {
                let email = match email {
                    Some(email) => email,
                    None => Text::new("Email:").prompt()?,
                };
                let password = Password::new("Password:")
                    .without_confirmation()
                    .prompt()?;

                // The shared client is still exclusively ours here.
                let api = std::sync::Arc::get_mut(&mut session.api)
                    .context("Session client unexpectedly shared during login")?;

                let auth = api.login(&email, &password).await?;
                context
                    .state
                    .token_store
                    .save(&api.server_hash, &auth.token)?;

                let expiry = decode_claims(&auth.token)
                    .ok()
                    .and_then(|c| c.expires_at())
                    .map(|t| format!(" (expires {})", t.format("%Y-%m-%d %H:%M UTC")))
                    .unwrap_or_default();

                match auth.user {
                    Some(user) => println!("✓ Logged in as {}{}", user.email, expiry),
                    None => println!("✓ Logged in{}", expiry),
                }
            }
            Self::Logout => {
                context.state.token_store.clear(session.server_hash())?;
                println!("✓ Logged out from {}", session.display_name());
            }
            Self::Whoami => {
                if !session.api.has_token() {
                    println!("Not logged in (no stored token)");
                    return Ok(());
                }
                match session.load_user().await {
                    Some(user) => {
                        let name = user
                            .display_name
                            .clone()
                            .or_else(|| user.username.clone())
                            .unwrap_or_else(|| user.email.clone());
                        let role = user.role.as_deref().unwrap_or("user");
                        println!("{} <{}> [{}]", name, user.email, role);
                    }
                    None => println!("Token rejected by server; try 'phimhub login' again"),
                }
            }
        }

        Ok(())
    }
}
