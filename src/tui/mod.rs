// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 PhimHub contributors

pub mod app;
pub mod event;
pub mod ui;
pub mod widgets;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;

use crate::config::Config;
use crate::player::Player;
use crate::state::AppState;

pub use app::App;
pub use event::{Event, EventHandler};

pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    pub event_handler: EventHandler,
}

impl Tui {
    pub fn new() -> Result<Self> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;
        let event_handler = EventHandler::new(250);
        Ok(Self {
            terminal,
            event_handler,
        })
    }

    pub fn init(&mut self) -> Result<()> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        self.terminal.hide_cursor()?;
        self.terminal.clear()?;
        Ok(())
    }

    pub fn draw(&mut self, app: &mut App) -> Result<()> {
        self.terminal.draw(|frame| ui::draw(frame, app))?;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

pub async fn run_tui(config: Config, player: Player, server_name: Option<String>) -> Result<()> {
    let ui = config.ui.clone();
    let state = AppState::new(config)?;
    let mut session = state.open_session(server_name.as_deref())?;
    session.load_user().await;

    let mut tui = Tui::new()?;
    tui.init()?;

    let mut app = App::new(state, session, player.clone(), ui);
    let res = run_app(&mut tui, &mut app).await;

    // Clean up player resources before exiting
    let _ = player.shutdown().await;

    tui.exit()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app(tui: &mut Tui, app: &mut App) -> Result<()> {
    // Draw once initially
    tui.draw(app)?;

    loop {
        // Wake up periodically so debounced search results land promptly
        // even when the user stops typing.
        let event = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            tui.event_handler.next(),
        )
        .await;

        let should_redraw = match event {
            Ok(Ok(Event::Key(key_event))) => {
                if let Some(app::Action::Quit) = app.handle_key_event(key_event).await {
                    break;
                }
                app.async_tick().await;
                true
            }
            Ok(Ok(Event::Mouse(mouse_event))) => {
                app.handle_mouse_event(mouse_event).await;
                true
            }
            Ok(Ok(Event::Resize(_, _))) => true,
            Ok(Ok(Event::Tick)) => app.async_tick().await,
            Ok(Err(e)) => return Err(e),
            Err(_) => app.async_tick().await,
        };

        if should_redraw {
            tui.draw(app)?;
        }
    }

    Ok(())
}
