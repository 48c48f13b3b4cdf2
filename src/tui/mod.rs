//! Terminal user interface built on ratatui

mod app;
pub mod components;
mod events;
mod keys;
mod styles;

pub use app::App;
pub use events::{Event, EventHandler};

use crate::config::Config;
use anyhow::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use tracing::info;

pub type Backend = CrosstermBackend<io::Stdout>;
pub type Frame<'a> = ratatui::Frame<'a>;

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> Result<Terminal<Backend>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore_terminal(terminal: &mut Terminal<Backend>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Best-effort restore without a terminal handle, for the panic hook
pub fn reset_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
}

/// Main TUI entry point
pub async fn run(config: &Config) -> Result<()> {
    let mut event_handler = EventHandler::new();
    let mut app = App::new(config, event_handler.sender())?;

    let mut terminal = init_terminal()?;
    app.load_catalogue();

    let result = run_app(&mut terminal, &mut app, &mut event_handler).await;

    restore_terminal(&mut terminal)?;
    info!("Interactive session ended");
    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Terminal<Backend>,
    app: &mut App,
    event_handler: &mut EventHandler,
) -> Result<()> {
    loop {
        // Pending layout changes collapse into a single pass per frame
        app.prepare_frame(terminal.size()?);
        terminal.draw(|frame| app.render(frame))?;

        let event = event_handler.next().await?;
        if app.handle_event(event).await? {
            break;
        }
    }
    Ok(())
}
