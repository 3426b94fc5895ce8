// src/ui/tui.rs
//! Terminal lifecycle and the main event loop.

use std::{io, time::Duration};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::App;

/// How long the loop waits for input before redrawing.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the player UI until the user quits. `start` is an optional
/// path or URL to begin playing immediately.
pub fn run(start: Option<String>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = App::new(start).and_then(|mut app| {
        let outcome = event_loop(&mut terminal, &mut app);
        app.shutdown();
        outcome
    });

    // Restore the terminal even when the loop errored.
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        app.process_metadata();
        terminal.draw(|f| app.draw(f))?;

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                CEvent::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.on_key(key) {
                        return Ok(());
                    }
                }
                CEvent::Mouse(mouse) => app.on_mouse(mouse),
                _ => {}
            }
        }
    }
}
