mod app;
mod config;
mod driver;
mod event;
mod games;
mod i18n;
mod input;
mod surface;
mod ui;

use std::io::{self, Stdout};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use app::App;
use config::Args;
use event::{Event, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

fn main() -> Result<()> {
    let args = Args::parse();
    config::init_logging(args.log_file.as_deref())?;
    log::info!(
        "neon-arcade starting: lang={:?} seed={:?} tick={}ms surface={}x{}",
        args.lang,
        args.seed,
        args.tick_ms,
        args.width,
        args.height
    );

    let mut terminal = setup_terminal().context("failed to set up terminal")?;
    let result = run(&mut terminal, &args);
    restore_terminal(&mut terminal).context("failed to restore terminal")?;

    match &result {
        Ok(()) => log::info!("neon-arcade exited"),
        Err(err) => log::error!("neon-arcade failed: {err:#}"),
    }
    result
}

fn setup_terminal() -> io::Result<Tui> {
    enable_raw_mode()?;
    or_rollback(enter_screen(), || {
        if let Err(err) = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture) {
            log::warn!("failed to leave alternate screen: {err}");
        }
        if let Err(err) = disable_raw_mode() {
            log::warn!("failed to disable raw mode: {err}");
        }
    })
}

fn enter_screen() -> io::Result<Tui> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

/// Runs `rollback` when `result` is an error, then hands the result back.
fn or_rollback<T>(result: io::Result<T>, rollback: impl FnOnce()) -> io::Result<T> {
    if result.is_err() {
        rollback();
    }
    result
}

fn restore_terminal(terminal: &mut Tui) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()
}

fn run(terminal: &mut Tui, args: &Args) -> Result<()> {
    let mut app = App::new(i18n::text(args.lang), args.surface_size(), args.seed);
    let events = EventHandler::new(args.tick_ms);

    loop {
        terminal
            .draw(|frame| ui::render(frame, &mut app))
            .context("failed to draw frame")?;

        match events.next().context("event channel closed")? {
            Event::Tick => app.on_tick(),
            Event::Key(key) => app.on_key(key),
            Event::Mouse(mouse) => app.on_mouse(mouse),
        }

        if app.should_quit {
            app.back_to_menu();
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn failed_setup_rolls_back() {
        let rolled_back = Cell::new(false);
        let result: io::Result<()> = or_rollback(Err(io::Error::other("no tty")), || rolled_back.set(true));
        assert!(result.is_err());
        assert!(rolled_back.get());
    }

    #[test]
    fn successful_setup_keeps_terminal_state() {
        let rolled_back = Cell::new(false);
        let result = or_rollback(Ok(3), || rolled_back.set(true));
        assert_eq!(result.ok(), Some(3));
        assert!(!rolled_back.get());
    }
}
