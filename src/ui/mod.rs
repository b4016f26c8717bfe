pub mod menu;
pub mod play;
pub mod tabs;

use ratatui::prelude::*;

use crate::app::App;
use crate::games::GameId;

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title strip
            Constraint::Min(0),   // Content
        ])
        .split(frame.area());

    tabs::render_tabs(frame, app, chunks[0]);

    match app.active_game() {
        None => menu::render_menu(frame, chunks[1], app),
        Some(id) => play::render_play(frame, chunks[1], app, id),
    }
}

/// Icon and neon accent for a title.
pub fn badge(id: GameId) -> (&'static str, Color) {
    match id {
        GameId::Snake => ("🐍", Color::Rgb(0, 255, 255)),
        GameId::Pong => ("🏓", Color::Rgb(255, 0, 255)),
        GameId::Breaker => ("🧱", Color::Rgb(0, 255, 0)),
        GameId::Invaders => ("👾", Color::Rgb(255, 220, 80)),
        GameId::Tetris => ("🧩", Color::Rgb(255, 127, 0)),
    }
}

/// A `w`×`h` rect centred in `area`, shrunk to fit.
pub fn centered(area: Rect, w: u16, h: u16) -> Rect {
    let w = w.min(area.width);
    let h = h.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}
