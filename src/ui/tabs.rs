use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::App;
use crate::games::GameId;

use super::badge;

/// Title strip. Highlights the title being played, or the carousel pick.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let text = app.text();
    let current = app.active_game().unwrap_or(app.selected());
    let (_, current_accent) = badge(current);

    let entries: Vec<Line> = GameId::all()
        .iter()
        .map(|&id| {
            let (icon, accent) = badge(id);
            let name = text.game(id).name;
            if id == current {
                Line::from(vec![
                    Span::raw(format!("{icon} ")),
                    Span::styled(name, Style::default().fg(accent).add_modifier(Modifier::BOLD)),
                ])
            } else {
                Line::from(Span::styled(name, Style::default().fg(Color::Rgb(90, 90, 110))))
            }
        })
        .collect();

    let strip = Tabs::new(entries)
        .select(current.index())
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .divider(Span::styled(" · ", Style::default().fg(Color::Rgb(50, 50, 70))))
        .block(
            Block::default()
                .borders(Borders::BOTTOM | Borders::TOP)
                .border_type(BorderType::Thick)
                .border_style(Style::default().fg(current_accent))
                .title(Line::from(Span::styled(
                    format!(" {} ", text.title),
                    Style::default().fg(Color::Rgb(255, 0, 255)).add_modifier(Modifier::BOLD),
                ))),
        );

    frame.render_widget(strip, area);
}
