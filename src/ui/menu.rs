use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::App;
use crate::games::GameId;
use crate::i18n::ArcadeText;

use super::{badge, centered};

const BANNER: &str = r#"
 ╔══════════════════════════════════════════════════════════════╗
 ║  █▄ █ █▀▀ █▀█ █▄ █    ▄▀█ █▀█ █▀▀ ▄▀█ █▀▄ █▀▀                ║
 ║  █ ▀█ ██▄ █▄█ █ ▀█    █▀█ █▀▄ █▄▄ █▀█ █▄▀ ██▄                ║
 ╚══════════════════════════════════════════════════════════════╝"#;

const TILE_W: u16 = 28;
const TILE_H: u16 = 9;

fn render_tile(frame: &mut Frame, area: Rect, text: &ArcadeText, id: GameId, selected: bool) {
    let (icon, accent) = badge(id);
    let border_color = if selected { Color::Rgb(255, 220, 80) } else { Color::Rgb(60, 60, 90) };
    let border_type = if selected { BorderType::Double } else { BorderType::Rounded };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let title = text.game(id);
    let name_color = if selected { Color::White } else { accent };
    let desc_color = if selected { Color::Rgb(180, 180, 200) } else { Color::Rgb(100, 100, 120) };
    let mut lines = vec![
        Line::from(vec![
            Span::raw(format!("{icon} ")),
            Span::styled(title.name, Style::default().fg(name_color).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(""),
        Line::from(Span::styled(title.desc, Style::default().fg(desc_color))),
    ];
    if selected {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("▶ {}", text.start),
            Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD),
        )));
    }

    let p = Paragraph::new(lines).alignment(Alignment::Center).wrap(Wrap { trim: true });
    frame.render_widget(p, inner);
}

/// Carousel: the selected title centred between its neighbours.
pub fn render_menu(frame: &mut Frame, area: Rect, app: &mut App) {
    let text = app.text();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Banner
            Constraint::Min(TILE_H),
            Constraint::Length(1), // Hint
        ])
        .split(area);

    let banner = Paragraph::new(BANNER.trim_start_matches('\n'))
        .style(Style::default().fg(Color::Rgb(0, 255, 255)))
        .alignment(Alignment::Center);
    frame.render_widget(banner, chunks[0]);

    let row = centered(chunks[1], TILE_W * 3 + 4, TILE_H);
    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .spacing(2)
        .split(row);

    let selected = app.selected();
    let len = GameId::all().len();
    let shown = [
        GameId::from_index(selected.index() + len - 1),
        selected,
        GameId::from_index(selected.index() + 1),
    ];

    app.regions.tiles.clear();
    for (slot, &id) in slots.iter().zip(shown.iter()) {
        render_tile(frame, *slot, text, id, id == selected);
        app.regions.tiles.push((*slot, id));
    }

    let dots: String = GameId::all()
        .iter()
        .map(|&id| if id == selected { "● " } else { "○ " })
        .collect();
    let hint = Paragraph::new(Line::from(vec![
        Span::styled(dots, Style::default().fg(Color::Rgb(255, 0, 255))),
        Span::styled("  │  ", Style::default().fg(Color::Rgb(40, 40, 60))),
        Span::styled(text.navigate, Style::default().fg(Color::Rgb(100, 100, 130))),
        Span::styled("  │  ", Style::default().fg(Color::Rgb(40, 40, 60))),
        Span::styled("q", Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD)),
        Span::styled(" quit", Style::default().fg(Color::Rgb(100, 100, 130))),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(hint, chunks[2]);
}
