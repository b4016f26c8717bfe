use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::{control_pad, App};
use crate::games::GameId;
use crate::surface::fit_area;

use super::{badge, centered};

const PAD_BUTTON_W: u16 = 9;

pub fn render_play(frame: &mut Frame, area: Rect, app: &mut App, id: GameId) {
    let text = app.text();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // HUD
            Constraint::Min(0),   // Surface
            Constraint::Length(3), // Touch pad
        ])
        .split(area);

    // HUD: score on the right, exit on the left.
    let (icon, accent) = badge(id);
    let score = Paragraph::new(Line::from(vec![
        Span::raw(format!("{icon} ")),
        Span::styled(format!("{}: ", text.score), Style::default().fg(Color::Rgb(140, 140, 160))),
        Span::styled(
            app.score().to_string(),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ]))
    .alignment(Alignment::Right);
    frame.render_widget(score, chunks[0]);

    let exit_label = format!(" ✕ {} ", text.exit);
    let exit_w = exit_label.chars().count() as u16;
    let exit = Rect::new(chunks[0].x, chunks[0].y, exit_w.min(chunks[0].width), 1);
    frame.render_widget(
        Paragraph::new(Span::styled(
            exit_label,
            Style::default().fg(Color::Rgb(255, 0, 255)).add_modifier(Modifier::BOLD),
        )),
        exit,
    );
    app.regions.exit = exit;

    // Surface, aspect-fitted inside a border.
    let frame_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(accent))
        .title(format!(" {} ", text.game(id).name))
        .title_style(Style::default().fg(accent).add_modifier(Modifier::BOLD));
    let inner = frame_block.inner(chunks[1]);
    frame.render_widget(frame_block, chunks[1]);
    let canvas = match app.surface() {
        Some(surface) => {
            frame.render_widget(surface, inner);
            fit_area(inner, surface.size())
        }
        None => Rect::default(),
    };
    app.regions.canvas = canvas;

    // Touch pad.
    let buttons = control_pad(id);
    let total_w = buttons.len() as u16 * (PAD_BUTTON_W + 1);
    let pad_row = centered(chunks[2], total_w, 3);
    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(buttons.iter().map(|_| Constraint::Length(PAD_BUTTON_W)))
        .spacing(1)
        .split(pad_row);
    app.regions.pad.clear();
    for (slot, button) in slots.iter().zip(buttons) {
        let p = Paragraph::new(button.label)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Rgb(0, 255, 255)).add_modifier(Modifier::BOLD))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::Rgb(60, 60, 90))),
            );
        frame.render_widget(p, *slot);
        app.regions.pad.push((*slot, button.action));
    }

    if app.is_game_over() {
        render_game_over(frame, chunks[1], app);
    } else {
        app.regions.retry = Rect::default();
    }
}

fn render_game_over(frame: &mut Frame, area: Rect, app: &mut App) {
    let text = app.text();
    let overlay = centered(area, 36, 9);
    frame.render_widget(Clear, overlay);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Rgb(255, 0, 255)))
        .title(format!(" {} ", text.game_over))
        .title_alignment(Alignment::Center)
        .title_style(Style::default().fg(Color::Rgb(255, 0, 255)).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(Color::Rgb(15, 15, 25)));
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1), // Final score
            Constraint::Length(1),
            Constraint::Length(3), // Retry button
            Constraint::Min(0),
        ])
        .split(inner);

    let final_score = Paragraph::new(Line::from(vec![
        Span::styled(format!("{}: ", text.final_score), Style::default().fg(Color::Rgb(180, 180, 200))),
        Span::styled(
            app.score().to_string(),
            Style::default().fg(Color::Rgb(255, 215, 0)).add_modifier(Modifier::BOLD),
        ),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(final_score, rows[1]);

    let retry = centered(rows[3], text.retry.chars().count() as u16 + 8, 3);
    let button = Paragraph::new(format!("↻ {}", text.retry))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Rgb(0, 255, 255)).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Rgb(0, 255, 255))),
        );
    frame.render_widget(button, retry);
    app.regions.retry = retry;
}
