pub mod components;
pub mod layout;

use std::sync::OnceLock;
use std::time::Duration;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, LineGauge, Paragraph, Wrap},
    Frame,
};
use tokio::time::Instant;

use crate::app::{App, Popup};
use crate::config::ThemeOverrides;
use crate::journey::{MessageDirection, STAGES};
use crate::theme::Theme;
use components::{centered_line, key_hint, stage_icon, ConfettiLayer, MessagePreview};
use layout::JourneyLayout;

// Resolved once at startup, after config is loaded
static THEME: OnceLock<Theme> = OnceLock::new();

/// Apply theme overrides. Only the first call has any effect.
pub fn init_theme(overrides: &ThemeOverrides) {
    let _ = THEME.set(Theme::with_overrides(overrides));
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

// Helper functions to get theme colors
fn accent() -> Color { theme().accent }
fn accent_soft() -> Color { theme().accent_soft }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn inactive() -> Color { theme().inactive }
fn online() -> Color { theme().online }
fn card() -> Color { theme().card }

/// Period of the "pulse" on the current marker and the presence dot
const PULSE_PERIOD: Duration = Duration::from_millis(2000);

fn pulse_on(app: &App, now: Instant) -> bool {
    let ms = now.saturating_duration_since(app.launched_at).as_millis();
    ms % PULSE_PERIOD.as_millis() < PULSE_PERIOD.as_millis() / 2
}

pub fn draw(f: &mut Frame, app: &App) {
    let now = Instant::now();
    let layout = JourneyLayout::new(f.area());

    draw_header(f, layout.header);
    draw_progress(f, app, &layout, now);
    draw_tooltip(f, app, &layout);
    draw_stage_panel(f, app, layout.stage_panel);
    draw_chat_panel(f, app, layout.chat_panel, now);
    draw_nav(f, app, &layout);
    draw_footer(f, app, layout.footer);

    // Confetti floats over everything but the help popup
    if app.show_confetti {
        if let Some(confetti) = &app.confetti {
            f.render_widget(ConfettiLayer { confetti, now }, f.area());
        }
    }

    match app.popup {
        Popup::None => {}
        Popup::Help => draw_help_popup(f, app),
    }
}

fn draw_header(f: &mut Frame, area: Rect) {
    let lines = vec![
        centered_line(vec![
            Span::styled("GuestTouch ", Style::default().fg(text()).add_modifier(Modifier::BOLD)),
            Span::styled("Messaging", Style::default().fg(accent()).add_modifier(Modifier::BOLD)),
            Span::styled(" Platform", Style::default().fg(text()).add_modifier(Modifier::BOLD)),
        ]),
        centered_line(vec![Span::styled(
            "All In One Guest Messaging Platform",
            Style::default().fg(text_dim()),
        )]),
    ];

    f.render_widget(Paragraph::new(lines), area);
}

fn draw_progress(f: &mut Frame, app: &App, layout: &JourneyLayout, now: Instant) {
    let gauge = LineGauge::default()
        .filled_style(Style::default().fg(accent()))
        .unfilled_style(Style::default().fg(inactive()))
        .line_set(symbols::line::THICK)
        .label("")
        .ratio(app.progress.ratio(now).clamp(0.0, 1.0));
    f.render_widget(gauge, layout.track);

    let pulse = pulse_on(app, now);

    for (i, area) in layout.markers.iter().enumerate() {
        let reached = app.is_reached(i);
        let is_current = i == app.current_stage;
        let is_hovered = app.hovered == Some(i);

        let border_color = if is_current {
            accent_soft()
        } else if reached {
            accent()
        } else {
            inactive()
        };
        let mut border_style = Style::default().fg(border_color);
        if is_current && pulse {
            border_style = border_style.add_modifier(Modifier::BOLD);
        }
        if is_current && !pulse {
            border_style = border_style.add_modifier(Modifier::DIM);
        }

        let border_type = if is_hovered {
            BorderType::Double
        } else if is_current {
            BorderType::Thick
        } else {
            BorderType::Rounded
        };

        let fill = if reached {
            Style::default().bg(accent())
        } else {
            Style::default()
        };

        let marker = Paragraph::new(Line::from(stage_icon(i, reached, app.icons, theme())))
            .alignment(Alignment::Center)
            .style(fill)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(border_type)
                    .border_style(border_style),
            );

        f.render_widget(Clear, *area);
        f.render_widget(marker, *area);
    }
}

fn draw_tooltip(f: &mut Frame, app: &App, layout: &JourneyLayout) {
    let Some(index) = app.hovered else { return };
    let title = STAGES[index].title;

    let area = layout.tooltip(index, title.chars().count() as u16);
    let tooltip = Paragraph::new(title)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::White).bg(Color::Rgb(31, 41, 55)));

    f.render_widget(tooltip, area);
}

fn draw_stage_panel(f: &mut Frame, app: &App, area: Rect) {
    let stage = app.stage();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Heading
            Constraint::Min(0),    // Action cards
        ])
        .split(area);

    let heading = Paragraph::new(format!("{} {}", stage.emoji, stage.title))
        .alignment(Alignment::Center)
        .style(Style::default().fg(accent()).add_modifier(Modifier::BOLD));
    f.render_widget(heading, chunks[0]);

    let cards_area = chunks[1];
    let boxed = cards_area.height as usize >= stage.actions.len() * 3;

    if boxed {
        let cards = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(3); stage.actions.len()])
            .split(cards_area);

        for (action, card_area) in stage.actions.iter().zip(cards.iter()) {
            let card = Paragraph::new(*action)
                .alignment(Alignment::Center)
                .style(Style::default().fg(text()).add_modifier(Modifier::BOLD))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .border_style(Style::default().fg(card())),
                );
            f.render_widget(card, *card_area);
        }
    } else {
        // Short terminal - list the actions instead of boxing them
        let lines: Vec<Line> = stage
            .actions
            .iter()
            .map(|action| {
                Line::from(vec![
                    Span::styled("  ▸ ", Style::default().fg(accent())),
                    Span::styled(*action, Style::default().fg(text())),
                ])
            })
            .collect();
        f.render_widget(Paragraph::new(lines), cards_area);
    }
}

fn draw_chat_panel(f: &mut Frame, app: &App, area: Rect, now: Instant) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(card()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(1)
        .constraints([
            Constraint::Length(1), // Sender + time
            Constraint::Length(1), // Divider
            Constraint::Length(1), // Spacer
            Constraint::Min(0),    // Bubble
        ])
        .split(inner);

    let dot_style = if pulse_on(app, now) {
        Style::default().fg(online())
    } else {
        Style::default().fg(online()).add_modifier(Modifier::DIM)
    };
    let sender = Paragraph::new(Line::from(vec![
        Span::styled("● ", dot_style),
        Span::styled(app.hotel_name.as_str(), Style::default().fg(text()).add_modifier(Modifier::BOLD)),
    ]));
    f.render_widget(sender, chunks[0]);

    let stamp = Paragraph::new(Span::styled("now", Style::default().fg(text_dim())))
        .alignment(Alignment::Right);
    f.render_widget(stamp, chunks[0]);

    let divider = Paragraph::new("─".repeat(chunks[1].width as usize))
        .style(Style::default().fg(inactive()));
    f.render_widget(divider, chunks[1]);

    if app.show_message {
        let elapsed = app
            .message_shown_at
            .map(|at| now.saturating_duration_since(at))
            .unwrap_or_default();

        let preview = MessagePreview {
            text: app.stage().message,
            direction: MessageDirection::Received,
            animate: true,
            elapsed,
            theme: theme(),
        };
        f.render_widget(preview, chunks[3]);
    }
}

fn draw_nav(f: &mut Frame, app: &App, layout: &JourneyLayout) {
    let buttons = [
        ("← Previous", app.can_go_previous(), layout.previous),
        ("Next →", app.can_go_next(), layout.next),
    ];

    for (label, enabled, area) in buttons {
        let (label_style, border_color) = if enabled {
            (
                Style::default().fg(theme().bubble_text).bg(accent()).add_modifier(Modifier::BOLD),
                accent(),
            )
        } else {
            (Style::default().fg(text_dim()), inactive())
        };

        let button = Paragraph::new(Span::styled(label, label_style))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(border_color)),
            );
        f.render_widget(button, area);
    }
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let link = format!("{} ↗", app.marketing_url);
    let link_width = link.chars().count() as u16 + 1;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(link_width)])
        .split(area);

    let hints = [
        ("←→", "Step"),
        ("1-6", "Jump"),
        ("Click", "Select"),
        ("?", "Help"),
        ("q", "Quit"),
    ];

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 { 2 } else if area.width < 90 { 3 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| key_hint(key, action, theme()))
        .collect();
    f.render_widget(Paragraph::new(Line::from(hint_spans)), chunks[0]);

    let link = Paragraph::new(Span::styled(
        link,
        Style::default().fg(accent()).add_modifier(Modifier::UNDERLINED),
    ))
    .alignment(Alignment::Right);
    f.render_widget(link, chunks[1]);
}

fn draw_help_popup(f: &mut Frame, app: &App) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 90 } else { 60 },
        if area.height < 30 { 90 } else { 60 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let timings = app.timings();
    let section = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().fg(accent_soft()).add_modifier(Modifier::BOLD)))
    };
    let entry = |key: &'static str, what: String| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", key), Style::default().fg(accent())),
            Span::raw(what),
        ])
    };

    let help_text = vec![
        section("═══ Navigation ═══"),
        entry("← / h", "Previous stage".to_string()),
        entry("→ / l", "Next stage (also Space)".to_string()),
        entry("1-6", "Jump to a stage".to_string()),
        entry("Home/End", "First / last stage".to_string()),
        entry("Click", "Select a stage marker or button".to_string()),
        entry("Hover", "Show the stage name".to_string()),
        Line::from(""),
        section("═══ Stages ═══"),
    ]
    .into_iter()
    .chain(STAGES.iter().enumerate().map(|(i, s)| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", i + 1), Style::default().fg(accent())),
            Span::raw(format!("{} {}", s.emoji, s.title)),
        ])
    }))
    .chain([
        Line::from(""),
        section("═══ Timing ═══"),
        entry("Message", format!("appears {} ms after a change", timings.reveal_delay.as_millis())),
        entry("Confetti", format!("clears {} ms after a change", timings.confetti_window.as_millis())),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(text_dim())),
            Span::styled("?", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" to close", Style::default().fg(text_dim())),
        ]),
    ])
    .collect::<Vec<_>>();

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" Guest Journey Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
