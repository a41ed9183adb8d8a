//! Story carousel layout.
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │ Options                                         │  menu bar
//! │ ██████████ ████▌      ░░░░░░░░░░ ░░░░░░░░░░     │  progress row
//! │ [ Back ]  ◉ ana  5 minutes ago        [ Options ]│  author header
//! │ ┌ story ──────────────────────────────────────┐ │
//! │ │            https://cdn.example/1.jpg        │ │  image panel
//! │ └─────────────────────────────────────────────┘ │
//! │ 2/5  [3s]  ←/→:Navigate  p:Pause  q:Exit        │  status bar
//! └─────────────────────────────────────────────────┘
//! ```

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap};
use ratatui::Frame;
use tui_menu::Menu;

use crate::carousel::progress::ProgressMarker;
use crate::carousel::Scheduler;

use super::app::{TuiApp, TuiSurface};
use super::dashboard;

const EXIT_LABEL: &str = "[ Back ]";
const OPTIONS_LABEL: &str = "[ Options ]";

/// Draw the full TUI layout. Caches the carousel and affordance areas on
/// the surface for mouse hit-testing.
pub fn draw<T: Scheduler>(f: &mut Frame, app: &mut TuiApp<T>) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // menu bar
            Constraint::Length(1), // progress row
            Constraint::Length(1), // author header
            Constraint::Min(3),    // image panel
            Constraint::Length(1), // status bar
        ])
        .split(f.area());

    let carousel_area = Rect {
        x: outer[1].x,
        y: outer[1].y,
        width: outer[1].width,
        height: outer[1].height + outer[2].height + outer[3].height,
    };

    if !app.carousel.surface().mounted {
        let para = Paragraph::new("carousel closed")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(para, carousel_area);
        return;
    }

    let header = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(EXIT_LABEL.len() as u16),
            Constraint::Min(1),
            Constraint::Length(OPTIONS_LABEL.len() as u16),
        ])
        .split(outer[2]);

    {
        let surface = app.carousel.surface_mut();
        surface.area = carousel_area;
        surface.exit_area = header[0];
        surface.options_area = header[2];
    }

    let surface = app.carousel.surface();
    draw_progress(f, &surface.markers, outer[1]);
    draw_header(f, surface, &header);
    draw_image(f, surface, outer[3]);
    draw_status(f, app, outer[4]);

    if app.show_details {
        draw_details(f, app, carousel_area);
    }

    // Fill the menu bar row before rendering menu items.
    f.render_widget(
        Paragraph::new("").style(Style::default().bg(Color::White)),
        outer[0],
    );

    // Menu rendered last so the dropdown overlays the carousel.
    let menu_area = Rect {
        x: outer[0].x,
        y: outer[0].y,
        width: outer[0].width,
        height: outer[0].height + carousel_area.height,
    };
    let menu_widget = Menu::new()
        .default_style(Style::default().fg(Color::Black).bg(Color::White))
        .highlight(
            Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .dropdown_width(18)
        .dropdown_style(Style::default().fg(Color::Black).bg(Color::White));
    f.render_stateful_widget(menu_widget, menu_area, &mut app.menu_state);
}

/// One gauge per slide in the active group.
fn draw_progress(f: &mut Frame, markers: &[ProgressMarker], area: Rect) {
    if markers.is_empty() {
        return;
    }
    let slots = markers.len() as u32;
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(markers.iter().map(|_| Constraint::Ratio(1, slots)))
        .spacing(1)
        .split(area);

    for (marker, cell) in markers.iter().zip(cells.iter()) {
        let fg = match marker {
            ProgressMarker::Completed => Color::White,
            ProgressMarker::Current { paused: true, .. } => Color::Yellow,
            ProgressMarker::Current { .. } => Color::Cyan,
            ProgressMarker::Neutral => Color::DarkGray,
        };
        let gauge = Gauge::default()
            .ratio(marker.fill().clamp(0.0, 1.0))
            .label("")
            .gauge_style(Style::default().fg(fg).bg(Color::DarkGray));
        f.render_widget(gauge, *cell);
    }
}

fn draw_header(f: &mut Frame, surface: &TuiSurface, header: &[Rect]) {
    let affordance = Style::default().fg(Color::Black).bg(Color::Gray);
    f.render_widget(Paragraph::new(Span::styled(EXIT_LABEL, affordance)), header[0]);
    f.render_widget(
        Paragraph::new(Span::styled(OPTIONS_LABEL, affordance)),
        header[2],
    );

    let author = &surface.author;
    let avatar = if author.avatar.is_some() { "\u{25c9}" } else { "\u{25cb}" };
    let mut spans = vec![
        Span::raw(" "),
        Span::styled(avatar, Style::default().fg(Color::Cyan)),
        Span::raw(" "),
        Span::styled(
            author.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ];
    if let Some(time_ago) = &author.time_ago {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            time_ago.clone(),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if let Some(group) = &author.group {
        spans.push(Span::raw("  \u{b7} "));
        spans.push(Span::styled(group.clone(), Style::default().fg(Color::Magenta)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), header[1]);
}

fn draw_image(f: &mut Frame, surface: &TuiSurface, area: Rect) {
    let block = Block::default()
        .title(" story ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let image = surface.image.as_deref().unwrap_or("");
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            image.to_string(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "\u{25c0} tap left  \u{b7}  hold to pause  \u{b7}  tap right \u{25b6}",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let para = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(para, inner);
}

fn draw_status<T: Scheduler>(f: &mut Frame, app: &TuiApp<T>, area: Rect) {
    let carousel = &app.carousel;
    let mut spans = Vec::new();
    if let Some(stories) = carousel.stories() {
        spans.push(Span::styled(
            format!("[{}]", dashboard::format_position(stories, carousel.position())),
            Style::default().fg(Color::Cyan),
        ));
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled(
        format!("[{}]", dashboard::format_remaining(carousel.autoplay())),
        Style::default().fg(Color::Yellow),
    ));
    let diagnostics = carousel.diagnostics().len();
    if diagnostics > 0 {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("[{diagnostics} issues]"),
            Style::default().fg(Color::Red),
        ));
    }
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        "\u{2190}\u{2192}:Navigate  p:Pause  o:Options  d:Details  q:Exit",
        Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Story details popup, centered over the carousel.
fn draw_details<T: Scheduler>(f: &mut Frame, app: &TuiApp<T>, area: Rect) {
    let carousel = &app.carousel;
    let Some(story) = carousel.current_story() else {
        return;
    };

    let popup_width = 60u16.min(area.width);
    let popup_height = 9u16.min(area.height);
    let popup_area = Rect::new(
        area.x + (area.width - popup_width) / 2,
        area.y + (area.height - popup_height) / 2,
        popup_width,
        popup_height,
    );
    f.render_widget(Clear, popup_area);

    let label = Style::default().fg(Color::DarkGray);
    let row = |name: &'static str, value: String| {
        Line::from(vec![Span::styled(format!("{name:<8}"), label), Span::raw(value)])
    };
    let mut lines = vec![
        row("author", story.author.clone()),
        row("posted", story.posted_at.format("%Y-%m-%d %H:%M UTC").to_string()),
        row("order", story.order.to_string()),
        row("image", story.image.clone()),
        row("avatar", story.avatar.clone().unwrap_or_else(|| "(none)".into())),
    ];
    if let Some(last) = carousel.diagnostics().last() {
        lines.push(Line::from(Span::styled(
            last.to_string(),
            Style::default().fg(Color::Red),
        )));
    }

    let block = Block::default()
        .title(" details ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));
    let para = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    f.render_widget(para, popup_area);
}
