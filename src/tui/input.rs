//! Key and mouse binding dispatch for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use tui_menu::MenuEvent;

use crate::carousel::{CarouselMessage, Scheduler};

use super::app::TuiApp;

/// Handle a key event, mutating app state.
pub fn handle_key<T: Scheduler>(app: &mut TuiApp<T>, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.carousel.update(CarouselMessage::Exit);
        return;
    }

    if app.menu_active {
        handle_menu_key(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.carousel.update(CarouselMessage::Exit),
        KeyCode::Left | KeyCode::Char('h') => app.carousel.update(CarouselMessage::Previous),
        KeyCode::Right | KeyCode::Char('l') => app.carousel.update(CarouselMessage::Next),
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            app.carousel.update(CarouselMessage::TogglePause)
        }
        KeyCode::Char('o') => app.open_menu(),
        KeyCode::Char('d') => app.show_details = !app.show_details,
        _ => {}
    }
}

fn handle_menu_key<T: Scheduler>(app: &mut TuiApp<T>, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('o') => app.close_menu(),
        KeyCode::Up => app.menu_state.up(),
        KeyCode::Down => app.menu_state.down(),
        KeyCode::Left => app.menu_state.left(),
        KeyCode::Right => app.menu_state.right(),
        KeyCode::Enter => app.menu_state.select(),
        _ => {}
    }
    drain_menu(app);
}

/// Apply whatever the menu selected since the last drain.
fn drain_menu<T: Scheduler>(app: &mut TuiApp<T>) {
    let selected: Vec<_> = app
        .menu_state
        .drain_events()
        .map(|event| match event {
            MenuEvent::Selected(action) => action,
        })
        .collect();
    for action in selected {
        app.apply_menu_action(action);
    }
}

/// Handle a mouse event. Left-button press and release feed the carousel's
/// gesture interpreter unless they land on an affordance.
pub fn handle_mouse<T: Scheduler>(app: &mut TuiApp<T>, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if app.hits_exit(mouse.column, mouse.row) {
                app.carousel.update(CarouselMessage::Exit);
            } else if app.hits_options(mouse.column, mouse.row) {
                if app.menu_active {
                    app.close_menu();
                } else {
                    app.open_menu();
                }
            } else if app.menu_active {
                app.close_menu();
            } else {
                app.carousel
                    .update(CarouselMessage::PointerPressed { x: mouse.column });
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.carousel
                .update(CarouselMessage::PointerReleased { x: mouse.column });
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carousel::{Lifecycle, ManualScheduler, TimerKind};
    use crate::config::CarouselConfig;
    use crate::story::{Story, StoryCollection};
    use crate::carousel::CarouselController;
    use crate::tui::app::TuiSurface;
    use chrono::Utc;
    use ratatui::layout::Rect;

    fn app(n: usize) -> TuiApp<ManualScheduler> {
        let stories = (0..n)
            .map(|i| Story {
                order: i as i64,
                author: format!("author-{i}"),
                posted_at: Utc::now(),
                image: format!("{i}.jpg"),
                avatar: None,
            })
            .collect();
        let mut surface = TuiSurface::new(80);
        surface.area = Rect::new(0, 0, 80, 24);
        surface.exit_area = Rect::new(0, 2, 8, 1);
        surface.options_area = Rect::new(70, 2, 10, 1);
        TuiApp::new(CarouselController::mount(
            &CarouselConfig::default(),
            None,
            Some(StoryCollection::flat(stories).unwrap()),
            surface,
            ManualScheduler::new(),
        ))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn arrows_navigate() {
        let mut app = app(3);
        handle_key(&mut app, key(KeyCode::Right));
        assert_eq!(app.carousel.position().index, 1);
        handle_key(&mut app, key(KeyCode::Char('h')));
        handle_key(&mut app, key(KeyCode::Left));
        assert_eq!(app.carousel.position().index, 2);
    }

    #[test]
    fn ctrl_c_exits() {
        let mut app = app(3);
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(app.carousel.lifecycle(), Lifecycle::Terminated);
    }

    #[test]
    fn q_exits_and_p_pauses() {
        let mut app = app(3);
        handle_key(&mut app, key(KeyCode::Char('p')));
        assert!(app.carousel.autoplay().is_paused());
        handle_key(&mut app, key(KeyCode::Char('q')));
        assert_eq!(app.carousel.lifecycle(), Lifecycle::Terminated);
    }

    #[test]
    fn esc_closes_menu_before_exiting() {
        let mut app = app(3);
        handle_key(&mut app, key(KeyCode::Char('o')));
        assert!(app.menu_active);
        handle_key(&mut app, key(KeyCode::Esc));
        assert!(!app.menu_active);
        assert!(app.carousel.is_running());
        // Navigation keys do not reach the carousel while the menu is open.
        handle_key(&mut app, key(KeyCode::Char('o')));
        handle_key(&mut app, key(KeyCode::Right));
        assert_eq!(app.carousel.position().index, 0);
    }

    #[test]
    fn tap_sides() {
        let mut app = app(3);
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 60, 10));
        handle_mouse(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 60, 10));
        assert_eq!(app.carousel.position().index, 1);
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 5, 10));
        handle_mouse(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 5, 10));
        assert_eq!(app.carousel.position().index, 0);
    }

    #[test]
    fn hold_previews() {
        let mut app = app(3);
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 60, 10));
        let id = app.carousel.scheduler().armed_of(TimerKind::LongPress).unwrap();
        let msg = app.carousel.scheduler_mut().fire(id).unwrap();
        app.carousel.update(msg);
        assert!(app.carousel.autoplay().is_paused());
        handle_mouse(&mut app, mouse(MouseEventKind::Up(MouseButton::Left), 60, 10));
        assert_eq!(app.carousel.position().index, 0);
        assert!(!app.carousel.autoplay().is_paused());
    }

    #[test]
    fn affordances_take_clicks() {
        let mut app = app(3);
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 72, 2));
        assert!(app.menu_active);
        assert!(app.carousel.scheduler().armed_of(TimerKind::LongPress).is_none());
        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 72, 2));
        assert!(!app.menu_active);

        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 2, 2));
        assert_eq!(app.carousel.lifecycle(), Lifecycle::Terminated);
    }
}
