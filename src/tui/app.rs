//! TuiApp: the TEA model.
//!
//! All state lives here. Update receives TuiMessages, mutates state.
//! View reads state to produce ratatui widgets. The carousel pushes its
//! render commands into [`TuiSurface`], a plain view model the layout
//! draws from each frame.

use ratatui::layout::{Position as Cell, Rect};
use tui_menu::{MenuItem, MenuState};

use crate::carousel::progress::ProgressMarker;
use crate::carousel::{CarouselController, CarouselMessage, Lifecycle, Scheduler};
use crate::surface::{AuthorView, RenderSurface};

use super::event::TuiMessage;

/// Actions that can be triggered from the options menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    TogglePause,
    ToggleDetails,
    Exit,
}

/// Build the options menu item tree.
pub fn build_menu_items() -> Vec<MenuItem<MenuAction>> {
    vec![MenuItem::group(
        "Options",
        vec![
            MenuItem::item("Pause/Resume  p", MenuAction::TogglePause),
            MenuItem::item("Details       d", MenuAction::ToggleDetails),
            MenuItem::item("Exit          q", MenuAction::Exit),
        ],
    )]
}

/// Terminal render surface: what the carousel last asked to show, plus
/// the screen areas the layout cached on the previous frame.
#[derive(Debug, Clone, Default)]
pub struct TuiSurface {
    pub mounted: bool,
    pub slots: usize,
    pub image: Option<String>,
    pub author: AuthorView,
    pub markers: Vec<ProgressMarker>,
    /// Whole carousel area from the last frame. Taps split at its midline.
    pub area: Rect,
    /// Exit affordance from the last frame.
    pub exit_area: Rect,
    /// Options affordance from the last frame.
    pub options_area: Rect,
}

impl TuiSurface {
    /// A surface spanning `width` columns until the first frame is drawn.
    pub fn new(width: u16) -> Self {
        Self {
            area: Rect::new(0, 0, width, 0),
            ..Self::default()
        }
    }
}

impl RenderSurface for TuiSurface {
    fn mount(&mut self, slots: usize) {
        self.mounted = true;
        self.slots = slots;
        self.markers = vec![ProgressMarker::Neutral; slots];
    }

    fn show_image(&mut self, uri: &str) {
        self.image = Some(uri.to_string());
    }

    fn show_author(&mut self, author: &AuthorView) {
        self.author = author.clone();
    }

    fn show_progress(&mut self, markers: &[ProgressMarker]) {
        self.slots = markers.len();
        self.markers = markers.to_vec();
    }

    fn midline(&self) -> u16 {
        self.area.x + self.area.width / 2
    }

    fn unmount(&mut self) {
        self.mounted = false;
        self.image = None;
        self.author = AuthorView::default();
        self.markers.clear();
    }
}

/// The main TUI application state (TEA model).
pub struct TuiApp<T> {
    pub carousel: CarouselController<TuiSurface, T>,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Options menu state (tui-menu).
    pub menu_state: MenuState<MenuAction>,
    /// Whether the options menu has keyboard focus.
    pub menu_active: bool,
    /// Story details overlay visible.
    pub show_details: bool,
}

impl<T: Scheduler> TuiApp<T> {
    pub fn new(carousel: CarouselController<TuiSurface, T>) -> Self {
        Self {
            carousel,
            should_quit: false,
            menu_state: MenuState::new(build_menu_items()),
            menu_active: false,
            show_details: false,
        }
    }

    /// Handle a TUI message (TEA update).
    pub fn update(&mut self, msg: TuiMessage) {
        match msg {
            TuiMessage::Input(key) => super::input::handle_key(self, key),
            TuiMessage::Mouse(mouse) => super::input::handle_mouse(self, mouse),
            TuiMessage::Carousel(msg) => self.carousel.update(msg),
            TuiMessage::Resize(cols, rows) => {
                self.carousel.surface_mut().area = Rect::new(0, 0, cols, rows);
            }
            TuiMessage::Render => {
                // Render handled externally by runner
            }
            TuiMessage::Quit => self.carousel.terminate(),
        }
        if self.carousel.lifecycle() != Lifecycle::Running {
            self.should_quit = true;
        }
    }

    /// Open the options menu with keyboard focus.
    pub fn open_menu(&mut self) {
        self.menu_state.activate();
        self.menu_active = true;
    }

    pub fn close_menu(&mut self) {
        self.menu_state.reset();
        self.menu_active = false;
    }

    /// Run an action chosen from the options menu.
    pub fn apply_menu_action(&mut self, action: MenuAction) {
        self.close_menu();
        match action {
            MenuAction::TogglePause => self.carousel.update(CarouselMessage::TogglePause),
            MenuAction::ToggleDetails => self.show_details = !self.show_details,
            MenuAction::Exit => self.carousel.update(CarouselMessage::Exit),
        }
    }

    /// Is `(column, row)` on the exit affordance?
    pub fn hits_exit(&self, column: u16, row: u16) -> bool {
        self.carousel.surface().exit_area.contains(Cell::new(column, row))
    }

    /// Is `(column, row)` on the options affordance?
    pub fn hits_options(&self, column: u16, row: u16) -> bool {
        self.carousel
            .surface()
            .options_area
            .contains(Cell::new(column, row))
    }
}
