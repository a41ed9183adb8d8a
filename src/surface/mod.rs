//! Render surfaces: where the controller's render commands land.
//!
//! The controller never reads a surface back except for its midline; all
//! state lives in the controller and is pushed here after each mutation.

pub mod html;

use crate::carousel::progress::ProgressMarker;

/// Author block contents for the slide on screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthorView {
    pub name: String,
    pub avatar: Option<String>,
    /// Relative posted time; `None` when it could not be formatted.
    pub time_ago: Option<String>,
    /// Group label in the nested variant.
    pub group: Option<String>,
}

/// A rendering target for the carousel.
pub trait RenderSurface {
    /// Build the carousel container with `slots` progress markers.
    fn mount(&mut self, slots: usize);
    /// Show the current slide's image.
    fn show_image(&mut self, uri: &str);
    /// Show the author block.
    fn show_author(&mut self, author: &AuthorView);
    /// Replace the progress row. The marker count follows the active group.
    fn show_progress(&mut self, markers: &[ProgressMarker]);
    /// Column of the vertical midline separating left and right taps.
    fn midline(&self) -> u16;
    /// Remove all rendered content.
    fn unmount(&mut self);
}
