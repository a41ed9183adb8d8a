//! Terminal carousel: ratatui presentation layer.
//!
//! The carousel renders into [`app::TuiSurface`], a view model the layout
//! draws each frame. Mouse press/release on the story panel feed the
//! gesture interpreter; keys navigate, pause, and open the options menu.
//!
//! ## Architecture (TEA)
//!
//! Model (`TuiApp`) + Update (message handler) + View (render).
//! Immediate mode, no retained widget state.

pub mod app;
pub mod dashboard;
pub mod event;
pub mod input;
pub mod layout;
pub mod runner;
