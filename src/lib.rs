//! storyreel: an auto-advancing stories carousel.
//!
//! Stories are scraped from markup or loaded as data, then played by a
//! controller that owns navigation, the autoplay countdown, and the
//! tap/long-press gesture interpreter. Render commands go to a pluggable
//! surface: a terminal UI or HTML slider markup.

pub mod carousel;
pub mod config;
pub mod story;
pub mod surface;
pub mod tui;
