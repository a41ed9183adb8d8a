//! Dashboard utilities: status bar formatting.

use crate::carousel::autoplay::AutoplayState;
use crate::carousel::Position;
use crate::story::StoryCollection;

/// Slide position for display, one-based: "2/5", or "group 1/3 · 2/5" when
/// stories are grouped.
pub fn format_position(stories: &StoryCollection, position: Position) -> String {
    let slide = format!(
        "{}/{}",
        position.index + 1,
        stories.group_len(position.group)
    );
    if stories.is_grouped() {
        format!(
            "group {}/{} \u{b7} {slide}",
            position.group + 1,
            stories.group_count()
        )
    } else {
        slide
    }
}

/// Countdown for display: "3s", or "paused".
pub fn format_remaining(autoplay: &AutoplayState) -> String {
    if autoplay.is_paused() {
        "paused".into()
    } else {
        format!("{}s", autoplay.remaining_ms().div_ceil(1000))
    }
}
