//! Slide positions and the wrap-around step functions.
//!
//! Pure functions over a [`StoryCollection`]; the controller decides what
//! a step means (render, or terminate in non-infinite mode).

use crate::story::StoryCollection;

/// Where the carousel is. `group` is always 0 for flat collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Position {
    pub group: usize,
    pub index: usize,
}

impl Position {
    /// The very first slide.
    pub const FIRST: Position = Position { group: 0, index: 0 };

    pub fn new(group: usize, index: usize) -> Self {
        Self { group, index }
    }

    pub fn is_first(&self) -> bool {
        *self == Self::FIRST
    }
}

/// The slide after `at`, wrapping at the end of a group and of the collection.
pub fn next_position(stories: &StoryCollection, at: Position) -> Position {
    match stories {
        StoryCollection::Flat { stories } => {
            if stories.is_empty() {
                return at;
            }
            Position::new(0, (at.index + 1) % stories.len())
        }
        StoryCollection::Grouped { groups } => {
            if groups.is_empty() {
                return at;
            }
            let index = at.index + 1;
            if index >= stories.group_len(at.group) {
                Position::new((at.group + 1) % groups.len(), 0)
            } else {
                Position::new(at.group, index)
            }
        }
    }
}

/// The slide before `at`; underflow moves to the last slide of the
/// previous group, wrapping to the last group.
pub fn previous_position(stories: &StoryCollection, at: Position) -> Position {
    match stories {
        StoryCollection::Flat { stories } => {
            let len = stories.len();
            if len == 0 {
                return at;
            }
            Position::new(0, (at.index + len - 1) % len)
        }
        StoryCollection::Grouped { groups } => {
            if groups.is_empty() {
                return at;
            }
            if at.index > 0 {
                return Position::new(at.group, at.index - 1);
            }
            let group = (at.group + groups.len() - 1) % groups.len();
            let last = stories.group_len(group).saturating_sub(1);
            Position::new(group, last)
        }
    }
}
