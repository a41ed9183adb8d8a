//! Press/release interpretation: tap to navigate, hold to preview.
//!
//! The interpreter only tracks gesture state; the controller owns the
//! long-press timer and does the scheduling and cancelling.

use super::scheduler::TimerId;

/// Which side of the midline a tap landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapSide {
    Left,
    Right,
}

impl TapSide {
    /// Left of the midline is `Left`; the midline itself counts as `Right`.
    pub fn of(x: u16, midline: u16) -> Self {
        if x < midline {
            TapSide::Left
        } else {
            TapSide::Right
        }
    }
}

/// What a release meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Short press: navigate.
    Tap(TapSide),
    /// Release after a long-press: resume autoplay, don't navigate.
    PreviewEnd,
    /// Release with no matching press.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PressState {
    #[default]
    Idle,
    /// Pressed, long-press timer pending.
    Pressed(TimerId),
    /// Long-press fired; autoplay is paused until release.
    Previewing,
}

#[derive(Debug, Clone, Default)]
pub struct GestureInterpreter {
    state: PressState,
}

impl GestureInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_previewing(&self) -> bool {
        self.state == PressState::Previewing
    }

    /// The pending long-press timer, if a press is in progress.
    pub fn pending_timer(&self) -> Option<TimerId> {
        match self.state {
            PressState::Pressed(timer) => Some(timer),
            _ => None,
        }
    }

    /// Record a press armed with `timer`. Returns a previously pending timer
    /// the caller must cancel.
    pub fn press(&mut self, timer: TimerId) -> Option<TimerId> {
        let stale = self.pending_timer();
        self.state = PressState::Pressed(timer);
        stale
    }

    /// The long-press timer fired. Returns `true` if it belongs to the
    /// current press, i.e. a preview starts now.
    pub fn long_press_elapsed(&mut self, timer: TimerId) -> bool {
        if self.state == PressState::Pressed(timer) {
            self.state = PressState::Previewing;
            true
        } else {
            false
        }
    }

    /// Interpret a release at `x`. Returns the gesture and the pending
    /// long-press timer to cancel.
    pub fn release(&mut self, x: u16, midline: u16) -> (Gesture, Option<TimerId>) {
        match std::mem::take(&mut self.state) {
            PressState::Idle => (Gesture::Ignored, None),
            PressState::Pressed(timer) => (Gesture::Tap(TapSide::of(x, midline)), Some(timer)),
            PressState::Previewing => (Gesture::PreviewEnd, None),
        }
    }

    /// Forget any gesture in progress. Returns the timer to cancel.
    pub fn reset(&mut self) -> Option<TimerId> {
        let pending = self.pending_timer();
        self.state = PressState::Idle;
        pending
    }
}
