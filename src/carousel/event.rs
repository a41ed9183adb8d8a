//! Messages that drive the carousel controller.
//!
//! Timer callbacks and pointer input arrive here as values; the controller
//! handles each one to completion before the next.

use super::scheduler::TimerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselMessage {
    /// The repeating one-second autoplay tick fired.
    AutoplayTick(TimerId),
    /// The one-shot long-press timer fired.
    LongPressElapsed(TimerId),
    /// Pointer pressed on the surface at column `x`.
    PointerPressed { x: u16 },
    /// Pointer released on the surface at column `x`.
    PointerReleased { x: u16 },
    /// Go to the next slide.
    Next,
    /// Go to the previous slide.
    Previous,
    /// Pause if running, resume if paused.
    TogglePause,
    /// Exit affordance: tear the carousel down.
    Exit,
}
