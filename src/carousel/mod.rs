//! The carousel state machine.
//!
//! Pure pieces (navigation, autoplay countdown, gesture interpretation,
//! progress markers) are composed by [`controller::CarouselController`],
//! which owns the timers and pushes render commands to a surface.

pub mod autoplay;
pub mod controller;
pub mod error;
pub mod event;
pub mod gesture;
pub mod navigation;
pub mod progress;
pub mod scheduler;

pub use controller::{CarouselController, Lifecycle};
pub use error::{CarouselError, CarouselResult};
pub use event::CarouselMessage;
pub use navigation::Position;
pub use scheduler::{ManualScheduler, Scheduler, TimerId, TimerKind, TokioScheduler};
