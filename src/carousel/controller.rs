//! The carousel controller. Navigation, autoplay and gestures live in one
//! owner, which renders through a [`RenderSurface`] after every mutation.
//!
//! All mutation happens inside [`CarouselController::update`] (or the
//! navigation calls it dispatches to) and runs to completion. The controller
//! exclusively owns its two timers: the repeating autoplay tick and the
//! one-shot long-press detector.

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::autoplay::{AutoplayState, TICK};
use super::error::{CarouselError, CarouselResult};
use super::event::CarouselMessage;
use super::gesture::{Gesture, GestureInterpreter, TapSide};
use super::navigation::{next_position, previous_position, Position};
use super::progress::{progress_markers, ProgressMarker};
use super::scheduler::{Scheduler, TimerId, TimerKind};
use crate::config::CarouselConfig;
use crate::story::markup::{self, Document};
use crate::story::time_ago::time_ago;
use crate::story::{Story, StoryCollection};
use crate::surface::{AuthorView, RenderSurface};

/// Maximum number of retained diagnostics.
const DIAGNOSTICS_CAPACITY: usize = 64;

/// Where the controller is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Construction failed; nothing is rendered and every message is dropped.
    Inert,
    Running,
    /// Torn down: timers cancelled, surface emptied, listeners detached.
    Terminated,
}

/// Resolve the story collection: explicit data wins, otherwise the host
/// is located in `host` and scraped.
pub fn resolve_stories(
    host: Option<&Document>,
    selector: Option<&str>,
    explicit: Option<StoryCollection>,
) -> CarouselResult<StoryCollection> {
    if let Some(stories) = explicit {
        return Ok(stories);
    }
    let document = host.ok_or_else(|| {
        CarouselError::HostNotFound(selector.unwrap_or("(no host)").to_string())
    })?;
    markup::scrape(document.host(selector)?)
}

pub struct CarouselController<S, T> {
    stories: Option<StoryCollection>,
    position: Position,
    infinite: bool,
    long_press: std::time::Duration,
    autoplay: AutoplayState,
    autoplay_timer: Option<TimerId>,
    gesture: GestureInterpreter,
    lifecycle: Lifecycle,
    surface: S,
    scheduler: T,
    diagnostics: Vec<CarouselError>,
}

impl<S: RenderSurface, T: Scheduler> CarouselController<S, T> {
    /// Build a carousel on `surface`.
    ///
    /// Stories come from `stories` when given, otherwise from scraping the
    /// host `config.selector` names inside `host`. If that fails the error is
    /// reported and the controller stays inert.
    pub fn mount(
        config: &CarouselConfig,
        host: Option<&Document>,
        stories: Option<StoryCollection>,
        surface: S,
        scheduler: T,
    ) -> Self {
        let mut carousel = Self {
            stories: None,
            position: Position::FIRST,
            infinite: config.infinite,
            long_press: config.long_press(),
            autoplay: AutoplayState::new(config.autoplay_interval_ms),
            autoplay_timer: None,
            gesture: GestureInterpreter::new(),
            lifecycle: Lifecycle::Inert,
            surface,
            scheduler,
            diagnostics: Vec::new(),
        };

        match resolve_stories(host, config.selector.as_deref(), stories) {
            Ok(stories) => carousel.start(stories, config.initial_index),
            Err(e) => carousel.report(e),
        }
        carousel
    }

    fn start(&mut self, stories: StoryCollection, initial_index: usize) {
        let first_group = stories.group_len(0);
        if initial_index < first_group {
            self.position = Position::new(0, initial_index);
        } else {
            self.report(CarouselError::InitialIndexOutOfRange {
                index: initial_index,
                len: first_group,
            });
        }

        info!(
            total = stories.total(),
            groups = stories.group_count(),
            infinite = self.infinite,
            "carousel mounted"
        );
        self.stories = Some(stories);
        self.lifecycle = Lifecycle::Running;
        self.surface.mount(first_group);
        self.restart_autoplay();
        self.render();
    }

    /// Handle one message to completion.
    pub fn update(&mut self, msg: CarouselMessage) {
        if self.lifecycle != Lifecycle::Running {
            debug!(?msg, lifecycle = ?self.lifecycle, "message dropped");
            return;
        }
        match msg {
            CarouselMessage::AutoplayTick(id) => self.on_autoplay_tick(id),
            CarouselMessage::LongPressElapsed(id) => self.on_long_press(id),
            CarouselMessage::PointerPressed { .. } => self.on_press(),
            CarouselMessage::PointerReleased { x } => self.on_release(x),
            CarouselMessage::Next => self.advance(),
            CarouselMessage::Previous => self.retreat(),
            CarouselMessage::TogglePause => {
                if self.autoplay.is_paused() {
                    self.resume_autoplay();
                } else {
                    self.pause_autoplay();
                }
            }
            CarouselMessage::Exit => self.terminate(),
        }
    }

    /// Move to the next slide. In non-infinite mode, wrapping back to the
    /// very first slide tears the carousel down instead.
    pub fn advance(&mut self) {
        let Some(stories) = self.running_stories() else {
            return;
        };
        let next = next_position(stories, self.position);
        if !self.infinite && next.is_first() {
            info!("reached the last story; terminating");
            self.terminate();
            return;
        }
        debug!(from = ?self.position, to = ?next, "advance");
        self.position = next;
        self.restart_autoplay();
        self.render();
    }

    /// Move to the previous slide, wrapping to the last one.
    pub fn retreat(&mut self) {
        let Some(stories) = self.running_stories() else {
            return;
        };
        let previous = previous_position(stories, self.position);
        debug!(from = ?self.position, to = ?previous, "retreat");
        self.position = previous;
        self.restart_autoplay();
        self.render();
    }

    pub fn pause_autoplay(&mut self) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }
        self.autoplay.pause();
        self.render_progress();
    }

    /// Unpause; the countdown restarts from the full interval.
    pub fn resume_autoplay(&mut self) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }
        self.autoplay.resume();
        self.render_progress();
    }

    /// Tear down: cancel both timers, stop handling input, empty the surface.
    pub fn terminate(&mut self) {
        if self.lifecycle == Lifecycle::Terminated {
            return;
        }
        if let Some(id) = self.autoplay_timer.take() {
            self.scheduler.cancel(id);
        }
        if let Some(id) = self.gesture.reset() {
            self.scheduler.cancel(id);
        }
        self.lifecycle = Lifecycle::Terminated;
        self.surface.unmount();
        info!("carousel terminated");
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn autoplay(&self) -> &AutoplayState {
        &self.autoplay
    }

    /// The armed autoplay tick, if any.
    pub fn autoplay_timer(&self) -> Option<TimerId> {
        self.autoplay_timer
    }

    pub fn is_previewing(&self) -> bool {
        self.gesture.is_previewing()
    }

    pub fn stories(&self) -> Option<&StoryCollection> {
        self.stories.as_ref()
    }

    pub fn current_story(&self) -> Option<&Story> {
        self.stories
            .as_ref()?
            .story(self.position.group, self.position.index)
    }

    /// Reported conditions, oldest first.
    pub fn diagnostics(&self) -> &[CarouselError] {
        &self.diagnostics
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn scheduler(&self) -> &T {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut T {
        &mut self.scheduler
    }

    fn running_stories(&self) -> Option<&StoryCollection> {
        if self.lifecycle == Lifecycle::Running {
            self.stories.as_ref()
        } else {
            None
        }
    }

    fn on_autoplay_tick(&mut self, id: TimerId) {
        if self.autoplay_timer != Some(id) {
            debug!(?id, "stale autoplay tick");
            return;
        }
        if self.autoplay.tick() {
            self.advance();
        } else {
            self.render_progress();
        }
    }

    fn on_press(&mut self) {
        if self.gesture.is_previewing() {
            return;
        }
        let timer = self
            .scheduler
            .schedule_once(self.long_press, TimerKind::LongPress);
        if let Some(stale) = self.gesture.press(timer) {
            self.scheduler.cancel(stale);
        }
    }

    fn on_long_press(&mut self, id: TimerId) {
        if self.gesture.long_press_elapsed(id) {
            debug!("long press: previewing");
            self.pause_autoplay();
        }
    }

    fn on_release(&mut self, x: u16) {
        let (gesture, pending) = self.gesture.release(x, self.surface.midline());
        if let Some(id) = pending {
            self.scheduler.cancel(id);
        }
        match gesture {
            Gesture::Tap(TapSide::Left) => self.retreat(),
            Gesture::Tap(TapSide::Right) => self.advance(),
            Gesture::PreviewEnd => self.resume_autoplay(),
            Gesture::Ignored => {}
        }
    }

    /// Cancel the pending tick and start a fresh one from the full interval.
    fn restart_autoplay(&mut self) {
        if let Some(id) = self.autoplay_timer.take() {
            self.scheduler.cancel(id);
        }
        self.autoplay.rearm();
        self.autoplay_timer = Some(
            self.scheduler
                .schedule_repeating(TICK, TimerKind::AutoplayTick),
        );
    }

    /// Full refresh: image, author block, progress row.
    fn render(&mut self) {
        let Some(stories) = self.stories.as_ref() else {
            return;
        };
        let group = stories.group_label(self.position.group).map(str::to_string);
        let Some(story) = stories
            .story(self.position.group, self.position.index)
            .cloned()
        else {
            self.report(CarouselError::CurrentPostMissing {
                group: self.position.group,
                index: self.position.index,
            });
            self.render_progress();
            return;
        };

        let time_ago = match time_ago(story.posted_at, Utc::now()) {
            Ok(text) => Some(text),
            Err(e) => {
                self.report(e);
                None
            }
        };

        self.surface.show_image(&story.image);
        self.surface.show_author(&AuthorView {
            name: story.author,
            avatar: story.avatar,
            time_ago,
            group,
        });
        self.render_progress();
    }

    fn render_progress(&mut self) {
        let markers = self.markers();
        self.surface.show_progress(&markers);
    }

    fn markers(&self) -> Vec<ProgressMarker> {
        let slots = self
            .stories
            .as_ref()
            .map_or(0, |s| s.group_len(self.position.group));
        progress_markers(slots, self.position.index, &self.autoplay)
    }

    fn report(&mut self, e: CarouselError) {
        match &e {
            CarouselError::NoStories | CarouselError::InitialIndexOutOfRange { .. } => {
                warn!("{e}")
            }
            _ => error!("{e}"),
        }
        self.diagnostics.push(e);
        if self.diagnostics.len() > DIAGNOSTICS_CAPACITY {
            self.diagnostics.remove(0);
        }
    }
}
