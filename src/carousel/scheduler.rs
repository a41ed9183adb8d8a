//! Timers as explicit scheduled tasks.
//!
//! A fired timer is delivered as a [`CarouselMessage`] carrying its
//! [`TimerId`]. The controller only honours the id it currently holds, so a
//! tick already queued when its timer was cancelled is dropped on arrival.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

use super::event::CarouselMessage;

/// Identifies one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// What a timer means when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    AutoplayTick,
    LongPress,
}

impl TimerKind {
    /// The message delivered when a timer of this kind fires.
    pub fn message(self, id: TimerId) -> CarouselMessage {
        match self {
            TimerKind::AutoplayTick => CarouselMessage::AutoplayTick(id),
            TimerKind::LongPress => CarouselMessage::LongPressElapsed(id),
        }
    }
}

/// Schedules timer callbacks for the controller.
pub trait Scheduler {
    /// Fire every `period`, first after one full period.
    fn schedule_repeating(&mut self, period: Duration, kind: TimerKind) -> TimerId;
    /// Fire once after `delay`.
    fn schedule_once(&mut self, delay: Duration, kind: TimerKind) -> TimerId;
    /// Cancel a timer. Unknown or finished ids are a no-op.
    fn cancel(&mut self, id: TimerId);
    /// Cancel everything this scheduler has armed.
    fn cancel_all(&mut self);
}

/// Tokio-backed scheduler: each timer is a task feeding an mpsc channel.
pub struct TokioScheduler {
    tx: mpsc::UnboundedSender<CarouselMessage>,
    tasks: HashMap<TimerId, JoinHandle<()>>,
    next_id: u64,
}

impl TokioScheduler {
    pub fn new(tx: mpsc::UnboundedSender<CarouselMessage>) -> Self {
        Self {
            tx,
            tasks: HashMap::new(),
            next_id: 0,
        }
    }

    /// A scheduler plus the receiver its timers deliver to.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<CarouselMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Number of timers still running.
    pub fn active(&self) -> usize {
        self.tasks.values().filter(|h| !h.is_finished()).count()
    }

    fn allocate(&mut self) -> TimerId {
        self.tasks.retain(|_, handle| !handle.is_finished());
        self.next_id += 1;
        TimerId(self.next_id)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_repeating(&mut self, period: Duration, kind: TimerKind) -> TimerId {
        let id = self.allocate();
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.send(kind.message(id)).is_err() {
                    break;
                }
            }
        });
        self.tasks.insert(id, handle);
        id
    }

    fn schedule_once(&mut self, delay: Duration, kind: TimerKind) -> TimerId {
        let id = self.allocate();
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            let _ = tx.send(kind.message(id));
        });
        self.tasks.insert(id, handle);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(handle) = self.tasks.remove(&id) {
            handle.abort();
        }
    }

    fn cancel_all(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// A timer armed on a [`ManualScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedTimer {
    pub kind: TimerKind,
    pub period: Duration,
    pub repeating: bool,
}

/// Scheduler that never fires on its own: the caller fires timers by hand.
///
/// Used by tests and by hosts that drive the carousel from their own loop.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    armed: BTreeMap<TimerId, ArmedTimer>,
    next_id: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.armed.contains_key(&id)
    }

    pub fn armed_count(&self) -> usize {
        self.armed.len()
    }

    /// The most recently armed timer of `kind`.
    pub fn armed_of(&self, kind: TimerKind) -> Option<TimerId> {
        self.armed
            .iter()
            .rev()
            .find(|(_, timer)| timer.kind == kind)
            .map(|(id, _)| *id)
    }

    pub fn timer(&self, id: TimerId) -> Option<&ArmedTimer> {
        self.armed.get(&id)
    }

    /// Fire `id`, returning the message its callback delivers. One-shot
    /// timers disarm; cancelled or unknown ids return `None`.
    pub fn fire(&mut self, id: TimerId) -> Option<CarouselMessage> {
        let timer = *self.armed.get(&id)?;
        if !timer.repeating {
            self.armed.remove(&id);
        }
        Some(timer.kind.message(id))
    }

    fn arm(&mut self, period: Duration, kind: TimerKind, repeating: bool) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.armed.insert(
            id,
            ArmedTimer {
                kind,
                period,
                repeating,
            },
        );
        id
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&mut self, period: Duration, kind: TimerKind) -> TimerId {
        self.arm(period, kind, true)
    }

    fn schedule_once(&mut self, delay: Duration, kind: TimerKind) -> TimerId {
        self.arm(delay, kind, false)
    }

    fn cancel(&mut self, id: TimerId) {
        self.armed.remove(&id);
    }

    fn cancel_all(&mut self) {
        self.armed.clear();
    }
}
