//! TUI event sources: terminal input, carousel timers, render ticks.
//!
//! Terminal input is read on a blocking task and forwarded through an mpsc
//! channel as TuiMessages, so no press or release is lost while the main
//! loop is busy with a timer or a frame.

use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::carousel::CarouselMessage;

/// Messages that drive the TUI update loop.
#[derive(Debug, Clone)]
pub enum TuiMessage {
    /// Keyboard input.
    Input(KeyEvent),
    /// Mouse press, release, or movement.
    Mouse(MouseEvent),
    /// A carousel timer fired.
    Carousel(CarouselMessage),
    /// Terminal resized to (columns, rows).
    Resize(u16, u16),
    /// Render: draw a frame.
    Render,
    /// Quit the TUI.
    Quit,
}

impl TuiMessage {
    /// Translate a crossterm event. Key releases and repeats are dropped.
    pub fn from_terminal(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => Some(Self::Input(key)),
            Event::Mouse(mouse) => Some(Self::Mouse(mouse)),
            Event::Resize(cols, rows) => Some(Self::Resize(cols, rows)),
            _ => None,
        }
    }
}

/// Read terminal events until the receiver is dropped.
pub fn spawn_input_reader(tx: mpsc::UnboundedSender<TuiMessage>) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        while !tx.is_closed() {
            match event::poll(Duration::from_millis(10)) {
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if let Some(msg) = TuiMessage::from_terminal(ev) {
                            if tx.send(msg).is_err() {
                                break;
                            }
                        }
                    }
                    Err(e) => warn!("terminal read failed: {e}"),
                },
                Ok(false) => {}
                Err(e) => {
                    warn!("terminal poll failed: {e}");
                    let _ = tx.send(TuiMessage::Quit);
                    break;
                }
            }
        }
    })
}
