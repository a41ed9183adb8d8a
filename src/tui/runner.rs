//! TUI runner: main loop that wires everything together.
//!
//! Mounts the carousel on a terminal surface, spawns the input reader,
//! and runs the TEA loop until the carousel is torn down.

use std::io;
use std::time::Duration;

use anyhow::anyhow;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::info;

use crate::carousel::{CarouselController, TokioScheduler};
use crate::config::CarouselConfig;
use crate::story::StorySource;

use super::app::{TuiApp, TuiSurface};
use super::event::{spawn_input_reader, TuiMessage};
use super::layout;

/// Mount a carousel for `source` on a terminal-backed surface.
pub fn mount_carousel(
    config: &CarouselConfig,
    source: StorySource,
    width: u16,
    scheduler: TokioScheduler,
) -> anyhow::Result<CarouselController<TuiSurface, TokioScheduler>> {
    let surface = TuiSurface::new(width);
    let carousel = match source {
        StorySource::Markup(doc) => {
            CarouselController::mount(config, Some(&doc), None, surface, scheduler)
        }
        StorySource::Data(stories) => {
            CarouselController::mount(config, None, Some(stories), surface, scheduler)
        }
    };
    if !carousel.is_running() {
        return Err(match carousel.diagnostics().first() {
            Some(e) => anyhow!("carousel failed to mount: {e}"),
            None => anyhow!("carousel failed to mount"),
        });
    }
    Ok(carousel)
}

/// Run the TUI main loop. Blocks until the carousel exits.
pub async fn run_tui(config: &CarouselConfig, source: StorySource) -> anyhow::Result<()> {
    let (scheduler, mut timer_rx) = TokioScheduler::channel();
    let (width, _) = terminal::size()?;
    let carousel = mount_carousel(config, source, width, scheduler)?;
    let mut app = TuiApp::new(carousel);

    // Setup terminal
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let (input_tx, mut input_rx) = mpsc::unbounded_channel();
    let reader = spawn_input_reader(input_tx);
    let mut render_interval = interval(Duration::from_millis(33)); // ~30fps

    let result = async {
        loop {
            tokio::select! {
                _ = render_interval.tick() => {
                    terminal.draw(|f| layout::draw(f, &mut app))?;
                }
                Some(msg) = timer_rx.recv() => {
                    app.update(TuiMessage::Carousel(msg));
                }
                Some(msg) = input_rx.recv() => {
                    app.update(msg);
                }
                else => break,
            }

            if app.should_quit {
                break;
            }
        }
        Ok::<_, anyhow::Error>(())
    }
    .await;

    // Restore terminal
    drop(input_rx);
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    let _ = reader.await;

    info!(
        position = ?app.carousel.position(),
        lifecycle = ?app.carousel.lifecycle(),
        "carousel closed"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carousel::{CarouselError, CarouselMessage, Lifecycle};
    use crate::story::markup::Document;

    const MARKUP: &str = r#"
<section id="stories">
  <div data-storie="" data-order="0">
    <img data-image="https://cdn.example/a.jpg" />
    <span data-author="ana"></span>
    <span data-dataposted="2024-01-01 10:00:00"></span>
  </div>
  <div data-storie="" data-order="1">
    <img data-image="https://cdn.example/b.jpg" />
    <span data-author="ben"></span>
    <span data-dataposted="2024-01-01 11:00:00"></span>
  </div>
</section>
"#;

    #[tokio::test]
    async fn mounts_markup_source() {
        let (scheduler, _rx) = TokioScheduler::channel();
        let source = StorySource::Markup(Document::parse(MARKUP).unwrap());
        let carousel = mount_carousel(&CarouselConfig::default(), source, 80, scheduler).unwrap();
        assert!(carousel.is_running());
        assert_eq!(carousel.surface().image.as_deref(), Some("https://cdn.example/a.jpg"));
        assert_eq!(carousel.scheduler().active(), 1);
    }

    #[tokio::test]
    async fn missing_host_is_an_error() {
        let (scheduler, _rx) = TokioScheduler::channel();
        let config = CarouselConfig {
            selector: Some("#absent".into()),
            ..CarouselConfig::default()
        };
        let source = StorySource::Markup(Document::parse(MARKUP).unwrap());
        let err = mount_carousel(&config, source, 80, scheduler).err().unwrap();
        assert!(err
            .to_string()
            .contains(&CarouselError::HostNotFound("#absent".into()).to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn timer_channel_drives_autoplay() {
        let (scheduler, mut rx) = TokioScheduler::channel();
        let source = StorySource::Markup(Document::parse(MARKUP).unwrap());
        let mut app = TuiApp::new(
            mount_carousel(&CarouselConfig::default(), source, 80, scheduler).unwrap(),
        );
        for _ in 0..3 {
            let msg = rx.recv().await.unwrap();
            app.update(TuiMessage::Carousel(msg));
        }
        assert_eq!(app.carousel.position().index, 1);
        assert_eq!(app.carousel.surface().image.as_deref(), Some("https://cdn.example/b.jpg"));
    }

    #[tokio::test]
    async fn exit_cancels_all_timers() {
        let (scheduler, _rx) = TokioScheduler::channel();
        let source = StorySource::Markup(Document::parse(MARKUP).unwrap());
        let mut app = TuiApp::new(
            mount_carousel(&CarouselConfig::default(), source, 80, scheduler).unwrap(),
        );
        app.update(TuiMessage::Carousel(CarouselMessage::PointerPressed { x: 3 }));
        app.update(TuiMessage::Carousel(CarouselMessage::Exit));
        assert!(app.should_quit);
        assert_eq!(app.carousel.lifecycle(), Lifecycle::Terminated);
        assert_eq!(app.carousel.scheduler().active(), 0);
    }
}
