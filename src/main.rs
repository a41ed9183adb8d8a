use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use storyreel::config::{CarouselConfig, ConfigOverlay};
use storyreel::story::StorySource;
use storyreel::surface::html;
use storyreel::tui::runner::run_tui;

/// Layout width the HTML snapshot assumes for its tap midline.
const SNAPSHOT_WIDTH: u16 = 400;

#[derive(Parser)]
#[command(name = "storyreel", about = "Auto-advancing stories carousel.")]
struct Cli {
    /// Markup page to scrape, or a .yaml/.json story file
    source: PathBuf,

    /// Host element inside the markup (#id, .class, [attr], tag)
    #[arg(short, long)]
    selector: Option<String>,

    /// Slide shown first
    #[arg(short, long)]
    index: Option<usize>,

    /// Stop after the last slide instead of looping
    #[arg(long)]
    no_loop: bool,

    /// Time per slide in milliseconds (at least 1000)
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Print the HTML surface for the initial slide and exit
    #[arg(long)]
    snapshot: bool,
}

impl Cli {
    fn overlay(&self) -> ConfigOverlay {
        ConfigOverlay {
            selector: self.selector.clone(),
            initial_index: self.index,
            infinite: self.no_loop.then_some(false),
            autoplay_interval_ms: self.interval_ms,
            long_press_ms: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("storyreel=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let mut config = CarouselConfig::load();
    config.apply(cli.overlay());
    config.validate()?;

    let source = StorySource::open(&cli.source)?;
    info!("storyreel playing {}", cli.source.display());

    if cli.snapshot {
        let markup = match source {
            StorySource::Markup(doc) => html::snapshot(&config, Some(&doc), None, SNAPSHOT_WIDTH)?,
            StorySource::Data(stories) => {
                html::snapshot(&config, None, Some(stories), SNAPSHOT_WIDTH)?
            }
        };
        println!("{markup}");
        return Ok(());
    }

    run_tui(&config, source).await
}
