use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use molasses::app;
use molasses::app::buffer::TextBuffer;
use molasses::config::Config;
use molasses::engine::FrictionEngine;
use molasses::overlay::{AnchorStrategy, VisualAnnotator};
use molasses::syntax::parser::TreeSitterProvider;
use molasses::ui::App;

#[derive(Parser, Debug)]
#[command(
    name = "molasses",
    about = "Typing friction for overlong method bodies",
    version
)]
struct Args {
    /// File to open in the demo editor
    file: PathBuf,

    /// Alternate config file (defaults to ~/.config/molasses/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overlay anchor strategy: first-character | child-minimum
    #[arg(long)]
    anchor: Option<String>,

    /// Fix the corruption RNG seed for a reproducible session
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let tiers = Arc::new(config.resolved_tiers()?);

    let anchor = match args.anchor.as_deref() {
        None => config.anchor,
        Some("first-character") => AnchorStrategy::FirstCharacter,
        Some("child-minimum") => AnchorStrategy::ChildMinimum,
        Some(other) => anyhow::bail!("unknown anchor strategy '{}'", other),
    };

    let buffer = TextBuffer::open(&args.file)?;
    let engine = FrictionEngine::new(
        config.interesting_set(),
        args.seed.or(config.corruption_seed),
    );

    let mut app = App::new(
        buffer,
        engine,
        Arc::new(TreeSitterProvider),
        tiers,
        VisualAnnotator::new(anchor),
    );
    match &args.config {
        Some(path) => app.show_toast(&format!("tiers from {}", path.display())),
        None => app.show_toast(&format!("tiers from {}", Config::config_location())),
    }
    app::run_editor(app).await
}
