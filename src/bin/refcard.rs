use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use refcard::{GameKind, RefCardService};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "refcard",
    version,
    about = "Render HOTAS reference cards from game binding exports"
)]
struct Cli {
    /// Service configuration JSON.
    #[arg(long, default_value = "config/config.json")]
    config: PathBuf,

    /// Title the binding files come from.
    #[arg(long, required_unless_present = "list_games")]
    game: Option<GameKind>,

    /// Output directory for the JPEG cards.
    #[arg(long, default_value = "out")]
    out: PathBuf,

    /// Print the supported titles and exit.
    #[arg(long)]
    list_games: bool,

    /// Binding files exported by the game.
    #[arg(required_unless_present = "list_games")]
    files: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.list_games {
        for kind in GameKind::ALL {
            println!("{:<8} {}", kind.label(), kind.description());
        }
        return Ok(());
    }
    let kind = cli
        .game
        .context("--game is required unless --list-games is given")?;

    let service = RefCardService::load(&cli.config)?;
    let files = cli
        .files
        .iter()
        .map(|p| std::fs::read(p).with_context(|| format!("read binding file '{}'", p.display())))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let resp = service.generate(kind, &files)?;

    std::fs::create_dir_all(&cli.out)
        .with_context(|| format!("create output dir '{}'", cli.out.display()))?;
    for (idx, card) in resp.cards.iter().enumerate() {
        if card.jpeg.is_empty() {
            continue;
        }
        let path = card_path(&cli.out, idx, &card.profile, &card.image);
        std::fs::write(&path, &card.jpeg)
            .with_context(|| format!("write card '{}'", path.display()))?;
        eprintln!("wrote {}", path.display());
    }

    for entry in &resp.log {
        let tag = if entry.is_error { "error" } else { "info " };
        println!("[{tag}] {}", entry.message);
    }
    Ok(())
}

fn card_path(out: &Path, idx: usize, profile: &str, image: &str) -> PathBuf {
    let clean = |s: &str| -> String {
        s.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect()
    };
    out.join(format!("{idx:02}_{}_{}.jpg", clean(profile), clean(image)))
}
