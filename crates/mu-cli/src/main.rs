//! mu: indexa una carpeta de música y responde consultas sobre ella

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mu_library::{ExtractorKind, LibraryConfig, LibraryIndex, LibraryManager};
use mu_paths::MuPaths;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mu")]
#[command(about = "Index a music folder and query it", long_about = None)]
struct Cli {
    /// Configuration file (default: the per-user mu config)
    #[arg(short, long, global = true, env = "MU_CONFIG")]
    config: Option<PathBuf>,

    /// Library root, overrides the configured one
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Maximum simultaneous extractions
    #[arg(short, long, global = true)]
    workers: Option<usize>,

    /// Metadata tool to use
    #[arg(long, global = true, value_enum)]
    extractor: Option<Extractor>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the catalog and report its size
    Index {
        /// Print one view of the catalog as JSON
        #[arg(long, value_enum)]
        dump: Option<View>,
    },
    /// Write the embedded cover of a song (or album) to stdout or a file
    Cover {
        /// Song id, or album name with --album
        id: String,
        #[arg(long)]
        album: bool,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Stream a song as MP3 to stdout
    Transcode {
        /// Song id
        id: String,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum View {
    Songs,
    Albums,
    Artists,
}

#[derive(Clone, Copy, ValueEnum)]
enum Extractor {
    Exiftool,
    Mediainfo,
}

impl From<Extractor> for ExtractorKind {
    fn from(e: Extractor) -> Self {
        match e {
            Extractor::Exiftool => ExtractorKind::ExifTool,
            Extractor::Mediainfo => ExtractorKind::MediaInfo,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    if let Commands::Config = cli.command {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let manager = LibraryManager::new(config).context("failed to open the library")?;
    let index = manager.reindex().await.context("failed to build the library")?;
    info!("serving {} items", index.size());

    match cli.command {
        Commands::Index { dump } => {
            if let Some(view) = dump {
                dump_view(&index, view)?;
            }
        }
        Commands::Cover { id, album, out } => {
            let cover = if album {
                manager.album_cover(&id).await
            } else {
                manager.song_cover(&id).await
            }
            .with_context(|| format!("no cover for {id}"))?;

            match out {
                Some(path) => std::fs::write(&path, &cover)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => std::io::stdout().lock().write_all(&cover)?,
            }
        }
        Commands::Transcode { id } => {
            let mut stdout = tokio::io::stdout();
            let bytes = manager
                .transcode(&id, &mut stdout)
                .await
                .with_context(|| format!("failed to transcode {id}"))?;
            info!(bytes, "transcode done");
        }
        Commands::Config => {}
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<LibraryConfig> {
    let file = match &cli.config {
        Some(path) => Some(path.clone()),
        None => {
            let paths = MuPaths::new().context("failed to resolve the config directory")?;
            Some(paths.settings_file).filter(|p| p.exists())
        }
    };

    let mut config = match file {
        Some(path) => LibraryConfig::from_file(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => LibraryConfig::from_env().context("failed to load config from the environment")?,
    };

    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    if let Some(workers) = cli.workers {
        config.workers = Some(workers);
    }
    if let Some(extractor) = cli.extractor {
        config.extractor = extractor.into();
    }

    Ok(config)
}

fn dump_view(index: &LibraryIndex, view: View) -> Result<()> {
    let stdout = std::io::stdout().lock();
    match view {
        View::Songs => serde_json::to_writer_pretty(stdout, index.songs())?,
        View::Albums => serde_json::to_writer_pretty(stdout, index.albums())?,
        View::Artists => serde_json::to_writer_pretty(stdout, index.artists())?,
    }
    println!();
    Ok(())
}
