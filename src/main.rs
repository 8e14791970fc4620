use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sheet_manager::config::{AppConfig, CliConfig, FileConfig};
use sheet_manager::{JsonFileStore, MusicItem, SheetManager};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the JSON file backing the sheet store.
    #[clap(long, value_parser = parse_path)]
    pub store_file: Option<PathBuf>,

    /// Path to an optional TOML config file.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all sheets with their track lists.
    List,
    /// Print a single sheet with its track list.
    Show { sheet_id: String },
    /// Create a new empty sheet and print its id.
    Create { title: String },
    /// Delete a sheet. The default "favorite" sheet cannot be deleted.
    Delete { sheet_id: String },
    /// Add a track to a sheet. Tracks already in the sheet are skipped.
    AddTrack {
        sheet_id: String,
        #[clap(long)]
        platform: String,
        #[clap(long)]
        track_id: String,
        #[clap(long)]
        title: String,
        #[clap(long)]
        artist: String,
        #[clap(long)]
        album: Option<String>,
        #[clap(long)]
        artwork: Option<String>,
    },
    /// Remove tracks from a sheet by their list positions.
    RemoveTrack {
        sheet_id: String,
        #[clap(long, required = true)]
        index: Vec<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        store_file: cli_args.store_file.clone(),
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Opening sheet store at {:?}...", config.store_file);
    let store = Arc::new(JsonFileStore::open(config.store_file).await);
    let manager = SheetManager::new(store);
    manager.setup().await?;

    match cli_args.command {
        Command::List => {
            let sheets = manager.get_sheets().await;
            println!("{}", serde_json::to_string_pretty(&sheets)?);
        }
        Command::Show { sheet_id } => match manager.get_sheet(&sheet_id).await {
            Some(sheet) => println!("{}", serde_json::to_string_pretty(&sheet)?),
            None => bail!("No sheet with id {}", sheet_id),
        },
        Command::Create { title } => {
            let new_id = manager.add_sheet(&title).await?;
            println!("{}", new_id);
        }
        Command::Delete { sheet_id } => {
            manager.remove_sheet(&sheet_id).await?;
        }
        Command::AddTrack {
            sheet_id,
            platform,
            track_id,
            title,
            artist,
            album,
            artwork,
        } => {
            let item = MusicItem {
                platform,
                id: track_id,
                title,
                artist,
                album,
                artwork,
            };
            manager.add_music_item(&sheet_id, item).await?;
        }
        Command::RemoveTrack { sheet_id, index } => {
            manager.remove_music_by_index(&sheet_id, index).await?;
        }
    }

    Ok(())
}
