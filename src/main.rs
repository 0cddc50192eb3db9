use anyhow::Result;
use clap::{Parser, Subcommand};
use modshelf::config::Paths;
use modshelf::{App, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "modshelf")]
#[command(
    author,
    version,
    about = "Browse, filter and download mod releases for a game instance"
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show project details
    Project {
        /// CurseForge project id
        id: u64,
        /// Open the project website in a browser
        #[arg(long)]
        open: bool,
    },

    /// List the release files of a project, newest first
    Releases {
        /// CurseForge project id
        id: u64,
        /// Only show files for this game version (e.g., 1.19.2)
        #[arg(long, conflicts_with = "instance_version")]
        game_version: Option<String>,
        /// Game directory containing versions/ and mods/
        #[arg(long)]
        game_dir: Option<String>,
        /// Version name inside the game directory; its game version is detected
        #[arg(long = "version-name", id = "instance_version")]
        version_name: Option<String>,
        /// Maximum number of files to print
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Download a release file
    Download {
        /// CurseForge project id
        id: u64,
        /// File id (defaults to the newest compatible file)
        file_id: Option<u64>,
        /// Save to this path instead of asking
        #[arg(short, long, conflicts_with = "install")]
        output: Option<String>,
        /// Install into the game directory's mods folder
        #[arg(long)]
        install: bool,
        /// Game directory containing versions/ and mods/
        #[arg(long)]
        game_dir: Option<String>,
        /// Version name inside the game directory
        #[arg(long = "version-name")]
        version_name: Option<String>,
        /// Accept the default save location without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Store the CurseForge API key
    SetApiKey { key: String },
    /// Set the default game directory (empty string clears it)
    SetGameDir { path: String },
}

fn setup_logging(verbosity: u8) {
    // Keep a log file next to the data dir; stderr alone if it cannot be opened
    let log_file = Paths::new().log_file();
    let file = log_file
        .parent()
        .map(std::fs::create_dir_all)
        .transpose()
        .and_then(|_| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_file)
        })
        .ok();

    log_subscriber(verbosity, file).init();
}

fn log_subscriber(
    verbosity: u8,
    file: Option<std::fs::File>,
) -> impl tracing::Subscriber + Send + Sync + 'static {
    let filter = match verbosity {
        0 => "modshelf=warn",
        1 => "modshelf=info",
        2 => "modshelf=debug",
        _ => "trace",
    };

    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());
    let file_layer = file.map(|file| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .with_writer(std::sync::Arc::new(file))
    });
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    // Load configuration
    let config = Config::load().await?;

    // Initialize app
    let mut app = App::new(config).await?;

    match cli.command {
        Commands::Project { id, open } => app.cmd_project_info(id, open).await?,
        Commands::Releases {
            id,
            game_version,
            game_dir,
            version_name,
            limit,
        } => {
            app.cmd_releases_list(
                id,
                game_version.as_deref(),
                game_dir.as_deref(),
                version_name.as_deref(),
                limit,
            )
            .await?
        }
        Commands::Download {
            id,
            file_id,
            output,
            install,
            game_dir,
            version_name,
            yes,
        } => {
            app.cmd_download(
                id,
                file_id,
                output.as_deref(),
                install,
                game_dir.as_deref(),
                version_name.as_deref(),
                yes,
            )
            .await?
        }
        Commands::Config { action } => match action {
            ConfigCommands::Show => app.cmd_config_show().await?,
            ConfigCommands::SetApiKey { key } => app.cmd_config_set_api_key(&key).await?,
            ConfigCommands::SetGameDir { path } => app.cmd_config_set_game_dir(&path).await?,
        },
    }

    Ok(())
}
