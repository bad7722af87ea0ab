use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use viro_core::identity::UserIdentity;
use viro_infrastructure::ConfigService;

mod commands;
mod render;
mod session;
mod shell;

#[derive(Parser)]
#[command(name = "viro")]
#[command(about = "VIRO - Generador de ideas virales con IA", long_about = None)]
struct Cli {
    /// Path to config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Sign in as this user id
    #[arg(long, global = true, env = "VIRO_USER")]
    user: Option<String>,

    /// Display name for --user (defaults to the id)
    #[arg(long, global = true)]
    name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate ideas for a topic
    Generate {
        /// Topic for the videos
        tema: String,
    },
    /// Show the signed-in user's history grouped by topic
    History,
    /// Show one history entry in full
    Show {
        /// Position of the entry (as shown by `history`)
        index: usize,
    },
    /// Delete one history entry
    Delete {
        #[arg(long)]
        topic: String,
        /// Position of the entry in the full history (as shown by `history`)
        #[arg(long)]
        index: usize,
    },
    /// Delete the whole history
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Interactive session
    Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ConfigService::locate(cli.config.as_deref())?.load()?;
    let account = cli.user.map(|uid| {
        let name = cli.name.unwrap_or_else(|| uid.clone());
        UserIdentity::new(uid, name)
    });

    match cli.command {
        Commands::Generate { tema } => commands::generate(&config, account, &tema).await?,
        Commands::History => commands::history(&config, account).await?,
        Commands::Show { index } => commands::show(&config, account, index).await?,
        Commands::Delete { topic, index } => {
            commands::delete(&config, account, &topic, index).await?
        }
        Commands::Clear { yes } => commands::clear(&config, account, yes).await?,
        Commands::Shell => shell::run(&config, account).await?,
    }

    Ok(())
}
