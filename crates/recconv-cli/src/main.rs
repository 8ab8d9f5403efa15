//! Record Converter CLI - 命令行工具

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod voice_cmd;

#[derive(Parser)]
#[command(name = "recconv")]
#[command(about = "QQ voice converter bot for OneBot v11", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to OneBot and handle commands
    Run {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Initialize configuration
    Init {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Config {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Guess the audio extension of a file
    Sniff {
        file: PathBuf,
    },
    /// Extract the audio track of a video with ffmpeg
    Extract {
        video: PathBuf,
        output: PathBuf,
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Synthesize speech with the configured TTS provider
    Synthesize {
        text: String,
        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let default_filter = if cli.verbose {
        "recconv=trace,debug"
    } else {
        "recconv=debug,info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Run { config } => {
            commands::run::run(config).await?;
        }
        Commands::Init { config, force } => {
            commands::init::run(config, force)?;
        }
        Commands::Config { config } => {
            commands::init::show(config)?;
        }
        Commands::Sniff { file } => {
            voice_cmd::sniff(&file).await?;
        }
        Commands::Extract {
            video,
            output,
            config,
        } => {
            voice_cmd::extract(config, &video, &output).await?;
        }
        Commands::Synthesize {
            text,
            output,
            config,
        } => {
            voice_cmd::synthesize(config, &text, output).await?;
        }
    }

    Ok(())
}
