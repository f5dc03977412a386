//! Jamgen CLI - static site generator for the game jam archive.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod prompt;

#[derive(Parser)]
#[command(name = "jamgen")]
#[command(about = "Static site generator for the game jam archive")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root containing jam.toml and the content tree
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the static site
    Build {
        /// Output directory (defaults to config or "_site")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip responsive image generation
        #[arg(long)]
        no_optimize: bool,
    },

    /// Preview the built site
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Directory to serve (defaults to the configured output)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },

    /// Scaffold data files and directories for a new jam year
    NewJam {
        /// Jam year (prompted when omitted)
        #[arg(short, long)]
        year: Option<u16>,
    },

    /// Add a game to a jam year interactively
    AddGame {
        /// Jam year (defaults to the latest)
        #[arg(short, long)]
        year: Option<u16>,
    },

    /// Add a sponsor to the homepage
    AddSponsor,

    /// Remove a sponsor from the homepage
    RemoveSponsor,

    /// Convert referenced images to a different format
    ConvertImages {
        /// Target format
        #[arg(short, long, default_value = "webp")]
        format: String,

        /// Limit to one jam year
        #[arg(short, long)]
        year: Option<u16>,

        /// Report planned conversions without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Recompute download checksums and update the data files
    UpdateChecksums {
        /// Limit to one jam year
        #[arg(short, long)]
        year: Option<u16>,
    },

    /// Synchronize download archives with the R2 bucket
    Sync {
        /// Transfer direction; "sync" reconciles both ways with the bucket as master
        #[arg(short, long, default_value = "upload")]
        mode: commands::sync::ModeArg,

        /// Limit to one jam year
        #[arg(short, long)]
        year: Option<u16>,

        /// Log planned transfers without performing them
        #[arg(long)]
        dry_run: bool,

        /// Skip the deletion confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Render printable game sheets for a jam year
    PrintSheets {
        /// Jam year (defaults to the latest)
        #[arg(short, long)]
        year: Option<u16>,

        /// Limit to these game slugs (comma separated)
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,

        /// Output directory (defaults to storage/sheets/{year})
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    // Execute command
    match cli.command {
        Commands::Build {
            output,
            no_optimize,
        } => {
            commands::build::run(&cli.root, output, no_optimize).await?;
        }
        Commands::Serve { port, dir, no_open } => {
            commands::serve::run(&cli.root, port, dir, !no_open).await?;
        }
        Commands::NewJam { year } => {
            commands::new_jam::run(&cli.root, year)?;
        }
        Commands::AddGame { year } => {
            commands::add_game::run(&cli.root, year)?;
        }
        Commands::AddSponsor => {
            commands::add_sponsor::run(&cli.root)?;
        }
        Commands::RemoveSponsor => {
            commands::remove_sponsor::run(&cli.root)?;
        }
        Commands::ConvertImages {
            format,
            year,
            dry_run,
        } => {
            commands::convert_images::run(&cli.root, &format, year, dry_run)?;
        }
        Commands::UpdateChecksums { year } => {
            commands::update_checksums::run(&cli.root, year)?;
        }
        Commands::Sync {
            mode,
            year,
            dry_run,
            force,
        } => {
            commands::sync::run(&cli.root, mode, year, dry_run, force).await?;
        }
        Commands::PrintSheets { year, only, output } => {
            commands::print_sheets::run(&cli.root, year, &only, output.as_deref())?;
        }
    }

    Ok(())
}
