//! Reframe CLI — run the Auto-Director over recorded event streams.
//!
//! Usage:
//!   reframe analyze <EVENTS>   Generate edit tracks from a recording
//!   reframe info <EVENTS>      Show recording statistics

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "reframe",
    about = "Auto-directed editing for screen recordings",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate camera, cursor, and keystroke tracks from a recording
    Analyze {
        /// Path to the events JSONL file
        events: PathBuf,

        /// Output path for the generated timeline JSON
        #[arg(short, long, default_value = "timeline.json")]
        output: PathBuf,

        /// Director settings overrides (JSON file)
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Post-hoc zoom intensity multiplier
        #[arg(long)]
        zoom_intensity: Option<f64>,

        /// Only show keystrokes with modifiers held
        #[arg(long)]
        shortcuts_only: bool,

        /// Disable the keystroke overlay track
        #[arg(long)]
        no_keystrokes: bool,

        /// Enable camera path smoothing
        #[arg(long)]
        smooth: bool,
    },

    /// Show statistics about a recorded event stream
    Info {
        /// Path to the events JSONL file
        events: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = reframe_common::config::AppConfig::load();
    reframe_common::logging::init_cli_logging(&config.logging, cli.verbose);

    match cli.command {
        Commands::Analyze {
            events,
            output,
            settings,
            zoom_intensity,
            shortcuts_only,
            no_keystrokes,
            smooth,
        } => {
            // Fall back to the configured default settings file.
            let settings = settings.or(config.default_settings);
            commands::analyze::run(
                events,
                output,
                settings,
                zoom_intensity,
                shortcuts_only,
                no_keystrokes,
                smooth,
                cli.verbose,
            )?;
        }
        Commands::Info { events } => commands::info::run(events)?,
    }

    Ok(())
}
