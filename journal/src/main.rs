// OurJournal - shared two-person journal
// Terminal client entry point

mod commands;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::edit::EditArgs;
use commands::theme::ThemeAction;
use ourjournal::models::DateKey;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ourjournal")]
#[command(version, about = "A shared journal for two, one calendar day at a time")]
struct Cli {
    /// Directory holding settings and the local journal
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a month with the days that have entries
    Calendar {
        /// Year to show (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Month to show, 1-12 (defaults to the current month)
        #[arg(short, long)]
        month: Option<u32>,
    },
    /// Print the entry for a day
    Show {
        /// Date (YYYY-MM-DD or "today")
        #[arg(value_parser = commands::parse_date, default_value = "today")]
        date: DateKey,
    },
    /// Write or change the entry for a day
    Edit(EditArgs),
    /// Delete the entry for a day
    Delete {
        /// Date (YYYY-MM-DD or "today")
        #[arg(value_parser = commands::parse_date)]
        date: DateKey,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show a random entry from the journal
    Memory,
    /// Show or change the color theme
    Theme {
        #[arg(value_enum)]
        action: Option<ThemeAction>,
    },
    /// Show or change where the journal is synced
    Remote {
        /// Realtime database URL
        #[arg(long, conflicts_with = "clear")]
        url: Option<String>,

        /// Forget the database URL and keep the journal on this machine
        #[arg(long)]
        clear: bool,

        /// Seconds to wait for a save or delete to be acknowledged
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Keep the calendar on screen and redraw it on every change
    Watch {
        /// Year to show (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Month to show, 1-12 (defaults to the current month)
        #[arg(short, long)]
        month: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never mix with command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ourjournal=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    tracing::info!("Starting OurJournal");

    let state = ourjournal::app::setup(cli.data_dir).await?;

    match cli.command {
        Commands::Calendar { year, month } => commands::calendar::run(&state, year, month).await,
        Commands::Show { date } => commands::show::run(&state, date).await,
        Commands::Edit(args) => commands::edit::run(&state, args).await,
        Commands::Delete { date, yes } => commands::delete::run(&state, date, yes).await,
        Commands::Memory => commands::memory::run(&state).await,
        Commands::Theme { action } => commands::theme::run(&state, action).await,
        Commands::Remote { url, clear, timeout } => {
            commands::remote::run(&state, url, clear, timeout).await
        }
        Commands::Watch { year, month } => commands::watch::run(&state, year, month).await,
    }
}
