mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "focal")]
#[command(about = "Attention-aware work session tracking", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start a tracking session (spawns the daemon)
    Start {
        /// Cycle through Pomodoro work/break phases instead of free-running
        #[arg(long)]
        pomodoro: bool,
    },
    /// (Internal) Run the daemon process
    #[command(hide = true)]
    DaemonInternalStart {
        #[arg(long)]
        pomodoro: bool,
    },
    /// Stop the running session
    Stop,
    /// Show live session status
    Status,
    /// Show the session report (totals, percentages, top applications)
    Report,
    /// Manage the unproductive application list
    Apps {
        #[command(subcommand)]
        action: AppsAction,
    },
}

#[derive(Subcommand, Debug)]
enum AppsAction {
    /// Add an application token to the unproductive list
    Add { name: String },
    /// Remove an application token from the unproductive list
    Remove { name: String },
    /// List unproductive application tokens
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Start { pomodoro } => commands::daemon::handle_start(pomodoro).await,
        Commands::DaemonInternalStart { pomodoro } => commands::daemon::run_daemon(pomodoro).await,
        Commands::Stop => commands::daemon::handle_stop().await,
        Commands::Status => commands::daemon::handle_status().await,
        Commands::Report => commands::report::handle_report().await,
        Commands::Apps { action } => commands::apps::handle_apps_command(action).await,
    }
}
