use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sitewatch-cli", version, about = "Sitewatch CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browsing-time statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Reminder and notification settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Reset counters
    Reset {
        #[command(subcommand)]
        action: commands::reset::ResetAction,
    },
    /// Export the persisted document for backup
    Export(commands::export::ExportArgs),
    /// Track focus events from stdin and run the flush/reminder loop
    Watch,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Reset { action } => commands::reset::run(action),
        Commands::Export(args) => commands::export::run(args),
        Commands::Watch => commands::watch::run(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
