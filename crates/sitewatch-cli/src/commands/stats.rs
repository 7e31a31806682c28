use clap::Subcommand;
use serde::Serialize;
use sitewatch_core::stats::format_duration;
use sitewatch_core::Engine;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's per-site stats and hourly buckets
    Today,
    /// Lifetime per-site stats
    All,
}

#[derive(Serialize)]
struct LifetimeView {
    lifetime_stats: std::collections::BTreeMap<String, u64>,
    lifetime_total_secs: u64,
    lifetime_total: String,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let engine = Engine::open()?;
    let snapshot = engine.stats()?;

    match action {
        StatsAction::Today => {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        StatsAction::All => {
            let view = LifetimeView {
                lifetime_total: format_duration(snapshot.lifetime_total_secs),
                lifetime_total_secs: snapshot.lifetime_total_secs,
                lifetime_stats: snapshot.lifetime_stats,
            };
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }
    Ok(())
}
