use clap::Subcommand;
use sitewatch_core::Engine;

#[derive(Subcommand)]
pub enum ResetAction {
    /// Zero today's stats, hourly buckets, and reminder state
    Today,
    /// Zero everything, lifetime stats and settings included
    All,
}

pub fn run(action: ResetAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = Engine::open()?;

    match action {
        ResetAction::Today => engine.reset_today()?,
        ResetAction::All => engine.reset_all()?,
    }
    println!("{}", serde_json::json!({ "success": true }));
    Ok(())
}
