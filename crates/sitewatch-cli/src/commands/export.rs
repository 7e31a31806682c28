use std::path::PathBuf;

use clap::Args;
use sitewatch_core::Engine;

#[derive(Args)]
pub struct ExportArgs {
    /// Directory to write the export file into
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
}

pub fn run(args: ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let engine = Engine::open()?;
    let path = engine.export(&args.dir)?;
    println!("{}", path.display());
    Ok(())
}
