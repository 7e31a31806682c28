use clap::Subcommand;
use sitewatch_core::Engine;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show current settings
    Show,
    /// Change one or more settings
    Set {
        /// Preset reminder interval in minutes (15, 30, or 45)
        #[arg(long)]
        interval: Option<u32>,
        /// Custom reminder interval in minutes (1-180); wins over the preset
        #[arg(long)]
        custom_interval: Option<u32>,
        /// Drop the custom interval and fall back to the preset
        #[arg(long)]
        clear_custom: bool,
        /// Enable or disable break notifications
        #[arg(long)]
        notifications: Option<bool>,
        /// Enable or disable in-page reminder interrupts
        #[arg(long)]
        page_interrupt: Option<bool>,
    },
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = Engine::open()?;

    match action {
        SettingsAction::Show => {
            let settings = engine.stats()?.settings;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsAction::Set {
            interval,
            custom_interval,
            clear_custom,
            notifications,
            page_interrupt,
        } => {
            let mut settings = engine.stats()?.settings;
            if let Some(interval) = interval {
                settings.reminder_interval_min = interval;
            }
            if let Some(custom) = custom_interval {
                settings.custom_interval_min = Some(custom);
            }
            if clear_custom {
                settings.custom_interval_min = None;
            }
            if let Some(on) = notifications {
                settings.enable_notifications = on;
            }
            if let Some(on) = page_interrupt {
                settings.enable_page_interrupt = on;
            }
            engine.update_settings(settings)?;
            println!("{}", serde_json::json!({ "success": true }));
        }
    }
    Ok(())
}
