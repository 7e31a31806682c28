pub mod export;
pub mod reset;
pub mod settings;
pub mod stats;
pub mod watch;
