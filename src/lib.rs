pub mod cli;
pub mod commands;
pub mod config;
pub mod drive;
pub mod error;
pub mod logging;
pub mod model;
pub mod organize;
pub mod progress;
pub mod report;
pub mod settings;
pub mod utils;

pub use config::AppConfig;
pub use error::Error;
pub use progress::{BatchOutcome, ProgressReporter, SilentReporter};
pub use settings::Settings;
