//! ox_profile: profile management front end over the schema-driven form engine.

pub mod config;
pub mod views;

pub use config::{load_config_from_path, ConfigError, ProfileConfig};
pub use views::{App, ViewError, ViewOutcome};
