//! Engine configuration.

pub mod settings;

pub use settings::{ContextSettings, LimitSettings, Settings, SettingsError, SqlSettings};
