mod config;
mod store;

pub use config::{Configuration, Notice};
pub use store::{JsonSettingsStore, SettingsStore};
