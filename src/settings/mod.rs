// Settings module
// Loads and saves the JSON settings file in the app config directory

pub mod settings;

pub use settings::{AccessPolicyMode, AppSettings, StopPolicy};
