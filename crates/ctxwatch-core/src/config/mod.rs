mod settings;

pub use settings::{Command, Config, MessageSettings, Settings, SettingsError};
