// Settings management and persistence
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::access::permission::MediaPermission;
use crate::error::SettingsError;

/// Which permission model the access gate follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPolicyMode {
    /// Pick from the platform version at startup
    Auto,
    /// One permission per media category
    FineGrained,
    /// A single storage-read permission for everything
    Coarse,
}

/// Access settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessSettings {
    pub policy: AccessPolicyMode,
    pub require_consent: bool,
    pub remember_grants: bool,
    pub granted: Vec<MediaPermission>,
}

impl Default for AccessSettings {
    fn default() -> Self {
        Self {
            policy: AccessPolicyMode::Auto,
            require_consent: true,
            remember_grants: false,
            granted: vec![],
        }
    }
}

/// What the stop button does when a source is loaded but paused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopPolicy {
    /// Stop whenever something is loaded, playing or paused
    AnyLoaded,
    /// Stop only while playing; paused sessions are left alone
    WhilePlaying,
}

/// Playback settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    pub volume: f32, // 0.0-1.0
    pub audio_stop: StopPolicy,
    pub video_stop: StopPolicy,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            audio_stop: StopPolicy::AnyLoaded,
            video_stop: StopPolicy::WhilePlaying,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub filter: String, // EnvFilter directive, RUST_LOG wins when set
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub version: i32, // Settings schema version for future migrations
    pub access: AccessSettings,
    pub playback: PlaybackSettings,
    pub logging: LoggingSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: 1,
            access: AccessSettings::default(),
            playback: PlaybackSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl AppSettings {
    /// Get the settings file path
    pub fn get_settings_path(app_dir: &Path) -> PathBuf {
        app_dir.join("settings.json")
    }

    /// Load settings from file, or return defaults if file doesn't exist
    pub fn load(app_dir: &Path) -> Result<Self, SettingsError> {
        let path = Self::get_settings_path(app_dir);

        if !path.exists() {
            tracing::info!("no settings file found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .map_err(|source| SettingsError::Read { path: path.clone(), source })?;

        let settings: AppSettings = serde_json::from_str(&content)?;

        tracing::info!(?path, "loaded settings");
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is unreadable
    pub fn load_or_default(app_dir: &Path) -> Self {
        Self::load(app_dir).unwrap_or_else(|e| {
            tracing::warn!("{e}; using default settings");
            Self::default()
        })
    }

    /// Save settings to file
    pub fn save(&self, app_dir: &Path) -> Result<(), SettingsError> {
        let path = Self::get_settings_path(app_dir);

        // Ensure directory exists
        fs::create_dir_all(app_dir)
            .map_err(|source| SettingsError::Write { path: path.clone(), source })?;

        let content = serde_json::to_string_pretty(self)?;

        fs::write(&path, content)
            .map_err(|source| SettingsError::Write { path: path.clone(), source })?;

        tracing::debug!(?path, "saved settings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CapturedLogs;
    use tempfile::tempdir;
    use tracing::Level;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().expect("tempdir");
        let settings = AppSettings::load(dir.path()).expect("load");

        assert_eq!(settings.version, 1);
        assert_eq!(settings.access.policy, AccessPolicyMode::Auto);
        assert_eq!(settings.playback.audio_stop, StopPolicy::AnyLoaded);
        assert_eq!(settings.playback.video_stop, StopPolicy::WhilePlaying);
    }

    #[test]
    fn test_save_then_load_keeps_grants() {
        let dir = tempdir().expect("tempdir");
        let mut settings = AppSettings::default();
        settings.access.remember_grants = true;
        settings.access.granted = vec![MediaPermission::ReadMediaVideo];
        settings.playback.video_stop = StopPolicy::AnyLoaded;
        settings.save(dir.path()).expect("save");

        let loaded = AppSettings::load(dir.path()).expect("load");
        assert!(loaded.access.remember_grants);
        assert_eq!(loaded.access.granted, vec![MediaPermission::ReadMediaVideo]);
        assert_eq!(loaded.playback.video_stop, StopPolicy::AnyLoaded);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = AppSettings::get_settings_path(dir.path());
        fs::write(&path, r#"{ "access": { "policy": "coarse" } }"#).expect("write");

        let loaded = AppSettings::load(dir.path()).expect("load");
        assert_eq!(loaded.access.policy, AccessPolicyMode::Coarse);
        assert!(loaded.access.require_consent);
        assert_eq!(loaded.logging.filter, "info");
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let dir = tempdir().expect("tempdir");
        let path = AppSettings::get_settings_path(dir.path());
        fs::write(&path, "not json").expect("write");

        assert!(matches!(AppSettings::load(dir.path()), Err(SettingsError::Parse(_))));
        assert_eq!(AppSettings::load_or_default(dir.path()).version, 1);
    }

    #[test]
    fn test_corrupt_file_warns_before_falling_back() {
        let dir = tempdir().expect("tempdir");
        let path = AppSettings::get_settings_path(dir.path());
        fs::write(&path, "{ \"playback\": ").expect("write");

        let logs = CapturedLogs::default();
        let settings = logs.capture(|| AppSettings::load_or_default(dir.path()));

        assert_eq!(settings.playback.video_stop, StopPolicy::WhilePlaying);
        let warnings = logs.at(Level::WARN);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("using default settings"));
    }
}
