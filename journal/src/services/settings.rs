//! Settings service
//!
//! Manages application settings persistence using JSON file storage.

use crate::config::{
    DEFAULT_WRITE_TIMEOUT_SECS, MAX_WRITE_TIMEOUT_SECS, MIN_WRITE_TIMEOUT_SECS, SETTINGS_FILE,
};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::fs;

/// Color theme of the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(AppError::Settings(format!(
                "Unknown theme '{}'. Use 'light' or 'dark'",
                other
            ))),
        }
    }
}

/// Where the shared journal lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Realtime database URL; `None` keeps the journal on this machine
    #[serde(default)]
    pub database_url: Option<String>,
    /// Upper bound for one save or delete, in seconds
    #[serde(default = "default_write_timeout")]
    pub write_timeout_secs: u64,
}

fn default_write_timeout() -> u64 {
    DEFAULT_WRITE_TIMEOUT_SECS
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            database_url: None,
            write_timeout_secs: default_write_timeout(),
        }
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AppSettings {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub remote: RemoteSettings,
}

/// Service for managing application settings
#[derive(Clone)]
pub struct SettingsService {
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new(app_data_dir: PathBuf) -> Self {
        Self {
            settings_path: app_data_dir.join(SETTINGS_FILE),
        }
    }

    /// Load settings from disk or create default if not exists
    pub async fn load(&self) -> Result<AppSettings> {
        if !self.settings_path.exists() {
            tracing::info!("Settings file not found, creating default settings");
            let default = AppSettings::default();
            self.save(&default).await?;
            return Ok(default);
        }

        let content = fs::read_to_string(&self.settings_path).await?;
        let settings: AppSettings = serde_json::from_str(&content)
            .map_err(|e| AppError::Settings(format!("Failed to parse settings: {}", e)))?;

        Ok(settings)
    }

    /// Save settings to disk
    pub async fn save(&self, settings: &AppSettings) -> Result<()> {
        let content = serde_json::to_string_pretty(settings)
            .map_err(|e| AppError::Settings(format!("Failed to serialize settings: {}", e)))?;

        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&self.settings_path, content).await?;
        tracing::info!("Settings saved to {:?}", self.settings_path);

        Ok(())
    }

    /// Get the theme
    pub async fn get_theme(&self) -> Result<Theme> {
        let settings = self.load().await?;
        Ok(settings.theme)
    }

    /// Set the theme
    pub async fn set_theme(&self, theme: Theme) -> Result<()> {
        let mut settings = self.load().await?;
        settings.theme = theme;
        self.save(&settings).await?;
        Ok(())
    }

    /// Flip between light and dark, returning the new theme
    pub async fn toggle_theme(&self) -> Result<Theme> {
        let mut settings = self.load().await?;
        settings.theme = settings.theme.toggled();
        self.save(&settings).await?;
        Ok(settings.theme)
    }

    /// Get remote settings
    pub async fn get_remote(&self) -> Result<RemoteSettings> {
        let settings = self.load().await?;
        Ok(settings.remote)
    }

    /// Update remote settings
    pub async fn update_remote(&self, remote: RemoteSettings) -> Result<()> {
        if !(MIN_WRITE_TIMEOUT_SECS..=MAX_WRITE_TIMEOUT_SECS).contains(&remote.write_timeout_secs) {
            return Err(AppError::Settings(format!(
                "Write timeout must be between {} and {} seconds",
                MIN_WRITE_TIMEOUT_SECS, MAX_WRITE_TIMEOUT_SECS
            )));
        }

        let mut settings = self.load().await?;
        settings.remote = remote;
        self.save(&settings).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_service() -> (SettingsService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let service = SettingsService::new(temp_dir.path().to_path_buf());
        (service, temp_dir)
    }

    #[tokio::test]
    async fn test_default_settings_created_on_load() {
        let (service, temp) = create_test_service();

        let settings = service.load().await.unwrap();

        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.remote.database_url, None);
        assert_eq!(settings.remote.write_timeout_secs, 15);
        assert!(temp.path().join("settings.json").exists());
    }

    #[tokio::test]
    async fn test_theme_toggle_persists() {
        let temp_dir = TempDir::new().unwrap();

        {
            let service = SettingsService::new(temp_dir.path().to_path_buf());
            assert_eq!(service.toggle_theme().await.unwrap(), Theme::Dark);
        }

        {
            let service = SettingsService::new(temp_dir.path().to_path_buf());
            assert_eq!(service.get_theme().await.unwrap(), Theme::Dark);
            assert_eq!(service.toggle_theme().await.unwrap(), Theme::Light);
        }
    }

    #[tokio::test]
    async fn test_theme_stored_as_plain_string() {
        let (service, temp) = create_test_service();
        service.set_theme(Theme::Dark).await.unwrap();

        let raw = std::fs::read_to_string(temp.path().join("settings.json")).unwrap();
        assert!(raw.contains(r#""theme": "dark""#));
    }

    #[tokio::test]
    async fn test_remote_update_keeps_theme() {
        let (service, _temp) = create_test_service();
        service.set_theme(Theme::Dark).await.unwrap();

        service
            .update_remote(RemoteSettings {
                database_url: Some("https://journal.firebaseio.com".to_string()),
                write_timeout_secs: 30,
            })
            .await
            .unwrap();

        let settings = service.load().await.unwrap();
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.remote.write_timeout_secs, 30);
    }

    #[tokio::test]
    async fn test_remote_timeout_bounds() {
        let (service, _temp) = create_test_service();

        let result = service
            .update_remote(RemoteSettings {
                database_url: None,
                write_timeout_secs: 0,
            })
            .await;

        assert!(matches!(result, Err(AppError::Settings(_))));
    }

    #[tokio::test]
    async fn test_partial_settings_file_uses_defaults() {
        let (service, temp) = create_test_service();
        std::fs::write(temp.path().join("settings.json"), r#"{ "theme": "dark" }"#).unwrap();

        let settings = service.load().await.unwrap();
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.remote, RemoteSettings::default());
    }

    #[test]
    fn test_theme_parsing() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("blue".parse::<Theme>().is_err());
    }
}
