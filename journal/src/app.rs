//! Application state and initialization
//!
//! This module builds the central application state once on startup:
//! data directory, settings, and the document store the journal syncs with.

use crate::config::{ENV_DATABASE_URL, ENV_DATA_DIR, LOCAL_STORE_FILE};
use crate::error::{AppError, Result};
use crate::services::{AppSettings, CalendarView, EntryStore, Journal, SettingsService};
use crate::storage::{DocumentStore, FirebaseStore, LocalDocumentStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub app_data_dir: PathBuf,
    pub settings_service: SettingsService,
    /// Settings as read at startup
    pub settings: AppSettings,
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(
        app_data_dir: PathBuf,
        settings: AppSettings,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            settings_service: SettingsService::new(app_data_dir.clone()),
            app_data_dir,
            settings,
            store,
        }
    }

    /// Entry store bound to the configured document store
    pub fn entry_store(&self) -> EntryStore {
        EntryStore::new(Arc::clone(&self.store))
            .with_write_timeout(Duration::from_secs(self.settings.remote.write_timeout_secs))
    }

    /// A journal showing the current month
    pub fn journal(&self) -> Journal {
        Journal::new(self.entry_store(), CalendarView::starting_today())
    }
}

/// Application setup - called once on startup
pub async fn setup(data_dir: Option<PathBuf>) -> Result<AppState> {
    tracing::info!("Initializing application");

    let app_data_dir = resolve_data_dir(data_dir, std::env::var_os(ENV_DATA_DIR).map(PathBuf::from))?;
    tracing::info!("App data directory: {:?}", app_data_dir);

    std::fs::create_dir_all(&app_data_dir)?;

    let settings = SettingsService::new(app_data_dir.clone()).load().await?;

    let database_url = std::env::var(ENV_DATABASE_URL)
        .ok()
        .filter(|url| !url.trim().is_empty())
        .or_else(|| settings.remote.database_url.clone());

    let store: Arc<dyn DocumentStore> = match database_url {
        Some(url) => {
            tracing::info!("Using realtime database at {}", url);
            Arc::new(FirebaseStore::new(&url)?)
        }
        None => {
            tracing::info!("No database URL configured, using local journal");
            Arc::new(LocalDocumentStore::open(app_data_dir.join(LOCAL_STORE_FILE)).await?)
        }
    };

    let state = AppState::new(app_data_dir, settings, store);

    tracing::info!("Application initialized successfully");

    Ok(state)
}

/// Pick the data directory: explicit flag, then environment, then the
/// platform data directory
fn resolve_data_dir(flag: Option<PathBuf>, env: Option<PathBuf>) -> Result<PathBuf> {
    flag.or(env)
        .or_else(|| dirs::data_dir().map(|dir| dir.join("ourjournal")))
        .ok_or_else(|| AppError::Generic("Failed to get app data dir".to_string()))
}
