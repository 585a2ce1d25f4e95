//! Remote database settings

use crate::commands::palette;
use anyhow::Result;
use ourjournal::app::AppState;
use ourjournal::storage::FirebaseStore;

pub async fn run(
    state: &AppState,
    url: Option<String>,
    clear: bool,
    timeout: Option<u64>,
) -> Result<()> {
    let service = &state.settings_service;
    let palette = palette(state);
    let mut remote = service.get_remote().await?;
    let changed = clear || url.is_some() || timeout.is_some();

    if clear {
        remote.database_url = None;
    }

    if let Some(url) = url {
        // Reject malformed URLs before they reach the settings file
        FirebaseStore::new(&url)?;
        remote.database_url = Some(url.trim().trim_end_matches('/').to_string());
    }

    if let Some(secs) = timeout {
        remote.write_timeout_secs = secs;
    }

    if changed {
        service.update_remote(remote.clone()).await?;
        println!("{}", palette.success("Remote settings saved"));
    }

    match &remote.database_url {
        Some(url) => println!("Database:      {}", url),
        None => println!("Database:      {}", palette.dim("local only")),
    }
    println!("Write timeout: {}s", remote.write_timeout_secs);

    Ok(())
}
