//! Theme preference

use crate::render::Palette;
use anyhow::Result;
use clap::ValueEnum;
use ourjournal::app::AppState;
use ourjournal::services::Theme;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeAction {
    Light,
    Dark,
    Toggle,
}

pub async fn run(state: &AppState, action: Option<ThemeAction>) -> Result<()> {
    let service = &state.settings_service;

    let theme = match action {
        None => service.get_theme().await?,
        Some(ThemeAction::Toggle) => service.toggle_theme().await?,
        Some(ThemeAction::Light) => {
            service.set_theme(Theme::Light).await?;
            Theme::Light
        }
        Some(ThemeAction::Dark) => {
            service.set_theme(Theme::Dark).await?;
            Theme::Dark
        }
    };

    let palette = Palette::new(theme);
    println!("Theme: {}", palette.heading(&theme.to_string()));

    Ok(())
}
