//! Edit and save one entry

use crate::commands::{load_journal, palette};
use crate::render::{self, Palette};
use anyhow::Result;
use clap::Args;
use ourjournal::app::AppState;
use ourjournal::error::AppError;
use ourjournal::models::{DateKey, Person};
use ourjournal::services::Journal;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Date to edit (YYYY-MM-DD or "today")
    #[arg(value_parser = super::parse_date)]
    pub date: DateKey,

    /// Replace Person A's text
    #[arg(long)]
    pub text_a: Option<String>,

    /// Replace Person B's text
    #[arg(long)]
    pub text_b: Option<String>,

    /// Attach an image to Person A's side (repeatable)
    #[arg(long = "image-a")]
    pub images_a: Vec<PathBuf>,

    /// Attach an image to Person B's side (repeatable)
    #[arg(long = "image-b")]
    pub images_b: Vec<PathBuf>,

    /// Remove Person A's image at this position (repeatable)
    #[arg(long = "remove-image-a")]
    pub remove_a: Vec<usize>,

    /// Remove Person B's image at this position (repeatable)
    #[arg(long = "remove-image-b")]
    pub remove_b: Vec<usize>,
}

impl EditArgs {
    fn text_for(&self, person: Person) -> Option<&String> {
        match person {
            Person::A => self.text_a.as_ref(),
            Person::B => self.text_b.as_ref(),
        }
    }

    fn images_for(&self, person: Person) -> &[PathBuf] {
        match person {
            Person::A => &self.images_a,
            Person::B => &self.images_b,
        }
    }

    fn removals_for(&self, person: Person) -> &[usize] {
        match person {
            Person::A => &self.remove_a,
            Person::B => &self.remove_b,
        }
    }
}

pub async fn run(state: &AppState, args: EditArgs) -> Result<()> {
    let (mut journal, _subscription) = load_journal(state).await?;
    let palette = palette(state);

    journal.open(args.date);

    for person in Person::BOTH {
        apply_changes(&mut journal, &args, person, &palette).await?;
    }

    if !journal.editor().can_save() {
        println!(
            "{}",
            palette.error("Nothing to save. Write something or add an image first.")
        );
        return Err(AppError::NothingToSave.into());
    }

    if !journal.editor().is_dirty() {
        println!("{}", palette.dim("No changes."));
        return Ok(());
    }

    let preview = journal.editor().buffer().cloned();

    match journal.save().await {
        Ok(()) => {
            if let Some(entry) = preview {
                println!("{}", render::entry(&args.date, &entry, &palette));
                println!();
            }
            println!("{}", palette.success(&format!("Saved entry for {}", args.date)));
            Ok(())
        }
        Err(e) => {
            println!("{}", palette.error(&format!("Could not save: {}", e)));
            Err(e.into())
        }
    }
}

async fn apply_changes(
    journal: &mut Journal,
    args: &EditArgs,
    person: Person,
    palette: &Palette,
) -> Result<()> {
    if let Some(text) = args.text_for(person) {
        journal.set_text(person, text.clone())?;
    }

    // Highest position first so earlier removals don't shift later ones
    let mut removals = args.removals_for(person).to_vec();
    removals.sort_unstable_by(|a, b| b.cmp(a));
    removals.dedup();
    for index in removals {
        if !journal.remove_image(person, index) {
            println!(
                "{}",
                palette.dim(&format!("{} has no image at position {}", person, index))
            );
        }
    }

    let paths = args.images_for(person);
    if paths.is_empty() {
        return Ok(());
    }

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::Generic(format!("Failed to read {}: {}", path.display(), e)))?;
        files.push(data);
    }

    let report = journal.add_images(person, files).await?;
    for (index, error) in &report.skipped {
        println!(
            "{}",
            palette.error(&format!("Skipped {}: {}", paths[*index].display(), error))
        );
    }
    tracing::debug!("Added {} images for {}", report.added, person);

    Ok(())
}
