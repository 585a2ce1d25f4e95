//! Terminal rendering for journal types.
//!
//! Colors follow the stored theme: the dark palette uses bright colors,
//! the light palette darker ones.

use ourjournal::models::{DateKey, Entry, Person};
use ourjournal::services::calendar::WEEKDAY_NAMES;
use ourjournal::services::{DayCell, Memory, MonthGrid, Theme};
use owo_colors::OwoColorize;

/// Width of one calendar cell, in columns
const CELL_WIDTH: usize = 5;

/// Marker printed next to days that have an entry
const ENTRY_MARKER: char = '•';

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    theme: Theme,
}

impl Palette {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn heading(&self, text: &str) -> String {
        match self.theme {
            Theme::Dark => text.bright_cyan().bold().to_string(),
            Theme::Light => text.blue().bold().to_string(),
        }
    }

    pub fn marked(&self, text: &str) -> String {
        match self.theme {
            Theme::Dark => text.bright_magenta().to_string(),
            Theme::Light => text.magenta().to_string(),
        }
    }

    pub fn today(&self, text: &str) -> String {
        text.reversed().bold().to_string()
    }

    pub fn dim(&self, text: &str) -> String {
        text.dimmed().to_string()
    }

    pub fn success(&self, text: &str) -> String {
        match self.theme {
            Theme::Dark => text.bright_green().to_string(),
            Theme::Light => text.green().to_string(),
        }
    }

    pub fn error(&self, text: &str) -> String {
        text.red().to_string()
    }
}

/// The month as a seven-column grid
pub fn month_grid(grid: &MonthGrid, palette: &Palette) -> String {
    let mut lines = Vec::new();

    let title = format!("{} {}", grid.month_name(), grid.year);
    let width = CELL_WIDTH * 7;
    lines.push(palette.heading(&format!("{:^width$}", title, width = width)));

    let header: String = WEEKDAY_NAMES
        .iter()
        .map(|name| format!("{:>width$}", name, width = CELL_WIDTH - 1) + " ")
        .collect();
    lines.push(palette.dim(&header));

    for week in grid.weeks() {
        let row: String = week
            .into_iter()
            .map(|cell| match cell {
                Some(cell) => day_cell(cell, palette),
                None => " ".repeat(CELL_WIDTH),
            })
            .collect();
        lines.push(row.trim_end().to_string());
    }

    let legend = format!(
        "{} entry   {} today",
        palette.marked(&ENTRY_MARKER.to_string()),
        palette.today("  ")
    );
    lines.push(String::new());
    lines.push(legend);

    lines.join("\n")
}

fn day_cell(cell: &DayCell, palette: &Palette) -> String {
    let number = format!("{:>3}", cell.day);
    let number = if cell.is_today {
        palette.today(&number)
    } else if cell.has_entry {
        palette.marked(&number)
    } else {
        number
    };

    let marker = if cell.has_entry {
        palette.marked(&ENTRY_MARKER.to_string())
    } else {
        " ".to_string()
    };

    format!("{}{} ", number, marker)
}

/// Both sides of an entry
pub fn entry(date: &DateKey, entry: &Entry, palette: &Palette) -> String {
    let mut lines = vec![palette.heading(&long_date(date))];

    for person in Person::BOTH {
        lines.push(String::new());
        lines.extend(person_section(entry, person, palette, None));
    }

    lines.join("\n")
}

/// A memory lane pick, with placeholders for blank sides
pub fn memory(memory: &Memory, palette: &Palette) -> String {
    let mut lines = vec![palette.heading(&format!("A memory from {}", long_date(&memory.date)))];

    for person in Person::BOTH {
        lines.push(String::new());
        lines.extend(person_section(&memory.entry, person, palette, Some(memory.text_for(person))));
    }

    lines.join("\n")
}

fn person_section(entry: &Entry, person: Person, palette: &Palette, text: Option<&str>) -> Vec<String> {
    let side = entry.person(person);
    let mut lines = vec![palette.marked(&person.to_string())];

    let text = text.unwrap_or(side.text.as_str());
    if text.trim().is_empty() {
        lines.push(format!("  {}", palette.dim("(no text)")));
    } else {
        lines.extend(text.lines().map(|line| format!("  {}", line)));
    }

    for (index, image) in side.images.iter().enumerate() {
        lines.push(format!(
            "  {}",
            palette.dim(&format!("[image {}: {}]", index, approximate_size(image)))
        ));
    }

    lines
}

fn long_date(date: &DateKey) -> String {
    date.date().format("%A, %-d %B %Y").to_string()
}

/// Decoded size of a base64 data URI, for display
fn approximate_size(image: &str) -> String {
    let payload = image.split_once(',').map(|(_, data)| data).unwrap_or(image);
    let bytes = payload.len() * 3 / 4;

    if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}
