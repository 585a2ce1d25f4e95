//! Services module
//!
//! Journal logic that sits between the terminal client and the document store.

pub mod calendar;
pub mod editor;
pub mod entries;
pub mod images;
pub mod journal;
pub mod memories;
pub mod settings;

pub use calendar::{CalendarView, DayCell, MonthGrid};
pub use editor::{BatchReport, ConfirmPrompt, DeleteOutcome, EntryEditor};
pub use entries::EntryStore;
pub use images::ImageCollector;
pub use journal::Journal;
pub use memories::Memory;
pub use settings::{AppSettings, RemoteSettings, SettingsService, Theme};
