//! OurJournal library
//!
//! This library exposes the journal core (entries, calendar, editor,
//! memory lane, settings and document stores) to the terminal client
//! and to tests.

pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
