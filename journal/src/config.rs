//! Application configuration constants
//!
//! Central location for remote paths, image limits and other
//! boundaries used throughout the application.

// ===== Remote Store =====

/// Root path of the journal tree in the document store
pub const ENTRIES_ROOT: &str = "journal_entries";

/// Default upper bound for a single remote write, in seconds
pub const DEFAULT_WRITE_TIMEOUT_SECS: u64 = 15;

/// Smallest accepted write timeout. Shorter values fail healthy writes.
pub const MIN_WRITE_TIMEOUT_SECS: u64 = 1;

/// Largest accepted write timeout (5 minutes)
pub const MAX_WRITE_TIMEOUT_SECS: u64 = 300;

/// First wait before reopening a dropped event stream, in milliseconds
pub const RECONNECT_DELAY_MS: u64 = 1000;

/// Reconnect waits double up to this ceiling, in seconds
pub const MAX_RECONNECT_DELAY_SECS: u64 = 30;

// ===== Images =====

/// Longest side of a stored image in pixels
pub const MAX_IMAGE_DIMENSION: u32 = 600;

/// JPEG quality for stored images (0.7 on a 0..1 scale)
pub const JPEG_QUALITY: u8 = 70;

/// Prefix of every stored image reference
pub const IMAGE_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

// ===== Calendar =====

/// How many years before the current one the year selector offers
pub const YEARS_BEFORE_CURRENT: i32 = 50;

/// How many years after the current one the year selector offers
pub const YEARS_AFTER_CURRENT: i32 = 20;

// ===== Environment =====

/// Overrides the app data directory
pub const ENV_DATA_DIR: &str = "OURJOURNAL_DATA_DIR";

/// Overrides the remote database URL from settings
pub const ENV_DATABASE_URL: &str = "OURJOURNAL_DATABASE_URL";

/// Settings file name inside the app data directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Offline store file name inside the app data directory
pub const LOCAL_STORE_FILE: &str = "journal.json";
