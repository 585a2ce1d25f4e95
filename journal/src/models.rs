//! Journal models
//!
//! Rust structs representing journal documents.
//! All models use serde for the remote store's JSON shape.

use crate::error::{AppError, Result};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An image stored inline as a `data:` URI
pub type ImageRef = String;

/// Canonical `YYYY-MM-DD` key of a calendar day.
///
/// Built from local wall-clock date components, never from an instant.
/// The month is 1-based, both in the key and in every accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Build a key from a year, a 1-based month and a day of month
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        if !(0..=9999).contains(&year) {
            return Err(AppError::InvalidDateKey(format!(
                "year {} does not fit in four digits",
                year
            )));
        }

        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| {
                AppError::InvalidDateKey(format!("{}-{}-{} is not a calendar date", year, month, day))
            })
    }

    /// Build a key from a chrono date
    pub fn from_date(date: NaiveDate) -> Result<Self> {
        Self::from_ymd(date.year(), date.month(), date.day())
    }

    /// Key for the local current date
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// Strictly parse a zero-padded `YYYY-MM-DD` string
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 10
            && bytes.iter().enumerate().all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            });

        if !well_formed {
            return Err(AppError::InvalidDateKey(format!(
                "'{}' is not in YYYY-MM-DD form",
                s
            )));
        }

        // All slices are ASCII digits at this point
        let year: i32 = s[0..4].parse().map_err(|_| AppError::InvalidDateKey(s.to_string()))?;
        let month: u32 = s[5..7].parse().map_err(|_| AppError::InvalidDateKey(s.to_string()))?;
        let day: u32 = s[8..10].parse().map_err(|_| AppError::InvalidDateKey(s.to_string()))?;

        Self::from_ymd(year, month, day)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// 1-based month
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

impl FromStr for DateKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for DateKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// One of the two journal authors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Person {
    A,
    B,
}

impl Person {
    pub const BOTH: [Person; 2] = [Person::A, Person::B];
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Person::A => write!(f, "Person A"),
            Person::B => write!(f, "Person B"),
        }
    }
}

impl FromStr for Person {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "a" | "persona" | "person-a" => Ok(Person::A),
            "b" | "personb" | "person-b" => Ok(Person::B),
            other => Err(AppError::Generic(format!(
                "Unknown person '{}'. Use 'a' or 'b'",
                other
            ))),
        }
    }
}

/// What one person wrote on a day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredPerson")]
pub struct PersonEntry {
    pub text: String,
    /// Display order is insertion order
    pub images: Vec<ImageRef>,
}

impl PersonEntry {
    /// Non-whitespace text or at least one image
    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty() || !self.images.is_empty()
    }
}

/// Person object as it may be found in the store.
///
/// Older records carry a single `image` string instead of `images`.
#[derive(Deserialize, Default)]
#[serde(default)]
struct StoredPerson {
    text: Option<String>,
    images: Option<Vec<ImageRef>>,
    image: Option<ImageRef>,
}

impl From<StoredPerson> for PersonEntry {
    fn from(stored: StoredPerson) -> Self {
        let images = match (stored.images, stored.image) {
            (Some(images), _) => images,
            (None, Some(image)) => vec![image],
            (None, None) => Vec::new(),
        };

        Self {
            text: stored.text.unwrap_or_default(),
            images,
        }
    }
}

/// The two-person record for one day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "personA", default, deserialize_with = "null_as_default")]
    pub person_a: PersonEntry,
    #[serde(rename = "personB", default, deserialize_with = "null_as_default")]
    pub person_b: PersonEntry,
}

impl Entry {
    /// Empty entries are treated as absent
    pub fn is_empty(&self) -> bool {
        !self.person_a.has_content() && !self.person_b.has_content()
    }

    pub fn person(&self, person: Person) -> &PersonEntry {
        match person {
            Person::A => &self.person_a,
            Person::B => &self.person_b,
        }
    }

    pub fn person_mut(&mut self, person: Person) -> &mut PersonEntry {
        match person {
            Person::A => &mut self.person_a,
            Person::B => &mut self.person_b,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_date_key_round_trip() {
        for (y, m, d) in [(2024, 3, 5), (1999, 12, 31), (2024, 2, 29), (33, 1, 1)] {
            let key = DateKey::from_ymd(y, m, d).unwrap();
            let parsed = DateKey::parse(&key.to_string()).unwrap();
            assert_eq!((parsed.year(), parsed.month(), parsed.day()), (y, m, d));
        }
    }

    #[test]
    fn test_date_key_is_zero_padded() {
        let key = DateKey::from_ymd(2024, 3, 5).unwrap();
        assert_eq!(key.to_string(), "2024-03-05");

        let key = DateKey::from_ymd(33, 1, 1).unwrap();
        assert_eq!(key.to_string(), "0033-01-01");
    }

    #[test]
    fn test_date_key_rejects_malformed() {
        assert!(DateKey::parse("2024-3-5").is_err());
        assert!(DateKey::parse("2024-02-30").is_err());
        assert!(DateKey::parse("2024/03/05").is_err());
        assert!(DateKey::parse("2024-03-05T00:00").is_err());
        assert!(DateKey::from_ymd(2024, 13, 1).is_err());
        assert!(DateKey::from_ymd(10000, 1, 1).is_err());
    }

    #[test]
    fn test_legacy_single_image_is_normalized() {
        let entry: Entry = serde_json::from_value(json!({ "personA": { "image": "abc" } })).unwrap();

        assert_eq!(entry.person_a.images, vec!["abc".to_string()]);
        assert_eq!(entry.person_a.text, "");
        assert_eq!(entry.person_b, PersonEntry::default());

        // Saving never writes the legacy field back
        let written = serde_json::to_value(&entry).unwrap();
        assert_eq!(written["personA"]["images"], json!(["abc"]));
        assert!(written["personA"].get("image").is_none());
    }

    #[test]
    fn test_images_sequence_wins_over_legacy_field() {
        let entry: Entry = serde_json::from_value(json!({
            "personB": { "images": [], "image": "old" }
        }))
        .unwrap();

        assert!(entry.person_b.images.is_empty());
    }

    #[test]
    fn test_null_person_reads_as_empty() {
        let entry: Entry = serde_json::from_value(json!({ "personA": null, "personB": { "text": "hi" } }))
            .unwrap();

        assert_eq!(entry.person_a, PersonEntry::default());
        assert_eq!(entry.person_b.text, "hi");
    }

    #[test]
    fn test_emptiness_rule() {
        let mut entry = Entry::default();
        assert!(entry.is_empty());

        entry.person_a.text = "  \n\t".to_string();
        assert!(entry.is_empty());

        entry.person_b.images.push("data:image/jpeg;base64,AA==".to_string());
        assert!(!entry.is_empty());

        entry.person_b.images.clear();
        entry.person_a.text = " hi ".to_string();
        assert!(!entry.is_empty());
    }

    #[test]
    fn test_person_parsing() {
        assert_eq!("a".parse::<Person>().unwrap(), Person::A);
        assert_eq!("B".parse::<Person>().unwrap(), Person::B);
        assert!("c".parse::<Person>().is_err());
    }
}
