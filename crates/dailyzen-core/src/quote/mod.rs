//! Quote records and the ordered catalog they are selected from.
//!
//! A quote's ID is the decimal string of its zero-based position in the
//! catalog. IDs are what the favorites store persists, so the catalog order
//! is part of the storage format: [`Catalog::digest`] fingerprints it so a
//! reordered catalog can be detected at hydration time.

pub mod select;

use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
pub use select::SelectError;

const BUILTIN_CATALOG: &str = include_str!("catalog.toml");

/// Immutable quote record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

impl Quote {
    pub fn new(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: author.into(),
        }
    }
}

/// A quote paired with its positional ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteWithId {
    pub id: String,
    pub text: String,
    pub author: String,
}

impl QuoteWithId {
    /// Case-insensitive substring match on text or author.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.text.to_lowercase().contains(&needle) || self.author.to_lowercase().contains(&needle)
    }
}

/// Quote ID lookup failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("{}: invalid quote ID '{}'", ErrorCode::InvalidQuoteId.code(), .0)]
    InvalidId(String),
    #[error("{}: no quote with ID '{}'", ErrorCode::QuoteNotFound.code(), .0)]
    NotFound(String),
}

impl LookupError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidId(_) => ErrorCode::InvalidQuoteId,
            Self::NotFound(_) => ErrorCode::QuoteNotFound,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    quotes: Vec<Quote>,
}

/// The fixed, ordered list quotes are selected from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    quotes: Vec<Quote>,
}

impl Catalog {
    pub const fn from_quotes(quotes: Vec<Quote>) -> Self {
        Self { quotes }
    }

    /// The catalog embedded in the library.
    #[must_use]
    pub fn builtin() -> Self {
        match Self::from_toml_str(BUILTIN_CATALOG) {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::error!(error = %err, "embedded quote catalog failed to parse");
                Self::from_quotes(Vec::new())
            }
        }
    }

    /// Parse a catalog from TOML (`[[quotes]]` tables with `text`/`author`).
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML does not match the catalog shape.
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        let file: CatalogFile = toml::from_str(raw)?;
        Ok(Self::from_quotes(file.quotes))
    }

    /// Load a catalog file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Catalog from an optional override path, else the built-in one.
    ///
    /// # Errors
    ///
    /// Returns an error if an override path is given and cannot be loaded.
    pub fn resolve(path: Option<&Path>) -> anyhow::Result<Self> {
        path.map_or_else(|| Ok(Self::builtin()), Self::load)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    #[must_use]
    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    /// Every quote paired with its ID, in catalog order.
    pub fn iter_with_ids(&self) -> impl Iterator<Item = QuoteWithId> + '_ {
        self.quotes
            .iter()
            .enumerate()
            .map(|(pos, quote)| with_id(pos, quote))
    }

    /// Resolve an ID to its quote; malformed or out-of-range IDs give `None`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<QuoteWithId> {
        let pos = parse_position(id)?;
        self.quotes.get(pos).map(|quote| with_id(pos, quote))
    }

    /// Like [`Catalog::get`] but explains why an ID does not resolve.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] for malformed or unknown IDs.
    pub fn lookup(&self, id: &str) -> Result<QuoteWithId, LookupError> {
        let pos = parse_position(id).ok_or_else(|| LookupError::InvalidId(id.to_string()))?;
        self.quotes
            .get(pos)
            .map(|quote| with_id(pos, quote))
            .ok_or_else(|| LookupError::NotFound(id.to_string()))
    }

    /// Quote selected for a day index.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::EmptyList`] on an empty catalog.
    pub fn for_day(&self, day_index: u64) -> Result<QuoteWithId, SelectError> {
        let pos = select::position_for_day(self.quotes.len(), day_index)?;
        Ok(with_id(pos, &self.quotes[pos]))
    }

    /// Quote of the day for a local calendar date.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::EmptyList`] on an empty catalog.
    pub fn for_date(&self, date: NaiveDate) -> Result<QuoteWithId, SelectError> {
        self.for_day(u64::from(select::day_index(date)))
    }

    /// Hex blake3 digest over the ordered `(text, author)` pairs.
    #[must_use]
    pub fn digest(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for quote in &self.quotes {
            hasher.update(normalize(&quote.text).as_bytes());
            hasher.update(b"\x1f");
            hasher.update(normalize(&quote.author).as_bytes());
            hasher.update(b"\n");
        }
        hasher.finalize().to_hex().to_string()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn with_id(pos: usize, quote: &Quote) -> QuoteWithId {
    QuoteWithId {
        id: pos.to_string(),
        text: quote.text.clone(),
        author: quote.author.clone(),
    }
}

fn parse_position(id: &str) -> Option<usize> {
    // Only canonical decimal forms; "+1" and "01" are not IDs we ever write.
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if id.len() > 1 && id.starts_with('0') {
        return None;
    }
    id.parse().ok()
}

fn normalize(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_parses_and_is_not_empty() {
        let catalog = Catalog::from_toml_str(BUILTIN_CATALOG).expect("embedded catalog parses");
        assert!(catalog.len() >= 30);
        assert!(
            catalog
                .quotes()
                .iter()
                .all(|q| !q.text.is_empty() && !q.author.is_empty())
        );
    }

    #[test]
    fn ids_are_positions() {
        let catalog = Catalog::builtin();
        let first = catalog.get("0").expect("first quote");
        assert_eq!(first.id, "0");
        assert_eq!(first.text, catalog.quotes()[0].text);

        let ids: Vec<String> = catalog.iter_with_ids().map(|q| q.id).take(3).collect();
        assert_eq!(ids, ["0", "1", "2"]);
    }

    #[test]
    fn malformed_and_stale_ids_do_not_resolve() {
        let catalog = Catalog::from_quotes(vec![Quote::new("A", "X"), Quote::new("B", "Y")]);
        assert!(catalog.get("2").is_none());
        assert!(catalog.get("-1").is_none());
        assert!(catalog.get("01").is_none());
        assert!(catalog.get("one").is_none());
        assert!(catalog.get("").is_none());

        assert_eq!(
            catalog.lookup("x").map_err(|e| e.code()),
            Err(ErrorCode::InvalidQuoteId)
        );
        assert_eq!(
            catalog.lookup("9").map_err(|e| e.code()),
            Err(ErrorCode::QuoteNotFound)
        );
    }

    #[test]
    fn for_day_wraps_and_carries_id() {
        let catalog = Catalog::from_quotes(vec![Quote::new("A", "X"), Quote::new("B", "Y")]);
        let q = catalog.for_day(3).expect("non-empty");
        assert_eq!(q.id, "1");
        assert_eq!(q.text, "B");
        assert_eq!(
            Catalog::from_quotes(Vec::new()).for_day(3),
            Err(SelectError::EmptyList)
        );
    }

    #[test]
    fn for_date_uses_ordinal_day() {
        let catalog = Catalog::from_quotes(vec![
            Quote::new("A", "X"),
            Quote::new("B", "Y"),
            Quote::new("C", "Z"),
        ]);
        // Jan 1 is day 1 -> position 1.
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date");
        assert_eq!(catalog.for_date(date).expect("non-empty").text, "B");
    }

    #[test]
    fn digest_tracks_order_but_not_spacing() {
        let a = Catalog::from_quotes(vec![Quote::new("A  b", "X"), Quote::new("C", "Y")]);
        let spaced = Catalog::from_quotes(vec![Quote::new("A b", " X "), Quote::new("C", "Y")]);
        let swapped = Catalog::from_quotes(vec![Quote::new("C", "Y"), Quote::new("A b", "X")]);
        assert_eq!(a.digest(), spaced.digest());
        assert_ne!(a.digest(), swapped.digest());
    }

    #[test]
    fn matches_is_case_insensitive_on_text_and_author() {
        let q = QuoteWithId {
            id: "0".into(),
            text: "Smile, breathe and go slowly.".into(),
            author: "Thich Nhat Hanh".into(),
        };
        assert!(q.matches("BREATHE"));
        assert!(q.matches("nhat"));
        assert!(!q.matches("seneca"));
    }

    #[test]
    fn load_reads_override_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("quotes.toml");
        std::fs::write(&path, "[[quotes]]\ntext = \"Only\"\nauthor = \"Me\"\n").expect("write");
        let catalog = Catalog::resolve(Some(&path)).expect("load");
        assert_eq!(catalog.len(), 1);
        assert!(Catalog::load(&dir.path().join("missing.toml")).is_err());
    }
}
