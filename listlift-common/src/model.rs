//! Core data model: list categories, scraped entries, catalog identifiers

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of "best of" list being scraped.
///
/// Selected by the numeric CLI prompt (1-4). The category drives both the
/// extraction field layout and the per-entry search strategy, so it is a
/// closed enum and every consumer matches it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListCategory {
    /// "Best songs" list: entries are [title, artist]
    Song,
    /// "Best artists" list: entries are [artist]
    Artist,
    /// "Best albums" list: entries are [album, artist]
    Album,
    /// "Best drummer/bassist/guitarist/..." list. Recognized but has no
    /// resolution strategy; resolving one is an explicit Unsupported error.
    Musician,
}

impl ListCategory {
    /// Parse the 1-4 menu selector
    pub fn from_selector(selector: u8) -> Result<Self> {
        match selector {
            1 => Ok(ListCategory::Song),
            2 => Ok(ListCategory::Artist),
            3 => Ok(ListCategory::Album),
            4 => Ok(ListCategory::Musician),
            other => Err(Error::InvalidInput(format!(
                "list category must be 1, 2, 3 or 4 (got {})",
                other
            ))),
        }
    }
}

impl fmt::Display for ListCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ListCategory::Song => "song",
            ListCategory::Artist => "artist",
            ListCategory::Album => "album",
            ListCategory::Musician => "musician",
        };
        write!(f, "{}", name)
    }
}

/// One row of a scraped list, split into fields on `-`.
///
/// Fields are stored untrimmed; per-category normalization happens in the
/// resolver. A segment with embedded `-` characters produces more than two
/// fields, and consumers only ever read the first two positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    fields: Vec<String>,
}

impl Entry {
    /// Split one raw list segment on the `-` delimiter
    pub fn from_segment(segment: &str) -> Self {
        Self {
            fields: segment.split('-').map(str::to_string).collect(),
        }
    }

    pub fn from_fields(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// Output of the extractor: immutable once created, consumed once by the
/// resolver. Entry order equals document order of the rank markers.
#[derive(Debug, Clone)]
pub struct ScrapedList {
    pub title: String,
    pub category: ListCategory,
    pub entries: Vec<Entry>,
}

/// Opaque track identifier returned by the catalog (a Spotify track URI)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackUri(pub String);

impl TrackUri {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque album identifier returned by the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumId(pub String);

impl AlbumId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_maps_per_menu_order() {
        assert_eq!(ListCategory::from_selector(1).unwrap(), ListCategory::Song);
        assert_eq!(ListCategory::from_selector(2).unwrap(), ListCategory::Artist);
        assert_eq!(ListCategory::from_selector(3).unwrap(), ListCategory::Album);
        assert_eq!(
            ListCategory::from_selector(4).unwrap(),
            ListCategory::Musician
        );
        assert!(ListCategory::from_selector(0).is_err());
        assert!(ListCategory::from_selector(5).is_err());
    }

    #[test]
    fn entry_splits_on_every_dash() {
        let entry = Entry::from_segment(" Layla - Derek and the Dominos - 1970");
        assert_eq!(entry.field_count(), 3);
        assert_eq!(entry.field(0), Some(" Layla "));
        assert_eq!(entry.field(1), Some(" Derek and the Dominos "));
        assert_eq!(entry.field(2), Some(" 1970"));
        assert_eq!(entry.field(3), None);
    }
}
