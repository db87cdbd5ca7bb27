//! # Listlift Common Library
//!
//! Shared code for the listlift workspace:
//! - Error taxonomy (`Error` enum, `Result` alias)
//! - Configuration loading (Spotify credentials, token cache path)
//! - Core data model (list categories, scraped entries)

pub mod config;
pub mod error;
pub mod model;

pub use error::{Error, Result};
pub use model::{AlbumId, Entry, ListCategory, ScrapedList, TrackUri};
