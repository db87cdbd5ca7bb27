//! listlift - "best of" list to Spotify playlist converter
//!
//! Scrapes a ranked music list (songs, artists or albums) from a
//! DigitalDreamDoor-style page, resolves each entry against the Spotify
//! search API, and creates a public playlist with the resolved tracks.
//!
//! The run is strictly sequential: extract, then resolve entry by entry,
//! then create and populate the playlist.

pub mod builder;
pub mod scrape;
pub mod services;
