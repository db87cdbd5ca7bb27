//! Resolver/Builder: turns a scraped list into a populated playlist
//!
//! Each category has its own query strategy; a single search miss is
//! printed and skipped, while any service failure aborts the run. Entry
//! order is preserved end to end.

use crate::services::{MusicService, PlaylistHandle, MAX_TRACKS_PER_ADD};
use listlift_common::{Error, ListCategory, Result, ScrapedList, TrackUri};
use once_cell::sync::Lazy;
use regex::Regex;

/// Source-site suffix for playlist names
const SOURCE_SITE: &str = "DigitalDreamDoor.com";

/// `(YYYY)` or `- YYYY` year annotations beside an artist or album name
static YEAR_ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([(][0-9]{4}[)])|(- [0-9]{4})").unwrap());

/// Stray `Â` characters left behind by the page's encoding
static ENCODING_ARTIFACTS: Lazy<Regex> = Lazy::new(|| Regex::new("[Â]").unwrap());

/// Outcome of resolving one scraped list.
///
/// `searches` counts issued catalog lookups, which exceeds `entries` when
/// an entry credits several artists; the summary reports matches against
/// searches so the ratio is well defined.
#[derive(Debug, Default)]
pub struct ResolutionReport {
    pub entries: usize,
    pub searches: usize,
    pub matched: usize,
    pub skipped: usize,
    /// Resolved track URIs, in entry order
    pub uris: Vec<TrackUri>,
}

/// Resolves scraped entries against a [`MusicService`] and publishes the
/// playlist
pub struct PlaylistBuilder<'a, S: MusicService> {
    service: &'a S,
}

impl<'a, S: MusicService> PlaylistBuilder<'a, S> {
    pub fn new(service: &'a S) -> Self {
        Self { service }
    }

    /// Resolve every entry to zero or more track URIs, in entry order.
    /// Misses are printed and counted; the Musician category is an explicit
    /// unsupported outcome, distinct from "no matches found".
    pub async fn resolve(&self, list: &ScrapedList) -> Result<ResolutionReport> {
        println!("Finding songs in Spotify...");
        let report = match list.category {
            ListCategory::Song => self.resolve_songs(list).await?,
            ListCategory::Artist => self.resolve_artists(list).await?,
            ListCategory::Album => self.resolve_albums(list).await?,
            ListCategory::Musician => {
                return Err(Error::Unsupported(
                    "musician lists (best drummer, bassist, ...) have no resolution strategy yet"
                        .to_string(),
                ))
            }
        };
        self.print_summary(list.category, &report);
        Ok(report)
    }

    async fn resolve_songs(&self, list: &ScrapedList) -> Result<ResolutionReport> {
        let mut report = ResolutionReport {
            entries: list.entries.len(),
            ..Default::default()
        };
        for entry in &list.entries {
            let title = entry.field(0).unwrap_or_default();
            let raw_artist = entry.field(1).unwrap_or_default();
            for artist in song_artists(raw_artist) {
                report.searches += 1;
                let query = format!("{} {}", title, artist);
                match self.service.search_track(&query).await? {
                    Some(uri) => {
                        report.matched += 1;
                        report.uris.push(uri);
                    }
                    None => {
                        report.skipped += 1;
                        println!("Couldn't find '{}' by {} in Spotify. Skipped.", title, artist);
                    }
                }
            }
        }
        Ok(report)
    }

    async fn resolve_artists(&self, list: &ScrapedList) -> Result<ResolutionReport> {
        let mut report = ResolutionReport {
            entries: list.entries.len(),
            ..Default::default()
        };
        for entry in &list.entries {
            let raw = entry.field(0).unwrap_or_default();
            for artist in credited_artists(raw) {
                report.searches += 1;
                match self.service.search_artist_track(&artist).await? {
                    Some(uri) => {
                        report.matched += 1;
                        report.uris.push(uri);
                    }
                    None => {
                        report.skipped += 1;
                        println!("Couldn't find any songs by {}. Skipped.", artist);
                    }
                }
            }
        }
        Ok(report)
    }

    async fn resolve_albums(&self, list: &ScrapedList) -> Result<ResolutionReport> {
        let mut report = ResolutionReport {
            entries: list.entries.len(),
            ..Default::default()
        };
        for entry in &list.entries {
            let album = strip_year(entry.field(0).unwrap_or_default());
            let artist = strip_year(entry.field(1).unwrap_or_default());
            report.searches += 1;
            let query = format!("{} {}", album, artist);
            match self.service.search_album(&query).await? {
                Some(album_id) => {
                    report.matched += 1;
                    let tracks = self.service.album_tracks(&album_id).await?;
                    report.uris.extend(tracks);
                }
                None => {
                    report.skipped += 1;
                    println!("Couldn't find the album '{}' by {}. Skipped.", album, artist);
                }
            }
        }
        Ok(report)
    }

    fn print_summary(&self, category: ListCategory, report: &ResolutionReport) {
        match category {
            ListCategory::Song | ListCategory::Artist => {
                println!(
                    "\n{} of {} searches matched across {} entries.",
                    report.matched, report.searches, report.entries
                );
            }
            ListCategory::Album => {
                println!(
                    "\n{} songs found from {} of {} albums.",
                    report.uris.len(),
                    report.matched,
                    report.entries
                );
            }
            ListCategory::Musician => {}
        }
    }

    /// Create the playlist and append the resolved URIs in order, in chunks
    /// bounded by the service's per-call cap
    pub async fn publish(&self, title: &str, uris: &[TrackUri]) -> Result<PlaylistHandle> {
        let user_id = self.service.current_user_id().await?;
        let name = format!("{} - {}", title, SOURCE_SITE);
        let description = format!(
            "A playlist built from the music list '{}' on {}",
            title, SOURCE_SITE
        );

        println!("Creating playlist {} for user {}...", title, user_id);
        let playlist = self
            .service
            .create_playlist(&user_id, &name, &description)
            .await?;

        println!("Adding songs to playlist...\n");
        for chunk in uris.chunks(MAX_TRACKS_PER_ADD) {
            self.service.add_tracks(&playlist.id, chunk).await?;
        }

        Ok(playlist)
    }
}

/// Album/artist field with year annotations removed and whitespace trimmed
fn strip_year(field: &str) -> String {
    YEAR_ANNOTATION.replace_all(field, "").trim().to_string()
}

/// Artist names to search for one song entry: year annotations and encoding
/// artifacts stripped, alternate credits after `/` dropped, `|`-separated
/// cover credits each searched separately
fn song_artists(raw_artist: &str) -> Vec<String> {
    let no_year = YEAR_ANNOTATION.replace_all(raw_artist, "");
    let cleaned = ENCODING_ARTIFACTS.replace_all(&no_year, "");
    let first_credit = cleaned.trim().split('/').next().unwrap_or("");
    first_credit
        .split('|')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Artist names for one artist entry: trailing parenthetical (location or
/// band annotation) dropped, `/`-separated credits each searched separately
fn credited_artists(raw: &str) -> Vec<String> {
    let no_annotation = raw.split('(').next().unwrap_or("");
    no_annotation
        .split('/')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_in_parens_stripped() {
        assert_eq!(song_artists(" Artist A (1999)"), vec!["Artist A"]);
    }

    #[test]
    fn year_after_dash_stripped() {
        assert_eq!(song_artists("Artist A - 1999"), vec!["Artist A"]);
    }

    #[test]
    fn encoding_artifacts_removed() {
        assert_eq!(song_artists("Artist AÂ"), vec!["Artist A"]);
    }

    #[test]
    fn alternate_credits_after_slash_dropped() {
        assert_eq!(
            song_artists("Lionel Richie / The Commodores"),
            vec!["Lionel Richie"]
        );
    }

    #[test]
    fn cover_credits_split_on_pipe() {
        assert_eq!(
            song_artists("The Box Tops | Joe Cocker"),
            vec!["The Box Tops", "Joe Cocker"]
        );
    }

    #[test]
    fn empty_artist_field_yields_no_searches() {
        assert!(song_artists("").is_empty());
        assert!(song_artists("  (1975) ").is_empty());
    }

    #[test]
    fn artist_entry_parenthetical_dropped() {
        assert_eq!(
            credited_artists("John Bonham (Led Zeppelin)"),
            vec!["John Bonham"]
        );
    }

    #[test]
    fn artist_entry_split_on_slash() {
        assert_eq!(
            credited_artists("Lionel Richie / The Commodores"),
            vec!["Lionel Richie", "The Commodores"]
        );
    }

    #[test]
    fn album_field_year_stripped_and_trimmed() {
        assert_eq!(strip_year(" Who's Next (1971) "), "Who's Next");
        assert_eq!(strip_year(" Who's Next - 1971"), "Who's Next");
    }
}
