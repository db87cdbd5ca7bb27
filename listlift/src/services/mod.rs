//! External service clients

pub mod spotify_client;

use async_trait::async_trait;
use listlift_common::{AlbumId, Result, TrackUri};

/// Spotify caps playlist item appends at 100 per call
pub const MAX_TRACKS_PER_ADD: usize = 100;

/// Playlist created on the external service
#[derive(Debug, Clone)]
pub struct PlaylistHandle {
    pub id: String,
    /// Shareable web URL reported to the user
    pub url: String,
}

/// Catalog search and playlist management surface consumed by the resolver.
///
/// Search methods return `Ok(None)` when the catalog has no candidates, so
/// the skip-on-miss policy is one explicit branch at the call site. Errors
/// are reserved for fatal service failures (auth, transport, non-2xx).
#[async_trait]
pub trait MusicService {
    /// Free-text track search; first candidate's URI if any
    async fn search_track(&self, query: &str) -> Result<Option<TrackUri>>;

    /// Artist-scoped search (`artist:{name}`); first candidate track's URI
    async fn search_artist_track(&self, artist: &str) -> Result<Option<TrackUri>>;

    /// Album search; first candidate's identifier if any
    async fn search_album(&self, query: &str) -> Result<Option<AlbumId>>;

    /// Track listing of an album, in the catalog's order
    async fn album_tracks(&self, album_id: &AlbumId) -> Result<Vec<TrackUri>>;

    /// Identity of the authenticated user
    async fn current_user_id(&self) -> Result<String>;

    /// Create a public playlist under `user_id`
    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<PlaylistHandle>;

    /// Append up to [`MAX_TRACKS_PER_ADD`] tracks in one call
    async fn add_tracks(&self, playlist_id: &str, uris: &[TrackUri]) -> Result<()>;
}
