//! Spotify Web API client
//!
//! Standard authorization-code OAuth with a JSON token cache, plus the
//! search and playlist endpoints the resolver needs. Credentials arrive in
//! an explicit [`Config`] at construction; nothing here reads process-wide
//! state. Search misses surface as `Ok(None)`, never as errors.

use super::{MusicService, PlaylistHandle, MAX_TRACKS_PER_ADD};
use async_trait::async_trait;
use chrono::Utc;
use listlift_common::config::Config;
use listlift_common::{AlbumId, Error, Result, TrackUri};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const API_BASE_URL: &str = "https://api.spotify.com/v1";
const ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";
const OAUTH_SCOPE: &str = "playlist-modify-public";
const USER_AGENT: &str = "listlift/0.1.0";

/// Tokens this close to expiry are refreshed instead of used
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Access token persisted between runs at the configured cache path
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedToken {
    access_token: String,
    refresh_token: Option<String>,
    /// Unix timestamp (seconds)
    expires_at: i64,
}

impl CachedToken {
    fn is_fresh(&self, now: i64) -> bool {
        self.expires_at - EXPIRY_MARGIN_SECS > now
    }

    fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        let token = serde_json::from_str(&content)
            .map_err(|e| Error::Auth(format!("Token cache {} is corrupt: {}", path.display(), e)))?;
        Ok(Some(token))
    }

    fn store(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Auth(format!("Serializing token failed: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    refresh_token: Option<String>,
}

/// Outcome of [`SpotifyClient::ensure_session`]
#[derive(Debug)]
pub enum SessionState {
    /// A usable access token is loaded
    Ready,
    /// The user must approve access in a browser first
    AuthorizationNeeded { authorize_url: String },
}

/// Spotify Web API client
pub struct SpotifyClient {
    http_client: reqwest::Client,
    config: Config,
    token: Option<CachedToken>,
}

impl SpotifyClient {
    pub fn new(config: Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Service(e.to_string()))?;

        Ok(Self {
            http_client,
            config,
            token: None,
        })
    }

    /// Reuse the cached token, refreshing it if expired. When no usable
    /// token exists, hand back the URL the user must visit to approve
    /// access; the caller then feeds the redirect back through
    /// [`complete_authorization`](Self::complete_authorization).
    pub async fn ensure_session(&mut self) -> Result<SessionState> {
        let now = Utc::now().timestamp();
        if let Some(cached) = CachedToken::load(&self.config.token_cache)? {
            if cached.is_fresh(now) {
                tracing::debug!("Using cached Spotify access token");
                self.token = Some(cached);
                return Ok(SessionState::Ready);
            }
            if let Some(refresh_token) = cached.refresh_token {
                tracing::debug!("Cached Spotify token expired, refreshing");
                let mut token = self
                    .request_token(&[
                        ("grant_type", "refresh_token"),
                        ("refresh_token", &refresh_token),
                    ])
                    .await?;
                // Spotify omits the refresh token from refresh responses
                if token.refresh_token.is_none() {
                    token.refresh_token = Some(refresh_token);
                }
                token.store(&self.config.token_cache)?;
                self.token = Some(token);
                return Ok(SessionState::Ready);
            }
        }

        Ok(SessionState::AuthorizationNeeded {
            authorize_url: self.authorize_url()?,
        })
    }

    /// URL of the consent page for this app's credentials and scope
    pub fn authorize_url(&self) -> Result<String> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/authorize", ACCOUNTS_BASE_URL),
            &[
                ("client_id", self.config.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", OAUTH_SCOPE),
                ("show_dialog", "true"),
            ],
        )
        .map_err(|e| Error::Auth(format!("Building authorize URL failed: {}", e)))?;
        Ok(url.to_string())
    }

    /// Exchange the code from the pasted redirect URL for a token
    pub async fn complete_authorization(&mut self, redirect_input: &str) -> Result<()> {
        let code = extract_authorization_code(redirect_input)?;
        let token = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", &code),
                ("redirect_uri", &self.config.redirect_uri),
            ])
            .await?;
        token.store(&self.config.token_cache)?;
        self.token = Some(token);
        tracing::info!("Spotify authorization complete");
        Ok(())
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<CachedToken> {
        let response = self
            .http_client
            .post(format!("{}/api/token", ACCOUNTS_BASE_URL))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(form)
            .send()
            .await
            .map_err(|e| Error::Auth(format!("Token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "Token request returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Auth(format!("Token response parse failed: {}", e)))?;

        Ok(CachedToken {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: Utc::now().timestamp() + token.expires_in,
        })
    }

    fn bearer(&self) -> Result<&str> {
        self.token
            .as_ref()
            .map(|t| t.access_token.as_str())
            .ok_or_else(|| Error::Auth("no access token; call ensure_session first".to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .http_client
            .get(format!("{}{}", API_BASE_URL, path))
            .bearer_auth(self.bearer()?)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Service(format!("GET {} failed: {}", path, e)))?;

        let response = triage(response, path).await?;
        response
            .json()
            .await
            .map_err(|e| Error::Service(format!("GET {} parse failed: {}", path, e)))
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let response = self
            .http_client
            .post(format!("{}{}", API_BASE_URL, path))
            .bearer_auth(self.bearer()?)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Service(format!("POST {} failed: {}", path, e)))?;

        let response = triage(response, path).await?;
        response
            .json()
            .await
            .map_err(|e| Error::Service(format!("POST {} parse failed: {}", path, e)))
    }
}

/// Sort a response into success, auth failure or service failure
async fn triage(response: reqwest::Response, path: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Auth(format!("{} returned {}: {}", path, status, body)));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Service(format!(
            "{} returned {}: {}",
            path, status, body
        )));
    }
    Ok(response)
}

/// Accept either the full redirect URL or a bare authorization code
fn extract_authorization_code(redirect_input: &str) -> Result<String> {
    let trimmed = redirect_input.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(
            "empty authorization response".to_string(),
        ));
    }
    if let Ok(url) = reqwest::Url::parse(trimmed) {
        return url
            .query_pairs()
            .find(|(key, _)| key == "code")
            .map(|(_, code)| code.into_owned())
            .ok_or_else(|| {
                Error::InvalidInput("redirect URL carries no ?code= parameter".to_string())
            });
    }
    Ok(trimmed.to_string())
}

// Response shapes for the endpoints in use. Spotify nests search results
// under a per-type page object; absent types deserialize as None.

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: Option<Page<TrackItem>>,
    albums: Option<Page<AlbumItem>>,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    uri: String,
}

#[derive(Debug, Deserialize)]
struct AlbumItem {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AlbumTracksResponse {
    items: Vec<TrackItem>,
}

#[derive(Debug, Deserialize)]
struct CurrentUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CreatedPlaylist {
    id: String,
    external_urls: ExternalUrls,
}

#[derive(Debug, Deserialize)]
struct ExternalUrls {
    spotify: Option<String>,
}

fn first_track(page: Option<Page<TrackItem>>) -> Option<TrackUri> {
    page.and_then(|p| p.items.into_iter().next())
        .map(|item| TrackUri(item.uri))
}

#[async_trait]
impl MusicService for SpotifyClient {
    async fn search_track(&self, query: &str) -> Result<Option<TrackUri>> {
        tracing::debug!(query = %query, "Searching tracks");
        let response: SearchResponse = self
            .get_json("/search", &[("q", query), ("type", "track"), ("limit", "1")])
            .await?;
        Ok(first_track(response.tracks))
    }

    async fn search_artist_track(&self, artist: &str) -> Result<Option<TrackUri>> {
        self.search_track(&format!("artist:{}", artist)).await
    }

    async fn search_album(&self, query: &str) -> Result<Option<AlbumId>> {
        tracing::debug!(query = %query, "Searching albums");
        let response: SearchResponse = self
            .get_json("/search", &[("q", query), ("type", "album"), ("limit", "1")])
            .await?;
        Ok(response
            .albums
            .and_then(|p| p.items.into_iter().next())
            .map(|item| AlbumId(item.id)))
    }

    async fn album_tracks(&self, album_id: &AlbumId) -> Result<Vec<TrackUri>> {
        let response: AlbumTracksResponse = self
            .get_json(
                &format!("/albums/{}/tracks", album_id.as_str()),
                &[("limit", "50")],
            )
            .await?;
        Ok(response
            .items
            .into_iter()
            .map(|item| TrackUri(item.uri))
            .collect())
    }

    async fn current_user_id(&self) -> Result<String> {
        let user: CurrentUser = self.get_json("/me", &[]).await?;
        Ok(user.id)
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<PlaylistHandle> {
        let body = serde_json::json!({
            "name": name,
            "public": true,
            "description": description,
        });
        let created: CreatedPlaylist = self
            .post_json(&format!("/users/{}/playlists", user_id), &body)
            .await?;
        let url = created
            .external_urls
            .spotify
            .unwrap_or_else(|| format!("https://open.spotify.com/playlist/{}", created.id));
        Ok(PlaylistHandle {
            id: created.id,
            url,
        })
    }

    async fn add_tracks(&self, playlist_id: &str, uris: &[TrackUri]) -> Result<()> {
        if uris.len() > MAX_TRACKS_PER_ADD {
            return Err(Error::Service(format!(
                "attempted to add {} tracks in one call (max {})",
                uris.len(),
                MAX_TRACKS_PER_ADD
            )));
        }
        let body = serde_json::json!({
            "uris": uris.iter().map(TrackUri::as_str).collect::<Vec<_>>(),
        });
        let _: serde_json::Value = self
            .post_json(&format!("/playlists/{}/tracks", playlist_id), &body)
            .await?;
        Ok(())
    }
}
