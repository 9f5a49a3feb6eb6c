use std::path::PathBuf;

use futures::stream::{Stream, StreamExt, TryStreamExt};
use log::debug;

use crate::affinity;
use crate::clients::{
    entities::{Artist, LikedTrack, ListeningRange, Track},
    errors::{Error, Result},
    pagination::{CursorPage, cursor_paginated, offset_paginated},
};
use crate::config::SpotifySettings;
use rspotify::{
    AuthCodeSpotify, Config, Credentials, OAuth,
    model::{FullArtist, FullTrack, SavedTrack, SimplifiedArtist, TimeRange},
    prelude::*,
};

/// Largest page the Spotify Web API serves for the endpoints used here.
pub const MAX_PAGE_SIZE: u32 = 50;

impl From<FullArtist> for Artist {
    fn from(a: FullArtist) -> Artist {
        Artist {
            id: Some(a.id.id().to_string()),
            name: a.name,
            popularity: Some(a.popularity),
            genres: a.genres,
        }
    }
}

impl From<SimplifiedArtist> for Artist {
    fn from(a: SimplifiedArtist) -> Artist {
        Artist {
            id: a.id.map(|id| id.id().to_string()),
            name: a.name,
            popularity: None,
            genres: Vec::new(),
        }
    }
}

impl From<FullTrack> for Track {
    fn from(t: FullTrack) -> Track {
        Track {
            id: t.id.map(|id| id.id().to_string()),
            name: t.name,
            artists: t.artists.into_iter().map(Artist::from).collect(),
        }
    }
}

impl From<SavedTrack> for LikedTrack {
    fn from(s: SavedTrack) -> LikedTrack {
        LikedTrack {
            added_at: Some(s.added_at),
            track: Track::from(s.track),
        }
    }
}

impl From<ListeningRange> for TimeRange {
    fn from(range: ListeningRange) -> TimeRange {
        match range {
            ListeningRange::ShortTerm => TimeRange::ShortTerm,
            ListeningRange::MediumTerm => TimeRange::MediumTerm,
            ListeningRange::LongTerm => TimeRange::LongTerm,
        }
    }
}

/// One user's Spotify session.
pub struct SpotifyClient {
    pub spotify: AuthCodeSpotify,
}

impl SpotifyClient {
    pub fn new(spotify: AuthCodeSpotify) -> Self {
        SpotifyClient { spotify }
    }

    /// Client for a browser session. Tokens stay in memory only.
    pub fn for_web_session(settings: &SpotifySettings) -> Self {
        Self::with_config(settings, Config::default())
    }

    /// Client for terminal use, caching the token in the user's cache directory.
    pub fn for_terminal(settings: &SpotifySettings) -> Self {
        let cache_path = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp")) // Fallback to /tmp if cache directory can't be determined
            .join(".gigscout_spotify_token");
        Self::with_config(
            settings,
            Config {
                token_cached: true,
                cache_path,
                ..Default::default()
            },
        )
    }

    // Create a terminal SpotifyClient from environment variables or raise a configuration error
    pub fn try_default() -> Result<Self> {
        let settings = SpotifySettings::from_env()?;
        Ok(Self::for_terminal(&settings))
    }

    fn with_config(settings: &SpotifySettings, config: Config) -> Self {
        let creds = Credentials::new(&settings.client_id, &settings.client_secret);
        let oauth = OAuth {
            redirect_uri: settings.redirect_uri.clone(),
            scopes: settings.scopes.clone(),
            ..Default::default()
        };
        Self::new(AuthCodeSpotify::with_config(creds, oauth, config))
    }

    /// Random `state` value sent along with the authorize URL.
    pub fn oauth_state(&self) -> &str {
        &self.spotify.get_oauth().state
    }

    pub fn authorize_url(&self) -> Result<String> {
        Ok(self.spotify.get_authorize_url(false)?)
    }

    // Exchange the code Spotify handed to the redirect URI for an access token
    pub async fn authenticate_with_code(&self, code: &str) -> Result<()> {
        debug!("Requesting Spotify access token ...");
        self.spotify
            .request_token(code)
            .await
            .map_err(|e| Error::AuthorizationError(e.to_string()))?;
        Ok(())
    }

    // Authorize the Spotify client via CLI prompt and OAuth flow
    // This function requires the `cli` feature enabled.
    pub async fn authorize_client(&self) -> Result<()> {
        debug!("Starting Spotify authorization ...");
        let url = self.spotify.get_authorize_url(false)?;
        self.spotify
            .prompt_for_token(&url)
            .await
            .map_err(|e| Error::AuthorizationError(e.to_string()))?;
        let user = self.spotify.me().await?;
        debug!("Authenticated as user: {:?}", user.display_name);
        Ok(())
    }

    /// Followed artists, walked with the `after` cursor.
    pub fn followed_artists(&self, page_size: u32) -> impl Stream<Item = Result<Artist>> + '_ {
        let limit = page_size.clamp(1, MAX_PAGE_SIZE);
        cursor_paginated(move |cursor: Option<String>| async move {
            let page = self
                .spotify
                .current_user_followed_artists(cursor.as_deref(), Some(limit))
                .await?;
            debug!("Fetched {} followed artists", page.items.len());
            Ok::<_, Error>(CursorPage {
                items: page.items.into_iter().map(Artist::from).collect(),
                next_cursor: page.cursors.and_then(|c| c.after),
            })
        })
    }

    /// Saved ("liked") tracks, walked by offset.
    pub fn liked_tracks(&self, page_size: u32) -> impl Stream<Item = Result<LikedTrack>> + '_ {
        let limit = page_size.clamp(1, MAX_PAGE_SIZE);
        offset_paginated(limit, move |offset, limit| async move {
            let page = self
                .spotify
                .current_user_saved_tracks_manual(None, Some(limit), Some(offset))
                .await?;
            debug!("Fetched {} liked tracks at offset {offset}", page.items.len());
            Ok::<_, Error>(page.items.into_iter().map(LikedTrack::from).collect::<Vec<_>>())
        })
    }

    pub async fn top_artists(&self, limit: u32, range: ListeningRange) -> Result<Vec<Artist>> {
        let page_size = limit.clamp(1, MAX_PAGE_SIZE);
        offset_paginated(page_size, move |offset, page_size| async move {
            let page = self
                .spotify
                .current_user_top_artists_manual(Some(TimeRange::from(range)), Some(page_size), Some(offset))
                .await?;
            Ok::<_, Error>(page.items.into_iter().map(Artist::from).collect::<Vec<_>>())
        })
        .take(limit as usize)
        .try_collect()
        .await
    }

    pub async fn top_tracks(&self, limit: u32, range: ListeningRange) -> Result<Vec<Track>> {
        let page_size = limit.clamp(1, MAX_PAGE_SIZE);
        offset_paginated(page_size, move |offset, page_size| async move {
            let page = self
                .spotify
                .current_user_top_tracks_manual(Some(TimeRange::from(range)), Some(page_size), Some(offset))
                .await?;
            Ok::<_, Error>(page.items.into_iter().map(Track::from).collect::<Vec<_>>())
        })
        .take(limit as usize)
        .try_collect()
        .await
    }

    /// Followed artists ordered by how many liked tracks they appear on.
    pub async fn followed_artists_by_affinity(&self, page_size: u32) -> Result<Vec<Artist>> {
        let followed: Vec<Artist> = self.followed_artists(page_size).try_collect().await?;
        debug!("Fetched {} followed artists in total", followed.len());
        let liked: Vec<LikedTrack> = self.liked_tracks(MAX_PAGE_SIZE).try_collect().await?;
        debug!("Fetched {} liked tracks in total", liked.len());
        Ok(affinity::rank(followed, &liked))
    }
}
