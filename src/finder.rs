//! Turns a Spotify session into concert listings: collect an ordered artist
//! list, then search events for each artist in that order.

use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::clients::{
    SpotifyClient, TicketmasterClient,
    entities::{ArtistEvents, ArtistSource, ListeningRange},
    errors::{Error, Result},
    spotify::MAX_PAGE_SIZE,
    ticketmaster::{EventQuery, parse_event},
};

pub const DEFAULT_ARTIST_LIMIT: u32 = 100;

/// Bounds applied to every per-artist event search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub events_per_artist: u32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            events_per_artist: 1,
            start_date: None,
            end_date: None,
        }
    }
}

impl SearchOptions {
    pub fn validate(&self) -> Result<()> {
        if self.events_per_artist == 0 {
            return Err(Error::ParseError(
                "events per artist must be at least 1".into(),
            ));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date)
            && start > end
        {
            return Err(Error::ParseError(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(())
    }

    fn query<'a>(&self, artist_name: &'a str) -> EventQuery<'a> {
        EventQuery {
            artist_name,
            size: self.events_per_artist,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Everything one concert search needs besides the clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub source: ArtistSource,
    pub artist_limit: u32,
    pub time_range: ListeningRange,
    pub options: SearchOptions,
}

impl Default for SearchRequest {
    fn default() -> Self {
        SearchRequest {
            source: ArtistSource::Top,
            artist_limit: DEFAULT_ARTIST_LIMIT,
            time_range: ListeningRange::MediumTerm,
            options: SearchOptions::default(),
        }
    }
}

/// Ordered artist names for `source`, at most `limit` of them.
pub async fn collect_artists(
    spotify: &SpotifyClient,
    source: ArtistSource,
    limit: u32,
    time_range: ListeningRange,
) -> Result<Vec<String>> {
    let artists = match source {
        ArtistSource::Top => spotify.top_artists(limit, time_range).await?,
        ArtistSource::Followed => {
            let mut ranked = spotify.followed_artists_by_affinity(MAX_PAGE_SIZE).await?;
            ranked.truncate(limit as usize);
            ranked
        }
    };
    debug!("Collected {} artists from {:?}", artists.len(), source);
    Ok(artists.into_iter().map(|a| a.name).collect())
}

/// Searches events for each artist in order, one request at a time.
///
/// A failed search is recorded on that artist's entry and does not stop the
/// remaining searches. Null or malformed events are dropped.
pub async fn collect_events(
    ticketmaster: &TicketmasterClient,
    artists: &[String],
    options: &SearchOptions,
) -> Vec<ArtistEvents> {
    let mut results = Vec::with_capacity(artists.len());
    for artist in artists {
        let entry = match ticketmaster.search_events(&options.query(artist)).await {
            Ok(raw_events) => ArtistEvents {
                artist: artist.clone(),
                events: raw_events
                    .iter()
                    .filter_map(|raw| parse_event(artist, raw))
                    .collect(),
                error: None,
            },
            Err(e) => {
                warn!("Event search failed for {artist:?}: {e}");
                ArtistEvents {
                    artist: artist.clone(),
                    events: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        };
        results.push(entry);
    }
    let found: usize = results.iter().map(|r| r.events.len()).sum();
    info!("Found {found} events for {} artists", results.len());
    results
}

// Configuration for the Finder when both clients are built from the environment
pub struct Config {
    pub spotify: SpotifyClient,
    pub ticketmaster: TicketmasterClient,
}

pub struct ConfigBuilder {
    spotify: Option<SpotifyClient>,
    ticketmaster: Option<TicketmasterClient>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            spotify: None,
            ticketmaster: None,
        }
    }

    #[must_use]
    pub fn spotify(mut self, spotify: SpotifyClient) -> Self {
        self.spotify = Some(spotify);
        self
    }

    #[must_use]
    pub fn ticketmaster(mut self, ticketmaster: TicketmasterClient) -> Self {
        self.ticketmaster = Some(ticketmaster);
        self
    }

    pub fn build(self) -> Result<Config> {
        let spotify = match self.spotify {
            Some(s) => s,
            None => SpotifyClient::try_default()?,
        };
        let ticketmaster = match self.ticketmaster {
            Some(t) => t,
            None => TicketmasterClient::try_default()?,
        };
        Ok(Config {
            spotify,
            ticketmaster,
        })
    }
}

/// Runs a whole search against an authenticated Spotify session.
pub struct Finder<'a> {
    spotify: &'a SpotifyClient,
    ticketmaster: &'a TicketmasterClient,
}

impl<'a> Finder<'a> {
    pub fn new(spotify: &'a SpotifyClient, ticketmaster: &'a TicketmasterClient) -> Self {
        Finder {
            spotify,
            ticketmaster,
        }
    }

    pub fn from_config(config: &'a Config) -> Self {
        Self::new(&config.spotify, &config.ticketmaster)
    }

    pub async fn find(&self, request: &SearchRequest) -> Result<Vec<ArtistEvents>> {
        request.options.validate()?;
        info!("Collecting artists ({}) ...", request.source.as_str());
        let artists = collect_artists(
            self.spotify,
            request.source,
            request.artist_limit,
            request.time_range,
        )
        .await?;

        if artists.is_empty() {
            info!("No artists found, nothing to search for");
            return Ok(Vec::new());
        }

        info!("Searching events for {} artists ...", artists.len());
        Ok(collect_events(self.ticketmaster, &artists, &request.options).await)
    }
}
