use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artist {
    pub id: Option<String>,
    pub name: String,
    pub popularity: Option<u32>,
    pub genres: Vec<String>,
}

impl Artist {
    /// Artist known only by its display name, as on track records.
    pub fn named(name: impl Into<String>) -> Self {
        Artist {
            id: None,
            name: name.into(),
            popularity: None,
            genres: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    pub artists: Vec<Artist>,
}

impl Track {
    /// Artist names joined the way they are shown next to a track title.
    pub fn artist_line(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LikedTrack {
    pub added_at: Option<DateTime<Utc>>,
    pub track: Track,
}

impl LikedTrack {
    pub fn artists(&self) -> &[Artist] {
        &self.track.artists
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub artist_name: String, // the artist the search was made for
    pub date_and_time: Option<String>,
    pub venue_name: Option<String>,
    pub venue_address: Option<String>,
    pub url: Option<String>,
    pub image: Option<String>,
}

/// Events found for one artist. `error` is set when the search itself failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistEvents {
    pub artist: String,
    pub events: Vec<Event>,
    pub error: Option<String>,
}

/// Listening period used by the Spotify top artists/tracks endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListeningRange {
    ShortTerm,
    #[default]
    MediumTerm,
    LongTerm,
}

impl ListeningRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListeningRange::ShortTerm => "short_term",
            ListeningRange::MediumTerm => "medium_term",
            ListeningRange::LongTerm => "long_term",
        }
    }
}

impl fmt::Display for ListeningRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListeningRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "short_term" | "short" => Ok(ListeningRange::ShortTerm),
            "medium_term" | "medium" => Ok(ListeningRange::MediumTerm),
            "long_term" | "long" => Ok(ListeningRange::LongTerm),
            other => Err(format!(
                "unknown time range '{other}', expected short_term, medium_term or long_term"
            )),
        }
    }
}

/// Where the artist list searched for events comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtistSource {
    /// The user's top artists.
    #[default]
    Top,
    /// Followed artists ranked by how many liked tracks they appear on.
    Followed,
}

impl ArtistSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtistSource::Top => "top",
            ArtistSource::Followed => "followed",
        }
    }
}

impl FromStr for ArtistSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "top" => Ok(ArtistSource::Top),
            "followed" => Ok(ArtistSource::Followed),
            other => Err(format!(
                "unknown artist source '{other}', expected top or followed"
            )),
        }
    }
}
