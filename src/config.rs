//! Settings read from the environment (and a `.env` file, when present).

use std::collections::HashSet;

use crate::clients::errors::{Error, Result};

pub const DEFAULT_SCOPE: &str = "user-follow-read user-library-read user-top-read";
pub const DEFAULT_TICKETMASTER_API_URL: &str =
    "https://app.ticketmaster.com/discovery/v2/events.json";
pub const DEFAULT_BIND: &str = "127.0.0.1:8888";

#[derive(Debug, Clone)]
pub struct SpotifySettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: HashSet<String>,
}

#[derive(Debug, Clone)]
pub struct TicketmasterSettings {
    pub api_key: String,
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub spotify: SpotifySettings,
    pub ticketmaster: TicketmasterSettings,
    pub bind: String,
}

impl SpotifySettings {
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let scope = lookup("SPOTIFY_APP_SCOPE")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SCOPE.to_string());
        Ok(SpotifySettings {
            client_id: required(&lookup, "SPOTIFY_CLIENT_ID")?,
            client_secret: required(&lookup, "SPOTIFY_CLIENT_SECRET")?,
            redirect_uri: required(&lookup, "SPOTIFY_REDIRECT_URI")?,
            scopes: parse_scopes(&scope),
        })
    }
}

impl TicketmasterSettings {
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(TicketmasterSettings {
            api_key: required(&lookup, "TICKETMASTER_API_KEY")?,
            api_url: lookup("TICKETMASTER_API_URL")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TICKETMASTER_API_URL.to_string()),
        })
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Settings {
            spotify: SpotifySettings::from_lookup(&lookup)?,
            ticketmaster: TicketmasterSettings::from_lookup(&lookup)?,
            bind: lookup("GIGSCOUT_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
        })
    }
}

/// Splits a scope string on whitespace or commas.
pub fn parse_scopes(scope: &str) -> HashSet<String> {
    scope
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            Error::ConfigurationError(format!(
                "Missing {key} in environment variables. Check README.MD for details."
            ))
        })
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn load_dotenv() {
    dotenvy::dotenv().ok();
}
