use rspotify::ClientError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to parse input, error: {0}")]
    ParseError(String),

    #[error("Spotify error: {0}")]
    SpotifyError(#[from] ClientError),

    #[error("Spotify authorization failed: {0}")]
    AuthorizationError(String),

    #[error("Unknown or expired session, please connect again")]
    UnknownSession,

    #[error("Ticketmaster request error: {0}")]
    TicketmasterError(#[from] reqwest::Error),

    #[error("Ticketmaster deserialization error: {0}")]
    TicketmasterDeserializationError(#[from] serde_json::Error),

    #[error("Ticketmaster API unexpected response: {0}")]
    TicketmasterUnexpectedResponse(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
