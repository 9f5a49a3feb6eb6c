/// Data entities for artists, tracks and events
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// Lazy cursor and offset pagination
pub mod pagination;
/// Spotify API client
pub mod spotify;
/// Ticketmaster Discovery API client
pub mod ticketmaster;

pub use spotify::SpotifyClient;
pub use ticketmaster::TicketmasterClient;
