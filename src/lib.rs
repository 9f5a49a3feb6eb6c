//! Gigscout - find concerts for the artists you listen to on Spotify
//!
//! This library ranks the artists from your Spotify listening data, searches
//! Ticketmaster for their upcoming events and renders the results as a small
//! web page.

/// Ranking of followed artists by liked-track counts
pub mod affinity;
/// Client modules for interacting with external services
pub mod clients;
/// Settings loaded from the environment
pub mod config;
/// Artist collection and per-artist event aggregation
pub mod finder;
/// Web UI
pub mod web;
