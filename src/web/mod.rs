//! Server-rendered web UI.
//!
//! `GET /` shows the search form, `GET /connect` starts a Spotify session and
//! redirects to the Spotify consent page, and `GET /callback` finishes the
//! OAuth flow and renders the concert listings for that session.

/// Route handlers
pub mod handlers;
/// HTML rendering
pub mod render;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use log::{error, info};
use tokio::sync::Mutex;

use crate::clients::{
    SpotifyClient, TicketmasterClient,
    errors::{Error, Result},
};
use crate::config::{Settings, SpotifySettings};
use crate::finder::SearchRequest;

/// How long a started Spotify login may wait for its callback.
pub const PENDING_SESSION_TTL: Duration = Duration::from_secs(10 * 60);

/// A Spotify session waiting for its OAuth callback.
pub struct PendingSession {
    pub spotify: SpotifyClient,
    pub request: SearchRequest,
    created: Instant,
}

pub struct AppState {
    pub spotify: SpotifySettings,
    pub ticketmaster: TicketmasterClient,
    pending: Mutex<HashMap<String, PendingSession>>,
}

impl AppState {
    pub fn new(spotify: SpotifySettings, ticketmaster: TicketmasterClient) -> Self {
        AppState {
            spotify,
            ticketmaster,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Stores a session under its OAuth `state` and returns that key.
    pub async fn insert_pending(&self, spotify: SpotifyClient, request: SearchRequest) -> String {
        let key = spotify.oauth_state().to_string();
        let mut pending = self.pending.lock().await;
        pending.retain(|_, session| session.created.elapsed() < PENDING_SESSION_TTL);
        pending.insert(
            key.clone(),
            PendingSession {
                spotify,
                request,
                created: Instant::now(),
            },
        );
        key
    }

    /// Removes and returns the session for `key`, if it has not expired.
    pub async fn take_pending(&self, key: &str) -> Option<PendingSession> {
        let session = self.pending.lock().await.remove(key)?;
        (session.created.elapsed() < PENDING_SESSION_TTL).then_some(session)
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/connect", get(handlers::connect))
        .route("/callback", get(handlers::callback))
        .with_state(state)
}

pub async fn serve(settings: Settings) -> Result<()> {
    let state = Arc::new(AppState::new(
        settings.spotify,
        TicketmasterClient::from_settings(&settings.ticketmaster),
    ));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&settings.bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::ParseError(_) | Error::UnknownSession => StatusCode::BAD_REQUEST,
            Error::AuthorizationError(_) => StatusCode::UNAUTHORIZED,
            Error::SpotifyError(_)
            | Error::TicketmasterError(_)
            | Error::TicketmasterDeserializationError(_)
            | Error::TicketmasterUnexpectedResponse(_) => StatusCode::BAD_GATEWAY,
            Error::ConfigurationError(_) | Error::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {self}");
        }
        (status, Html(render::error_page(&self.to_string()))).into_response()
    }
}
