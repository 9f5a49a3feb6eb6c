use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
};
use chrono::NaiveDate;
use log::{debug, info};
use serde::Deserialize;

use crate::clients::{
    SpotifyClient,
    entities::ArtistSource,
    errors::{Error, Result},
};
use crate::finder::{Finder, SearchOptions, SearchRequest};
use crate::web::{
    AppState,
    render::{self, MAX_EVENTS, MIN_EVENTS},
};

/// Query string submitted by the connect form. Every field arrives as text so
/// bad input can be reported on an HTML page.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectForm {
    pub events_to_get: Option<String>,
    pub source: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ConnectForm {
    pub fn into_request(self) -> Result<SearchRequest> {
        let events_per_artist = match non_empty(self.events_to_get.as_deref()) {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| Error::ParseError(format!("events_to_get must be a number, got {raw:?}")))?,
            None => MIN_EVENTS,
        };
        if !(MIN_EVENTS..=MAX_EVENTS).contains(&events_per_artist) {
            return Err(Error::ParseError(format!(
                "events_to_get must be between {MIN_EVENTS} and {MAX_EVENTS}, got {events_per_artist}"
            )));
        }
        let source = match non_empty(self.source.as_deref()) {
            Some(raw) => raw.parse::<ArtistSource>().map_err(Error::ParseError)?,
            None => ArtistSource::default(),
        };
        let options = SearchOptions {
            events_per_artist,
            start_date: parse_date("start_date", self.start_date.as_deref())?,
            end_date: parse_date("end_date", self.end_date.as_deref())?,
        };
        options.validate()?;

        Ok(SearchRequest {
            source,
            options,
            ..SearchRequest::default()
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    non_empty(value)
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|e| Error::ParseError(format!("{field} {raw:?} is not a date: {e}")))
        })
        .transpose()
}

pub async fn index() -> Html<String> {
    Html(render::index_page(&SearchRequest::default()))
}

pub async fn connect(
    State(state): State<Arc<AppState>>,
    Query(form): Query<ConnectForm>,
) -> Result<Redirect> {
    let request = form.into_request()?;
    let spotify = SpotifyClient::for_web_session(&state.spotify);
    let url = spotify.authorize_url()?;
    let key = state.insert_pending(spotify, request).await;
    debug!("Started Spotify session {key}");
    Ok(Redirect::to(&url))
}

pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Html<String>> {
    let key = params.state.ok_or(Error::UnknownSession)?;
    let session = state
        .take_pending(&key)
        .await
        .ok_or(Error::UnknownSession)?;

    if let Some(reason) = params.error {
        return Err(Error::AuthorizationError(reason));
    }
    let code = params
        .code
        .ok_or_else(|| Error::AuthorizationError("no authorization code in callback".into()))?;

    // Nothing below runs without a token.
    session.spotify.authenticate_with_code(&code).await?;
    info!("Spotify session {key} authenticated");

    let results = Finder::new(&session.spotify, &state.ticketmaster)
        .find(&session.request)
        .await?;
    Ok(Html(render::results_page(&session.request, &results)))
}
