use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::clients::{
    entities::Event,
    errors::{Error, Result},
};
use crate::config::TicketmasterSettings;

/// Upper bound the Discovery API accepts for `size`.
pub const MAX_EVENTS_PER_REQUEST: u32 = 200;

/// Parameters of one event search.
#[derive(Debug, Clone)]
pub struct EventQuery<'a> {
    pub artist_name: &'a str,
    pub size: u32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Deserialize, Debug)]
struct SearchResponse {
    #[serde(rename = "_embedded")]
    embedded: Option<EmbeddedEvents>,
}

#[derive(Deserialize, Debug)]
struct EmbeddedEvents {
    #[serde(default)]
    events: Vec<Value>,
}

// Only `id` and `name` are required. Every other field is read leniently:
// null or an unexpected type leaves it empty instead of rejecting the event.
#[derive(Deserialize, Debug)]
struct ApiEvent {
    id: String,
    name: String,
    #[serde(default, deserialize_with = "lenient")]
    url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    dates: Option<ApiDates>,
    #[serde(default, deserialize_with = "lenient_seq")]
    images: Vec<ApiImage>,
    #[serde(rename = "_embedded", default, deserialize_with = "lenient")]
    embedded: Option<ApiEventEmbedded>,
}

#[derive(Deserialize, Debug)]
struct ApiDates {
    #[serde(default, deserialize_with = "lenient")]
    start: Option<ApiStart>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ApiStart {
    #[serde(default, deserialize_with = "lenient")]
    local_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    local_time: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    date_time: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiImage {
    url: String,
    #[serde(default, deserialize_with = "lenient")]
    width: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct ApiEventEmbedded {
    #[serde(default, deserialize_with = "lenient_seq")]
    venues: Vec<ApiVenue>,
}

#[derive(Deserialize, Debug)]
struct ApiVenue {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    address: Option<ApiAddress>,
    #[serde(default, deserialize_with = "lenient")]
    city: Option<ApiNamed>,
    #[serde(default, deserialize_with = "lenient")]
    state: Option<ApiState>,
    #[serde(default, deserialize_with = "lenient")]
    country: Option<ApiNamed>,
}

#[derive(Deserialize, Debug)]
struct ApiAddress {
    #[serde(default, deserialize_with = "lenient")]
    line1: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiNamed {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ApiState {
    #[serde(default, deserialize_with = "lenient")]
    state_code: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
}

fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

// Keeps the well-formed elements of an array, anything else is an empty list.
fn lenient_seq<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| T::deserialize(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

pub struct TicketmasterClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl TicketmasterClient {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        TicketmasterClient {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_settings(settings: &TicketmasterSettings) -> Self {
        Self::new(settings.api_url.clone(), settings.api_key.clone())
    }

    pub fn try_default() -> Result<Self> {
        Ok(Self::from_settings(&TicketmasterSettings::from_env()?))
    }

    /// Runs one search and returns the raw event payloads, unparsed.
    pub async fn search_events(&self, query: &EventQuery<'_>) -> Result<Vec<Value>> {
        let size = query.size.clamp(1, MAX_EVENTS_PER_REQUEST);
        let mut params: Vec<(&str, String)> = vec![
            ("apikey", self.api_key.clone()),
            ("keyword", query.artist_name.to_string()),
            ("size", size.to_string()),
            ("classificationName", "music".to_string()),
            ("sort", "date,asc".to_string()),
        ];
        if let Some(start) = query.start_date {
            params.push(("startDateTime", format!("{}T00:00:00Z", start.format("%Y-%m-%d"))));
        }
        if let Some(end) = query.end_date {
            params.push(("endDateTime", format!("{}T23:59:59Z", end.format("%Y-%m-%d"))));
        }

        debug!("Searching Ticketmaster events for {:?}", query.artist_name);
        let response = self.http.get(&self.api_url).query(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(
                        "Could not read Ticketmaster error body for {:?}: {e}",
                        query.artist_name
                    );
                    String::new()
                }
            };
            return Err(Error::TicketmasterUnexpectedResponse(format!(
                "status {status} for {:?}: {}",
                query.artist_name,
                truncate(&body, 200)
            )));
        }

        let text = response.text().await?;
        let body: SearchResponse = serde_json::from_str(&text)?;
        let events = body.embedded.map(|e| e.events).unwrap_or_default();
        debug!(
            "Ticketmaster returned {} events for {:?}",
            events.len(),
            query.artist_name
        );
        Ok(events)
    }
}

/// Turns one raw payload into an [`Event`] attributed to `artist_name`.
///
/// Returns `None` for null payloads and payloads without a string `id` and
/// `name`.
pub fn parse_event(artist_name: &str, raw: &Value) -> Option<Event> {
    if raw.is_null() {
        debug!("Skipping null event for {artist_name:?}");
        return None;
    }
    let event = match ApiEvent::deserialize(raw) {
        Ok(event) => event,
        Err(e) => {
            warn!("Skipping malformed event for {artist_name:?}: {e}");
            return None;
        }
    };

    let venue = event
        .embedded
        .and_then(|e| e.venues.into_iter().next());
    let (venue_name, venue_address) = match venue {
        Some(v) => {
            let address = venue_address(&v);
            (v.name, address)
        }
        None => (None, None),
    };

    Some(Event {
        id: event.id,
        name: event.name,
        artist_name: artist_name.to_string(),
        date_and_time: event.dates.and_then(|d| d.start).and_then(|s| start_label(&s)),
        venue_name,
        venue_address,
        url: event.url,
        image: widest_image(event.images),
    })
}

fn start_label(start: &ApiStart) -> Option<String> {
    let date = start
        .local_date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
    let time = start
        .local_time
        .as_deref()
        .and_then(|t| {
            NaiveTime::parse_from_str(t, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M"))
                .ok()
        });

    match (date, time) {
        (Some(date), Some(time)) => Some(date.and_time(time).format("%Y-%m-%d %H:%M").to_string()),
        (Some(date), None) => Some(date.format("%Y-%m-%d").to_string()),
        (None, _) => start.date_time.as_deref().map(|raw| {
            raw.parse::<DateTime<Utc>>()
                .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
                .unwrap_or_else(|_| raw.to_string())
        }),
    }
}

fn venue_address(venue: &ApiVenue) -> Option<String> {
    let state = venue
        .state
        .as_ref()
        .and_then(|s| s.state_code.as_deref().or(s.name.as_deref()));
    let parts: Vec<&str> = [
        venue.address.as_ref().and_then(|a| a.line1.as_deref()),
        venue.city.as_ref().and_then(|c| c.name.as_deref()),
        state,
        venue.country.as_ref().and_then(|c| c.name.as_deref()),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .filter(|p| !p.is_empty())
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

fn widest_image(images: Vec<ApiImage>) -> Option<String> {
    images
        .into_iter()
        .map(|img| (img.width.unwrap_or(0.0), img.url))
        .max_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, url)| url)
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
