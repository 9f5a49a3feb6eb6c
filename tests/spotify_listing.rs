use chrono::{TimeDelta, Utc};
use futures::stream::TryStreamExt;
use gigscout::clients::entities::{ArtistSource, ListeningRange};
use gigscout::clients::{SpotifyClient, TicketmasterClient};
use gigscout::finder::{ConfigBuilder, Finder, SearchRequest, collect_artists};
use httpmock::prelude::*;
use rspotify::{AuthCodeSpotify, Config, Credentials, OAuth, Token};
use serde_json::{Value, json};

// Spotify client talking to the mock server with an already valid token.
fn spotify_for(server: &MockServer) -> SpotifyClient {
    let token = Token {
        access_token: "test-token".into(),
        expires_in: TimeDelta::try_hours(1).unwrap(),
        expires_at: Some(Utc::now() + TimeDelta::try_hours(1).unwrap()),
        ..Default::default()
    };
    let config = Config {
        api_base_url: server.url("/"),
        token_refreshing: false,
        ..Default::default()
    };
    SpotifyClient::new(AuthCodeSpotify::from_token_with_config(
        token,
        Credentials::new("id", "secret"),
        OAuth::default(),
        config,
    ))
}

fn artist(id: &str, name: &str) -> Value {
    json!({
        "external_urls": {},
        "followers": { "total": 0 },
        "genres": ["rock"],
        "href": format!("https://api.spotify.com/v1/artists/{id}"),
        "id": id,
        "images": [],
        "name": name,
        "popularity": 50
    })
}

fn liked(id: &str, artist_names: &[&str]) -> Value {
    let artists: Vec<Value> = artist_names
        .iter()
        .map(|name| json!({ "external_urls": {}, "href": null, "id": null, "name": name }))
        .collect();
    json!({
        "added_at": "2024-01-01T00:00:00Z",
        "track": {
            "album": { "artists": [], "external_urls": {}, "href": null, "id": null, "images": [], "name": "Album" },
            "artists": artists,
            "disc_number": 1,
            "duration_ms": 180000,
            "explicit": false,
            "external_ids": {},
            "external_urls": {},
            "href": null,
            "id": id,
            "is_local": false,
            "name": format!("Track {id}"),
            "popularity": 0,
            "preview_url": null,
            "track_number": 1,
            "type": "track"
        }
    })
}

fn followed_page(items: Vec<Value>, after: Option<&str>) -> Value {
    json!({
        "artists": {
            "href": "https://api.spotify.com/v1/me/following",
            "items": items,
            "limit": 50,
            "next": null,
            "cursors": { "after": after },
            "total": null
        }
    })
}

fn offset_page(items: Vec<Value>, offset: u32) -> Value {
    let total = items.len();
    json!({
        "href": "https://api.spotify.com/v1/me",
        "items": items,
        "limit": 50,
        "next": null,
        "offset": offset,
        "previous": null,
        "total": total
    })
}

// Three followed artists A, B, C in one page; B is on two liked tracks, C on one.
async fn mock_library(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/me/following").query_param("type", "artist");
            then.status(200).json_body(followed_page(
                vec![artist("a1", "A"), artist("b2", "B"), artist("c3", "C")],
                None,
            ));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/me/tracks");
            then.status(200).json_body(offset_page(
                vec![liked("t1", &["B"]), liked("t2", &["C"]), liked("t3", &["B", "X"])],
                0,
            ));
        })
        .await;
}

#[tokio::test]
async fn followed_artists_follow_the_after_cursor_until_it_is_absent() {
    let server = MockServer::start_async().await;
    // The more specific mock is registered first so it wins for the second page.
    let second = server
        .mock_async(|when, then| {
            when.method(GET).path("/me/following").query_param("after", "c1");
            then.status(200)
                .json_body(followed_page(vec![artist("b2", "B")], None));
        })
        .await;
    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/me/following")
                .query_param("type", "artist")
                .query_param("limit", "1");
            then.status(200)
                .json_body(followed_page(vec![artist("a1", "A")], Some("c1")));
        })
        .await;

    let spotify = spotify_for(&server);
    let names: Vec<String> = spotify
        .followed_artists(1)
        .map_ok(|a| a.name)
        .try_collect()
        .await
        .unwrap();

    assert_eq!(names, vec!["A", "B"]);
    assert_eq!(first.hits_async().await, 1);
    assert_eq!(second.hits_async().await, 1);
}

#[tokio::test]
async fn liked_tracks_are_paged_by_offset_until_a_short_page() {
    let server = MockServer::start_async().await;
    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/me/tracks")
                .query_param("offset", "0")
                .query_param("limit", "2");
            then.status(200)
                .json_body(offset_page(vec![liked("t1", &["A"]), liked("t2", &["B"])], 0));
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/me/tracks")
                .query_param("offset", "2")
                .query_param("limit", "2");
            then.status(200)
                .json_body(offset_page(vec![liked("t3", &["C", "D"])], 2));
        })
        .await;

    let spotify = spotify_for(&server);
    let tracks: Vec<_> = spotify.liked_tracks(2).try_collect().await.unwrap();

    assert_eq!(tracks.len(), 3);
    assert_eq!(tracks[2].track.artist_line(), "C, D");
    assert!(tracks[0].added_at.is_some());
    assert_eq!(first.hits_async().await, 1);
    assert_eq!(second.hits_async().await, 1);
}

#[tokio::test]
async fn top_artists_cross_pages_of_fifty_and_stop_at_the_limit() {
    let server = MockServer::start_async().await;
    let page = |offset: u32| {
        let items = (offset..offset + 50)
            .map(|i| artist(&format!("id{i}"), &format!("Artist {i}")))
            .collect();
        offset_page(items, offset)
    };
    let mut mocks = Vec::new();
    for offset in [0u32, 50, 100] {
        let body = page(offset);
        mocks.push(
            server
                .mock_async(|when, then| {
                    when.method(GET)
                        .path("/me/top/artists")
                        .query_param("time_range", "short_term")
                        .query_param("limit", "50")
                        .query_param("offset", offset.to_string());
                    then.status(200).json_body(body);
                })
                .await,
        );
    }

    let spotify = spotify_for(&server);
    let top = spotify
        .top_artists(100, ListeningRange::ShortTerm)
        .await
        .unwrap();

    assert_eq!(top.len(), 100);
    assert_eq!(top[0].name, "Artist 0");
    assert_eq!(top[99].name, "Artist 99");
    assert_eq!(mocks[0].hits_async().await, 1);
    assert_eq!(mocks[1].hits_async().await, 1);
    // the limit is reached inside the second page
    assert_eq!(mocks[2].hits_async().await, 0);
}

#[tokio::test]
async fn followed_artists_are_ranked_by_liked_tracks() {
    let server = MockServer::start_async().await;
    mock_library(&server).await;

    let spotify = spotify_for(&server);
    let ranked = spotify.followed_artists_by_affinity(50).await.unwrap();
    let names: Vec<&str> = ranked.iter().map(|a| a.name.as_str()).collect();

    assert_eq!(names, vec!["B", "C", "A"]);
    assert_eq!(ranked[0].id.as_deref(), Some("b2"));
}

#[tokio::test]
async fn collect_artists_truncates_ranked_followed_artists() {
    let server = MockServer::start_async().await;
    mock_library(&server).await;

    let spotify = spotify_for(&server);
    let names = collect_artists(&spotify, ArtistSource::Followed, 2, ListeningRange::MediumTerm)
        .await
        .unwrap();

    assert_eq!(names, vec!["B", "C"]);
}

#[tokio::test]
async fn finder_searches_events_for_the_selected_source() {
    let server = MockServer::start_async().await;
    mock_library(&server).await;
    let top = server
        .mock_async(|when, then| {
            when.method(GET).path("/me/top/artists");
            then.status(200).json_body(offset_page(vec![artist("z9", "Z")], 0));
        })
        .await;
    let mut searches = Vec::new();
    for name in ["A", "B", "C"] {
        searches.push(
            server
                .mock_async(|when, then| {
                    when.method(GET).path("/events.json").query_param("keyword", name);
                    then.status(200).json_body(json!({
                        "_embedded": { "events": [{ "id": format!("e-{name}"), "name": format!("{name} live") }] }
                    }));
                })
                .await,
        );
    }

    let config = ConfigBuilder::new()
        .spotify(spotify_for(&server))
        .ticketmaster(TicketmasterClient::new(server.url("/events.json"), "key"))
        .build()
        .unwrap();
    let request = SearchRequest {
        source: ArtistSource::Followed,
        artist_limit: 2,
        ..SearchRequest::default()
    };
    let results = Finder::from_config(&config).find(&request).await.unwrap();

    let artists: Vec<&str> = results.iter().map(|r| r.artist.as_str()).collect();
    assert_eq!(artists, vec!["B", "C"]);
    assert_eq!(results[0].events[0].name, "B live");
    assert_eq!(top.hits_async().await, 0);
    assert_eq!(searches[0].hits_async().await, 0);
    assert_eq!(searches[1].hits_async().await, 1);
    assert_eq!(searches[2].hits_async().await, 1);
}

#[tokio::test]
async fn finder_returns_nothing_without_top_artists() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/me/top/artists");
            then.status(200).json_body(offset_page(Vec::new(), 0));
        })
        .await;
    let events = server
        .mock_async(|when, then| {
            when.method(GET).path("/events.json");
            then.status(200).json_body(json!({}));
        })
        .await;

    let spotify = spotify_for(&server);
    let ticketmaster = TicketmasterClient::new(server.url("/events.json"), "key");
    let results = Finder::new(&spotify, &ticketmaster)
        .find(&SearchRequest::default())
        .await
        .unwrap();

    assert!(results.is_empty());
    assert_eq!(events.hits_async().await, 0);
}
