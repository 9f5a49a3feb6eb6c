//! HTML pages, rendered from plain format strings.

use std::fmt::Write;

use crate::clients::entities::{ArtistEvents, ArtistSource, Event};
use crate::finder::SearchRequest;

pub const MIN_EVENTS: u32 = 1;
pub const MAX_EVENTS: u32 = 10;

const STYLE: &str = r"
        body {
            font-family: system-ui, -apple-system, sans-serif;
            max-width: 800px;
            margin: 40px auto;
            padding: 20px;
            line-height: 1.6;
            color: #333;
        }
        h1 {
            border-bottom: 2px solid #b19cd9;
            padding-bottom: 10px;
        }
        label { display: block; margin-top: 12px; }
        .button {
            display: inline-block;
            padding: 10px 20px;
            background: #1db954;
            color: white;
            border: none;
            border-radius: 4px;
            margin: 16px 0;
            font-weight: 600;
            cursor: pointer;
            text-decoration: none;
        }
        details {
            border: 1px solid #b4bcde;
            border-radius: 6px;
            margin: 10px 0;
            padding: 8px 12px;
        }
        summary { cursor: pointer; font-weight: 600; }
        .card {
            border-top: 1px solid #ddd;
            padding: 12px 0;
        }
        .card img { max-width: 100%; border-radius: 4px; }
        .error {
            background: #fdecea;
            color: #8a1c1c;
            border-radius: 4px;
            padding: 10px 14px;
        }
";

/// Escapes text for use in element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{STYLE}</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape(title),
    )
}

/// Landing page with the connect form.
pub fn index_page(defaults: &SearchRequest) -> String {
    let events = defaults
        .options
        .events_per_artist
        .clamp(MIN_EVENTS, MAX_EVENTS);
    let selected = |source: ArtistSource| {
        if source == defaults.source {
            " selected"
        } else {
            ""
        }
    };
    let body = format!(
        r#"<h1>Content Finder</h1>
<p>Please connect to your Spotify account</p>
<form action="/connect" method="get">
    <label for="events_to_get">events_to_get: <output id="events_value">{events}</output></label>
    <input type="range" id="events_to_get" name="events_to_get" min="{MIN_EVENTS}" max="{MAX_EVENTS}" step="1" value="{events}"
        oninput="document.getElementById('events_value').value = this.value">
    <label for="source">Artists</label>
    <select id="source" name="source">
        <option value="top"{top}>My top artists</option>
        <option value="followed"{followed}>Followed artists, ranked by liked tracks</option>
    </select>
    <label for="start_date">Start date (optional)</label>
    <input type="date" id="start_date" name="start_date">
    <label for="end_date">End date (optional)</label>
    <input type="date" id="end_date" name="end_date">
    <div><button class="button" type="submit">Connect</button></div>
</form>"#,
        top = selected(ArtistSource::Top),
        followed = selected(ArtistSource::Followed),
    );
    page("Content Finder", &body)
}

fn event_card(out: &mut String, event: &Event) {
    let tba = "TBA";
    let _ = write!(
        out,
        r#"<div class="card">
    <h3>{name}</h3>
    <p><strong>Band:</strong> {band}<br>
    <strong>Date and Time:</strong> {when}<br>
    <strong>Venue:</strong> {venue}<br>
    <strong>Address:</strong> {address}</p>
"#,
        name = escape(&event.name),
        band = escape(&event.artist_name),
        when = escape(event.date_and_time.as_deref().unwrap_or(tba)),
        venue = escape(event.venue_name.as_deref().unwrap_or(tba)),
        address = escape(event.venue_address.as_deref().unwrap_or(tba)),
    );
    if let Some(url) = &event.url {
        let _ = writeln!(
            out,
            r#"    <p><a href="{url}" target="_blank" rel="noopener">Tickets</a></p>"#,
            url = escape(url)
        );
    }
    if let Some(image) = &event.image {
        let _ = writeln!(
            out,
            r#"    <img src="{src}" alt="{alt}">"#,
            src = escape(image),
            alt = escape(&event.name)
        );
    }
    out.push_str("</div>\n");
}

/// One collapsed section per artist, in search order.
pub fn results_page(request: &SearchRequest, results: &[ArtistEvents]) -> String {
    let mut body = String::from("<h1>Content Finder</h1>\n");
    let _ = writeln!(
        body,
        "<p>Searched {count} artists ({source}), up to {events} events each.</p>",
        count = results.len(),
        source = request.source.as_str(),
        events = request.options.events_per_artist,
    );
    if results.is_empty() {
        body.push_str("<p>No artists found in your Spotify library.</p>\n");
    }
    for entry in results {
        let _ = writeln!(
            body,
            "<details>\n<summary>{artist}, {count}  events found</summary>",
            artist = escape(&entry.artist),
            count = entry.events.len()
        );
        if let Some(error) = &entry.error {
            let _ = writeln!(
                body,
                r#"<p class="error">Search failed: {}</p>"#,
                escape(error)
            );
        }
        for event in &entry.events {
            event_card(&mut body, event);
        }
        body.push_str("</details>\n");
    }
    body.push_str(r#"<a class="button" href="/">Search again</a>"#);
    page("Content Finder - results", &body)
}

pub fn error_page(message: &str) -> String {
    let body = format!(
        r#"<h1>Content Finder</h1>
<p class="error">{}</p>
<a class="button" href="/">Back</a>"#,
        escape(message)
    );
    page("Content Finder - error", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: &str) -> Event {
        Event {
            id: "1".into(),
            name: name.into(),
            artist_name: "Band".into(),
            date_and_time: Some("2025-06-01 19:30".into()),
            venue_name: Some("The Hall".into()),
            venue_address: None,
            url: Some("https://tm/1?a=1&b=2".into()),
            image: None,
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn index_has_connect_form_and_slider_bounds() {
        let html = index_page(&SearchRequest::default());
        assert!(html.contains("Please connect to your Spotify account"));
        assert!(html.contains(r#"action="/connect""#));
        assert!(html.contains(r#"min="1" max="10""#));
        assert!(html.contains(r#"<option value="top" selected>"#));
    }

    #[test]
    fn results_list_each_artist_with_event_count() {
        let results = vec![
            ArtistEvents {
                artist: "Band".into(),
                events: vec![event("First <Show>"), event("Second")],
                error: None,
            },
            ArtistEvents {
                artist: "Quiet".into(),
                events: Vec::new(),
                error: Some("status 500".into()),
            },
        ];
        let html = results_page(&SearchRequest::default(), &results);

        assert!(html.contains("<summary>Band, 2  events found</summary>"));
        assert!(html.contains("<summary>Quiet, 0  events found</summary>"));
        assert!(html.contains("First &lt;Show&gt;"));
        assert!(html.contains("Search failed: status 500"));
        assert!(html.contains("<strong>Address:</strong> TBA"));
        assert!(html.contains(r#"href="https://tm/1?a=1&amp;b=2""#));
    }

    #[test]
    fn error_page_escapes_message() {
        let html = error_page("bad <input>");
        assert!(html.contains("bad &lt;input&gt;"));
    }
}
