use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use futures::stream::TryStreamExt;
use gigscout::affinity;
use gigscout::clients::{
    SpotifyClient,
    entities::{ArtistEvents, ArtistSource, LikedTrack, ListeningRange},
    errors::Result,
    spotify::MAX_PAGE_SIZE,
};
use gigscout::config::Settings;
use gigscout::finder::{ConfigBuilder, DEFAULT_ARTIST_LIMIT, Finder, SearchOptions, SearchRequest};
use gigscout::web;
use log::info;

#[derive(Parser)]
#[command(name = "gigscout")]
#[command(version, about = "Find concerts for the artists you listen to on Spotify", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web UI
    Serve {
        /// Address to listen on, overrides GIGSCOUT_BIND
        #[arg(long)]
        bind: Option<String>,
    },
    /// Print followed artists, liked tracks and top artists/tracks
    Summary {
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long, default_value_t = ListeningRange::MediumTerm)]
        time_range: ListeningRange,
    },
    /// Search concerts and print them to the terminal
    Concerts {
        /// Events to fetch per artist
        #[arg(long, default_value_t = 1)]
        events: u32,
        /// `top` or `followed`
        #[arg(long, default_value = "top")]
        source: ArtistSource,
        /// Maximum number of artists to search
        #[arg(long, default_value_t = DEFAULT_ARTIST_LIMIT)]
        artists: u32,
        #[arg(long, default_value_t = ListeningRange::MediumTerm)]
        time_range: ListeningRange,
        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind } => {
            let mut settings = Settings::from_env()?;
            if let Some(bind) = bind {
                settings.bind = bind;
            }
            web::serve(settings).await
        }
        Commands::Summary { limit, time_range } => summary(limit, time_range).await,
        Commands::Concerts {
            events,
            source,
            artists,
            time_range,
            from,
            to,
        } => {
            let request = SearchRequest {
                source,
                artist_limit: artists,
                time_range,
                options: SearchOptions {
                    events_per_artist: events,
                    start_date: from,
                    end_date: to,
                },
            };
            concerts(&request).await
        }
    }
}

async fn summary(limit: u32, time_range: ListeningRange) -> Result<()> {
    let spotify = SpotifyClient::try_default()?;
    info!("Authorizing Spotify client ...");
    // CLI prompt may be shown here
    spotify.authorize_client().await?;

    let followed: Vec<_> = spotify.followed_artists(MAX_PAGE_SIZE).try_collect().await?;
    let liked: Vec<LikedTrack> = spotify.liked_tracks(MAX_PAGE_SIZE).try_collect().await?;
    println!("Followed artists: {}", followed.len());
    println!("Liked tracks: {}", liked.len());

    let counts = affinity::affinity_counts(&liked);
    println!("\nFollowed artists by liked tracks:");
    for artist in affinity::rank(followed, &liked).iter().take(limit as usize) {
        let count = counts.get(artist.name.as_str()).copied().unwrap_or(0);
        println!("  {count:>4}  {}", artist.name);
    }

    println!("\nTop artists ({time_range}):");
    for artist in spotify.top_artists(limit, time_range).await? {
        println!("  {}", artist.name);
    }

    println!("\nTop tracks ({time_range}):");
    for track in spotify.top_tracks(limit, time_range).await? {
        println!("  {} - {}", track.name, track.artist_line());
    }
    Ok(())
}

async fn concerts(request: &SearchRequest) -> Result<()> {
    info!("Building config ...");
    let config = ConfigBuilder::new().build()?;
    info!("Authorizing Spotify client ...");
    config.spotify.authorize_client().await?;

    let results = Finder::from_config(&config).find(request).await?;
    print_results(&results);
    Ok(())
}

fn print_results(results: &[ArtistEvents]) {
    for entry in results {
        println!("{}, {} events found", entry.artist, entry.events.len());
        if let Some(error) = &entry.error {
            println!("    search failed: {error}");
        }
        for event in &entry.events {
            println!("  - {}", event.name);
            println!(
                "    Date and Time: {}",
                event.date_and_time.as_deref().unwrap_or("TBA")
            );
            println!("    Venue: {}", event.venue_name.as_deref().unwrap_or("TBA"));
            println!(
                "    Address: {}",
                event.venue_address.as_deref().unwrap_or("TBA")
            );
            if let Some(url) = &event.url {
                println!("    URL: {url}");
            }
        }
    }
}
