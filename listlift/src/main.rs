//! listlift - build a Spotify playlist from a "best of" music list webpage

use anyhow::Result;
use clap::Parser;
use listlift::builder::PlaylistBuilder;
use listlift::scrape::Extractor;
use listlift::services::spotify_client::{SessionState, SpotifyClient};
use listlift_common::config::Config;
use listlift_common::ListCategory;
use std::io::Write;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "listlift",
    version,
    about = "Build a Spotify playlist from a 'best of' music list webpage"
)]
struct Args {
    /// URL of the list page (prompted for when omitted)
    #[arg(env = "LISTLIFT_URL")]
    url: Option<String>,

    /// List category: 1=song, 2=artist, 3=album, 4=musician (prompted for
    /// when omitted)
    #[arg(env = "LISTLIFT_CATEGORY")]
    category: Option<u8>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();

    let url = match args.url {
        Some(url) => url,
        None => prompt(
            "Please paste the url of the DigitalDreamDoor page you want to create a playlist from:",
        )?,
    };
    let category = match args.category {
        Some(selector) => ListCategory::from_selector(selector)?,
        None => prompt_category()?,
    };

    let extractor = Extractor::new()?;
    let list = extractor.scrape(&url, category).await?;
    println!("\nScraping {} List...\n", list.title);

    let config = Config::load()?;
    info!("Configuration loaded");

    let mut spotify = SpotifyClient::new(config)?;
    if let SessionState::AuthorizationNeeded { authorize_url } = spotify.ensure_session().await? {
        println!("Open this URL in your browser and approve access:\n{}\n", authorize_url);
        let redirect = prompt("Paste the URL you were redirected to (or the code parameter):")?;
        spotify.complete_authorization(&redirect).await?;
    }

    let builder = PlaylistBuilder::new(&spotify);
    let report = builder.resolve(&list).await?;
    let playlist = builder.publish(&list.title, &report.uris).await?;

    println!("Process complete! Listen to your new playlist at: {}", playlist.url);
    Ok(())
}

fn prompt(message: &str) -> Result<String> {
    println!("{}", message);
    print!("> ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_category() -> Result<ListCategory> {
    let line = prompt(
        "What type of 'best of' list is this? (Select by entering 1, 2, 3 or 4)\n\
         1) A 'best song' list\n\
         2) A 'best artist' list\n\
         3) A 'best album' list\n\
         4) A 'best musician' list",
    )?;
    let selector: u8 = line.parse().map_err(|_| {
        listlift_common::Error::InvalidInput(format!("not a category number: {}", line))
    })?;
    Ok(ListCategory::from_selector(selector)?)
}
