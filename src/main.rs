use std::io::{self, IsTerminal, Read};

use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "lyrics-translator-rust",
    version,
    about = "Translate song lyrics line by line with word annotations"
)]
struct Cli {
    /// Artist to look up (use together with --title)
    #[arg(short = 'a', long = "artist")]
    artist: Option<String>,

    /// Song title to look up (use together with --artist)
    #[arg(short = 't', long = "title")]
    title: Option<String>,

    /// Source language of the lyrics (default from settings: es)
    #[arg(short = 'L', long = "source-lang")]
    source_lang: Option<String>,

    /// Target language (default from settings: en)
    #[arg(short = 'l', long = "lang")]
    lang: Option<String>,

    /// Base URL of the lyrics backend (overrides settings and LYRICS_API_URL)
    #[arg(long = "api-url")]
    api_url: Option<String>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Print the aligned rows as JSON
    #[arg(long = "json")]
    json: bool,

    /// Hide per-word translations
    #[arg(long = "no-annotate")]
    no_annotate: bool,

    /// Width of each column in characters
    #[arg(long = "width")]
    width: Option<usize>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,

    /// Interactive mode
    #[arg(short = 'i', long = "interactive")]
    interactive: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    lyrics_translator_rust::logging::init(cli.verbose)?;

    let config = lyrics_translator_rust::Config {
        artist: cli.artist,
        title: cli.title,
        source_lang: cli.source_lang,
        lang: cli.lang,
        api_url: cli.api_url,
        settings_path: cli.read_settings,
        json: cli.json,
        no_annotate: cli.no_annotate,
        width: cli.width,
    };

    if cli.interactive {
        return lyrics_translator_rust::interactive::run(config).await;
    }

    let searching = config.artist.is_some() || config.title.is_some();
    let input = if searching || io::stdin().is_terminal() {
        None
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Some(buffer)
    };

    let output = lyrics_translator_rust::run(config, input).await?;
    println!("{}", output);
    Ok(())
}
