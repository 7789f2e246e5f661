pub mod commands;

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "pasito-sync")]
#[command(about = "Copy Pasito dance events to a Facebook page", long_about = None)]
pub struct Cli {
    /// Event identifiers: slugs, @slugs, or full event URLs
    #[arg(value_name = "EVENT_ID")]
    pub event_ids: Vec<String>,

    /// Add every event listed on this series page
    #[arg(short, long, value_name = "SERIES_ID")]
    pub series: Option<String>,

    /// Print and save the API calls instead of sending them
    #[arg(short, long)]
    pub preview: bool,

    /// Remove the preview file and debug HTML after the run
    #[arg(short, long)]
    pub clean: bool,

    /// Cover image for every event: an image URL or a local file to upload
    #[arg(long, value_name = "PATH_OR_URL")]
    pub cover: Option<String>,

    /// Save the raw HTML of each fetched page
    #[arg(long)]
    pub debug: bool,

    /// Skip the browser and use plain HTTP fetches
    #[arg(long)]
    pub static_only: bool,

    /// Ask for the location when a page has none
    #[arg(long)]
    pub interactive: bool,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Config file (default: ~/.config/pasito-sync/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn flags(&self) -> crate::app::RunFlags {
        crate::app::RunFlags {
            preview: self.preview,
            debug: self.debug,
            static_only: self.static_only,
            interactive: self.interactive,
        }
    }
}
