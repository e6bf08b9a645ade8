use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "dcs-downloads", version, about = "List downloadable release assets from a content catalog")]
pub struct Cli {
    /// Config file to read instead of the platform config directory.
    #[arg(long, global = true, env = "DCS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the catalog server URL.
    #[arg(long, global = true)]
    pub catalog_url: Option<String>,

    /// Override the catalog publishing stage.
    #[arg(long, global = true)]
    pub stage: Option<String>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` wins when set.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Languages with published content.
    Languages,
    /// Owners publishing in a language.
    Owners { lang: String },
    /// Packages an owner publishes in a language, with their downloads.
    Entries {
        lang: String,
        owner: String,
        /// Only list the packages, without grouping their downloads.
        #[arg(long)]
        no_downloads: bool,
    },
    /// Downloads of one package.
    Downloads {
        owner: String,
        repo: String,
        /// Also list older versions that offered file types the newer ones lack.
        #[arg(long)]
        history: bool,
    },
    /// Show how asset file names are classified, without any network access.
    Classify {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

impl Cli {
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}
