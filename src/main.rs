mod cli;

use crate::cli::{Cli, Command};
use clap::Parser;
use dcs_catalog::models::{CategorizedAssetSet, Category, FormatRecord, ReleaseEntry};
use dcs_catalog::{GroupedAssets, describe};
use dcs_config::Config;
use dcs_fetch::FetcherHandle;
use dcs_fetch::backend::HttpFetcher;
use dcs_library::{CatalogClient, ExpandOptions, downloadable_types, version_history};
use futures::StreamExt;
use miette::{IntoDiagnostic, Result, miette};
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level());
    run(cli).await
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn report<E>(err: exn::Exn<E>) -> miette::Report
where
    E: std::error::Error + Send + Sync + 'static,
{
    miette!("{err:?}")
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref()).map_err(report)?;
    if let Some(catalog_url) = &cli.catalog_url {
        config.catalog_url = catalog_url.clone();
    }
    if let Some(stage) = &cli.stage {
        config.stage = stage.clone();
    }
    config.validate().map_err(report)?;
    tracing::debug!(catalog = %config.catalog_url, stage = %config.stage, "Loaded configuration");
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    if let Command::Classify { names } = &cli.command {
        return classify(names, cli.json);
    }
    let config = load_config(&cli)?;
    let options = ExpandOptions::from(&config);
    let fetcher: FetcherHandle = Arc::new(HttpFetcher::new().map_err(report)?);
    let client = CatalogClient::new(fetcher.clone(), config);
    let origin = client.config().origin().to_string();

    match cli.command {
        Command::Languages => {
            let languages = client.languages().await.map_err(report)?;
            if cli.json {
                return print_json(&languages);
            }
            for language in languages {
                println!("{}\t{} ({})", language.lc, language.ln, language.ang);
            }
        },
        Command::Owners { lang } => {
            let owners = client.owners(&lang).await.map_err(report)?;
            if cli.json {
                return print_json(&owners);
            }
            for owner in owners {
                println!("{}\t{}", owner.username, owner.display_name());
            }
        },
        Command::Entries {
            lang,
            owner,
            no_downloads,
        } => {
            let entries = client.entries(&lang, &owner).await.map_err(report)?;
            if no_downloads {
                if cli.json {
                    return print_json(&entries);
                }
                for entry in &entries {
                    println!("{}", entry_heading(entry));
                }
                return Ok(());
            }
            let mut listing = Vec::new();
            for entry in &entries {
                let downloads = downloadable_types(&fetcher, std::slice::from_ref(entry), &options).await;
                match cli.json {
                    true => listing.push(VersionListing::new(entry, downloads)),
                    false => print_downloads(entry, &downloads, &origin),
                }
            }
            if cli.json {
                return print_json(&listing);
            }
        },
        Command::Downloads { owner, repo, history } => {
            let entries = client.history(&owner, &repo).await.map_err(report)?;
            if entries.is_empty() {
                return Err(miette!("No released versions of {owner}/{repo} in the catalog"));
            }
            let entries = match history {
                true => entries,
                false => entries.into_iter().take(1).collect(),
            };
            let mut listing = Vec::new();
            let mut versions = std::pin::pin!(version_history(&fetcher, &entries, &options));
            while let Some(version) = versions.next().await {
                match cli.json {
                    true => listing.push(VersionListing::new(&version.entry, version.downloads)),
                    false => print_downloads(&version.entry, &version.downloads, &origin),
                }
            }
            if cli.json {
                return print_json(&listing);
            }
        },
        Command::Classify { .. } => {},
    }
    Ok(())
}

#[derive(Serialize)]
struct VersionListing {
    full_name: String,
    version: String,
    downloads: CategorizedAssetSet,
}
impl VersionListing {
    fn new(entry: &ReleaseEntry, downloads: GroupedAssets) -> Self {
        Self {
            full_name: entry.full_name.clone(),
            version: entry.branch_or_tag_name.clone(),
            downloads: downloads.into_set(),
        }
    }
}

#[derive(Serialize)]
struct Classification<'a> {
    name: &'a str,
    format: String,
    category: Category,
}

fn classify(names: &[String], json: bool) -> Result<()> {
    let rows: Vec<_> = names
        .iter()
        .map(|name| {
            let format = dcs_format::classify(name);
            let category = Category::for_format(&format);
            Classification { name, format, category }
        })
        .collect();
    if json {
        return print_json(&rows);
    }
    for row in rows {
        println!("{}\t{}\t{}", row.name, row.category, row.format);
    }
    Ok(())
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
    Ok(())
}

fn entry_heading(entry: &ReleaseEntry) -> String {
    match entry.title.as_deref() {
        Some(title) if !title.is_empty() => format!("{title} [{} {}]", entry.full_name, entry.branch_or_tag_name),
        _ => format!("{} {}", entry.full_name, entry.branch_or_tag_name),
    }
}

fn print_downloads(entry: &ReleaseEntry, downloads: &GroupedAssets, origin: &str) {
    println!("{}", entry_heading(entry));
    if downloads.set().is_empty() {
        println!("  (no downloads)");
        return;
    }
    for (category, records) in downloads.set().iter() {
        println!("  {category}:");
        for record in records {
            print_record(record, origin, 4);
            for chapter in record.chapters() {
                print_record(chapter, origin, 6);
            }
        }
    }
}

fn print_record(record: &FormatRecord, origin: &str, indent: usize) {
    let description = describe(record, origin);
    let url = record.download_url().unwrap_or_default();
    println!("{:indent$}[{}] {description}  {url}", "", description.icon);
}
