//! Command-line probe: runs one fetch-and-assemble pass against a live
//! backend and prints the result as JSON. Useful for eyeballing what the
//! rendering layer would receive.

use std::sync::Arc;

use anyhow::{bail, Result};
use tracing_subscriber::EnvFilter;

use songstats::api::{CatalogApi, HttpCatalogApi};
use songstats::config::Config;
use songstats::pipeline::{assemble_difficulty, assemble_difficulty_buckets, assemble_vintage};

const USAGE: &str =
    "usage: songstats <vintage | difficulty [bins] | difficulty2 [bins] | search <term> [--exact]>";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = Config::from_env();
    let api: Arc<dyn CatalogApi> = Arc::new(HttpCatalogApi::new(&cfg)?);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let output = match args.first().map(String::as_str) {
        Some("vintage") => {
            let chart = assemble_vintage(api.vintage_stats().await?);
            serde_json::to_string_pretty(&chart)?
        }
        Some("difficulty") => {
            let bins = parse_bins(args.get(1), cfg.default_bins)?;
            let chart = assemble_difficulty(api.difficulty_stats(bins).await?, bins);
            serde_json::to_string_pretty(&chart)?
        }
        Some("difficulty2") => {
            let bins = parse_bins(args.get(1), cfg.default_bins)?;
            let chart = assemble_difficulty_buckets(api.difficulty_buckets(bins).await?);
            serde_json::to_string_pretty(&chart)?
        }
        Some("search") => {
            let Some(term) = args.get(1) else {
                bail!(USAGE);
            };
            let exact = args.iter().any(|a| a == "--exact");
            let rows = api.search(term, exact).await?;
            serde_json::to_string_pretty(&rows)?
        }
        _ => bail!(USAGE),
    };
    println!("{}", output);
    Ok(())
}

fn parse_bins(arg: Option<&String>, default: u32) -> Result<u32> {
    match arg {
        None => Ok(default),
        Some(raw) => match raw.parse::<u32>() {
            Ok(bins) if bins > 0 => Ok(bins),
            _ => bail!("bin count must be a positive integer, got {:?}", raw),
        },
    }
}
