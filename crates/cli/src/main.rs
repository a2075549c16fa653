mod cli;
mod output;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use turok_core::searcher::list_sources;
use turok_core::{load_config_or_default, Config, SearchQuery, Searcher, TorrentSearcher};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so results on stdout stay pipeable. `RUST_LOG` wins over
/// the verbosity flag.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    debug!("Loading configuration from {:?}", cli.config);
    let mut config = load_config_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    match cli.command {
        Commands::Search {
            query,
            limit,
            sort,
            timeout,
            magnet,
            json,
        } => {
            if let Some(timeout) = timeout {
                config.search.timeout_secs = timeout;
            }
            let query = SearchQuery::new(query.join(" "))
                .with_limit(limit.unwrap_or(config.search.default_limit))
                .with_sort(sort.unwrap_or(config.search.default_sort));
            search(&config, query, magnet, json).await
        }
        Commands::Sites { all } => {
            let sources: Vec<_> = list_sources(&config)
                .into_iter()
                .filter(|s| all || s.enabled)
                .collect();
            print!("{}", output::render_sources(&sources));
            Ok(())
        }
    }
}

async fn search(config: &Config, query: SearchQuery, magnet: Option<usize>, json: bool) -> Result<()> {
    let searcher = TorrentSearcher::from_config(config).context("Invalid configuration")?;
    let mut outcome = searcher.search(&query).await?;

    let link = match magnet {
        Some(index) => {
            let total = outcome.records.len();
            let Some(record) = index.checked_sub(1).and_then(|i| outcome.records.get_mut(i)) else {
                bail!("No result #{} (search returned {})", index, total);
            };
            let link = searcher
                .resolve_magnet(record)
                .await
                .with_context(|| format!("Failed to fetch magnet for \"{}\"", record.title))?;
            match link {
                Some(link) => Some(link),
                None => bail!("{} has no magnet link for \"{}\"", record.source, record.title),
            }
        }
        None => None,
    };

    if json {
        let rendered =
            output::render_json(&outcome, link.as_deref()).context("Failed to serialize results")?;
        println!("{}", rendered);
    } else {
        print!("{}", output::render_outcome(&outcome));
        if let Some(link) = link {
            println!("{}", link);
        }
    }

    Ok(())
}
