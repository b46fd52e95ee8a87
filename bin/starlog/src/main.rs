//! Starlog command line.
//!
//! Drives the catalog search stack against local JSON catalogs:
//! - `suggest` replays keystrokes into a debounced autocomplete box
//! - `resolve` looks for a readable copy of a book across catalogs

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use starlog_catalog::{Autocomplete, Candidate, CopyQuery, DigitalCopyResolver, SearchProvider, StaticCatalog};
use starlog_config::Config;
use starlog_debounce::SearchDebouncer;
use tracing::{debug, info};

/// Starlog command line arguments.
#[derive(Parser, Debug)]
#[command(name = "starlog")]
#[command(about = "Catalog search tools for the starlog reading tracker")]
struct Args {
	/// Config file (defaults to $XDG_CONFIG_HOME/starlog/config.toml)
	#[arg(short, long, value_name = "PATH", global = true)]
	config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long, global = true)]
	verbose: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Replay successive search box contents and show what the box ends up suggesting
	Suggest {
		/// JSON catalog to search
		#[arg(long, value_name = "FILE")]
		catalog: PathBuf,

		/// Pause between keystrokes, in milliseconds
		#[arg(long, default_value_t = 50)]
		interval_ms: u64,

		/// Search box contents after each keystroke, e.g. `D Du Dun Dune`
		#[arg(required = true)]
		keystrokes: Vec<String>,
	},

	/// Find a readable digital copy of a book
	Resolve {
		/// JSON catalogs to search, in priority order
		#[arg(long = "catalog", value_name = "FILE", required = true)]
		catalogs: Vec<PathBuf>,

		#[arg(long)]
		title: String,

		#[arg(long)]
		author: Option<String>,

		/// Print the matched candidate as JSON
		#[arg(long)]
		json: bool,
	},
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
	let args = Args::parse();

	let subscriber = tracing_subscriber::fmt()
		.with_max_level(if args.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO })
		.with_writer(std::io::stderr)
		.finish();
	tracing::subscriber::set_global_default(subscriber)?;

	let config = Config::load(args.config.as_deref()).context("failed to load configuration")?;
	debug!(?config, "configuration loaded");

	match args.command {
		Command::Suggest {
			catalog,
			interval_ms,
			keystrokes,
		} => suggest(&config, &catalog, Duration::from_millis(interval_ms), &keystrokes).await,
		Command::Resolve { catalogs, title, author, json } => {
			let query = CopyQuery { title, author };
			resolve(&config, &catalogs, &query, json).await
		}
	}
}

fn load_catalog(path: &Path) -> Result<StaticCatalog> {
	let catalog = StaticCatalog::from_json_file(path).with_context(|| format!("failed to load catalog {}", path.display()))?;
	info!(catalog = catalog.name(), entries = catalog.len(), "catalog loaded");
	Ok(catalog)
}

fn describe(candidate: &Candidate) -> String {
	match candidate.primary_author() {
		Some(author) => format!("{} ({author})", candidate.title),
		None => candidate.title.clone(),
	}
}

async fn suggest(config: &Config, catalog: &Path, interval: Duration, keystrokes: &[String]) -> Result<()> {
	let catalog = load_catalog(catalog)?;
	let debouncer = SearchDebouncer::new(config.search.debounce());
	let input = Autocomplete::new("book-search", debouncer.clone(), Arc::new(catalog), config.search.clone());

	for text in keystrokes {
		input.input(text);
		tokio::time::sleep(interval).await;
	}
	while !debouncer.is_empty() {
		tokio::time::sleep(Duration::from_millis(10)).await;
	}

	let state = input.snapshot();
	let stats = debouncer.stats();
	println!("query: {}", state.query);
	println!("lookups issued: {} of {} scheduled", stats.started, stats.scheduled);
	if state.suggestions.is_empty() {
		println!("no suggestions");
	}
	for (index, candidate) in state.suggestions.iter().enumerate() {
		println!("{:>3}. {}", index + 1, describe(candidate));
	}
	Ok(())
}

async fn resolve(config: &Config, catalogs: &[PathBuf], query: &CopyQuery, json: bool) -> Result<()> {
	let mut resolver = DigitalCopyResolver::new(config.resolver.clone());
	for path in catalogs {
		resolver = resolver.with_provider(Arc::new(load_catalog(path)?));
	}

	let Some(found) = resolver.resolve(query).await? else {
		println!("no match for {}", query.title);
		return Ok(());
	};

	if json {
		println!("{}", serde_json::to_string_pretty(&found.candidate)?);
		return Ok(());
	}
	println!("{} [{} @ {:.2}]", describe(&found.candidate), found.provider, found.score);
	if let Some(link) = found.candidate.best_link() {
		println!("{:?}: {}", link.format, link.url);
	}
	Ok(())
}
