//! seenlist - personal seen-media tracker CLI
//!
//! Front end over the data-access layer: lists, adds and removes records in
//! the remote collection (with local fallback), drives the one-time legacy
//! migration, and searches the movie/series metadata providers.

use anyhow::{anyhow, Result};
use std::env;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use seenlist::cache::LocalCache;
use seenlist::library::{Library, MigrationOutcome, Migrator};
use seenlist::remote::{AddOutcome, ApiClient, MediaDraft};
use seenlist::search::{OmdbClient, TvdbClient};

/// CLI command
#[derive(Debug)]
enum Command {
    /// Print the collection
    List,
    /// Add a movie or series by its external id
    Add(MediaDraft),
    /// Remove a record by surrogate id
    Remove { id: String },
    /// Search the movie metadata provider
    SearchMovie { query: String },
    /// Search the series metadata provider
    SearchShow { query: String },
    /// Explicitly drive the one-shot legacy migration
    Migrate,
    /// Show help
    Help,
}

fn print_help() {
    eprintln!(
        r#"seenlist - track the movies and series you have seen

USAGE:
    seenlist list
    seenlist add movie <imdb_id> <title> <year> <poster_url>
    seenlist add series <tvdb_id> <title> <year> <poster_url>
    seenlist remove <id>
    seenlist search-movie <query>
    seenlist search-show <query>
    seenlist migrate
    seenlist help

COMMANDS:
    list          Print the collection (falls back to the local snapshot
                  when the remote store is unreachable)
    add           Add a record; reports when it is already in your list
    remove        Delete a record by its id (idempotent)
    search-movie  Search the movie metadata provider
    search-show   Search the series metadata provider
    migrate       Move legacy local data into the remote store (runs
                  automatically before list/add/remove)
    help          Show this help message

ENVIRONMENT:
    SEENLIST_API_URL  Base URL of the media API deployment
    OMDB_API_KEY      API key for movie search
    TVDB_API_KEY      API key for series search
    RUST_LOG          Log level (trace, debug, info, warn, error)
"#
    );
}

fn parse_args() -> Result<Command> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        return Ok(Command::Help);
    }

    match args[1].as_str() {
        "list" => Ok(Command::List),
        "add" => {
            if args.len() < 7 {
                return Err(anyhow!(
                    "Usage: seenlist add <movie|series> <external_id> <title> <year> <poster_url>"
                ));
            }
            let draft = match args[2].as_str() {
                "movie" => MediaDraft::movie(&args[3], &args[4], &args[5], &args[6]),
                "series" => MediaDraft::series(&args[3], &args[4], &args[5], &args[6]),
                other => return Err(anyhow!("Unknown media kind: {}", other)),
            };
            Ok(Command::Add(draft))
        }
        "remove" => {
            if args.len() < 3 {
                return Err(anyhow!("Usage: seenlist remove <id>"));
            }
            Ok(Command::Remove {
                id: args[2].clone(),
            })
        }
        "search-movie" => {
            if args.len() < 3 {
                return Err(anyhow!("Usage: seenlist search-movie <query>"));
            }
            Ok(Command::SearchMovie {
                query: args[2..].join(" "),
            })
        }
        "search-show" => {
            if args.len() < 3 {
                return Err(anyhow!("Usage: seenlist search-show <query>"));
            }
            Ok(Command::SearchShow {
                query: args[2..].join(" "),
            })
        }
        "migrate" => Ok(Command::Migrate),
        "help" | "--help" | "-h" => Ok(Command::Help),
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            Ok(Command::Help)
        }
    }
}

fn build_library() -> Result<Arc<Library>> {
    let base_url = env::var("SEENLIST_API_URL")
        .map_err(|_| anyhow!("SEENLIST_API_URL environment variable is not set"))?;
    let store = Arc::new(ApiClient::new(&base_url)?);
    let cache = Arc::new(LocalCache::open()?);
    Ok(Arc::new(Library::new(store, cache)))
}

/// Run the one-shot migration check; an interrupted run only logs, the
/// next launch resumes from the recorded progress
async fn migrate_at_startup(library: &Arc<Library>) {
    let migrator = Migrator::new(Arc::clone(library));
    match migrator.run().await {
        MigrationOutcome::NotNeeded => {}
        MigrationOutcome::Completed { migrated, skipped } => {
            info!(migrated = migrated, skipped = skipped, "Legacy data migrated");
        }
        MigrationOutcome::Aborted { migrated, remaining } => {
            warn!(
                migrated = migrated,
                remaining = remaining,
                "Legacy migration interrupted, will resume on next run"
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let log_level = env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Parse command
    let command = match parse_args() {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_help();
            std::process::exit(1);
        }
    };

    match command {
        Command::List => {
            let library = build_library()?;
            migrate_at_startup(&library).await;

            let items = library.list().await;
            if items.is_empty() {
                println!("Nothing tracked yet.");
            } else {
                for item in items {
                    println!(
                        "{}  [{}] {} ({})",
                        item.id, item.kind, item.title, item.year
                    );
                }
            }
        }
        Command::Add(draft) => {
            let library = build_library()?;
            migrate_at_startup(&library).await;

            match library.add(&draft).await {
                Ok(AddOutcome::Added(item)) => {
                    println!("Added {} ({}) as {}", item.title, item.year, item.id);
                }
                Ok(AddOutcome::Conflict) => {
                    println!("{} is already in your list.", draft.title);
                }
                Err(e) => {
                    return Err(anyhow!("Could not add {}: {}", draft.title, e));
                }
            }
        }
        Command::Remove { id } => {
            let library = build_library()?;
            migrate_at_startup(&library).await;

            if library.remove(&id).await {
                println!("Removed {}", id);
            } else {
                return Err(anyhow!("Could not remove {}", id));
            }
        }
        Command::SearchMovie { query } => {
            let api_key = env::var("OMDB_API_KEY")
                .map_err(|_| anyhow!("OMDB_API_KEY environment variable is not set"))?;
            let client = OmdbClient::new(&api_key)?;

            let hits = client.search_movies(&query).await?;
            if hits.is_empty() {
                println!("No movies found for \"{}\".", query);
            } else {
                for hit in hits {
                    println!("{}  {} ({})", hit.external_id, hit.title, hit.year);
                }
            }
        }
        Command::SearchShow { query } => {
            let api_key = env::var("TVDB_API_KEY")
                .map_err(|_| anyhow!("TVDB_API_KEY environment variable is not set"))?;
            let client = TvdbClient::new(&api_key)?;

            let hits = client.search_shows(&query).await?;
            if hits.is_empty() {
                println!("No series found for \"{}\".", query);
            } else {
                for hit in hits {
                    println!("{}  {} ({})", hit.external_id, hit.title, hit.year);
                }
            }
        }
        Command::Migrate => {
            let library = build_library()?;
            let migrator = Migrator::new(library);
            match migrator.run().await {
                MigrationOutcome::NotNeeded => println!("Nothing to migrate."),
                MigrationOutcome::Completed { migrated, skipped } => {
                    println!(
                        "Migration complete: {} moved, {} already present.",
                        migrated, skipped
                    );
                }
                MigrationOutcome::Aborted { migrated, remaining } => {
                    return Err(anyhow!(
                        "Migration interrupted after {} items ({} remaining); run again to resume",
                        migrated,
                        remaining
                    ));
                }
            }
        }
        Command::Help => {
            print_help();
        }
    }

    Ok(())
}
