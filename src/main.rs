//! githelp CLI - look up Git command usage from the local catalog

use clap::{Parser, Subcommand};
use githelp::config::{self, GithelpConfig};
use githelp::ui;
use githelp::{CatalogDocument, CatalogStore, LookupEngine, SCHEMA_VERSION};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "githelp")]
#[command(version)]
#[command(about = "Git command explorer - find the right git invocation for a task")]
#[command(long_about = r#"
githelp keeps a two-level catalog of Git commands in a local SQLite file:
a command (commit, push, ...) and, under it, the options and variants with
their usage and notes.

Example usage:
  githelp load
  githelp list
  githelp show commit
  githelp lookup commit commit_amend
  githelp complete --primary push for
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the catalog database
    Init {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Also write a githelp.toml pointing at the database
        #[arg(long)]
        write_config: bool,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Load a catalog document into the database
    Load {
        /// JSON catalog document (defaults to the bundled catalog)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Drop existing data before loading
        #[arg(long)]
        reset: bool,
    },

    /// Drop and recreate the catalog tables
    Reset {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// List all commands
    List {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Show the options of a command
    Show {
        /// Command key or label
        primary: String,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Print the usage of one option of a command
    Lookup {
        /// Command key or label
        primary: String,

        /// Option key or label
        secondary: String,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Autocomplete command labels, or option labels with --primary
    Complete {
        /// Text typed so far
        #[arg(default_value = "")]
        prefix: String,

        /// Complete options of this command instead of commands
        #[arg(short, long)]
        primary: Option<String>,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Show catalog statistics
    Stats {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = config::load_config(cli.config.as_deref())?.unwrap_or_default();

    match cli.command {
        Commands::Init { database, write_config, force } => {
            let database = config.database_path(database);
            let mut store = open_store(&database)?;
            ui::success(&format!("Catalog ready at {}", database.display()));
            ui::summary_row("Schema version:", &store.schema_version()?.to_string());

            if write_config {
                let path = cli.config.clone().unwrap_or_else(config::default_config_path);
                let written = GithelpConfig {
                    database: Some(database.display().to_string()),
                    ..config.clone()
                };
                config::write_config(&path, &written, force)?;
                ui::info("Config written", &path.display().to_string());
            }
            store.close()?;
        }

        Commands::Load { file, database, reset } => {
            let file = file.or_else(|| config.document_path());
            let document = match &file {
                Some(path) => {
                    tracing::info!("Loading catalog from {}", path.display());
                    let Some(document) = CatalogDocument::read(path)? else {
                        anyhow::bail!("catalog document {} not found", path.display());
                    };
                    document
                }
                None => CatalogDocument::builtin()?,
            };

            let database = config.database_path(database);
            let mut store = open_store(&database)?;

            let stats = if reset {
                store.replace(&document)?
            } else if !store.is_empty()? {
                anyhow::bail!(
                    "catalog at {} is already populated (use --reset to reload)",
                    database.display()
                );
            } else {
                store.populate(&document)?
            };

            if stats.primary == 0 {
                ui::warn("Document has no commands, catalog is empty");
            } else {
                ui::success(&format!("Loaded {}", stats));
            }
            store.close()?;
        }

        Commands::Reset { database } => {
            let database = config.database_path(database);
            let mut store = open_store(&database)?;
            store.reset()?;
            ui::success("Catalog tables recreated, run `githelp load` to repopulate");
            store.close()?;
        }

        Commands::List { database } => {
            let store = open_store(&config.database_path(database))?;
            let engine = LookupEngine::new(&store);
            let options = engine.list_primary_options()?;

            if options.is_empty() {
                ui::warn("Catalog is empty, run `githelp load` first");
            } else {
                ui::header("Git commands");
                println!("{}", ui::primary_table(&options));
            }
        }

        Commands::Show { primary, database } => {
            let store = open_store(&config.database_path(database))?;
            let engine = LookupEngine::new(&store);

            let Some(command) = engine.resolve_primary(&primary)? else {
                anyhow::bail!("unknown command: {}", primary);
            };
            let options = engine.list_secondary_options(&command.value)?;

            ui::header(&format!("git {}", command.label));
            if options.is_empty() {
                println!("{}", ui::dim("No options recorded."));
            } else {
                println!("{}", ui::secondary_table(&options));
            }
        }

        Commands::Lookup { primary, secondary, database, format } => {
            let store = open_store(&config.database_path(database))?;
            let engine = LookupEngine::new(&store);

            let Some(card) = engine.usage_card(&primary, &secondary)? else {
                anyhow::bail!("no usage found for {} / {}", primary, secondary);
            };

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&card)?);
            } else {
                ui::section(&format!(" {} {} ", card.primary.label, card.secondary.label));
                if card.usage.is_empty() {
                    println!("{}", ui::dim("No usage recorded."));
                } else {
                    ui::usage(&card.usage);
                }
                if let Some(note) = &card.note {
                    ui::note(note);
                }
            }
        }

        Commands::Complete { prefix, primary, database } => {
            let store = open_store(&config.database_path(database))?;
            let engine = LookupEngine::new(&store);

            let labels: Vec<String> = match primary {
                Some(primary) => {
                    let Some(command) = engine.resolve_primary(&primary)? else {
                        anyhow::bail!("unknown command: {}", primary);
                    };
                    engine
                        .complete_secondary(&command.value, &prefix)?
                        .into_iter()
                        .map(|o| o.label)
                        .collect()
                }
                None => engine
                    .complete_primary(&prefix)?
                    .into_iter()
                    .map(|o| o.label)
                    .collect(),
            };

            for label in labels {
                println!("{}", label);
            }
        }

        Commands::Stats { database } => {
            let database = config.database_path(database);
            let store = open_store(&database)?;
            let stats = store.stats()?;
            let primary = stats.primary.to_string();
            let secondary = stats.secondary.to_string();
            let version = store.schema_version()?.to_string();
            let supported = SCHEMA_VERSION.to_string();

            ui::header(&format!("githelp catalog ({})", database.display()));
            println!(
                "{}",
                ui::stats_table(&[
                    ("Primary options", primary.as_str()),
                    ("Secondary options", secondary.as_str()),
                    ("Schema version", version.as_str()),
                    ("Supported version", supported.as_str()),
                ])
            );
        }
    }

    Ok(())
}

fn open_store(database: &Path) -> anyhow::Result<CatalogStore> {
    config::ensure_db_dir(database)?;
    tracing::debug!("Opening catalog {:?}", database);
    match CatalogStore::open(database) {
        Ok(store) => Ok(store),
        Err(e) => {
            ui::error(&format!("Cannot open catalog at {}", database.display()));
            Err(e.into())
        }
    }
}
