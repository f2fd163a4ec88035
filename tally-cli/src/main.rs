use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tally_core::{FileStorage, MappingAssignment, Tag, TransactionFilter, TransactionStore, parse_record_date};
use tally_finance::{Period, compute_insights};
use tally_ingest::AmountPolicy;

mod config;
mod import;
mod logging;
mod state;
mod view;

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TALLY_BUILD_SHA"), ")"),
    about = "Paste bank statements, tag transactions, see where the money goes"
)]
struct Cli {
    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import pasted CSV/TSV text (file or stdin)
    Import {
        /// Read from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,

        /// Column assignment, e.g. --map date=0 --map amount=2 (attr=- clears)
        #[arg(long = "map", value_name = "ATTR=COLUMN")]
        assignments: Vec<MappingAssignment>,

        /// Ask the LLM assistant to map header names
        #[arg(long)]
        assist: bool,

        /// Drop rows whose amount is not a number (default: keep them at 0)
        #[arg(long)]
        skip_invalid: bool,

        /// Show the preview without storing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// List stored transactions
    List {
        #[arg(long)]
        tag: Option<Tag>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
        #[arg(long, allow_negative_numbers = true)]
        min: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        max: Option<f64>,
        /// Only transactions without confirmed tags
        #[arg(long)]
        untagged: bool,
    },

    /// Add, remove or accept tags
    Tag {
        #[command(subcommand)]
        command: TagCommand,
    },

    /// Show the tag vocabulary
    Tags,

    /// Delete transactions by id
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Remove every stored transaction
    Clear {
        /// Required to confirm
        #[arg(long)]
        yes: bool,
    },

    /// Write stored transactions as CSV to stdout
    Export,

    /// Spending by tag against the previous period
    Insights {
        #[arg(long, default_value = "month")]
        period: Period,
        /// Reference date (default: today)
        #[arg(long, value_parser = parse_date)]
        as_of: Option<NaiveDate>,
    },

    /// Manage ~/.tally/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum TagCommand {
    /// Add a tag to transactions (no-op where already present)
    Add {
        tag: Tag,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    Remove {
        tag: Tag,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Confirm suggested tags
    Accept {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    parse_record_date(s).ok_or_else(|| format!("unrecognized date '{s}' (try YYYY-MM-DD)"))
}

fn open_store(cfg: &config::Config) -> Result<TransactionStore<FileStorage>> {
    let home = state::ensure_tally_home()?;
    let storage = FileStorage::new(cfg.storage_dir(&home));
    let dir = storage.dir().to_path_buf();
    TransactionStore::load(storage, cfg.storage.key.clone())
        .with_context(|| format!("load transactions from {}", dir.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let cfg = config::load_config()?;

    match cli.command {
        Command::Import {
            file,
            assignments,
            assist,
            skip_invalid,
            dry_run,
        } => {
            let mut store = open_store(&cfg)?;
            let policy = if skip_invalid {
                AmountPolicy::Skip
            } else {
                cfg.import.amount_policy
            };
            import::run_import(
                &mut store,
                import::ImportOptions {
                    file: file.as_deref(),
                    assignments: &assignments,
                    assist: (assist || cfg.assist.enabled).then_some(&cfg.assist),
                    policy,
                    dry_run,
                },
            )
            .await?;
        }

        Command::List {
            tag,
            search,
            from,
            to,
            min,
            max,
            untagged,
        } => {
            let store = open_store(&cfg)?;
            let filter = TransactionFilter {
                tag,
                search,
                from,
                to,
                min_amount: min,
                max_amount: max,
                untagged,
            };
            let shown = filter.apply(store.records());
            let total: f64 = shown.iter().map(|r| r.amount).sum();
            let count = shown.len();
            view::print_records("Transactions", shown);
            println!("\n{count} of {} transactions, net {total:.2}", store.len());
        }

        Command::Tag { command } => {
            let mut store = open_store(&cfg)?;
            let (changed, ids) = match command {
                TagCommand::Add { tag, ids } => (store.add_tag(&ids, tag), ids),
                TagCommand::Remove { tag, ids } => (store.remove_tag(&ids, tag), ids),
                TagCommand::Accept { ids } => (store.accept_suggested(&ids), ids),
            };
            report_unknown(&store, &ids);
            store.save()?;
            println!("Updated {changed} transaction(s).");
        }

        Command::Tags => view::print_tags(),

        Command::Delete { ids } => {
            let mut store = open_store(&cfg)?;
            report_unknown(&store, &ids);
            let removed = store.delete(&ids);
            store.save()?;
            println!("Deleted {removed} transaction(s); {} remain.", store.len());
        }

        Command::Clear { yes } => {
            if !yes {
                bail!("refusing to clear without --yes");
            }
            let mut store = open_store(&cfg)?;
            let n = store.len();
            store.clear()?;
            println!("Removed {n} transaction(s).");
        }

        Command::Export => {
            let store = open_store(&cfg)?;
            tally_core::export::write_csv(std::io::stdout().lock(), store.records())
                .context("export CSV")?;
        }

        Command::Insights { period, as_of } => {
            let store = open_store(&cfg)?;
            let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
            let ins = compute_insights(store.records(), as_of, period);
            view::print_insights(&ins);
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let s = toml::to_string_pretty(&cfg).context("serialize config")?;
                println!("# {}\n{s}", config::config_path()?.display());
            }
        },
    }

    Ok(())
}

fn report_unknown<S: tally_core::Storage>(store: &TransactionStore<S>, ids: &[String]) {
    for id in ids {
        if store.get(id).is_none() {
            eprintln!("warning: no transaction with id '{id}'");
        }
    }
}
