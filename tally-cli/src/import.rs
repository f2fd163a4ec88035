//! `tally import`: paste → tokenize → map → preview → store

use anyhow::{Context, Result, bail};
use std::io::Read;
use std::path::Path;
use tally_core::{ColumnMapping, MappingAssignment, Storage, TransactionStore};
use tally_finance::{HeaderAssistant, Outcome, apply_suggestions};
use tally_ingest::{AmountPolicy, ImportSession, IssueKind, Materialized};
use tracing::{info, warn};

use crate::config::AssistSection;
use crate::view;

pub struct ImportOptions<'a> {
    pub file: Option<&'a Path>,
    pub assignments: &'a [MappingAssignment],
    pub assist: Option<&'a AssistSection>,
    pub policy: AmountPolicy,
    pub dry_run: bool,
}

pub fn read_paste(file: Option<&Path>) -> Result<String> {
    match file {
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("read {}", p.display())),
        None => {
            let mut s = String::new();
            std::io::stdin()
                .read_to_string(&mut s)
                .context("read pasted text from stdin")?;
            Ok(s)
        }
    }
}

/// Build the mapping in layers: header-name guess, then the assistant
/// (if asked), then explicit `--map` flags.
async fn build_mapping(session: &ImportSession, opts: &ImportOptions<'_>) -> ColumnMapping {
    let mut mapping = ColumnMapping::from_header_guess(session.header());

    if let Some(section) = opts.assist {
        let header_line = session.header_line().unwrap_or_default();
        match HeaderAssistant::new(section.to_assist_config()) {
            Ok(assistant) => {
                let cfg = assistant.config();
                info!(provider = %cfg.provider, model = %cfg.model, "asking assistant for a column mapping");
                match assistant.suggest_mapping(header_line, session.header()).await {
                    Outcome::Assisted { mapping: assisted, file_type } => {
                        info!(?file_type, "using assistant column mapping");
                        mapping.merge(&assisted);
                    }
                    Outcome::Fallback { notice } => eprintln!("note: {notice}"),
                }
            }
            Err(e) => {
                warn!(error = %e, "could not build assistant client");
                eprintln!("note: automatic column mapping unavailable ({e}); map them manually.");
            }
        }
    }

    for a in opts.assignments {
        mapping.set_mapping(a.attribute, a.column);
    }
    mapping
}

pub async fn run_import<S: Storage>(store: &mut TransactionStore<S>, opts: ImportOptions<'_>) -> Result<()> {
    let text = read_paste(opts.file)?;

    let mut session = ImportSession::new(opts.policy);
    session.paste(text)?;
    session.tokenize()?;

    let mapping = build_mapping(&session, &opts).await;
    session.apply_mapping(mapping)?;

    println!(
        "Detected {:?}-separated input: {} columns, {} rows\n",
        session.delimiter().unwrap_or(tally_ingest::Delimiter::Comma),
        session.header().len(),
        session.rows().len()
    );
    view::print_mapping(session.header(), session.mapping());

    if session.mapping().is_empty() {
        bail!("no columns mapped; pass --map attribute=column (e.g. --map date=0 --map amount=1)");
    }

    let policy = session.policy();
    let preview = session.preview()?;
    view::print_records("Preview", preview.records.iter().take(10));
    if preview.records.len() > 10 {
        println!("... and {} more", preview.records.len() - 10);
    }
    print_issues(preview, policy);

    if opts.dry_run {
        println!("\nDry run: nothing stored.");
        return Ok(());
    }

    let count = session.import(store, apply_suggestions)?;
    store
        .save()
        .with_context(|| format!("save transactions under '{}'", store.key()))?;
    println!("\nImported {count} transactions ({} stored).", store.len());
    Ok(())
}

fn print_issues(m: &Materialized, policy: AmountPolicy) {
    if m.issues.is_empty() {
        return;
    }
    let action = match policy {
        AmountPolicy::Zero => "amount set to 0",
        AmountPolicy::Skip => "row skipped",
    };
    println!("\n{} row(s) without a usable amount ({action}):", m.issues.len());
    for issue in m.issues.iter().take(20) {
        match &issue.kind {
            IssueKind::InvalidAmount { raw } => println!("  row {}: not a number: {raw:?}", issue.row),
            IssueKind::MissingAmount => println!("  row {}: amount missing", issue.row),
        }
    }
}
