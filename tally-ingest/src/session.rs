//! Import session state machine.
//!
//! `Idle → Pasted → Tokenized → Mapped → Previewed → Imported`. Every step
//! is driven by the caller; pasting again always restarts the session.

use serde::Serialize;
use tally_core::{Attribute, ColumnMapping, Storage, TransactionRecord, TransactionStore};
use tracing::{debug, info};

use crate::delimiter::{Delimiter, detect_delimiter};
use crate::error::{IngestError, Result};
use crate::materialize::{AmountPolicy, Materialized, materialize};
use crate::tokenizer::{RawRow, split_header, tokenize};

/// Byte order mark that spreadsheet exports often put before the header
const BOM: char = '\u{feff}';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Stage {
    #[default]
    Idle,
    Pasted,
    Tokenized,
    Mapped,
    Previewed,
    Imported,
}

#[derive(Debug, Default)]
pub struct ImportSession {
    stage: Stage,
    text: String,
    delimiter: Option<Delimiter>,
    header: RawRow,
    rows: Vec<RawRow>,
    mapping: ColumnMapping,
    policy: AmountPolicy,
    preview: Option<Materialized>,
}

impl ImportSession {
    pub fn new(policy: AmountPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn delimiter(&self) -> Option<Delimiter> {
        self.delimiter
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Header line exactly as pasted
    pub fn header_line(&self) -> Option<&str> {
        self.text.lines().find(|l| !l.trim().is_empty())
    }

    /// Data rows, header excluded
    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    pub fn policy(&self) -> AmountPolicy {
        self.policy
    }

    /// Restart with new pasted text. Empty text leaves the session idle.
    pub fn paste(&mut self, text: impl Into<String>) -> Result<()> {
        let policy = self.policy;
        *self = Self::new(policy);

        let mut text = text.into();
        if text.starts_with(BOM) {
            text.drain(..BOM.len_utf8());
        }
        if text.trim().is_empty() {
            return Err(IngestError::EmptyInput);
        }
        self.text = text;
        self.stage = Stage::Pasted;
        Ok(())
    }

    pub fn tokenize(&mut self) -> Result<()> {
        self.expect(&[Stage::Pasted], "tokenize")?;

        let delimiter = detect_delimiter(self.header_line().unwrap_or_default());
        let (header, rows) = split_header(tokenize(&self.text, delimiter));
        debug!(?delimiter, columns = header.len(), rows = rows.len(), "tokenized paste");

        self.delimiter = Some(delimiter);
        self.header = header;
        self.rows = rows;
        self.stage = Stage::Tokenized;
        Ok(())
    }

    pub fn set_mapping(&mut self, attr: Attribute, column: Option<usize>) -> Result<()> {
        self.expect(&[Stage::Tokenized, Stage::Mapped, Stage::Previewed], "change the mapping")?;
        self.mapping.set_mapping(attr, column);
        self.mark_mapped();
        Ok(())
    }

    /// Replace the whole mapping
    pub fn apply_mapping(&mut self, mapping: ColumnMapping) -> Result<()> {
        self.expect(&[Stage::Tokenized, Stage::Mapped, Stage::Previewed], "change the mapping")?;
        self.mapping = mapping;
        self.mark_mapped();
        Ok(())
    }

    pub fn preview(&mut self) -> Result<&Materialized> {
        self.expect(&[Stage::Mapped, Stage::Previewed], "preview")?;
        let preview = self
            .preview
            .insert(materialize(&self.rows, &self.mapping, self.policy));
        self.stage = Stage::Previewed;
        Ok(preview)
    }

    /// Store the previewed records, each passed through `suggest` first.
    /// Does not save the store.
    pub fn import<S: Storage>(
        &mut self,
        store: &mut TransactionStore<S>,
        mut suggest: impl FnMut(&mut TransactionRecord),
    ) -> Result<usize> {
        self.expect(&[Stage::Previewed], "import")?;
        let mut records = self
            .preview
            .take()
            .map(|m| m.records)
            .unwrap_or_default();
        for r in &mut records {
            suggest(r);
        }
        let count = store.import(records);
        self.stage = Stage::Imported;
        info!(count, "import session finished");
        Ok(count)
    }

    fn mark_mapped(&mut self) {
        self.preview = None;
        self.stage = Stage::Mapped;
    }

    fn expect(&self, allowed: &[Stage], action: &'static str) -> Result<()> {
        let from = self.stage();
        if allowed.contains(&from) {
            Ok(())
        } else {
            Err(IngestError::InvalidTransition { from, action })
        }
    }
}
