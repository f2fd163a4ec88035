//! tally-ingest: turn pasted CSV/TSV text into transaction records.
//!
//! Pipeline: detect delimiter → tokenize rows → map columns → materialize
//! records. [`ImportSession`] drives the steps in order.

pub mod delimiter;
pub mod error;
pub mod materialize;
pub mod session;
pub mod tokenizer;

pub use delimiter::{Delimiter, detect_delimiter};
pub use error::{IngestError, Result};
pub use materialize::{AmountPolicy, IssueKind, Materialized, RowIssue, materialize, parse_amount};
pub use session::{ImportSession, Stage};
pub use tokenizer::{RawRow, clean_field, split_header, split_line, tokenize};
