//! Build transaction records from tokenized rows and a column mapping

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tally_core::{Attribute, ColumnMapping, TransactionRecord};
use tracing::{debug, warn};

use crate::tokenizer::RawRow;

/// What to do with a row whose amount is missing or not a number
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountPolicy {
    /// Keep the record with amount 0.0
    #[default]
    Zero,
    /// Leave the row out of the batch
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum IssueKind {
    InvalidAmount { raw: String },
    MissingAmount,
}

/// A problem found in one data row. `row` is 1-based, header excluded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowIssue {
    pub row: usize,
    pub kind: IssueKind,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Materialized {
    pub records: Vec<TransactionRecord>,
    pub issues: Vec<RowIssue>,
}

/// Comma-grouped thousands, e.g. `1,234` or `12,345,678.90`
static THOUSANDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}(?:,\d{3})+(?:\.\d+)?$").expect("static thousands pattern"));

/// Parse statement amount text.
///
/// Accepts a leading `$`, comma thousands separators and `(12.50)` for
/// negatives. Any other comma (a decimal comma such as `12,50`) makes the
/// value unreadable. Returns `None` for anything that is not a finite number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.trim().replace('$', "");
    let s = s.trim();
    let (negate, s) = match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => (true, inner.trim()),
        None => (false, s),
    };
    let (minus, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    if digits.is_empty() || digits.starts_with(['-', '+']) {
        return None;
    }

    let value: f64 = if digits.contains(',') {
        if !THOUSANDS.is_match(digits) {
            return None;
        }
        digits.replace(',', "").parse().ok()?
    } else {
        digits.parse().ok()?
    };
    if !value.is_finite() {
        return None;
    }
    Some(if negate != minus { -value } else { value })
}

fn cell<'a>(row: &'a RawRow, mapping: &ColumnMapping, attr: Attribute) -> Option<&'a str> {
    mapping
        .get(attr)
        .and_then(|idx| row.get(idx))
        .map(|s| s.trim())
}

fn optional(row: &RawRow, mapping: &ColumnMapping, attr: Attribute) -> Option<String> {
    cell(row, mapping, attr)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Turn body rows (header excluded) into records.
///
/// Every row is handled on its own: short rows leave fields empty, and a
/// bad amount is resolved by `policy` and reported in `issues`.
pub fn materialize(rows: &[RawRow], mapping: &ColumnMapping, policy: AmountPolicy) -> Materialized {
    let mut out = Materialized::default();

    for (i, row) in rows.iter().enumerate() {
        let row_no = i + 1;
        let amount = match cell(row, mapping, Attribute::Amount) {
            Some(raw) if !raw.is_empty() => match parse_amount(raw) {
                Some(v) => Ok(v),
                None => Err(IssueKind::InvalidAmount {
                    raw: raw.to_string(),
                }),
            },
            _ => Err(IssueKind::MissingAmount),
        };

        let amount = match amount {
            Ok(v) => v,
            Err(kind) => {
                warn!(row = row_no, ?kind, ?policy, "row has no usable amount");
                out.issues.push(RowIssue { row: row_no, kind });
                match policy {
                    AmountPolicy::Zero => 0.0,
                    AmountPolicy::Skip => continue,
                }
            }
        };

        out.records.push(TransactionRecord {
            id: cell(row, mapping, Attribute::Id).unwrap_or_default().to_string(),
            date: cell(row, mapping, Attribute::Date).unwrap_or_default().to_string(),
            amount,
            kind: optional(row, mapping, Attribute::Type),
            category: optional(row, mapping, Attribute::Category),
            description: cell(row, mapping, Attribute::Description)
                .unwrap_or_default()
                .to_string(),
            currency: optional(row, mapping, Attribute::Currency),
            tags: Vec::new(),
            suggested_tags: Vec::new(),
        });
    }

    debug!(
        rows = rows.len(),
        records = out.records.len(),
        issues = out.issues.len(),
        "materialized rows"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> RawRow {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn date_amount_desc() -> ColumnMapping {
        ColumnMapping {
            date: Some(0),
            amount: Some(1),
            description: Some(2),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_amount_variants() {
        assert_eq!(parse_amount("12.50"), Some(12.5));
        assert_eq!(parse_amount(" -3 "), Some(-3.0));
        assert_eq!(parse_amount("$1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("(45.00)"), Some(-45.0));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("inf"), None);
        assert_eq!(parse_amount("-$1,000"), Some(-1000.0));
        assert_eq!(parse_amount("+7"), Some(7.0));
        assert_eq!(parse_amount("--3"), None);
        assert_eq!(parse_amount("-"), None);
    }

    #[test]
    fn test_decimal_comma_is_not_a_thousands_separator() {
        assert_eq!(parse_amount("12,50"), None);
        assert_eq!(parse_amount("1.234,56"), None);
        assert_eq!(parse_amount("1,23"), None);
        assert_eq!(parse_amount("12,345,678.90"), Some(12_345_678.9));
        assert_eq!(parse_amount("(1,000.00)"), Some(-1000.0));
    }

    #[test]
    fn test_decimal_comma_row_is_reported() {
        let m = materialize(&[row(&["2024-01-05", "12,50", "Coffee"])], &date_amount_desc(), AmountPolicy::Zero);
        assert_eq!(m.records[0].amount, 0.0);
        assert_eq!(
            m.issues,
            vec![RowIssue {
                row: 1,
                kind: IssueKind::InvalidAmount { raw: "12,50".into() }
            }]
        );
    }

    #[test]
    fn test_policy_and_issue_serialize() {
        assert_eq!(serde_json::to_string(&AmountPolicy::Skip).unwrap(), r#""skip""#);
        let back: AmountPolicy = serde_json::from_str(r#""zero""#).unwrap();
        assert_eq!(back, AmountPolicy::Zero);

        let issue = RowIssue {
            row: 3,
            kind: IssueKind::MissingAmount,
        };
        assert_eq!(
            serde_json::to_value(&issue).unwrap(),
            serde_json::json!({"row": 3, "kind": "MissingAmount"})
        );
    }

    #[test]
    fn test_basic_record() {
        let m = materialize(&[row(&["2024-01-05", "12.50", "Coffee"])], &date_amount_desc(), AmountPolicy::Zero);
        assert!(m.issues.is_empty());
        assert_eq!(m.records.len(), 1);
        let r = &m.records[0];
        assert_eq!(r.date, "2024-01-05");
        assert_eq!(r.amount, 12.5);
        assert_eq!(r.description, "Coffee");
        assert_eq!(r.id, "");
        assert_eq!(r.kind, None);
    }

    #[test]
    fn test_short_row_leaves_description_empty() {
        let m = materialize(&[row(&["2024-01-05", "12.50"])], &date_amount_desc(), AmountPolicy::Zero);
        assert_eq!(m.records[0].description, "");
        assert_eq!(m.records[0].amount, 12.5);
    }

    #[test]
    fn test_invalid_amount_zero_policy() {
        let rows = [row(&["2024-01-05", "n/a", "Mystery"]), row(&["2024-01-06", "4", "Tea"])];
        let m = materialize(&rows, &date_amount_desc(), AmountPolicy::Zero);
        assert_eq!(m.records.len(), 2);
        assert_eq!(m.records[0].amount, 0.0);
        assert_eq!(
            m.issues,
            vec![RowIssue {
                row: 1,
                kind: IssueKind::InvalidAmount { raw: "n/a".into() }
            }]
        );
    }

    #[test]
    fn test_invalid_amount_skip_policy() {
        let rows = [row(&["2024-01-05", "", "Blank"]), row(&["2024-01-06", "4", "Tea"])];
        let m = materialize(&rows, &date_amount_desc(), AmountPolicy::Skip);
        assert_eq!(m.records.len(), 1);
        assert_eq!(m.records[0].description, "Tea");
        assert_eq!(m.issues[0].kind, IssueKind::MissingAmount);
    }

    #[test]
    fn test_unmapped_amount_reports_every_row() {
        let mapping = ColumnMapping {
            description: Some(0),
            ..Default::default()
        };
        let m = materialize(&[row(&["a"]), row(&["b"])], &mapping, AmountPolicy::Zero);
        assert_eq!(m.records.len(), 2);
        assert_eq!(m.issues.len(), 2);
    }

    #[test]
    fn test_mapped_fields_equal_trimmed_cells() {
        let mapping = ColumnMapping {
            id: Some(0),
            kind: Some(1),
            category: Some(2),
            currency: Some(3),
            amount: Some(4),
            description: Some(5),
            date: Some(6),
        };
        let r = row(&[" 9 ", "debit", "", "EUR", "7", " Bakery ", "2024-02-02"]);
        let m = materialize(&[r.clone()], &mapping, AmountPolicy::Zero);
        let rec = &m.records[0];
        assert_eq!(rec.id, r[0].trim());
        assert_eq!(rec.kind.as_deref(), Some("debit"));
        assert_eq!(rec.category, None);
        assert_eq!(rec.currency.as_deref(), Some("EUR"));
        assert_eq!(rec.amount, 7.0);
        assert_eq!(rec.description, "Bakery");
        assert_eq!(rec.date, "2024-02-02");
    }

    #[test]
    fn test_out_of_range_index_is_absent() {
        let mapping = ColumnMapping {
            amount: Some(0),
            description: Some(42),
            ..Default::default()
        };
        let m = materialize(&[row(&["1"])], &mapping, AmountPolicy::Zero);
        assert_eq!(m.records[0].description, "");
    }
}
