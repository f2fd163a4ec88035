//! Filtering and search over stored records

use chrono::NaiveDate;

use crate::record::TransactionRecord;
use crate::tag::Tag;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y", "%Y/%m/%d"];

/// Parse a record's free-form date text, trying the common statement formats
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// All conditions are ANDed; unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub tag: Option<Tag>,
    /// Case-insensitive substring over description, category, type and id
    pub search: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    /// Only records with no confirmed tags
    pub untagged: bool,
}

impl TransactionFilter {
    pub fn matches(&self, r: &TransactionRecord) -> bool {
        if let Some(tag) = self.tag {
            if !r.has_tag(tag) {
                return false;
            }
        }
        if self.untagged && !r.tags.is_empty() {
            return false;
        }
        if let Some(q) = self.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let q = q.to_lowercase();
            let hit = [
                Some(r.description.as_str()),
                r.category.as_deref(),
                r.kind.as_deref(),
                Some(r.id.as_str()),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&q));
            if !hit {
                return false;
            }
        }
        if self.from.is_some() || self.to.is_some() {
            let Some(date) = parse_record_date(&r.date) else {
                return false;
            };
            if self.from.is_some_and(|from| date < from) || self.to.is_some_and(|to| date > to) {
                return false;
            }
        }
        if self.min_amount.is_some_and(|min| r.amount < min) {
            return false;
        }
        if self.max_amount.is_some_and(|max| r.amount > max) {
            return false;
        }
        true
    }

    pub fn apply<'a>(&self, records: &'a [TransactionRecord]) -> Vec<&'a TransactionRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<TransactionRecord> {
        let mut coffee = TransactionRecord::new("a", "2024-01-05", -4.5, "Blue Bottle Coffee");
        coffee.tags.push(Tag::Dining);
        let mut rent = TransactionRecord::new("b", "02/01/2024", -1800.0, "Rent");
        rent.category = Some("Housing".into());
        let odd = TransactionRecord::new("c", "sometime", 100.0, "Refund");
        vec![coffee, rent, odd]
    }

    fn ids(v: Vec<&TransactionRecord>) -> Vec<&str> {
        v.into_iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_parse_record_date_formats() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(parse_record_date("2024-02-01"), Some(d));
        assert_eq!(parse_record_date("02/01/2024"), Some(d));
        assert_eq!(parse_record_date(" 01.02.2024 "), Some(d));
        assert_eq!(parse_record_date("yesterday"), None);
    }

    #[test]
    fn test_search_and_tag() {
        let records = sample();
        let f = TransactionFilter {
            search: Some("housing".into()),
            ..Default::default()
        };
        assert_eq!(ids(f.apply(&records)), vec!["b"]);

        let f = TransactionFilter {
            tag: Some(Tag::Dining),
            ..Default::default()
        };
        assert_eq!(ids(f.apply(&records)), vec!["a"]);

        let f = TransactionFilter {
            untagged: true,
            ..Default::default()
        };
        assert_eq!(ids(f.apply(&records)), vec!["b", "c"]);
    }

    #[test]
    fn test_date_bounds_skip_unparseable() {
        let records = sample();
        let f = TransactionFilter {
            from: NaiveDate::from_ymd_opt(2024, 1, 10),
            ..Default::default()
        };
        assert_eq!(ids(f.apply(&records)), vec!["b"]);
    }

    #[test]
    fn test_amount_range() {
        let records = sample();
        let f = TransactionFilter {
            min_amount: Some(-100.0),
            max_amount: Some(0.0),
            ..Default::default()
        };
        assert_eq!(ids(f.apply(&records)), vec!["a"]);
    }
}
