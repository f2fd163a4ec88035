//! Transaction record as imported and persisted

use serde::{Deserialize, Serialize};

use crate::tag::Tag;

/// A single imported transaction, tagged by the user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TransactionRecord {
    /// Identifier from the source column, or assigned by the store
    pub id: String,
    /// Date text exactly as it appeared in the source
    pub date: String,
    pub amount: f64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Tags confirmed by the user (no duplicates)
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Tags proposed at import time, not yet confirmed
    #[serde(rename = "suggestedTags", default)]
    pub suggested_tags: Vec<Tag>,
}

impl TransactionRecord {
    pub fn new(
        id: impl Into<String>,
        date: impl Into<String>,
        amount: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            date: date.into(),
            amount,
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    /// Add a tag; returns false when it was already present
    pub fn add_tag(&mut self, tag: Tag) -> bool {
        if self.has_tag(tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn remove_tag(&mut self, tag: Tag) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| *t != tag);
        self.tags.len() != before
    }

    /// Promote suggested tags into confirmed tags
    pub fn accept_suggested(&mut self) -> bool {
        let suggested = std::mem::take(&mut self.suggested_tags);
        let mut changed = false;
        for tag in suggested {
            changed |= self.add_tag(tag);
        }
        changed
    }

    /// Tag used to bucket this record in summaries
    pub fn primary_tag(&self) -> Tag {
        self.tags
            .first()
            .or_else(|| self.suggested_tags.first())
            .copied()
            .unwrap_or(Tag::Other)
    }

    /// Money going out; credits such as income and refunds are not expenses
    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_tag_is_set_like() {
        let mut r = TransactionRecord::new("t1", "2024-01-05", -12.5, "Coffee");
        assert!(r.add_tag(Tag::Dining));
        assert!(!r.add_tag(Tag::Dining));
        assert_eq!(r.tags, vec![Tag::Dining]);
        assert!(r.remove_tag(Tag::Dining));
        assert!(!r.remove_tag(Tag::Dining));
    }

    #[test]
    fn test_accept_suggested_merges() {
        let mut r = TransactionRecord::new("t1", "2024-01-05", -60.0, "Safeway");
        r.tags.push(Tag::Groceries);
        r.suggested_tags = vec![Tag::Groceries, Tag::Shopping];
        assert!(r.accept_suggested());
        assert_eq!(r.tags, vec![Tag::Groceries, Tag::Shopping]);
        assert!(r.suggested_tags.is_empty());
    }

    #[test]
    fn test_primary_tag_fallbacks() {
        let mut r = TransactionRecord::new("t1", "2024-01-05", 1.0, "x");
        assert_eq!(r.primary_tag(), Tag::Other);
        r.suggested_tags.push(Tag::Travel);
        assert_eq!(r.primary_tag(), Tag::Travel);
        r.tags.push(Tag::Health);
        assert_eq!(r.primary_tag(), Tag::Health);
    }

    #[test]
    fn test_json_field_names() {
        let mut r = TransactionRecord::new("t1", "2024-01-05", 12.5, "Coffee");
        r.kind = Some("debit".into());
        r.suggested_tags.push(Tag::Dining);
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["type"], "debit");
        assert_eq!(v["suggestedTags"][0], "Dining");
        assert!(v.get("category").is_none());

        let back: TransactionRecord = serde_json::from_value(v).unwrap();
        assert_eq!(back, r);
    }
}
