//! CSV export of stored records

use std::io::Write;

use crate::error::Result;
use crate::record::TransactionRecord;

const HEADER: [&str; 9] = [
    "id",
    "date",
    "amount",
    "type",
    "category",
    "description",
    "currency",
    "tags",
    "suggested_tags",
];

fn join_tags(tags: &[crate::tag::Tag]) -> String {
    tags.iter().map(|t| t.label()).collect::<Vec<_>>().join(";")
}

/// Write records as RFC-4180 CSV with a header row. Tags are `;`-joined.
pub fn write_csv<'a, W: Write>(
    out: W,
    records: impl IntoIterator<Item = &'a TransactionRecord>,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(HEADER)?;
    for r in records {
        let amount = r.amount.to_string();
        let tags = join_tags(&r.tags);
        let suggested = join_tags(&r.suggested_tags);
        wtr.write_record([
            r.id.as_str(),
            r.date.as_str(),
            amount.as_str(),
            r.kind.as_deref().unwrap_or(""),
            r.category.as_deref().unwrap_or(""),
            r.description.as_str(),
            r.currency.as_deref().unwrap_or(""),
            tags.as_str(),
            suggested.as_str(),
        ])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::Tag;

    #[test]
    fn test_export_quotes_embedded_commas() {
        let mut r = TransactionRecord::new("a", "2024-01-05", -12.5, "Coffee, large");
        r.tags = vec![Tag::Dining, Tag::Other];
        let mut buf = Vec::new();
        write_csv(&mut buf, [&r]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("id,date,amount,type,category,description,currency,tags,suggested_tags")
        );
        assert_eq!(
            lines.next(),
            Some("a,2024-01-05,-12.5,,,\"Coffee, large\",,Dining;Other,")
        );
    }
}
