//! Split pasted text into rows of trimmed, quote-stripped fields.
//!
//! This is deliberately not a CSV parser: a delimiter or a quote inside a
//! quoted field is not handled.

use crate::delimiter::Delimiter;

/// One delimited line of pasted input
pub type RawRow = Vec<String>;

/// Trim a field and strip one surrounding pair of double quotes
pub fn clean_field(raw: &str) -> String {
    let t = raw.trim();
    let t = t
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(t);
    t.trim().to_string()
}

pub fn split_line(line: &str, delimiter: Delimiter) -> RawRow {
    line.split(delimiter.as_char()).map(clean_field).collect()
}

/// Tokenize every non-blank line. The first row is the header by convention.
/// A leading byte order mark is ignored.
pub fn tokenize(text: &str, delimiter: Delimiter) -> Vec<RawRow> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| split_line(line, delimiter))
        .collect()
}

/// Split tokenized rows into header and body
pub fn split_header(mut rows: Vec<RawRow>) -> (RawRow, Vec<RawRow>) {
    if rows.is_empty() {
        return (Vec::new(), Vec::new());
    }
    let header = rows.remove(0);
    (header, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_and_strip_quotes() {
        assert_eq!(clean_field("  \"Coffee\"  "), "Coffee");
        assert_eq!(clean_field("\" padded \""), "padded");
        assert_eq!(clean_field("\"half"), "\"half");
        assert_eq!(clean_field("\"\""), "");
        // only one pair is removed
        assert_eq!(clean_field("\"\"x\"\""), "\"x\"");
    }

    #[test]
    fn test_tokenize_crlf_and_blank_lines() {
        let rows = tokenize("Date,Amount\r\n\r\n2024-01-05, 12.50 \r\n", Delimiter::Comma);
        assert_eq!(
            rows,
            vec![
                vec!["Date".to_string(), "Amount".to_string()],
                vec!["2024-01-05".to_string(), "12.50".to_string()],
            ]
        );
    }

    #[test]
    fn test_tokenize_tabs_keeps_commas() {
        let rows = tokenize("Date\tDescription\n2024-01-05\tCoffee, large", Delimiter::Tab);
        assert_eq!(rows[1][1], "Coffee, large");
    }

    #[test]
    fn test_quoted_delimiter_is_a_known_limitation() {
        let rows = tokenize("\"Coffee, large\",3", Delimiter::Comma);
        assert_eq!(rows[0], vec!["\"Coffee", "large\"", "3"]);
    }

    #[test]
    fn test_round_trip_plain_values() {
        let values = ["2024-01-05", "12.50", "Corner Store", "", "x y z"];
        for delimiter in [Delimiter::Comma, Delimiter::Tab] {
            let sep = delimiter.as_char().to_string();
            let line = values.join(sep.as_str());
            let row = split_line(&line, delimiter);
            assert_eq!(row, values.iter().map(|v| v.to_string()).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_split_header() {
        let (header, body) = split_header(tokenize("a,b\n1,2\n3", Delimiter::Comma));
        assert_eq!(header, vec!["a", "b"]);
        assert_eq!(body.len(), 2);
        assert_eq!(body[1], vec!["3"]);

        let (header, body) = split_header(Vec::new());
        assert!(header.is_empty() && body.is_empty());
    }
}
