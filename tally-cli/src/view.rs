//! Plain-text rendering for the terminal

use tally_core::{Attribute, ColumnMapping, Tag, TransactionRecord};
use tally_finance::Insights;

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

fn tag_list(tags: &[Tag]) -> String {
    tags.iter()
        .map(|t| format!("{} {}", t.icon(), t.label()))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn print_mapping(header: &[String], mapping: &ColumnMapping) {
    println!("Column mapping:");
    for attr in Attribute::ALL {
        let target = match mapping.get(attr) {
            Some(i) => match header.get(i) {
                Some(name) => format!("{i} ({name})"),
                None => format!("{i} (beyond header)"),
            },
            None => "-".to_string(),
        };
        println!("  {:<12} {}", attr.name(), target);
    }
    println!();
}

pub fn print_records<'a>(title: &str, records: impl IntoIterator<Item = &'a TransactionRecord>) {
    println!("## {title}\n");
    println!(
        "{:<12} {:<12} {:>12} {:<32} {:<24} {}",
        "ID", "DATE", "AMOUNT", "DESCRIPTION", "TAGS", "SUGGESTED"
    );
    for r in records {
        let amount = match &r.currency {
            Some(c) => format!("{:.2} {c}", r.amount),
            None => format!("{:.2}", r.amount),
        };
        println!(
            "{:<12} {:<12} {:>12} {:<32} {:<24} {}",
            truncate(&r.id, 12),
            truncate(&r.date, 12),
            amount,
            truncate(&r.description, 32),
            tag_list(&r.tags),
            tag_list(&r.suggested_tags)
        );
    }
}

pub fn print_tags() {
    for t in Tag::ALL {
        println!("{} {:<15} {}", t.icon(), t.label(), t.color());
    }
}

pub fn print_insights(ins: &Insights) {
    println!(
        "# Spending this {} (since {}, compared with {})\n",
        ins.period, ins.current_start, ins.previous_start
    );
    println!("Total spending:   ${:.2}", ins.total_spending);
    println!("Money in:         ${:.2}", ins.total_income);
    match ins.biggest_tag {
        Some(t) => println!("Biggest tag:      {} {}", t.icon(), t.label()),
        None => println!("Biggest tag:      -"),
    }
    match ins.most_active_day {
        Some(d) => println!("Most active day:  {d}"),
        None => println!("Most active day:  -"),
    }

    if !ins.by_tag.is_empty() {
        println!("\n## By tag\n");
        println!("{:<18} {:>12} {:>12} {:>7}", "TAG", "PREVIOUS", "CURRENT", "SHARE");
        for row in &ins.by_tag {
            let share = ins
                .distribution
                .iter()
                .find(|s| s.tag == row.tag)
                .map_or(0.0, |s| s.share * 100.0);
            println!(
                "{} {:<15} {:>12.2} {:>12.2} {:>6.0}%",
                row.tag.icon(),
                row.tag.label(),
                row.previous,
                row.current,
                share
            );
        }
    }

    if !ins.facts.is_empty() {
        println!("\n## Interesting facts\n");
        for f in &ins.facts {
            println!("- {}", f.message);
        }
    }

    if ins.undated > 0 {
        println!("\n({} transactions skipped: unreadable date)", ins.undated);
    }
}
