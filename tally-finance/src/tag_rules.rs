//! Deterministic tag suggestions from description, category and type text.
//!
//! Keyword rules are checked in order; the first hit wins. Nothing is sent
//! anywhere; records with no hit get `Other`.

use regex::Regex;
use std::sync::LazyLock;
use tally_core::{Tag, TransactionRecord};

struct Rule {
    tag: Tag,
    pattern: Regex,
}

fn rule(tag: Tag, words: &str) -> Rule {
    Rule {
        tag,
        pattern: Regex::new(&format!(r"(?i)\b(?:{words})\b")).expect("static tag rule pattern"),
    }
}

// Whole words only; `\w*` marks a deliberate prefix.
static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        rule(
            Tag::Groceries,
            "groceries|grocery|supermarkets?|safeway|trader joe's|trader joes?|whole foods|kroger|aldi|lidl|costco|h-e-b|markets?",
        ),
        rule(
            Tag::Dining,
            "restaurants?|cafe|café|coffee|starbucks|pizza|pizzeria|burgers?|sushi|doordash|uber eats|grubhub|bar & grill|pub|dining|bakery",
        ),
        rule(
            Tag::Transportation,
            "uber|lyft|taxi|metro|transit|clipper|parking|fuel|gas station|shell|chevron|exxon|trains?|bus",
        ),
        rule(
            Tag::Travel,
            "airlines?|airways|flights?|delta air\\w*|united air\\w*|delta\\.com|united\\.com|expedia|booking\\.com|travel",
        ),
        rule(Tag::Accommodation, "hotels?|motels?|airbnb|hostels?|lodging|inn|rent|lease"),
        rule(
            Tag::Utilities,
            "electric\\w*|utility|utilities|water bill|internet|comcast|verizon|at&t|t-mobile|phone bill|pg&e",
        ),
        rule(
            Tag::Entertainment,
            "netflix|spotify|hulu|disney\\w*|cinemas?|movies?|theaters?|theatres?|steam|playstation|concerts?|ticketmaster",
        ),
        rule(
            Tag::Health,
            "pharmacy|cvs|walgreens|doctor|dental|dentist|clinic|hospital|medical|healthcare|gym|fitness",
        ),
        rule(
            Tag::Education,
            "tuition|university|college|school|courses?|udemy|coursera|bookstore|textbooks?",
        ),
        rule(
            Tag::Shopping,
            "amazon|target|walmart|ebay|etsy|ikea|best buy|clothing|apparel|department store|shopping",
        ),
    ]
});

/// Suggest a tag for free text. Falls back to `Other`.
pub fn suggest_tag(text: &str) -> Tag {
    RULES
        .iter()
        .find(|r| r.pattern.is_match(text))
        .map_or(Tag::Other, |r| r.tag)
}

/// Fill `suggested_tags` for a freshly materialized record.
/// A suggestion the user already confirmed is not repeated.
pub fn apply_suggestions(record: &mut TransactionRecord) {
    let text = [
        Some(record.description.as_str()),
        record.category.as_deref(),
        record.kind.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ");

    let tag = suggest_tag(&text);
    if !record.has_tag(tag) && !record.suggested_tags.contains(&tag) {
        record.suggested_tags.push(tag);
    }
}
