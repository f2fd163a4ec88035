//! Fixed tag vocabulary used to label transactions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// One of the eleven labels a transaction can carry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    Groceries,
    Shopping,
    Entertainment,
    Utilities,
    Dining,
    Health,
    Transportation,
    Education,
    // Older blobs were written with the misspelled label.
    #[serde(alias = "Accomodation")]
    Accommodation,
    Travel,
    Other,
}

impl Tag {
    pub const ALL: [Tag; 11] = [
        Tag::Groceries,
        Tag::Shopping,
        Tag::Entertainment,
        Tag::Utilities,
        Tag::Dining,
        Tag::Health,
        Tag::Transportation,
        Tag::Education,
        Tag::Accommodation,
        Tag::Travel,
        Tag::Other,
    ];

    /// Display label, also the serialized form
    pub fn label(&self) -> &'static str {
        match self {
            Tag::Groceries => "Groceries",
            Tag::Shopping => "Shopping",
            Tag::Entertainment => "Entertainment",
            Tag::Utilities => "Utilities",
            Tag::Dining => "Dining",
            Tag::Health => "Health",
            Tag::Transportation => "Transportation",
            Tag::Education => "Education",
            Tag::Accommodation => "Accommodation",
            Tag::Travel => "Travel",
            Tag::Other => "Other",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Tag::Groceries => "🛒",
            Tag::Shopping => "🛍️",
            Tag::Entertainment => "🎬",
            Tag::Utilities => "💡",
            Tag::Dining => "🍽️",
            Tag::Health => "⚕️",
            Tag::Transportation => "🚗",
            Tag::Education => "📚",
            Tag::Accommodation => "🏨",
            Tag::Travel => "✈️",
            Tag::Other => "💬",
        }
    }

    /// Display color name
    pub fn color(&self) -> &'static str {
        match self {
            Tag::Groceries | Tag::Education => "green",
            Tag::Shopping | Tag::Accommodation => "purple",
            Tag::Entertainment | Tag::Travel => "blue",
            Tag::Utilities => "orange",
            Tag::Dining => "red",
            Tag::Health => "yellow",
            Tag::Transportation => "indigo",
            Tag::Other => "gray",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tag {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.eq_ignore_ascii_case("accomodation") {
            return Ok(Tag::Accommodation);
        }
        Tag::ALL
            .iter()
            .find(|t| t.label().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| CoreError::UnknownTag(wanted.to_string()))
    }
}
