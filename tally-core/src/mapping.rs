//! Column mapping: which source column feeds each transaction attribute

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Logical transaction attribute that a source column can be mapped to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Id,
    Date,
    Amount,
    Type,
    Category,
    Description,
    Currency,
}

impl Attribute {
    pub const ALL: [Attribute; 7] = [
        Attribute::Id,
        Attribute::Date,
        Attribute::Amount,
        Attribute::Type,
        Attribute::Category,
        Attribute::Description,
        Attribute::Currency,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Id => "id",
            Attribute::Date => "date",
            Attribute::Amount => "amount",
            Attribute::Type => "type",
            Attribute::Category => "category",
            Attribute::Description => "description",
            Attribute::Currency => "currency",
        }
    }

    /// Guess the attribute a header cell names, if any
    pub fn from_header(header: &str) -> Option<Attribute> {
        let h = header.trim().to_lowercase();
        let attr = match h.as_str() {
            "id" | "transaction id" | "txn id" | "reference" | "reference number" => Attribute::Id,
            "date" | "txn date" | "transaction date" | "posted date" | "post date" | "timestamp" => {
                Attribute::Date
            }
            "amount" | "transaction amount" | "value" => Attribute::Amount,
            "type" | "transaction type" => Attribute::Type,
            "category" | "spending type" | "expense type" => Attribute::Category,
            "description" | "merchant" | "payee" | "vendor" | "memo" => Attribute::Description,
            "currency" | "iso currency code" => Attribute::Currency,
            _ => return None,
        };
        Some(attr)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Attribute {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Attribute::ALL
            .iter()
            .find(|a| a.name().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| CoreError::UnknownAttribute(wanted.to_string()))
    }
}

/// Zero-based source column per attribute; `None` means unmapped.
///
/// Two attributes may share a column and indices are not checked against
/// the header width; out-of-range indices simply yield absent values.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnMapping {
    pub id: Option<usize>,
    pub date: Option<usize>,
    pub amount: Option<usize>,
    #[serde(rename = "type")]
    pub kind: Option<usize>,
    pub category: Option<usize>,
    pub description: Option<usize>,
    pub currency: Option<usize>,
}

impl ColumnMapping {
    /// Pre-fill slots from recognizable header names.
    /// The first matching column wins for each attribute.
    pub fn from_header_guess(header: &[String]) -> Self {
        let mut mapping = Self::default();
        for (idx, cell) in header.iter().enumerate() {
            if let Some(attr) = Attribute::from_header(cell) {
                if mapping.get(attr).is_none() {
                    mapping.set_mapping(attr, Some(idx));
                }
            }
        }
        mapping
    }

    pub fn get(&self, attr: Attribute) -> Option<usize> {
        *self.slot(attr)
    }

    /// Assign (or clear) the column for one attribute, replacing any previous value
    pub fn set_mapping(&mut self, attr: Attribute, column: Option<usize>) {
        *self.slot_mut(attr) = column;
    }

    pub fn is_empty(&self) -> bool {
        self.mapped().next().is_none()
    }

    /// Mapped attributes with their columns, in attribute order
    pub fn mapped(&self) -> impl Iterator<Item = (Attribute, usize)> + '_ {
        Attribute::ALL
            .into_iter()
            .filter_map(|a| self.get(a).map(|c| (a, c)))
    }

    /// Overlay every mapped slot of `other` onto `self`
    pub fn merge(&mut self, other: &ColumnMapping) {
        for (attr, col) in other.mapped() {
            self.set_mapping(attr, Some(col));
        }
    }

    fn slot(&self, attr: Attribute) -> &Option<usize> {
        match attr {
            Attribute::Id => &self.id,
            Attribute::Date => &self.date,
            Attribute::Amount => &self.amount,
            Attribute::Type => &self.kind,
            Attribute::Category => &self.category,
            Attribute::Description => &self.description,
            Attribute::Currency => &self.currency,
        }
    }

    fn slot_mut(&mut self, attr: Attribute) -> &mut Option<usize> {
        match attr {
            Attribute::Id => &mut self.id,
            Attribute::Date => &mut self.date,
            Attribute::Amount => &mut self.amount,
            Attribute::Type => &mut self.kind,
            Attribute::Category => &mut self.category,
            Attribute::Description => &mut self.description,
            Attribute::Currency => &mut self.currency,
        }
    }
}

/// One `attribute=column` pair, as typed on the command line.
/// `attribute=` or `attribute=-` clears the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingAssignment {
    pub attribute: Attribute,
    pub column: Option<usize>,
}

impl FromStr for MappingAssignment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (attr, col) = s
            .split_once('=')
            .ok_or_else(|| CoreError::InvalidAssignment(s.to_string()))?;
        let attribute: Attribute = attr.parse()?;
        let col = col.trim();
        let column = if col.is_empty() || col == "-" {
            None
        } else {
            Some(
                col.parse::<usize>()
                    .map_err(|_| CoreError::InvalidAssignment(s.to_string()))?,
            )
        };
        Ok(Self { attribute, column })
    }
}
