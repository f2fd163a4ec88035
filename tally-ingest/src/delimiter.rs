//! Comma/tab delimiter detection from the header line.
//!
//! A tab anywhere in the line means TSV, otherwise CSV. Quoted commas are
//! not treated specially.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    pub fn as_char(&self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
        }
    }
}

pub fn detect_delimiter(header_line: &str) -> Delimiter {
    if header_line.contains('\t') {
        Delimiter::Tab
    } else {
        Delimiter::Comma
    }
}
