//! tally-core: transaction records, tag vocabulary, column mapping and the record store

pub mod error;
pub mod export;
pub mod filter;
pub mod mapping;
pub mod record;
pub mod storage;
pub mod store;
pub mod tag;

pub use error::{CoreError, Result};
pub use filter::{TransactionFilter, parse_record_date};
pub use mapping::{Attribute, ColumnMapping, MappingAssignment};
pub use record::TransactionRecord;
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{DEFAULT_KEY, TransactionStore};
pub use tag::Tag;
