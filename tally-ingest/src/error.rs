use thiserror::Error;

use crate::session::Stage;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("nothing to import: pasted text is empty")]
    EmptyInput,

    #[error("cannot {action} while the import session is {from:?}")]
    InvalidTransition { from: Stage, action: &'static str },
}

pub type Result<T> = std::result::Result<T, IngestError>;
