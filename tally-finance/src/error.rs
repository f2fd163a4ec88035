use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinanceError {
    #[error("unknown period '{0}' (expected month, quarter or year)")]
    UnknownPeriod(String),

    #[error("unknown assistant provider '{0}' (expected ollama or openai)")]
    UnknownProvider(String),

    #[error("assistant request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("assistant returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("assistant reply is not the expected JSON: {0}")]
    Reply(String),

    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,
}

pub type Result<T> = std::result::Result<T, FinanceError>;
