//! tally-finance: tag suggestion rules, spending insights and the optional
//! LLM header-mapping assistant

pub mod assist;
pub mod error;
pub mod insights;
pub mod prompts;
pub mod tag_rules;

pub use assist::{AssistConfig, FileType, HeaderAssistant, Outcome, Provider};
pub use error::{FinanceError, Result};
pub use insights::{Fact, Insights, Period, Slice, TagSpending, compute_insights};
pub use tag_rules::{apply_suggestions, suggest_tag};
