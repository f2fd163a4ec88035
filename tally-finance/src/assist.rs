//! Optional LLM assistant that maps header names to transaction attributes.
//!
//! The assistant is best-effort: [`HeaderAssistant::suggest_mapping`] never
//! fails, it reports a fallback notice and the caller maps columns by hand.

use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tally_core::{Attribute, ColumnMapping};
use tracing::{debug, warn};

use crate::error::{FinanceError, Result};
use crate::prompts::HEADER_MAPPING_PROMPT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Local Ollama server, `POST /api/chat`
    Ollama,
    /// OpenAI-compatible `POST /v1/chat/completions`
    OpenAI,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provider::Ollama => "ollama",
            Provider::OpenAI => "openai",
        })
    }
}

impl FromStr for Provider {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Provider::Ollama),
            "openai" => Ok(Provider::OpenAI),
            other => Err(FinanceError::UnknownProvider(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssistConfig {
    pub provider: Provider,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub api_key: Option<String>,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Ollama,
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            timeout: Duration::from_secs(20),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Csv,
    Tsv,
    Unknown,
}

/// The JSON object the assistant is asked to return
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AssistantReply {
    pub file_type: FileType,
    pub header_mapping: BTreeMap<String, Option<String>>,
}

impl AssistantReply {
    /// Resolve header names back to column indices. Header names match
    /// after trimming, ignoring case; unknown field names are ignored.
    /// When two columns claim the same field, the leftmost wins.
    pub fn to_column_mapping(&self, header: &[String]) -> ColumnMapping {
        let mut mapping = ColumnMapping::default();
        for (idx, column) in header.iter().enumerate() {
            let column = column.trim();
            let attr = self
                .header_mapping
                .iter()
                .find(|(name, _)| name.trim().eq_ignore_ascii_case(column))
                .and_then(|(_, field)| field.as_deref())
                .and_then(field_attribute);
            if let Some(attr) = attr {
                if mapping.get(attr).is_none() {
                    mapping.set_mapping(attr, Some(idx));
                }
            }
        }
        mapping
    }
}

fn field_attribute(field: &str) -> Option<Attribute> {
    match field.trim().to_lowercase().as_str() {
        "vendor" | "description" => Some(Attribute::Description),
        "date" => Some(Attribute::Date),
        "amount" => Some(Attribute::Amount),
        "currency" => Some(Attribute::Currency),
        "category" => Some(Attribute::Category),
        "id" => Some(Attribute::Id),
        "type" => Some(Attribute::Type),
        _ => None,
    }
}

/// Parse the assistant's text, tolerating prose or code fences around the JSON object
pub fn parse_reply(text: &str) -> Result<AssistantReply> {
    let start = text.find('{');
    let end = text.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &text[s..=e],
        _ => return Err(FinanceError::Reply(format!("no JSON object in {text:?}"))),
    };
    serde_json::from_str(json).map_err(|e| FinanceError::Reply(e.to_string()))
}

/// Result of asking the assistant
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Assisted {
        mapping: ColumnMapping,
        file_type: FileType,
    },
    /// Map manually; `notice` says why
    Fallback { notice: String },
}

pub struct HeaderAssistant {
    client: reqwest::Client,
    config: AssistConfig,
}

impl HeaderAssistant {
    pub fn new(config: AssistConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AssistConfig {
        &self.config
    }

    /// Ask for a mapping of `header` (the tokenized header row).
    /// Any failure becomes [`Outcome::Fallback`].
    pub async fn suggest_mapping(&self, header_line: &str, header: &[String]) -> Outcome {
        match self.try_suggest(header_line, header).await {
            Ok((mapping, file_type)) if !mapping.is_empty() => {
                debug!(?file_type, ?mapping, "assistant mapped header");
                Outcome::Assisted { mapping, file_type }
            }
            Ok(_) => {
                warn!("assistant recognized no columns");
                Outcome::Fallback {
                    notice: "The assistant did not recognize any columns; map them manually.".to_string(),
                }
            }
            Err(e) => {
                warn!(error = %e, provider = %self.config.provider, "header assistant failed");
                Outcome::Fallback {
                    notice: format!("Automatic column mapping unavailable ({e}); map them manually."),
                }
            }
        }
    }

    async fn try_suggest(&self, header_line: &str, header: &[String]) -> Result<(ColumnMapping, FileType)> {
        let text = self.complete(HEADER_MAPPING_PROMPT, header_line).await?;
        let reply = parse_reply(&text)?;
        Ok((reply.to_column_mapping(header), reply.file_type))
    }

    /// Send one system + user exchange and return the reply text
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        match self.config.provider {
            Provider::Ollama => self.ollama_complete(system, user).await,
            Provider::OpenAI => self.openai_complete(system, user).await,
        }
    }

    async fn ollama_complete(&self, system: &str, user: &str) -> Result<String> {
        #[derive(Deserialize)]
        struct Resp {
            message: MsgOut,
        }

        #[derive(Deserialize)]
        struct MsgOut {
            content: String,
        }

        let body = ChatRequest {
            model: &self.config.model,
            messages: messages(system, user),
            stream: Some(false),
            temperature: None,
        };

        let url = format!("{}/api/chat", self.config.base_url.trim_end_matches('/'));
        let resp = self.client.post(url).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FinanceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let out: Resp = resp.json().await?;
        Ok(out.message.content.trim().to_string())
    }

    async fn openai_complete(&self, system: &str, user: &str) -> Result<String> {
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: MsgOut,
        }

        #[derive(Deserialize)]
        struct MsgOut {
            content: Option<String>,
        }

        let key = self
            .config
            .api_key
            .as_deref()
            .ok_or(FinanceError::MissingApiKey)?;

        let body = ChatRequest {
            model: &self.config.model,
            messages: messages(system, user),
            stream: None,
            temperature: Some(0.0),
        };

        let url = format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let resp = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {key}"))
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FinanceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let out: Resp = resp.json().await?;
        Ok(out
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .unwrap_or_default()
            .trim()
            .to_string())
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

fn messages<'a>(system: &'a str, user: &'a str) -> Vec<ChatMessage<'a>> {
    vec![
        ChatMessage {
            role: "system",
            content: system,
        },
        ChatMessage {
            role: "user",
            content: user,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_minified_reply() {
        let reply = parse_reply(
            r#"{"file_type":"tsv","header_mapping":{"Date":"date","Vendor":"vendor","Amount":"amount","Memo":null}}"#,
        )
        .unwrap();
        assert_eq!(reply.file_type, FileType::Tsv);
        assert_eq!(reply.header_mapping.get("Memo"), Some(&None));
    }

    #[test]
    fn test_parse_reply_inside_code_fence() {
        let text = "Sure! Here it is:\n```json\n{\"file_type\": \"csv\", \"header_mapping\": {\"Date\": \"date\"}}\n```";
        let reply = parse_reply(text).unwrap();
        assert_eq!(reply.file_type, FileType::Csv);
    }

    #[test]
    fn test_bad_replies_are_errors() {
        assert!(parse_reply("I cannot help with that").is_err());
        assert!(parse_reply(r#"{"file_type":"xls","header_mapping":{}}"#).is_err());
        assert!(parse_reply(r#"{"file_type":"csv","header_mapping":["Date"]}"#).is_err());
        assert!(parse_reply(r#"{"file_type":"csv""#).is_err());
    }

    #[test]
    fn test_to_column_mapping() {
        let reply = parse_reply(
            r#"{"file_type":"csv","header_mapping":{"txn date":"date","Merchant":"vendor","Transaction Amount":"amount","Notes":null,"Extra":"bogus","Missing":"currency"}}"#,
        )
        .unwrap();
        let m = reply.to_column_mapping(&header(&["Txn Date", "Merchant", "Transaction Amount", "Notes"]));
        assert_eq!(m.date, Some(0));
        assert_eq!(m.description, Some(1));
        assert_eq!(m.amount, Some(2));
        assert_eq!(m.currency, None);
        assert_eq!(m.category, None);
    }

    #[test]
    fn test_duplicate_field_follows_column_order() {
        let reply = parse_reply(
            r#"{"file_type":"csv","header_mapping":{"Posted Date":"date","Date":"date","Amount":"amount"}}"#,
        )
        .unwrap();
        let m = reply.to_column_mapping(&header(&["Posted Date", "Date", "Amount"]));
        assert_eq!(m.date, Some(0));
        assert_eq!(m.amount, Some(2));
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!("Ollama".parse::<Provider>().unwrap(), Provider::Ollama);
        assert_eq!("openai".parse::<Provider>().unwrap(), Provider::OpenAI);
        assert!("groq".parse::<Provider>().is_err());
    }
}
