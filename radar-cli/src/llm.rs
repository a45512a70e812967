//! Classifier backed by a hosted chat model.

use anyhow::{Context, Result, anyhow, bail};
use radar_core::{Category, Transaction};
use radar_finance::{Classifier, Offline, Verdict};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::config::LlmSection;

const VERIFY_PROMPT: &str = "You check SMS messages for a personal finance app. \
Decide whether the message reports a completed money movement on the user's account \
(debit, credit, UPI payment, card spend). OTPs, offers and reminders are not transactions. \
Reply with JSON only: {\"is_transaction\": true|false, \"confidence\": 0.0-1.0}";

const CATEGORY_PROMPT: &str = "Pick the spending category for this transaction. \
Reply with one word from: food, groceries, shopping, transport, bills, entertainment, \
health, education, transfer, income, other.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAI,
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAI),
            "anthropic" => Ok(Provider::Anthropic),
            other => bail!("unknown llm provider: {other} (expected openai or anthropic)"),
        }
    }
}

impl Provider {
    fn default_base_url(self) -> &'static str {
        match self {
            Provider::Anthropic => "https://api.anthropic.com",
            Provider::OpenAI => "https://api.openai.com",
        }
    }
}

pub struct LlmClassifier {
    provider: Provider,
    model: String,
    base_url: String,
    api_key: String,
    temperature: f32,
    client: reqwest::Client,
}

impl LlmClassifier {
    pub fn from_config(section: &LlmSection) -> Result<Self> {
        let provider: Provider = section.provider.parse()?;
        let api_key = std::env::var(&section.api_key_env)
            .with_context(|| format!("{} is not set", section.api_key_env))?;
        let base_url = section
            .base_url
            .clone()
            .unwrap_or_else(|| provider.default_base_url().to_string());
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(section.timeout_secs.max(1)))
            .build()
            .context("build http client")?;
        Ok(Self {
            provider,
            model: section.model.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            temperature: section.temperature,
            client,
        })
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        match self.provider {
            Provider::Anthropic => self.anthropic_complete(system, user).await,
            Provider::OpenAI => self.openai_complete(system, user).await,
        }
    }

    async fn anthropic_complete(&self, system: &str, user: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            max_tokens: i32,
            temperature: f32,
            system: &'a str,
            messages: Vec<Msg<'a>>,
        }

        #[derive(Deserialize)]
        struct Resp {
            content: Vec<ContentBlock>,
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            #[serde(rename = "type")]
            t: String,
            text: Option<String>,
        }

        let body = Req {
            model: &self.model,
            max_tokens: 64,
            temperature: self.temperature,
            system,
            messages: vec![Msg {
                role: "user",
                content: user,
            }],
        };

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let resp = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .headers(headers)
            .json(&body)
            .send()
            .await
            .context("anthropic request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("anthropic error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse anthropic response")?;
        let text: String = out
            .content
            .into_iter()
            .filter(|b| b.t == "text")
            .filter_map(|b| b.text)
            .collect();
        Ok(text.trim().to_string())
    }

    async fn openai_complete(&self, system: &str, user: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
        }

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

        let body = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: system,
                },
                Msg {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.temperature,
        };

        let resp = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .context("openai request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("openai error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse openai response")?;
        let content = out
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();
        Ok(content.trim().to_string())
    }
}

impl Classifier for LlmClassifier {
    async fn verify(&self, body: &str) -> Result<Verdict> {
        let reply = self.complete(VERIFY_PROMPT, body).await?;
        parse_verdict(&reply).ok_or_else(|| anyhow!("unreadable verdict: {reply}"))
    }

    async fn categorize(&self, txn: &Transaction) -> Result<Option<Category>> {
        let prompt = format!(
            "{} {:.2} on {}: {}\nSMS: {}",
            txn.txn_type.as_str(),
            txn.amount,
            txn.date,
            txn.description,
            txn.original_sms
        );
        let reply = self.complete(CATEGORY_PROMPT, &prompt).await?;
        Ok(parse_category(&reply))
    }
}

/// The classifier the CLI runs with: offline unless `[llm] enabled = true`
pub enum Backend {
    Offline(Offline),
    Llm(LlmClassifier),
}

impl Backend {
    pub fn from_config(section: &LlmSection) -> Result<Self> {
        if !section.enabled {
            return Ok(Backend::Offline(Offline));
        }
        Ok(Backend::Llm(LlmClassifier::from_config(section)?))
    }
}

impl Classifier for Backend {
    async fn verify(&self, body: &str) -> Result<Verdict> {
        match self {
            Backend::Offline(c) => c.verify(body).await,
            Backend::Llm(c) => c.verify(body).await,
        }
    }

    async fn categorize(&self, txn: &Transaction) -> Result<Option<Category>> {
        match self {
            Backend::Offline(c) => c.categorize(txn).await,
            Backend::Llm(c) => c.categorize(txn).await,
        }
    }
}

/// First `{...}` span in a reply; models often wrap JSON in prose or fences
fn json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}

fn parse_verdict(reply: &str) -> Option<Verdict> {
    #[derive(Deserialize)]
    struct Raw {
        is_transaction: bool,
        #[serde(default)]
        confidence: Option<f64>,
    }

    if let Some(raw) = json_object(reply).and_then(|s| serde_json::from_str::<Raw>(s).ok()) {
        return Some(Verdict {
            is_transaction: raw.is_transaction,
            confidence: raw.confidence.unwrap_or(1.0).clamp(0.0, 1.0),
        });
    }

    let lower = reply.to_lowercase();
    let mut words = lower
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '.')
        .map(|w| w.trim_matches('.'))
        .filter(|w| !w.is_empty());
    let is_transaction = match words.next()? {
        "yes" | "true" => true,
        "no" | "false" => false,
        _ => return None,
    };
    let confidence = words
        .filter_map(|w| w.parse::<f64>().ok())
        .find(|c| (0.0..=1.0).contains(c))
        .unwrap_or(1.0);
    Some(Verdict {
        is_transaction,
        confidence,
    })
}

fn parse_category(reply: &str) -> Option<Category> {
    #[derive(Deserialize)]
    struct Raw {
        category: String,
    }

    if let Some(raw) = json_object(reply).and_then(|s| serde_json::from_str::<Raw>(s).ok()) {
        return raw.category.parse().ok();
    }
    reply
        .split_whitespace()
        .find_map(|word| word.parse::<Category>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_names() {
        assert_eq!("OpenAI".parse::<Provider>().unwrap(), Provider::OpenAI);
        assert_eq!(" anthropic ".parse::<Provider>().unwrap(), Provider::Anthropic);
        assert!("gemini".parse::<Provider>().is_err());
    }

    #[test]
    fn test_verdict_from_json() {
        let v = parse_verdict(r#"{"is_transaction": false, "confidence": 0.93}"#).unwrap();
        assert!(!v.is_transaction);
        assert_eq!(v.confidence, 0.93);

        let fenced = "```json\n{\"is_transaction\": true, \"confidence\": 1.7}\n```";
        let v = parse_verdict(fenced).unwrap();
        assert!(v.is_transaction);
        assert_eq!(v.confidence, 1.0);
    }

    #[test]
    fn test_verdict_from_words() {
        let v = parse_verdict("No, confidence 0.85").unwrap();
        assert!(!v.is_transaction);
        assert_eq!(v.confidence, 0.85);

        assert!(parse_verdict("Yes.").unwrap().is_transaction);
        assert!(parse_verdict("I cannot tell").is_none());
    }

    #[test]
    fn test_category_replies() {
        assert_eq!(parse_category("food"), Some(Category::Food));
        assert_eq!(parse_category("Groceries."), Some(Category::Groceries));
        assert_eq!(parse_category(r#"{"category": "Bills"}"#), Some(Category::Bills));
        assert_eq!(parse_category("Category: transport"), Some(Category::Transport));
        assert_eq!(parse_category("no idea"), None);
    }
}
