//! OpenAI implementation of the Judge trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use curation::judges::OpenAiJudge;
//!
//! let judge = OpenAiJudge::from_env()?.with_model("gpt-4o");
//! let curator = Curator::new(collector, judge);
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{CurationError, Result};
use crate::pipeline::prompts::{
    format_exclusion_prompt, format_grouping_prompt, format_selection_prompt,
};
use crate::traits::judge::{ExclusionVerdict, GroupingVerdict, Judge, SelectionVerdict};
use crate::types::{article::Article, config::ArticleCap};

const SYSTEM_PROMPT: &str =
    "You are a news-curation assistant for an accounting firm. Respond with JSON only.";

/// OpenAI-backed judgment service.
#[derive(Clone)]
pub struct OpenAiJudge {
    client: Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl OpenAiJudge {
    /// Create a new judge with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: SecretString::from(api_key.into()),
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| CurationError::Config {
            reason: "OPENAI_API_KEY not set".to_string(),
        })?;
        Ok(Self::new(api_key))
    }

    /// Set the chat model (default: gpt-4o).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Get the current model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Make a chat completion request.
    async fn chat(&self, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: 0.0,
            max_tokens: 4096,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(CurationError::judge)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CurationError::judge(format!(
                "OpenAI API error {status}: {error_text}"
            )));
        }

        let chat_response: ChatResponse =
            response.json().await.map_err(CurationError::judge)?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| CurationError::judge("no response from OpenAI"))
    }

    async fn chat_parsed<T: serde::de::DeserializeOwned>(&self, prompt: &str) -> Result<T> {
        let response = self.chat(prompt).await?;
        let json = extract_json(&response);
        serde_json::from_str(json)
            .map_err(|e| CurationError::judge(format!("failed to parse verdict: {e}")))
    }
}

/// Pull the JSON object out of a model response that may wrap it in
/// markdown fences or surrounding prose.
fn extract_json(response: &str) -> &str {
    let trimmed = response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

#[async_trait]
impl Judge for OpenAiJudge {
    async fn judge_exclusion(
        &self,
        articles: &[Article],
        criteria: &str,
    ) -> Result<ExclusionVerdict> {
        self.chat_parsed(&format_exclusion_prompt(articles, criteria))
            .await
    }

    async fn judge_grouping(
        &self,
        articles: &[Article],
        criteria: &str,
    ) -> Result<GroupingVerdict> {
        self.chat_parsed(&format_grouping_prompt(articles, criteria))
            .await
    }

    async fn judge_selection(
        &self,
        articles: &[Article],
        criteria: &str,
        cap: ArticleCap,
    ) -> Result<SelectionVerdict> {
        self.chat_parsed(&format_selection_prompt(articles, criteria, cap))
            .await
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_plain() {
        assert_eq!(extract_json(r#"{"a":1}"#), r#"{"a":1}"#);
    }

    #[test]
    fn test_extract_json_fenced() {
        let fenced = "```json\n{\"groups\":[]}\n```";
        assert_eq!(extract_json(fenced), r#"{"groups":[]}"#);
    }

    #[test]
    fn test_extract_json_with_prose() {
        let chatty = "Here is the result:\n{\"selected\":[]}\nHope that helps.";
        assert_eq!(extract_json(chatty), r#"{"selected":[]}"#);
    }

    #[test]
    fn test_extracted_json_parses_as_verdict() {
        let response = "```json\n{\"excluded\":[{\"index\":0,\"reason\":\"광고\"}]}\n```";
        let verdict: ExclusionVerdict = serde_json::from_str(extract_json(response)).unwrap();
        assert_eq!(verdict.excluded.len(), 1);
    }
}
