use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use super::{GrammarMatch, IssueKind};
use crate::error::{AnalysisError, Result};
use crate::traits::GrammarChecker;

#[derive(Debug, Deserialize)]
pub struct LanguageToolResponse {
    pub matches: Vec<LanguageToolMatch>,
}

#[derive(Debug, Deserialize)]
pub struct LanguageToolMatch {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub length: usize,
    pub rule: LanguageToolRule,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageToolRule {
    pub id: String,
    #[serde(default)]
    pub issue_type: Option<String>,
}

impl LanguageToolResponse {
    pub fn into_matches(self) -> Vec<GrammarMatch> {
        self.matches
            .into_iter()
            .map(|m| GrammarMatch {
                kind: m
                    .rule
                    .issue_type
                    .as_deref()
                    .map(IssueKind::from_issue_type)
                    .unwrap_or(IssueKind::Grammar),
                rule_id: m.rule.id,
                message: m.message,
                offset: m.offset,
                length: m.length,
            })
            .collect()
    }
}

/// Client for a LanguageTool HTTP server
///
/// Built once at startup and shared; the underlying `reqwest::Client` keeps
/// its connection pool across checks.
pub struct LanguageToolClient {
    client: Client,
    base_url: String,
    language: String,
}

impl LanguageToolClient {
    /// Create a new LanguageTool client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the server (e.g., "http://localhost:8081")
    /// * `language` - Language code passed to every check (e.g., "en-US")
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: String, language: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            language,
        })
    }

    /// Check if the LanguageTool server answers
    pub async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/v2/languages", self.base_url))
            .send()
            .await?;

        Ok(response.status().is_success())
    }
}

#[async_trait::async_trait]
impl GrammarChecker for LanguageToolClient {
    async fn check(&self, text: &str) -> Result<Vec<GrammarMatch>> {
        tracing::debug!(
            "Sending text to LanguageTool (language: {}, length: {} chars)",
            self.language,
            text.len()
        );

        let response = self
            .client
            .post(format!("{}/v2/check", self.base_url))
            .form(&[("text", text), ("language", self.language.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AnalysisError::GrammarCheckError(format!(
                "LanguageTool API error ({}): {}",
                status, error_text
            )));
        }

        let body: LanguageToolResponse = response.json().await.map_err(|e| {
            AnalysisError::GrammarCheckError(format!(
                "Failed to parse LanguageTool response: {}",
                e
            ))
        })?;

        Ok(body.into_matches())
    }
}
