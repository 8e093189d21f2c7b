use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub languagetool_url: String,
    pub languagetool_language: String,
    pub grammar_timeout_secs: u64,
    pub ollama_url: Option<String>,
    pub embedding_model: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: std::env::var("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            languagetool_url: std::env::var("LANGUAGETOOL_URL")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
            languagetool_language: std::env::var("LANGUAGETOOL_LANGUAGE")
                .unwrap_or_else(|_| "en-US".to_string()),
            grammar_timeout_secs: match std::env::var("GRAMMAR_TIMEOUT_SECS") {
                Ok(value) => value
                    .parse()
                    .context("GRAMMAR_TIMEOUT_SECS must be a number of seconds")?,
                Err(_) => 5,
            },
            ollama_url: std::env::var("OLLAMA_URL").ok().filter(|s| !s.is_empty()),
            embedding_model: std::env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "all-minilm".to_string()),
        })
    }
}
