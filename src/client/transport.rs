//! Transporte HTTP da API de completions (formato OpenRouter).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::config::Config;
use crate::HaitaleResult;

/// Temperatura enviada em toda requisição.
pub const TEMPERATURE: f64 = 0.7;

/// Limite de tokens da resposta.
pub const MAX_TOKENS: u32 = 2000;

/// Mensagem de chat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Corpo da requisição.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl ChatRequest {
    /// Cria uma requisição com prompt de sistema e de usuário.
    pub fn new(model: impl Into<String>, system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

/// Corpo da resposta. Só `choices[0].message.content` é obrigatório na prática.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub choices: Vec<ChatChoice>,

    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Conteúdo da primeira escolha, se não vazio.
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|c| !c.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatChoice {
    pub message: ResponseMessage,

    #[serde(default, alias = "finish_reason")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub content: Option<String>,
}

/// Consumo de tokens.
#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    #[serde(default, alias = "prompt_tokens")]
    pub prompt_tokens: u32,

    #[serde(default, alias = "completion_tokens")]
    pub completion_tokens: u32,

    #[serde(default, alias = "total_tokens")]
    pub total_tokens: u32,
}

/// Resposta HTTP crua.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,

    /// Valor do header `Retry-After`, se presente.
    pub retry_after: Option<String>,

    pub body: String,
}

impl TransportResponse {
    /// Resposta 200 com o corpo dado.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            retry_after: None,
            body: body.into(),
        }
    }

    /// Resposta só com status.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            retry_after: None,
            body: String::new(),
        }
    }

    /// Define o `Retry-After`.
    #[must_use]
    pub fn with_retry_after(mut self, value: impl Into<String>) -> Self {
        self.retry_after = Some(value.into());
        self
    }
}

/// Falha de rede antes de obter um status.
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("timeout: {0}")]
    Timeout(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else {
            Self::Request(e.to_string())
        }
    }
}

/// Envia uma requisição de completions.
///
/// Implementado por [`HttpTransport`]; testes usam implementações roteirizadas.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    /// Envia a requisição e devolve a resposta HTTP, seja qual for o status.
    async fn send(
        &self,
        api_key: &str,
        request: &ChatRequest,
    ) -> Result<TransportResponse, TransportError>;
}

/// Transporte via reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    site_url: String,
    site_name: String,
}

impl HttpTransport {
    /// Cria o transporte a partir da configuração.
    pub fn from_config(config: &Config) -> HaitaleResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.general.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.openrouter.api_url.clone(),
            site_url: config.openrouter.site_url.clone(),
            site_name: config.openrouter.site_name.clone(),
        })
    }
}

#[async_trait]
impl CompletionTransport for HttpTransport {
    async fn send(
        &self,
        api_key: &str,
        request: &ChatRequest,
    ) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .header("HTTP-Referer", &self.site_url)
            .header("X-Title", &self.site_name)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        Ok(TransportResponse {
            status,
            retry_after,
            body,
        })
    }
}
