//! Cliente resiliente da API de completions.
//!
//! Ordem de verificação por chamada: credencial, circuito, cache, rede.
//! A rede é tentada com retry e backoff; o resultado alimenta o circuito e
//! o cache.

use std::sync::Arc;

use chrono::Utc;

use crate::cache::ResponseCache;
use crate::types::config::Config;
use crate::HaitaleResult;

use super::backoff::{parse_retry_after, Backoff, NextStep, RetryPolicy};
use super::error::AiError;
use super::state::SharedState;
use super::transport::{ChatRequest, ChatResponse, CompletionTransport, HttpTransport};

/// Prompt de uma requisição, com o escopo usado na chave de cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionPrompt {
    /// Prompt de sistema.
    pub system: String,

    /// Prompt do usuário.
    pub user: String,

    /// Descrição original do mundo.
    pub description: String,

    /// Ids dos candidatos, na ordem enviada.
    pub candidate_ids: Vec<String>,
}

/// Cliente com retry, circuit breaker e cache.
pub struct ResilientAiClient {
    api_key: Option<String>,
    model: String,
    retry: RetryPolicy,
    cache_enabled: bool,
    transport: Arc<dyn CompletionTransport>,
    state: Arc<SharedState>,
}

impl ResilientAiClient {
    /// Cria um cliente com transporte e estado explícitos.
    pub fn new(
        config: &Config,
        transport: Arc<dyn CompletionTransport>,
        state: Arc<SharedState>,
    ) -> Self {
        Self {
            api_key: config.openrouter.credential().map(str::to_string),
            model: config.openrouter.model.clone(),
            retry: RetryPolicy::from_config(&config.retry),
            cache_enabled: config.cache.enabled,
            transport,
            state,
        }
    }

    /// Cria um cliente HTTP real.
    pub fn from_config(config: &Config, state: Arc<SharedState>) -> HaitaleResult<Self> {
        let transport = HttpTransport::from_config(config)?;
        Ok(Self::new(config, Arc::new(transport), state))
    }

    /// Modelo usado.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Se há credencial configurada.
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Estado compartilhado.
    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    /// Obtém o texto do modelo, ou `None` em qualquer falha.
    pub async fn complete(&self, prompt: &CompletionPrompt) -> Option<String> {
        match self.try_complete(prompt).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(error = %e, "Completion unavailable");
                None
            }
        }
    }

    /// Obtém o texto do modelo, informando o motivo da falha.
    pub async fn try_complete(&self, prompt: &CompletionPrompt) -> Result<String, AiError> {
        let api_key = self.api_key.as_deref().ok_or(AiError::MissingCredential)?;

        if self.state.circuit.is_open().await {
            return Err(AiError::CircuitOpen);
        }

        let key = ResponseCache::cache_key(&self.model, &prompt.description, &prompt.candidate_ids);
        if self.cache_enabled {
            let (cached, stats) = {
                let mut cache = self.state.cache.lock().await;
                (cache.get(&key), cache.stats())
            };
            if let Some(text) = cached {
                tracing::info!(
                    model = %self.model,
                    hit_rate = stats.hit_rate(),
                    "Completion cache hit"
                );
                return Ok(text);
            }
        }

        let request = ChatRequest::new(&self.model, &prompt.system, &prompt.user);
        tracing::info!(
            model = %self.model,
            candidates = prompt.candidate_ids.len(),
            "Calling completion API"
        );

        let text = self.send_with_retries(api_key, &request).await?;

        if self.cache_enabled {
            self.state.cache.lock().await.insert(key, text.clone());
        }

        Ok(text)
    }

    /// Loop de retry. Registra sucesso ou falha no circuito ao terminar.
    async fn send_with_retries(&self, api_key: &str, request: &ChatRequest) -> Result<String, AiError> {
        let mut backoff = Backoff::new(self.retry);

        loop {
            let attempt = backoff.start_attempt();

            let error = match self.attempt(api_key, request).await {
                Ok(text) => {
                    self.state.circuit.record_success().await;
                    return Ok(text);
                }
                Err(AiError::EmptyResponse) => {
                    // O serviço respondeu; só não veio conteúdo
                    self.state.circuit.record_success().await;
                    return Err(AiError::EmptyResponse);
                }
                Err(e) => e,
            };

            match backoff.next_step(&error) {
                NextStep::Retry(wait) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.retry.max_attempts(),
                        wait_ms = wait.as_millis() as u64,
                        error = %error,
                        "Completion attempt failed, backing off"
                    );
                    tokio::time::sleep(wait).await;
                }
                NextStep::GiveUp => {
                    tracing::error!(attempt, error = %error, "Giving up on completion request");
                    if error.counts_as_circuit_failure() {
                        self.state.circuit.record_failure().await;
                    }
                    return Err(error);
                }
            }
        }
    }

    /// Uma única tentativa de rede, classificada.
    async fn attempt(&self, api_key: &str, request: &ChatRequest) -> Result<String, AiError> {
        let response = self
            .transport
            .send(api_key, request)
            .await
            .map_err(|e| AiError::Transport(e.to_string()))?;

        let retry_after = response
            .retry_after
            .as_deref()
            .and_then(|v| parse_retry_after(v, Utc::now()));

        if let Some(error) = AiError::from_status(response.status, retry_after) {
            return Err(error);
        }

        let parsed: ChatResponse = serde_json::from_str(&response.body).map_err(|e| {
            tracing::warn!(error = %e, "Completion response body is not valid JSON");
            AiError::EmptyResponse
        })?;

        if let Some(usage) = parsed.usage {
            tracing::info!(total_tokens = usage.total_tokens, "Received completion response");
        }

        parsed
            .content()
            .map(str::to_string)
            .ok_or(AiError::EmptyResponse)
    }
}
