//! Falhas do caminho de IA.

use std::time::Duration;

use thiserror::Error;

/// Motivo pelo qual uma chamada à API de completions não produziu texto.
///
/// Nenhuma dessas falhas chega ao chamador do orquestrador: todas levam ao
/// fallback por regras.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AiError {
    #[error("API key não configurada")]
    MissingCredential,

    #[error("Circuito aberto, chamada não realizada")]
    CircuitOpen,

    #[error("Rate limit atingido (HTTP 429)")]
    RateLimited {
        /// Espera sugerida pelo servidor.
        retry_after: Option<Duration>,
    },

    #[error("Quota excedida (HTTP 402)")]
    QuotaExceeded,

    #[error("Requisição rejeitada (HTTP {0})")]
    ClientError(u16),

    #[error("Erro do servidor (HTTP {0})")]
    ServerError(u16),

    #[error("Erro de transporte: {0}")]
    Transport(String),

    #[error("Resposta sem conteúdo utilizável")]
    EmptyResponse,
}

impl AiError {
    /// Classifica um status HTTP. Retorna `None` para 2xx.
    pub fn from_status(status: u16, retry_after: Option<Duration>) -> Option<Self> {
        match status {
            200..=299 => None,
            402 => Some(Self::QuotaExceeded),
            429 => Some(Self::RateLimited { retry_after }),
            500..=599 => Some(Self::ServerError(status)),
            _ => Some(Self::ClientError(status)),
        }
    }

    /// Se uma nova tentativa pode ser feita na mesma requisição.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::ServerError(_) | Self::Transport(_)
        )
    }

    /// Se a falha conta para o circuit breaker quando encerra a requisição.
    pub fn counts_as_circuit_failure(&self) -> bool {
        matches!(
            self,
            Self::QuotaExceeded | Self::ClientError(_) | Self::ServerError(_) | Self::Transport(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert_eq!(AiError::from_status(200, None), None);
        assert_eq!(AiError::from_status(204, None), None);
        assert_eq!(AiError::from_status(402, None), Some(AiError::QuotaExceeded));
        assert_eq!(AiError::from_status(404, None), Some(AiError::ClientError(404)));
        assert_eq!(AiError::from_status(503, None), Some(AiError::ServerError(503)));
        assert_eq!(
            AiError::from_status(429, Some(Duration::from_secs(2))),
            Some(AiError::RateLimited {
                retry_after: Some(Duration::from_secs(2))
            })
        );
    }

    #[test]
    fn test_retry_and_circuit_classification() {
        let rate_limited = AiError::RateLimited { retry_after: None };
        assert!(rate_limited.is_retryable());
        assert!(!rate_limited.counts_as_circuit_failure());

        assert!(!AiError::QuotaExceeded.is_retryable());
        assert!(AiError::QuotaExceeded.counts_as_circuit_failure());

        assert!(!AiError::ClientError(400).is_retryable());
        assert!(AiError::ClientError(400).counts_as_circuit_failure());

        assert!(AiError::ServerError(500).is_retryable());
        assert!(AiError::ServerError(500).counts_as_circuit_failure());

        assert!(AiError::Transport("timeout".into()).is_retryable());

        assert!(!AiError::MissingCredential.counts_as_circuit_failure());
        assert!(!AiError::CircuitOpen.counts_as_circuit_failure());
        assert!(!AiError::EmptyResponse.counts_as_circuit_failure());
    }
}
