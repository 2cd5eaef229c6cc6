//! Circuit breaker da API de completions.
//!
//! Conta falhas consecutivas. Ao atingir o limite o circuito abre e as
//! chamadas são recusadas sem I/O até `reset_timeout` passar; então o estado
//! volta inteiro para fechado (sem estado half-open).

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::types::config::CircuitConfig;

/// Status derivado do estado do circuito.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitStatus {
    Closed,
    Open,
}

impl std::fmt::Display for CircuitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitStatus::Closed => write!(f, "closed"),
            CircuitStatus::Open => write!(f, "open"),
        }
    }
}

/// Estado mutável do circuito.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CircuitState {
    /// Falhas consecutivas.
    pub consecutive_failures: u32,

    /// Momento em que o circuito abriu.
    pub opened_at: Option<Instant>,
}

/// Circuit breaker compartilhado entre requisições.
#[derive(Debug)]
pub struct CircuitBreaker {
    enabled: bool,
    failure_threshold: u32,
    reset_timeout: Duration,
    state: Mutex<CircuitState>,
}

impl CircuitBreaker {
    /// Cria um circuit breaker. Limite mínimo de 1 falha e 1 segundo.
    pub fn new(enabled: bool, failure_threshold: u32, reset_timeout: Duration) -> Self {
        Self {
            enabled,
            failure_threshold: failure_threshold.max(1),
            reset_timeout: reset_timeout.max(Duration::from_secs(1)),
            state: Mutex::new(CircuitState::default()),
        }
    }

    /// Cria a partir da configuração.
    pub fn from_config(config: &CircuitConfig) -> Self {
        Self::new(
            config.enabled,
            config.failure_threshold,
            Duration::from_secs(config.reset_timeout_secs),
        )
    }

    /// Limite de falhas consecutivas.
    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    /// Tempo em que o circuito permanece aberto.
    pub fn reset_timeout(&self) -> Duration {
        self.reset_timeout
    }

    /// Verifica se o circuito está aberto.
    ///
    /// Se o timeout já passou, reseta o estado e libera a chamada.
    pub async fn is_open(&self) -> bool {
        if !self.enabled {
            return false;
        }

        let mut state = self.state.lock().await;
        if state.consecutive_failures < self.failure_threshold {
            return false;
        }

        match state.opened_at {
            None => {
                state.opened_at = Some(Instant::now());
                true
            }
            Some(opened_at) => {
                let elapsed = opened_at.elapsed();
                if elapsed >= self.reset_timeout {
                    tracing::info!(
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Circuit reset timeout elapsed, closing circuit"
                    );
                    *state = CircuitState::default();
                    false
                } else {
                    true
                }
            }
        }
    }

    /// Registra uma falha.
    pub async fn record_failure(&self) {
        if !self.enabled {
            return;
        }

        let mut state = self.state.lock().await;
        state.consecutive_failures = state.consecutive_failures.saturating_add(1);
        tracing::warn!(
            failures = state.consecutive_failures,
            threshold = self.failure_threshold,
            "Completion API failure recorded"
        );

        if state.consecutive_failures >= self.failure_threshold && state.opened_at.is_none() {
            state.opened_at = Some(Instant::now());
            tracing::error!(
                failures = state.consecutive_failures,
                reset_timeout_secs = self.reset_timeout.as_secs(),
                "Circuit opened after repeated failures"
            );
        }
    }

    /// Registra um sucesso, zerando o contador.
    pub async fn record_success(&self) {
        if !self.enabled {
            return;
        }

        let mut state = self.state.lock().await;
        if state.consecutive_failures > 0 {
            tracing::info!(
                previous_failures = state.consecutive_failures,
                "Completion API recovered, resetting failure counter"
            );
        }
        *state = CircuitState::default();
    }

    /// Retorna uma cópia do estado atual.
    pub async fn snapshot(&self) -> CircuitState {
        *self.state.lock().await
    }

    /// Status derivado, sem efeitos colaterais.
    pub async fn status(&self) -> CircuitStatus {
        let state = self.snapshot().await;
        let open = self.enabled
            && state.consecutive_failures >= self.failure_threshold
            && state
                .opened_at
                .map_or(true, |t| t.elapsed() < self.reset_timeout);

        if open {
            CircuitStatus::Open
        } else {
            CircuitStatus::Closed
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::from_config(&CircuitConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(threshold: u32, reset_secs: u64) -> CircuitBreaker {
        CircuitBreaker::new(true, threshold, Duration::from_secs(reset_secs))
    }

    #[tokio::test]
    async fn test_starts_closed() {
        let cb = breaker(3, 60);

        assert!(!cb.is_open().await);
        assert_eq!(cb.status().await, CircuitStatus::Closed);
        assert_eq!(cb.snapshot().await, CircuitState::default());
    }

    #[tokio::test]
    async fn test_opens_at_threshold() {
        let cb = breaker(3, 60);

        cb.record_failure().await;
        cb.record_failure().await;
        assert!(!cb.is_open().await);

        cb.record_failure().await;
        assert!(cb.is_open().await);
        assert_eq!(cb.status().await, CircuitStatus::Open);
        assert!(cb.snapshot().await.opened_at.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_opened_at_set_only_once() {
        let cb = breaker(1, 60);

        cb.record_failure().await;
        let first = cb.snapshot().await.opened_at;

        tokio::time::advance(Duration::from_secs(5)).await;
        cb.record_failure().await;

        assert_eq!(cb.snapshot().await.opened_at, first);
        assert_eq!(cb.snapshot().await.consecutive_failures, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resets_after_timeout() {
        let cb = breaker(2, 30);
        cb.record_failure().await;
        cb.record_failure().await;

        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(cb.is_open().await);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!cb.is_open().await);
        assert_eq!(cb.snapshot().await, CircuitState::default());
    }

    #[tokio::test]
    async fn test_success_resets_counter() {
        let cb = breaker(3, 60);
        cb.record_failure().await;
        cb.record_failure().await;

        cb.record_success().await;

        assert_eq!(cb.snapshot().await.consecutive_failures, 0);
        cb.record_failure().await;
        assert!(!cb.is_open().await);
    }

    #[tokio::test]
    async fn test_disabled_never_opens() {
        let cb = CircuitBreaker::new(false, 1, Duration::from_secs(60));

        cb.record_failure().await;
        cb.record_failure().await;

        assert!(!cb.is_open().await);
        assert_eq!(cb.snapshot().await.consecutive_failures, 0);
    }

    #[test]
    fn test_limits_are_clamped() {
        let cb = CircuitBreaker::new(true, 0, Duration::ZERO);

        assert_eq!(cb.failure_threshold(), 1);
        assert_eq!(cb.reset_timeout(), Duration::from_secs(1));
    }
}
