//! Política de retry com backoff exponencial e jitter.
//!
//! [`Backoff`] é uma pequena máquina de estados (tentativa atual e atraso
//! atual). Depois de cada falha, [`Backoff::next_step`] decide entre tentar
//! de novo após uma espera ou desistir.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::types::config::RetryConfig;

use super::error::AiError;

/// Menor backoff inicial aceito.
const MIN_INITIAL_BACKOFF: Duration = Duration::from_millis(100);

/// Menor espera derivada de um `Retry-After`.
const MIN_RETRY_AFTER: Duration = Duration::from_millis(500);

/// Maior espera aceita de um `Retry-After`. O header vem do servidor e não é
/// confiável.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(300);

/// Parâmetros de retry, já normalizados.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
    jitter_fraction: f64,
}

impl RetryPolicy {
    /// Cria uma política, corrigindo valores fora dos limites.
    pub fn new(
        max_attempts: u32,
        initial_backoff: Duration,
        max_backoff: Duration,
        jitter_fraction: f64,
    ) -> Self {
        let initial_backoff = initial_backoff.max(MIN_INITIAL_BACKOFF);
        let jitter_fraction = if jitter_fraction.is_nan() {
            0.0
        } else {
            jitter_fraction.clamp(0.0, 1.0)
        };

        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_backoff: max_backoff.max(initial_backoff),
            jitter_fraction,
        }
    }

    /// Cria a partir da configuração.
    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.initial_backoff_ms),
            Duration::from_millis(config.max_backoff_ms),
            config.jitter_fraction,
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn initial_backoff(&self) -> Duration {
        self.initial_backoff
    }

    pub fn max_backoff(&self) -> Duration {
        self.max_backoff
    }

    pub fn jitter_fraction(&self) -> f64 {
        self.jitter_fraction
    }

    /// Jitter aleatório em `[0, jitter_fraction × base)`.
    pub fn jitter(&self, base: Duration) -> Duration {
        if self.jitter_fraction == 0.0 || base.is_zero() {
            return Duration::ZERO;
        }
        let factor: f64 = rand::thread_rng().gen();
        base.mul_f64(self.jitter_fraction * factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Próximo passo após uma tentativa sem sucesso.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Dormir e tentar novamente.
    Retry(Duration),
    /// Encerrar a requisição com a falha atual.
    GiveUp,
}

/// Estado do loop de retry de uma requisição.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: RetryPolicy,
    attempt: u32,
    delay: Duration,
}

impl Backoff {
    /// Cria o estado inicial (nenhuma tentativa feita).
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            attempt: 0,
            delay: policy.initial_backoff,
        }
    }

    /// Marca o início de uma tentativa e retorna seu número (1-based).
    pub fn start_attempt(&mut self) -> u32 {
        self.attempt += 1;
        self.attempt
    }

    /// Tentativa atual.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Backoff calculado para o próximo retry, sem jitter.
    pub fn current_delay(&self) -> Duration {
        self.delay
    }

    /// Se ainda há tentativas no orçamento.
    pub fn has_attempts_left(&self) -> bool {
        self.attempt < self.policy.max_attempts
    }

    /// Decide o que fazer após uma falha.
    ///
    /// - Falhas não retentáveis (402, outros 4xx) desistem na hora.
    /// - Com o orçamento esgotado, desiste.
    /// - 429 com `Retry-After` usa a dica do servidor como base; os demais
    ///   usam o backoff atual. O jitter é somado nos dois casos.
    ///
    /// O backoff dobra (até o teto) a cada retry.
    pub fn next_step(&mut self, error: &AiError) -> NextStep {
        if !error.is_retryable() || !self.has_attempts_left() {
            return NextStep::GiveUp;
        }

        let base = match error {
            AiError::RateLimited {
                retry_after: Some(hint),
            } => (*hint).min(MAX_RETRY_AFTER),
            _ => self.delay,
        };
        let wait = base.saturating_add(self.policy.jitter(base));

        self.delay = self.delay.saturating_mul(2).min(self.policy.max_backoff);

        NextStep::Retry(wait)
    }
}

/// Interpreta um header `Retry-After`.
///
/// Aceita segundos inteiros ou uma HTTP-date (RFC 1123). O resultado fica
/// entre 500 ms e [`MAX_RETRY_AFTER`]. Valores ilegíveis retornam `None`.
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();

    if let Ok(seconds) = value.parse::<u64>() {
        return Some(clamp_retry_after(Duration::from_secs(seconds)));
    }

    match DateTime::parse_from_rfc2822(value) {
        Ok(date) => {
            let delta = date.with_timezone(&Utc).signed_duration_since(now);
            let wait = delta.to_std().unwrap_or(Duration::ZERO);
            Some(clamp_retry_after(wait))
        }
        Err(_) => {
            tracing::debug!(header = value, "Unable to parse Retry-After header");
            None
        }
    }
}

fn clamp_retry_after(wait: Duration) -> Duration {
    wait.clamp(MIN_RETRY_AFTER, MAX_RETRY_AFTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_attempts: u32, initial_ms: u64, max_ms: u64) -> RetryPolicy {
        RetryPolicy::new(
            max_attempts,
            Duration::from_millis(initial_ms),
            Duration::from_millis(max_ms),
            0.0,
        )
    }

    fn expect_retry(step: NextStep) -> Duration {
        match step {
            NextStep::Retry(d) => d,
            NextStep::GiveUp => panic!("expected retry"),
        }
    }

    #[test]
    fn test_policy_clamps_values() {
        let p = RetryPolicy::new(0, Duration::from_millis(10), Duration::from_millis(5), 3.0);

        assert_eq!(p.max_attempts(), 1);
        assert_eq!(p.initial_backoff(), Duration::from_millis(100));
        assert_eq!(p.max_backoff(), Duration::from_millis(100));
        assert_eq!(p.jitter_fraction(), 1.0);
    }

    #[test]
    fn test_server_error_doubles_until_cap() {
        let mut backoff = Backoff::new(policy(5, 1000, 3000));
        let err = AiError::ServerError(500);

        backoff.start_attempt();
        assert_eq!(expect_retry(backoff.next_step(&err)), Duration::from_millis(1000));
        backoff.start_attempt();
        assert_eq!(expect_retry(backoff.next_step(&err)), Duration::from_millis(2000));
        backoff.start_attempt();
        assert_eq!(expect_retry(backoff.next_step(&err)), Duration::from_millis(3000));
        backoff.start_attempt();
        assert_eq!(expect_retry(backoff.next_step(&err)), Duration::from_millis(3000));
        backoff.start_attempt();
        assert_eq!(backoff.next_step(&err), NextStep::GiveUp);
    }

    #[test]
    fn test_transport_error_retries() {
        let mut backoff = Backoff::new(policy(2, 200, 1000));

        backoff.start_attempt();
        let step = backoff.next_step(&AiError::Transport("connection reset".into()));
        assert_eq!(step, NextStep::Retry(Duration::from_millis(200)));

        backoff.start_attempt();
        let step = backoff.next_step(&AiError::Transport("connection reset".into()));
        assert_eq!(step, NextStep::GiveUp);
    }

    #[test]
    fn test_non_retryable_gives_up_immediately() {
        for err in [AiError::QuotaExceeded, AiError::ClientError(401)] {
            let mut backoff = Backoff::new(policy(5, 1000, 8000));
            backoff.start_attempt();
            assert_eq!(backoff.next_step(&err), NextStep::GiveUp);
        }
    }

    #[test]
    fn test_rate_limit_uses_retry_after_hint() {
        let mut backoff = Backoff::new(policy(3, 1000, 8000));
        let err = AiError::RateLimited {
            retry_after: Some(Duration::from_secs(2)),
        };

        backoff.start_attempt();
        assert_eq!(expect_retry(backoff.next_step(&err)), Duration::from_secs(2));
        // O backoff calculado continua crescendo
        assert_eq!(backoff.current_delay(), Duration::from_millis(2000));
    }

    #[test]
    fn test_rate_limit_without_hint_uses_backoff() {
        let mut backoff = Backoff::new(policy(3, 1000, 8000));

        backoff.start_attempt();
        let step = backoff.next_step(&AiError::RateLimited { retry_after: None });
        assert_eq!(step, NextStep::Retry(Duration::from_millis(1000)));
    }

    #[test]
    fn test_jitter_within_fraction() {
        let p = RetryPolicy::new(3, Duration::from_millis(1000), Duration::from_millis(8000), 0.25);
        let base = Duration::from_millis(1000);

        for _ in 0..100 {
            let jitter = p.jitter(base);
            assert!(jitter <= Duration::from_millis(250), "jitter {jitter:?} too large");
        }
    }

    #[test]
    fn test_parse_retry_after_seconds() {
        let now = Utc::now();

        assert_eq!(parse_retry_after("2", now), Some(Duration::from_secs(2)));
        assert_eq!(parse_retry_after(" 10 ", now), Some(Duration::from_secs(10)));
        // Piso de 500 ms
        assert_eq!(parse_retry_after("0", now), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_parse_retry_after_http_date() {
        let now = DateTime::parse_from_rfc2822("Wed, 21 Oct 2015 07:28:00 GMT")
            .unwrap()
            .with_timezone(&Utc);

        let wait = parse_retry_after("Wed, 21 Oct 2015 07:28:30 GMT", now);
        assert_eq!(wait, Some(Duration::from_secs(30)));

        // Datas no passado viram o piso
        let wait = parse_retry_after("Wed, 21 Oct 2015 07:27:00 GMT", now);
        assert_eq!(wait, Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_parse_retry_after_caps_huge_values() {
        let now = DateTime::parse_from_rfc2822("Wed, 21 Oct 2015 07:28:00 GMT")
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(parse_retry_after("18446744073709551615", now), Some(MAX_RETRY_AFTER));
        assert_eq!(
            parse_retry_after("Wed, 21 Oct 2015 08:28:00 GMT", now),
            Some(MAX_RETRY_AFTER)
        );
    }

    #[test]
    fn test_huge_retry_after_hint_does_not_overflow() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1000), Duration::from_millis(8000), 0.2);
        let mut backoff = Backoff::new(policy);

        let hint = parse_retry_after("18446744073709551615", Utc::now());
        backoff.start_attempt();
        let wait = expect_retry(backoff.next_step(&AiError::RateLimited { retry_after: hint }));

        assert!(wait >= MAX_RETRY_AFTER);
        assert!(wait <= MAX_RETRY_AFTER.mul_f64(1.2));

        // Dica construída à mão, sem passar pelo parser
        backoff.start_attempt();
        let wait = expect_retry(backoff.next_step(&AiError::RateLimited {
            retry_after: Some(Duration::MAX),
        }));
        assert!(wait <= MAX_RETRY_AFTER.mul_f64(1.2));
    }

    #[test]
    fn test_parse_retry_after_garbage() {
        assert_eq!(parse_retry_after("soon", Utc::now()), None);
    }
}
