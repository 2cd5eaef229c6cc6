//! Estado compartilhado do cliente: cache de respostas e circuit breaker.

use std::time::Duration;

use tokio::sync::Mutex;

use crate::cache::ResponseCache;
use crate::types::config::Config;

use super::circuit::CircuitBreaker;

/// Estado que vive durante todo o processo e é compartilhado entre
/// requisições via `Arc`.
///
/// Os locks só são mantidos durante leituras e escritas, nunca durante
/// esperas de backoff ou chamadas de rede.
pub struct SharedState {
    pub cache: Mutex<ResponseCache>,
    pub circuit: CircuitBreaker,
}

impl SharedState {
    /// Cria o estado com cache e circuit breaker explícitos.
    pub fn new(cache: ResponseCache, circuit: CircuitBreaker) -> Self {
        Self {
            cache: Mutex::new(cache),
            circuit,
        }
    }

    /// Cria a partir da configuração.
    pub fn from_config(config: &Config) -> Self {
        let cache = ResponseCache::new(
            config.cache.max_entries,
            Duration::from_secs(config.cache.ttl_secs),
        );
        Self::new(cache, CircuitBreaker::from_config(&config.circuit))
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
