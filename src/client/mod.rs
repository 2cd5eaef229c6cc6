//! Cliente da API de completions.
//!
//! Camadas:
//! - `transport`: HTTP cru, atrás do trait [`CompletionTransport`]
//! - `backoff`: política de retry
//! - `circuit`: circuit breaker
//! - `resilient`: orquestra as camadas acima com o cache

mod backoff;
mod circuit;
mod error;
mod resilient;
mod state;
mod transport;

pub use backoff::{parse_retry_after, Backoff, NextStep, RetryPolicy, MAX_RETRY_AFTER};
pub use circuit::{CircuitBreaker, CircuitState, CircuitStatus};
pub use error::AiError;
pub use resilient::{CompletionPrompt, ResilientAiClient};
pub use state::SharedState;
pub use transport::{
    ChatChoice, ChatMessage, ChatRequest, ChatResponse, CompletionTransport, HttpTransport,
    ResponseMessage, TransportError, TransportResponse, Usage, MAX_TOKENS, TEMPERATURE,
};
