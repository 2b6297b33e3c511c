//! Vectorization worker (§4.8): chunks files, embeds prose (via a
//! [`crate::domain::ports::EmbeddingProvider`] wrapped in a circuit
//! breaker), and keeps the vector index in sync with the store — all on a
//! single cooperative poll loop.

mod circuit_breaker;
mod fallback;
mod http_provider;
mod owner;
mod poll_loop;
mod resilient_provider;

pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use fallback::{pseudo_embed, FALLBACK_MODEL_NAME};
pub use http_provider::HttpEmbeddingProvider;
pub use owner::resolve_owner_id;
pub use poll_loop::{run_once, spawn, StopFlag, WorkerContext};
pub use resilient_provider::ResilientEmbeddingProvider;
