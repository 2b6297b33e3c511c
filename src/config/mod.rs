//! Layered configuration (§6).

mod loader;
mod types;

pub use loader::{default_config_toml, ConfigLoader};
pub use types::{
    ChunkerConfig, CircuitBreakerConfig, CodeAnalysisConfig, Config, EmbeddingConfig, ProcessManagementConfig,
    WorkerConfig,
};
