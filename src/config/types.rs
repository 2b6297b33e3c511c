//! Configuration types (§6). Mirrors the recognized key names one-for-one
//! under a `[code_analysis]` table plus a top-level `[process_management]`
//! table.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Root configuration document.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Config {
    #[validate(nested)]
    pub code_analysis: CodeAnalysisConfig,
    #[serde(default)]
    #[validate(nested)]
    pub process_management: ProcessManagementConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CodeAnalysisConfig {
    /// Vector dimension `D`. Required for any semantic-search feature.
    #[validate(range(min = 1))]
    pub vector_dim: u32,

    /// Path to the on-disk ANN index file, relative to the project root.
    pub faiss_index_path: String,

    /// Path to the SQLite persistent store, relative to the project root.
    #[serde(default = "default_store_path")]
    pub store_path: String,

    #[validate(nested)]
    pub embedding: EmbeddingConfig,

    #[validate(nested)]
    pub chunker: ChunkerConfig,

    /// `L_min`: minimum prose length before a chunk is sent standalone.
    #[serde(default = "default_min_chunk_length")]
    pub min_chunk_length: usize,

    /// Module size threshold for the `file_too_long` issue.
    #[serde(default = "default_max_file_lines")]
    pub max_file_lines: u32,

    #[validate(nested)]
    pub worker: WorkerConfig,

    #[serde(default = "default_retry_attempts")]
    pub vectorization_retry_attempts: u32,

    #[serde(default = "default_retry_delay")]
    pub vectorization_retry_delay: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmbeddingConfig {
    pub enabled: bool,
    /// Base URL of the external embedding service.
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChunkerConfig {
    pub enabled: bool,
    /// Base URL of the external chunker service; `None` uses the in-process
    /// extractor/grouper only (no remote sub-chunking).
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WorkerConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    #[validate(nested)]
    pub circuit_breaker: CircuitBreakerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CircuitBreakerConfig {
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    #[serde(default = "default_recovery_timeout")]
    pub recovery_timeout: u64,
    #[serde(default = "default_success_threshold")]
    pub success_threshold: u32,
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff: f64,
    #[serde(default = "default_max_backoff")]
    pub max_backoff: f64,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProcessManagementConfig {
    #[serde(default = "default_shutdown_grace_seconds")]
    pub shutdown_grace_seconds: f64,
}

impl Default for ProcessManagementConfig {
    fn default() -> Self {
        Self {
            shutdown_grace_seconds: default_shutdown_grace_seconds(),
        }
    }
}

fn default_store_path() -> String {
    "data/code_analysis.db".to_string()
}
fn default_min_chunk_length() -> usize {
    30
}
fn default_max_file_lines() -> u32 {
    400
}
fn default_timeout_seconds() -> u64 {
    30
}
fn default_retry_attempts() -> u32 {
    3
}
fn default_retry_delay() -> f64 {
    1.0
}
fn default_poll_interval() -> u64 {
    30
}
fn default_batch_size() -> u32 {
    10
}
fn default_failure_threshold() -> u32 {
    5
}
fn default_recovery_timeout() -> u64 {
    30
}
fn default_success_threshold() -> u32 {
    2
}
fn default_initial_backoff() -> f64 {
    1.0
}
fn default_max_backoff() -> f64 {
    60.0
}
fn default_backoff_multiplier() -> f64 {
    2.0
}
fn default_shutdown_grace_seconds() -> f64 {
    10.0
}
