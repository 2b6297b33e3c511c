//! `codeloom`: a selector-driven CST query and refactoring engine with
//! structural indexing and semantic code search, for a Python-like
//! source language.
//!
//! Module map mirrors §2's component table: [`domain`] holds the CST/query/
//! analysis/patch core (C1-C4, C9) plus the port traits (C5/C7/embedding);
//! [`store`] and [`vectorindex`] are the concrete adapters behind those
//! ports (C5, C7); [`worker`] is the vectorization background task (C8);
//! [`orchestrator`] is the command facade (C10); [`server`] is the
//! external transport (CLI/daemon), out of core scope per §1.

pub mod config;
pub mod domain;
pub mod orchestrator;
pub mod server;
pub mod store;
pub mod vectorindex;
pub mod worker;

pub use domain::error::{Error, Result};
