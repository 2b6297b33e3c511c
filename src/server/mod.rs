//! External transport (§1 "out of scope... thin wrappers"): the CLI
//! surface and the worker daemon supervisor. Nothing here is part of the
//! core; every handler is a few lines that calls into
//! [`crate::orchestrator`] or [`crate::worker`] and reports the result.

mod cli;
mod daemon;
mod dispatch;

pub use cli::Cli;
pub use dispatch::run;
