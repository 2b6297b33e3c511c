//! Core domain: entities, errors, and the ports the rest of the crate is
//! built behind.

pub mod analysis;
pub mod chunking;
pub mod error;
pub mod patch;
pub mod ports;
pub mod query;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
