//! Conversational request router.
//!
//! A chat message is answered from a table of canned shortcuts or by one of
//! several text-generation backends. Backend answers are translated to the
//! display language when needed and cleaned of formatting residue before
//! they are returned.

pub mod config;
pub mod pipeline;

pub use config::CharlaConfig;
pub use pipeline::{BackendKind, BackendSelector, Router};
