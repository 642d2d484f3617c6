//! Core domain types
//!
//! These types carry a single pipeline invocation from dispatch to extracted
//! output. They are shared between the HTTP client (which fills them from API
//! responses) and the CLI (which threads them through the pipeline stages).

pub mod command;
pub mod output;
pub mod repository;
pub mod run;
pub mod token;
