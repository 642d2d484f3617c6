//! Relay Core
//!
//! Core types and building blocks for dispatching command batches to a
//! remote CI workflow and recovering their output.
//!
//! This crate contains:
//! - Domain types: correlation token, command batch, repository coordinate,
//!   run handle and output block
//! - DTOs: wire types exchanged with the GitHub Actions API
//! - Retry policy: bounded constant-interval polling with cancellation
//! - Log archive access and token-delimited output extraction

pub mod archive;
pub mod domain;
pub mod dto;
pub mod extract;
pub mod retry;
