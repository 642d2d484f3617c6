//! Data Transfer Objects for the GitHub Actions API
//!
//! This module contains the request and response bodies exchanged with the
//! remote CI system. They mirror the wire format; the domain module turns
//! them into the types the pipeline works with.

pub mod dispatch;
pub mod run;
