//! Shared model for the report builder: variables, tokens, blocks, templates,
//! uploaded tables and the publish flow that binds them together.
//!
//! Everything in this crate is synchronous and free of I/O. The `backend`
//! service wraps it in HTTP handlers and background jobs.

pub mod error;
pub mod jobs;
pub mod model;
pub mod requests;

pub use error::{ReportError, Result};
