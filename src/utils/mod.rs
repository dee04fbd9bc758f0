// src/utils/mod.rs
//! Common utilities
//!
//! - **Errors**: crate error taxonomy and `Result` alias
//! - **Stack**: filtered caller-stack capture for event diagnostics

pub mod errors;
pub mod stack;

pub use errors::{Result, TraceError};
pub use stack::caller_stack;
