// src/sink/mod.rs
//! Event persistence
//!
//! - **EventSink**: append-only JSON-lines log, lazily opened, one file
//!   per sink lifetime, best-effort writes

pub mod log_sink;

pub use log_sink::{EventSink, SinkConfig};
