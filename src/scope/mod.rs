// src/scope/mod.rs
//! Scope surface and extraction
//!
//! - **OperationScope**: the read surface the collaborator's per-call
//!   context must expose, plus a get/set attribute bag
//! - **ScopeView**: owned, consistent snapshot of a scope at one phase
//! - **ScopeAdapter**: extraction of tracer-relevant fields, including
//!   the attribute allow-list

pub mod adapter;
pub mod view;

pub use adapter::{ScopeAdapter, DEFAULT_ATTR_ALLOW_LIST};
pub use view::{OperationScope, ScopeView};
