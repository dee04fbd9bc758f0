// src/model/mod.rs
//! Event model
//!
//! The structured record of one logical database operation:
//!
//! - **Event**: lifecycle state, captured SQL, bindings, violations
//! - **OperationKind**: create / query / row_query / update / delete
//! - **FieldSnapshot**: declared per-field metadata at operation start

pub mod event;
pub mod field;

pub use event::{Event, OperationKind};
pub use field::{FieldSnapshot, TypeKind};
