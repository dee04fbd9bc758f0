// src/rules/mod.rs
//! Declarative correctness rules
//!
//! - **Engine**: ordered evaluation of the installed rule set against
//!   each completing event; full-set evaluation always completes
//! - **Catalog**: the canonical rules (no-filter family, zero-value
//!   insert, binding-count mismatch) and the exempt-field policy

pub mod catalog;
pub mod engine;

pub use catalog::{
    canonical_rules, is_zero_value, BindingCountMismatch, ExemptPolicy, NoFilterDelete,
    NoFilterSelect, NoFilterUpdate, ZeroValueInsert,
};
pub use engine::{Rule, RuleEngine, Violation};
