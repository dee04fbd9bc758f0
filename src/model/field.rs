// src/model/field.rs
//! Declared field metadata
//!
//! The record-mapping layer describes each field of the in-memory record
//! with explicit metadata instead of runtime reflection: its name,
//! whether the caller left it at the type's zero value, and the declared
//! type category. Rules that compare "what the caller supplied" against
//! "what was actually bound" operate on this snapshot alone.

use serde::{Deserialize, Serialize};

/// Declared type category of a mapped field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// Boolean; has no "unset" state distinguishable from `false`
    Bool,

    /// Any integer width, signed or unsigned
    Integer,

    /// Any floating-point width
    Float,

    /// Text
    String,

    /// Raw byte blobs
    Bytes,

    /// Timestamps and dates
    Time,

    /// Anything the mapping layer does not classify further
    Other,
}

/// One field of the in-memory record, as observed at operation start
/// (before SQL generation, while the caller-supplied default/non-default
/// distinction still exists).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    /// Column-level field name
    pub name: String,

    /// Whether the caller left the field at its type's zero value
    pub is_default: bool,

    /// Declared type category
    pub kind: TypeKind,
}

impl FieldSnapshot {
    /// Create a field snapshot
    pub fn new(name: impl Into<String>, is_default: bool, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            is_default,
            kind,
        }
    }
}
