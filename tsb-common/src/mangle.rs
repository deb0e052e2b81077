//! Deterministic symbol mangling for exported entry points
//!
//! The foreign-linkage, wrapper, and marshalling generators each compute
//! entry point names independently and never communicate, so mangling must be
//! a pure function of its inputs: identical (owner, member, call kind)
//! triples always produce identical names.

use serde::{Deserialize, Serialize};

/// How an entry point is invoked, which decides its name suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallKind {
    /// Property setter, suffixed `_s`
    Setter,
    /// Property getter, suffixed `_g`
    Getter,
    /// Top-level function, suffixed `_r`
    Root,
    /// Method call, no suffix beyond the owner prefix
    NoMangle,
}

impl CallKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            CallKind::Setter => "_s",
            CallKind::Getter => "_g",
            CallKind::Root => "_r",
            CallKind::NoMangle => "",
        }
    }
}

/// Mangle a base name for the given call kind
pub fn mangle(name: &str, kind: CallKind) -> String {
    format!("{}{}", name, kind.suffix())
}

/// Mangle a struct member: the owner's name prefixes the member name
pub fn mangle_member(owner: &str, member: &str, kind: CallKind) -> String {
    mangle(&format!("{}_{}", owner, member), kind)
}
