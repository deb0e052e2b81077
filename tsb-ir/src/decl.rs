//! Declaration IR and the declaration arena
//!
//! References between declarations resolve through arena indices rather than
//! invocable thunks: a [`DeclId`] can be handed out before its target is
//! built (mutual and self reference), and resolution is an O(1) lookup that
//! performs no recursive evaluation. Consumers that walk further are
//! responsible for their own cycle detection, keyed by FQN.

use crate::types::{Param, Type};
use serde::{Deserialize, Serialize};
use tsb_common::BridgeError;

/// Index of a declaration in the arena
pub type DeclId = u32;

/// Substrings of `source_origin` that identify bundled standard/host
/// library declarations (used by discriminator synthesis for
/// prototype-membership checks). Matching is by path convention, not
/// semantics.
const HOST_ORIGIN_MARKERS: [&str; 3] = ["lib.", "@types/", "typescript/lib"];

/// Whether a declaration's source origin marks it as a standard/host one
pub fn is_host_origin(origin: &str) -> bool {
    HOST_ORIGIN_MARKERS.iter().any(|m| origin.contains(m))
}

/// Whether an enum member marshals as an integer or a string at the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnumMemberKind {
    Number,
    String,
    /// Member whose value is itself another enum member
    Enum,
}

/// An enum member's declared value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EnumValue {
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    pub value: EnumValue,
    pub kind: EnumMemberKind,
}

/// A struct member: data property or method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StructMember {
    Property {
        name: String,
        ty: Type,
    },
    Method {
        name: String,
        type_params: Vec<String>,
        params: Vec<Param>,
        ret: Type,
    },
}

impl StructMember {
    pub fn name(&self) -> &str {
        match self {
            StructMember::Property { name, .. } => name,
            StructMember::Method { name, .. } => name,
        }
    }
}

/// The closed set of declaration kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Declaration {
    Struct {
        name: String,
        type_params: Vec<String>,
        members: Vec<StructMember>,
        /// Path of the declaring source file; recognizes standard/host
        /// declarations via [`is_host_origin`]
        source_origin: String,
    },
    Enum {
        name: String,
        members: Vec<EnumMember>,
    },
    Alias {
        name: String,
        type_params: Vec<String>,
        ty: Type,
    },
    Function {
        name: String,
        type_params: Vec<String>,
        params: Vec<Param>,
        ret: Type,
    },
    TypeParameter {
        name: String,
        constraint: Option<Type>,
        default: Option<Type>,
    },
    /// Placeholder for a reserved-but-never-filled arena slot
    Unknown,
}

impl Declaration {
    /// The declaration's FQN, if it has one
    pub fn name(&self) -> Option<&str> {
        match self {
            Declaration::Struct { name, .. }
            | Declaration::Enum { name, .. }
            | Declaration::Alias { name, .. }
            | Declaration::Function { name, .. }
            | Declaration::TypeParameter { name, .. } => Some(name),
            Declaration::Unknown => None,
        }
    }

    /// Enum members are all integer-marshalled (number or enum kind)
    pub fn is_numeric_enum(&self) -> bool {
        match self {
            Declaration::Enum { members, .. } => members
                .iter()
                .all(|m| matches!(m.kind, EnumMemberKind::Number | EnumMemberKind::Enum)),
            _ => false,
        }
    }
}

/// Arena of declarations addressed by [`DeclId`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclArena {
    decls: Vec<Declaration>,
}

impl DeclArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a completed declaration, returning its id
    pub fn alloc(&mut self, decl: Declaration) -> DeclId {
        let id = self.decls.len() as DeclId;
        self.decls.push(decl);
        id
    }

    /// Reserve a slot for a declaration that is still being built.
    /// Until [`DeclArena::fill`] runs, the slot resolves as unknown.
    pub fn reserve(&mut self) -> DeclId {
        self.alloc(Declaration::Unknown)
    }

    /// Complete a previously reserved slot
    pub fn fill(&mut self, id: DeclId, decl: Declaration) {
        self.decls[id as usize] = decl;
    }

    pub fn get(&self, id: DeclId) -> Option<&Declaration> {
        self.decls.get(id as usize)
    }

    /// Resolve a reference to its declaration. Out-of-range ids and
    /// never-filled slots fail with `UnresolvedSymbol`, naming the
    /// reference and the declaration being processed.
    pub fn resolve(
        &self,
        id: DeclId,
        reference: &str,
        context: &str,
    ) -> Result<&Declaration, BridgeError> {
        match self.get(id) {
            Some(Declaration::Unknown) | None => {
                Err(BridgeError::unresolved(reference, context))
            }
            Some(decl) => Ok(decl),
        }
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> + '_ {
        self.decls.iter()
    }
}

/// A complete generation input: the arena plus the ordered list of
/// top-level declarations. Produced once per run, immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub arena: DeclArena,
    /// Top-level declarations in input order
    pub order: Vec<DeclId>,
}

impl Program {
    pub fn new(arena: DeclArena, order: Vec<DeclId>) -> Self {
        Self { arena, order }
    }

    /// Top-level declarations in input order
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> + '_ {
        self.order.iter().filter_map(|id| self.arena.get(*id))
    }

    /// Deserialize a program fed by the external front end
    pub fn from_json(json: &str) -> Result<Program, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
