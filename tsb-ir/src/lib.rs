//! TypeScript Bridge Generator - Declaration IR
//!
//! This crate defines the intermediate representation of the declaration
//! surface consumed by the generators:
//! - Types: the closed set of type variants with stable FQNs
//! - Declarations: structs, enums, aliases, functions, type parameters
//! - Declaration arena: index-based lazy reference resolution
//! - Boundary reduction: how a rich type degrades to something passable
//!   across the primitive-only boundary
//!
//! The model is produced once per generation run by an external front end
//! (fed as JSON via [`Program::from_json`]), is immutable thereafter, and is
//! discarded after the generators finish.

pub mod decl;
pub mod reduce;
pub mod types;

pub use decl::{
    is_host_origin, DeclArena, DeclId, Declaration, EnumMember, EnumMemberKind, EnumValue,
    Program, StructMember,
};
pub use reduce::{reduce, reduce_param, reduces_to_handle};
pub use types::{Keyword, LiteralBase, Param, Type};
