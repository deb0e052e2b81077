//! Type system IR
//!
//! This module defines the closed set of type variants that the generators
//! dispatch over. Every variant carries (or derives) a fully-qualified name
//! used for identity, deduplication, and cross-referencing across the whole
//! pipeline.
//!
//! Two invariants are enforced at construction and never re-checked
//! downstream:
//! - a union whose members are all literals is represented as
//!   [`Type::LiteralUnion`], never as a generic [`Type::Union`];
//! - a two-member union containing the `null`/`undefined` keyword collapses
//!   to [`Type::Optional`], and `Optional(Optional(x))` never occurs.

use crate::decl::DeclId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tsb_common::BridgeError;

/// Primitive keyword types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    Double,
    Bool,
    String,
    Void,
    Null,
    Undefined,
    Any,
    BigInt,
}

impl Keyword {
    pub fn name(&self) -> &'static str {
        match self {
            Keyword::Double => "double",
            Keyword::Bool => "bool",
            Keyword::String => "string",
            Keyword::Void => "void",
            Keyword::Null => "null",
            Keyword::Undefined => "undefined",
            Keyword::Any => "any",
            Keyword::BigInt => "bigint",
        }
    }

    /// True for the keywords that collapse a two-member union to `Optional`
    pub fn is_nullish(&self) -> bool {
        matches!(self, Keyword::Null | Keyword::Undefined)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Base primitive kind of a literal type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralBase {
    String,
    Number,
    Bool,
}

impl LiteralBase {
    /// The keyword a literal (union) of this base degrades to at the boundary
    pub fn keyword(&self) -> Keyword {
        match self {
            LiteralBase::String => Keyword::String,
            LiteralBase::Number => Keyword::Double,
            LiteralBase::Bool => Keyword::Bool,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LiteralBase::String => "string",
            LiteralBase::Number => "number",
            LiteralBase::Bool => "bool",
        }
    }
}

/// A named function/method parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: Type,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self { name: name.into(), ty }
    }
}

/// The closed set of type variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Type {
    /// Primitive keyword
    Keyword(Keyword),

    /// A single literal value with its base primitive kind
    Literal { value: String, base: LiteralBase },

    /// Closed set of literals sharing one base kind, in declaration order
    LiteralUnion { members: Vec<String>, base: LiteralBase },

    /// A named reference into the declaration arena
    Reference {
        name: String,
        args: Vec<Type>,
        decl: DeclId,
    },

    Array(Box<Type>),

    Optional(Box<Type>),

    Union(Vec<Type>),

    Intersection(Vec<Type>),

    Function {
        type_params: Vec<String>,
        params: Vec<Param>,
        ret: Box<Type>,
    },

    Mapped,

    Conditional {
        check: Box<Type>,
        extends: Box<Type>,
        true_ty: Box<Type>,
        false_ty: Box<Type>,
    },

    Indexed {
        object: Box<Type>,
        index: Box<Type>,
        /// Members resolved by the front end, keyed by name
        members: BTreeMap<String, Type>,
    },

    /// A runtime type-check function's target (`x is T`)
    Predicate(Box<Type>),

    /// Opaque cross-boundary reference into the live-object registry
    Handle,

    /// A generic alias with its arguments substituted
    Instantiated {
        name: String,
        base: Box<Type>,
        args: Vec<Type>,
    },
}

impl Type {
    /// Build a union, applying the mandatory construction rules:
    /// all-literal member lists become [`Type::LiteralUnion`] (failing on
    /// mixed base kinds), and a two-member union containing `null` or
    /// `undefined` collapses to [`Type::Optional`].
    pub fn union(mut members: Vec<Type>) -> Result<Type, BridgeError> {
        match members.len() {
            0 => {
                return Err(BridgeError::Internal {
                    message: "cannot build a union with no members".to_string(),
                })
            }
            1 => return Ok(members.remove(0)),
            _ => {}
        }

        if members.len() == 2 {
            let nullish = |t: &Type| matches!(t, Type::Keyword(k) if k.is_nullish());
            if let Some(pos) = members.iter().position(nullish) {
                let other = members.swap_remove(1 - pos);
                // Never double-wrap: T? | null stays T?
                if matches!(other, Type::Optional(_)) {
                    return Ok(other);
                }
                return Ok(Type::Optional(Box::new(other)));
            }
        }

        if members.iter().all(|m| matches!(m, Type::Literal { .. })) {
            let mut values = Vec::with_capacity(members.len());
            let mut base: Option<LiteralBase> = None;
            for member in members {
                let Type::Literal { value, base: b } = member else {
                    unreachable!()
                };
                match base {
                    None => base = Some(b),
                    Some(expected) if expected != b => {
                        return Err(BridgeError::MixedLiteralBaseKind {
                            expected: expected.name().to_string(),
                            found: b.name().to_string(),
                        })
                    }
                    Some(_) => {}
                }
                values.push(value);
            }
            return Ok(Type::LiteralUnion {
                members: values,
                base: base.expect("non-empty literal union"),
            });
        }

        Ok(Type::Union(members))
    }

    /// Build a literal union directly, validating the single-base-kind rule
    pub fn literal_union(
        members: Vec<String>,
        base: LiteralBase,
    ) -> Result<Type, BridgeError> {
        if members.is_empty() {
            return Err(BridgeError::Internal {
                message: "cannot build a literal union with no members".to_string(),
            });
        }
        Ok(Type::LiteralUnion { members, base })
    }

    pub fn reference(name: impl Into<String>, args: Vec<Type>, decl: DeclId) -> Type {
        Type::Reference {
            name: name.into(),
            args,
            decl,
        }
    }

    pub fn array(element: Type) -> Type {
        Type::Array(Box::new(element))
    }

    pub fn optional(base: Type) -> Type {
        match base {
            // Optional(Optional(x)) never occurs
            already @ Type::Optional(_) => already,
            other => Type::Optional(Box::new(other)),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Keyword(Keyword::Void))
    }

    /// True for types with no runtime state of their own: a single literal,
    /// or the `undefined` keyword. Such properties get no accessors.
    pub fn is_stateless(&self) -> bool {
        matches!(
            self,
            Type::Literal { .. } | Type::Keyword(Keyword::Undefined)
        )
    }

    /// Variant name used by error messages
    pub fn variant_name(&self) -> &'static str {
        match self {
            Type::Keyword(_) => "keyword",
            Type::Literal { .. } => "literal",
            Type::LiteralUnion { .. } => "literalunion",
            Type::Reference { .. } => "reference",
            Type::Array(_) => "array",
            Type::Optional(_) => "optional",
            Type::Union(_) => "union",
            Type::Intersection(_) => "intersection",
            Type::Function { .. } => "function",
            Type::Mapped => "mapped",
            Type::Conditional { .. } => "conditional",
            Type::Indexed { .. } => "indexed",
            Type::Predicate(_) => "predicate",
            Type::Handle => "handle",
            Type::Instantiated { .. } => "instantiated",
        }
    }

    /// Stable fully-qualified name: the identity key for deduplication.
    /// References carry the front end's fully-qualified name; composite
    /// types derive theirs structurally, so two occurrences of the same
    /// source type always agree.
    pub fn fqn(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Keyword(k) => write!(f, "{}", k),
            Type::Literal { value, base } => match base {
                LiteralBase::String => write!(f, "\"{}\"", value),
                _ => write!(f, "{}", value),
            },
            Type::LiteralUnion { members, base } => {
                let sep = match base {
                    LiteralBase::String => {
                        let quoted: Vec<String> =
                            members.iter().map(|m| format!("\"{}\"", m)).collect();
                        quoted.join(" | ")
                    }
                    _ => members.join(" | "),
                };
                write!(f, "{}", sep)
            }
            Type::Reference { name, args, .. } => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    let rendered: Vec<String> = args.iter().map(Type::to_string).collect();
                    write!(f, "<{}>", rendered.join(", "))?;
                }
                Ok(())
            }
            Type::Array(el) => write!(f, "{}[]", el),
            Type::Optional(base) => write!(f, "{}?", base),
            Type::Union(members) => {
                let rendered: Vec<String> = members.iter().map(Type::to_string).collect();
                write!(f, "{}", rendered.join(" | "))
            }
            Type::Intersection(members) => {
                let rendered: Vec<String> = members.iter().map(Type::to_string).collect();
                write!(f, "{}", rendered.join(" & "))
            }
            Type::Function { params, ret, .. } => {
                let rendered: Vec<String> =
                    params.iter().map(|p| format!("{}: {}", p.name, p.ty)).collect();
                write!(f, "({}) => {}", rendered.join(", "), ret)
            }
            Type::Mapped => write!(f, "{{mapped}}"),
            Type::Conditional {
                check,
                extends,
                true_ty,
                false_ty,
            } => write!(f, "{} extends {} ? {} : {}", check, extends, true_ty, false_ty),
            Type::Indexed { object, index, .. } => write!(f, "{}[{}]", object, index),
            Type::Predicate(target) => write!(f, "is {}", target),
            Type::Handle => write!(f, "handle"),
            Type::Instantiated { name, args, .. } => {
                let rendered: Vec<String> = args.iter().map(Type::to_string).collect();
                write!(f, "{}<{}>", name, rendered.join(", "))
            }
        }
    }
}
