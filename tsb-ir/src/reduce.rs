//! Boundary reduction
//!
//! Maps any IR type to its boundary-safe representation: the single source
//! of truth for "does this type need an opaque handle or can it cross the
//! boundary by value". Every generator calls [`reduce`] rather than
//! re-deriving the rules.
//!
//! The function is total over all variants except `conditional` (never
//! crosses), bare `mapped` in parameter position (rejected by
//! [`reduce_param`]), and references to unknown declarations.

use crate::decl::{DeclArena, Declaration};
use crate::types::{Keyword, Type};
use tsb_common::BridgeError;

/// Reduce a type to its boundary representation.
/// `context` names the declaration being processed, for error messages.
pub fn reduce(ty: &Type, arena: &DeclArena, context: &str) -> Result<Type, BridgeError> {
    reduce_inner(ty, arena, context, &mut Vec::new())
}

/// Reduce a type in function-parameter position. Identical to [`reduce`]
/// except that a bare `mapped` type cannot be a parameter at all.
pub fn reduce_param(ty: &Type, arena: &DeclArena, context: &str) -> Result<Type, BridgeError> {
    if matches!(ty, Type::Mapped) {
        return Err(BridgeError::unsupported("mapped", context));
    }
    reduce(ty, arena, context)
}

/// Whether a declared type crosses the boundary as an opaque handle
pub fn reduces_to_handle(ty: &Type, arena: &DeclArena) -> bool {
    matches!(reduce(ty, arena, "<query>"), Ok(Type::Handle))
}

fn reduce_inner(
    ty: &Type,
    arena: &DeclArena,
    context: &str,
    visiting: &mut Vec<String>,
) -> Result<Type, BridgeError> {
    match ty {
        Type::Reference { name, args, decl } => {
            let target = arena.resolve(*decl, name, context)?;
            match target {
                Declaration::Struct { .. } => Ok(Type::Handle),
                Declaration::Alias { ty: aliased, .. } => {
                    if visiting.iter().any(|seen| seen == name) {
                        return Err(BridgeError::Internal {
                            message: format!(
                                "alias cycle through `{}` while reducing {}",
                                name, context
                            ),
                        });
                    }
                    visiting.push(name.clone());
                    let reduced = reduce_inner(aliased, arena, context, visiting)?;
                    visiting.pop();

                    if matches!(reduced, Type::Handle) {
                        Ok(Type::Handle)
                    } else if !args.is_empty() {
                        Ok(Type::Instantiated {
                            name: name.clone(),
                            base: Box::new(aliased.clone()),
                            args: args.clone(),
                        })
                    } else {
                        Ok(ty.clone())
                    }
                }
                // Enum boundary handling is resolved later by member-kind
                // inspection.
                Declaration::Enum { .. } => Ok(ty.clone()),
                _ => Ok(ty.clone()),
            }
        }

        Type::LiteralUnion { base, .. } => Ok(Type::Keyword(base.keyword())),

        Type::Predicate(_) => Ok(Type::Keyword(Keyword::Bool)),

        Type::Mapped => Ok(Type::Handle),

        Type::Conditional { .. } => Err(BridgeError::unsupported("conditional", context)),

        // Everything else passes through unchanged; unions and
        // intersections stay composite for downstream structural handling.
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{DeclArena, Declaration};
    use crate::types::{LiteralBase, Param};
    use pretty_assertions::assert_eq;

    fn arena_with_struct(name: &str) -> (DeclArena, u32) {
        let mut arena = DeclArena::new();
        let id = arena.alloc(Declaration::Struct {
            name: name.to_string(),
            type_params: vec![],
            members: vec![],
            source_origin: "test.d.ts".to_string(),
        });
        (arena, id)
    }

    #[test]
    fn test_struct_reference_becomes_handle() {
        let (arena, id) = arena_with_struct("Point");
        let ty = Type::reference("Point", vec![], id);
        assert_eq!(reduce(&ty, &arena, "test").unwrap(), Type::Handle);
        assert!(reduces_to_handle(&ty, &arena));
    }

    #[test]
    fn test_alias_of_struct_becomes_handle() {
        let (mut arena, point) = arena_with_struct("Point");
        let alias = arena.alloc(Declaration::Alias {
            name: "Origin".to_string(),
            type_params: vec![],
            ty: Type::reference("Point", vec![], point),
        });
        let ty = Type::reference("Origin", vec![], alias);
        assert_eq!(reduce(&ty, &arena, "test").unwrap(), Type::Handle);
    }

    #[test]
    fn test_plain_alias_passes_through_as_reference() {
        let mut arena = DeclArena::new();
        let alias = arena.alloc(Declaration::Alias {
            name: "Scalar".to_string(),
            type_params: vec![],
            ty: Type::Keyword(Keyword::Double),
        });
        let ty = Type::reference("Scalar", vec![], alias);
        assert_eq!(reduce(&ty, &arena, "test").unwrap(), ty);
    }

    #[test]
    fn test_generic_alias_instantiates() {
        let mut arena = DeclArena::new();
        let alias = arena.alloc(Declaration::Alias {
            name: "Pair".to_string(),
            type_params: vec!["T".to_string()],
            ty: Type::array(Type::Keyword(Keyword::Any)),
        });
        let ty = Type::reference("Pair", vec![Type::Keyword(Keyword::Double)], alias);

        match reduce(&ty, &arena, "test").unwrap() {
            Type::Instantiated { name, args, .. } => {
                assert_eq!(name, "Pair");
                assert_eq!(args, vec![Type::Keyword(Keyword::Double)]);
            }
            other => panic!("expected instantiated alias, got {:?}", other),
        }
    }

    #[test]
    fn test_enum_reference_passes_through() {
        let mut arena = DeclArena::new();
        let id = arena.alloc(Declaration::Enum {
            name: "Direction".to_string(),
            members: vec![],
        });
        let ty = Type::reference("Direction", vec![], id);
        assert_eq!(reduce(&ty, &arena, "test").unwrap(), ty);
    }

    #[test]
    fn test_literal_union_reduces_to_base_keyword() {
        let arena = DeclArena::new();
        let ty = Type::literal_union(
            vec!["circle".to_string(), "square".to_string()],
            LiteralBase::String,
        )
        .unwrap();
        assert_eq!(
            reduce(&ty, &arena, "test").unwrap(),
            Type::Keyword(Keyword::String)
        );
    }

    #[test]
    fn test_predicate_reduces_to_bool() {
        let arena = DeclArena::new();
        let ty = Type::Predicate(Box::new(Type::Keyword(Keyword::Any)));
        assert_eq!(
            reduce(&ty, &arena, "test").unwrap(),
            Type::Keyword(Keyword::Bool)
        );
    }

    #[test]
    fn test_mapped_value_degrades_but_param_fails() {
        let arena = DeclArena::new();
        assert_eq!(reduce(&Type::Mapped, &arena, "test").unwrap(), Type::Handle);

        let err = reduce_param(&Type::Mapped, &arena, "function render").unwrap_err();
        assert!(matches!(err, BridgeError::UnsupportedBoundaryType { .. }));
        assert!(err.to_string().contains("mapped"));
    }

    #[test]
    fn test_conditional_is_unsupported() {
        let arena = DeclArena::new();
        let ty = Type::Conditional {
            check: Box::new(Type::Keyword(Keyword::Any)),
            extends: Box::new(Type::Keyword(Keyword::String)),
            true_ty: Box::new(Type::Keyword(Keyword::Double)),
            false_ty: Box::new(Type::Keyword(Keyword::Bool)),
        };
        let err = reduce(&ty, &arena, "alias Pick").unwrap_err();
        assert!(err.to_string().contains("conditional"));
    }

    #[test]
    fn test_unknown_reference_is_unresolved() {
        let mut arena = DeclArena::new();
        let id = arena.reserve();
        let ty = Type::reference("Missing", vec![], id);
        let err = reduce(&ty, &arena, "struct Owner").unwrap_err();
        assert!(matches!(err, BridgeError::UnresolvedSymbol { .. }));
    }

    #[test]
    fn test_alias_cycle_fails_fast() {
        let mut arena = DeclArena::new();
        let a = arena.reserve();
        let b = arena.reserve();
        arena.fill(
            a,
            Declaration::Alias {
                name: "A".to_string(),
                type_params: vec![],
                ty: Type::reference("B", vec![], b),
            },
        );
        arena.fill(
            b,
            Declaration::Alias {
                name: "B".to_string(),
                type_params: vec![],
                ty: Type::reference("A", vec![], a),
            },
        );

        let ty = Type::reference("A", vec![], a);
        let err = reduce(&ty, &arena, "test").unwrap_err();
        assert!(matches!(err, BridgeError::Internal { .. }));
    }

    #[test]
    fn test_composites_pass_through() {
        let arena = DeclArena::new();
        let union = Type::Union(vec![
            Type::Keyword(Keyword::Double),
            Type::Keyword(Keyword::String),
            Type::Keyword(Keyword::Bool),
        ]);
        assert_eq!(reduce(&union, &arena, "test").unwrap(), union);

        let func = Type::Function {
            type_params: vec![],
            params: vec![Param::new("x", Type::Keyword(Keyword::Double))],
            ret: Box::new(Type::Keyword(Keyword::Void)),
        };
        assert_eq!(reduce(&func, &arena, "test").unwrap(), func);
    }
}
