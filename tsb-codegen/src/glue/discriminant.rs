//! Union discriminator synthesis
//!
//! Given a union's members, produce one runtime guard per member: a boolean
//! check evaluable on an arbitrary host value that identifies which member
//! the value represents. No runtime type tags exist in the host format, so
//! the guards are invented from static declaration structure, in strict
//! precedence order:
//!
//! 1. primitive-kind members: direct `typeof` checks
//! 2. members declared by a recognized standard/host source: `instanceof`
//! 3. a shared literal-discriminant property across two or more remaining
//!    struct members (first property found wins, not best)
//! 4. declared type-predicate functions matching a member's FQN
//! 5. at most one member left unguarded: always-true by exclusion
//! 6. more than one left: placeholder guards plus a recoverable warning
//!
//! Guards are emitted in that precedence order; the encoded discriminant is
//! always the member's declaration-order index.

use crate::glue::codec::js_string;
use crate::render::short_name;
use tsb_common::Diagnostics;
use tsb_ir::{is_host_origin, Declaration, Keyword, LiteralBase, Program, StructMember, Type};

/// A runtime check identifying one union member
#[derive(Debug, Clone, PartialEq)]
pub enum Guard {
    /// `typeof value === "<kind>"`
    TypeOf(&'static str),
    IsNull,
    IsUndefined,
    /// `value instanceof <class>` for standard/host declarations
    Instance(String),
    /// Equality or set-membership test on a shared literal property
    LiteralProp {
        prop: String,
        values: Vec<String>,
        base: LiteralBase,
    },
    /// Call to a declared type-predicate function
    PredicateFn(String),
    /// Matches by exclusion; must be tried last
    Always,
    /// No distinguishing check could be synthesized
    Placeholder,
}

impl Guard {
    /// Precedence class; guards are emitted in ascending order of this
    fn priority(&self) -> u8 {
        match self {
            Guard::TypeOf(_) | Guard::IsNull | Guard::IsUndefined => 0,
            Guard::Instance(_) => 1,
            Guard::LiteralProp { .. } => 2,
            Guard::PredicateFn(_) => 3,
            Guard::Always => 4,
            Guard::Placeholder => 5,
        }
    }
}

/// A member's guard together with its declaration-order index
#[derive(Debug, Clone)]
pub struct GuardedMember {
    pub decl_index: usize,
    pub guard: Guard,
}

/// Synthesize mutually exclusive guards for a union's members, returned in
/// guard precedence order
pub fn synthesize(
    union_name: &str,
    members: &[Type],
    program: &Program,
    diags: &mut Diagnostics,
) -> Vec<GuardedMember> {
    let mut guards: Vec<Option<Guard>> = members.iter().map(primitive_guard).collect();

    // Step 2: standard/host declarations get a prototype-membership check.
    for (i, member) in members.iter().enumerate() {
        if guards[i].is_some() {
            continue;
        }
        if let Type::Reference { name, decl, .. } = member {
            if let Some(Declaration::Struct { source_origin, .. }) = program.arena.get(*decl) {
                if is_host_origin(source_origin) {
                    guards[i] = Some(Guard::Instance(short_name(name).to_string()));
                }
            }
        }
    }

    // Step 3: first shared literal-discriminant property across the
    // remaining struct members. First found wins, even if a later property
    // would partition more members. A property partitions when two or more
    // remaining members declare it literally, or when it splits a remaining
    // pair into declarer and non-declarer.
    let remaining = guards.iter().filter(|g| g.is_none()).count();
    'search: for (i, member) in members.iter().enumerate() {
        if guards[i].is_some() {
            continue;
        }
        let Some(props) = struct_properties(member, program) else {
            continue;
        };
        for prop in props {
            let StructMember::Property { name: prop_name, ty } = prop else {
                continue;
            };
            if literal_values(ty).is_none() {
                continue;
            }
            let holders: Vec<(usize, Vec<String>, LiteralBase)> = members
                .iter()
                .enumerate()
                .filter(|(j, _)| guards[*j].is_none())
                .filter_map(|(j, m)| {
                    let candidate = struct_properties(m, program)?
                        .iter()
                        .find(|p| p.name() == prop_name)?;
                    let StructMember::Property { ty, .. } = candidate else {
                        return None;
                    };
                    let (values, base) = literal_values(ty)?;
                    Some((j, values, base))
                })
                .collect();
            if holders.len() >= 2 || (holders.len() == 1 && remaining == 2) {
                for (j, values, base) in holders {
                    guards[j] = Some(Guard::LiteralProp {
                        prop: prop_name.clone(),
                        values,
                        base,
                    });
                }
                break 'search;
            }
        }
    }

    // Step 4: declared type-predicate functions matched by target FQN.
    for (i, member) in members.iter().enumerate() {
        if guards[i].is_some() {
            continue;
        }
        if let Some(predicate) = find_predicate_for(member, program) {
            guards[i] = Some(Guard::PredicateFn(predicate));
        }
    }

    // Steps 5 and 6: exclusion fallback, or flag for hand authoring.
    let unresolved: Vec<usize> = (0..members.len())
        .filter(|i| guards[*i].is_none())
        .collect();
    match unresolved.len() {
        0 => {}
        1 => guards[unresolved[0]] = Some(Guard::Always),
        n => {
            for i in &unresolved {
                guards[*i] = Some(Guard::Placeholder);
            }
            let message = format!(
                "union `{}` leaves {} members without a distinguishing runtime check; \
                 a hand-authored discriminator is required",
                union_name, n
            );
            log::warn!("{}", message);
            diags.warning(message, None);
        }
    }

    let mut out: Vec<GuardedMember> = guards
        .into_iter()
        .enumerate()
        .map(|(decl_index, guard)| GuardedMember {
            decl_index,
            guard: guard.expect("every member was assigned a guard"),
        })
        .collect();
    // Stable sort keeps declaration order within each precedence class.
    out.sort_by_key(|gm| gm.guard.priority());
    out
}

/// Render a guard as a JavaScript boolean expression over `value`
pub fn render_guard(guard: &Guard, value: &str) -> String {
    match guard {
        Guard::TypeOf(kind) => format!("typeof {} === \"{}\"", value, kind),
        Guard::IsNull => format!("{} === null", value),
        Guard::IsUndefined => format!("{} === undefined", value),
        Guard::Instance(class) => format!("{} instanceof {}", value, class),
        Guard::LiteralProp { prop, values, base } => {
            let literals: Vec<String> = values.iter().map(|v| literal_js(v, *base)).collect();
            if literals.len() == 1 {
                format!("{}.{} === {}", value, prop, literals[0])
            } else {
                format!("[{}].includes({}.{})", literals.join(", "), value, prop)
            }
        }
        Guard::PredicateFn(name) => format!("impl.{}({})", name, value),
        Guard::Always => "true".to_string(),
        Guard::Placeholder => "false".to_string(),
    }
}

fn literal_js(value: &str, base: LiteralBase) -> String {
    match base {
        LiteralBase::String => js_string(value),
        LiteralBase::Number | LiteralBase::Bool => value.to_string(),
    }
}

/// Step-1 guard for members with a primitive runtime kind
fn primitive_guard(member: &Type) -> Option<Guard> {
    match member {
        Type::Keyword(Keyword::Double) => Some(Guard::TypeOf("number")),
        Type::Keyword(Keyword::String) => Some(Guard::TypeOf("string")),
        Type::Keyword(Keyword::Bool) => Some(Guard::TypeOf("boolean")),
        Type::Keyword(Keyword::BigInt) => Some(Guard::TypeOf("bigint")),
        Type::Keyword(Keyword::Null) => Some(Guard::IsNull),
        Type::Keyword(Keyword::Undefined | Keyword::Void) => Some(Guard::IsUndefined),
        Type::Literal { base, .. } | Type::LiteralUnion { base, .. } => Some(match base {
            LiteralBase::String => Guard::TypeOf("string"),
            LiteralBase::Number => Guard::TypeOf("number"),
            LiteralBase::Bool => Guard::TypeOf("boolean"),
        }),
        Type::Function { .. } => Some(Guard::TypeOf("function")),
        _ => None,
    }
}

/// A property type counts as a literal discriminant when it is a literal or
/// literal union, possibly optional-wrapped
fn literal_values(ty: &Type) -> Option<(Vec<String>, LiteralBase)> {
    match ty {
        Type::Literal { value, base } => Some((vec![value.clone()], *base)),
        Type::LiteralUnion { members, base } => Some((members.clone(), *base)),
        Type::Optional(inner) => literal_values(inner),
        _ => None,
    }
}

fn struct_properties<'p>(member: &Type, program: &'p Program) -> Option<&'p [StructMember]> {
    let Type::Reference { decl, .. } = member else {
        return None;
    };
    match program.arena.get(*decl) {
        Some(Declaration::Struct { members, .. }) => Some(members),
        _ => None,
    }
}

/// Find a declared type-predicate function whose target matches the member
fn find_predicate_for(member: &Type, program: &Program) -> Option<String> {
    let member_fqn = member.fqn();
    for decl in program.declarations() {
        if let Declaration::Function { name, ret, .. } = decl {
            if let Type::Predicate(target) = ret {
                if target.fqn() == member_fqn {
                    return Some(name.clone());
                }
            }
        }
    }
    None
}
