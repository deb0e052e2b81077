//! Rust type rendering
//!
//! Shared by the foreign-linkage and wrapper generators: maps reduced
//! boundary types to their Rust spelling. Array and optional values expand
//! to a pair in parameter position (length + pointer, presence flag + base)
//! and to a support type in return position; composite values render as the
//! support crate's marker types, never expanded inline.

use tsb_common::BridgeError;
use tsb_ir::{reduce, reduce_param, DeclArena, Keyword, Type};

/// Last segment of a possibly dotted fully-qualified name
pub fn short_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

fn keyword_spelling(kw: Keyword) -> &'static str {
    match kw {
        Keyword::Double => "f64",
        Keyword::Bool => "bool",
        Keyword::String => "JsString",
        Keyword::Void | Keyword::Null | Keyword::Undefined => "()",
        Keyword::Any => "JsAny",
        Keyword::BigInt => "JsBigInt",
    }
}

/// Render a type in single-slot (value/return) position after reduction
pub fn render_value(ty: &Type, arena: &DeclArena, context: &str) -> Result<String, BridgeError> {
    let reduced = reduce(ty, arena, context)?;
    render_reduced(&reduced, arena, context)
}

/// Render an already-reduced type; used where the declared view should be
/// kept (alias bodies, wrapper signatures)
pub fn render_reduced(ty: &Type, arena: &DeclArena, context: &str) -> Result<String, BridgeError> {
    match ty {
        Type::Keyword(kw) => Ok(keyword_spelling(*kw).to_string()),
        Type::Literal { base, .. } | Type::LiteralUnion { base, .. } => {
            Ok(keyword_spelling(base.keyword()).to_string())
        }
        Type::Handle => Ok("JsHandle".to_string()),
        Type::Array(_) => Ok("JsArray".to_string()),
        Type::Optional(base) => {
            let inner = render_value(base, arena, context)?;
            Ok(format!("JsOptional<{}>", inner))
        }
        Type::Union(_) => Ok("JsUnion".to_string()),
        Type::Intersection(_) => Ok("JsIntersection".to_string()),
        Type::Mapped => Ok("JsMapped".to_string()),
        Type::Indexed { .. } => Ok("JsAny".to_string()),
        Type::Predicate(_) => Ok("bool".to_string()),
        Type::Function { params, ret, .. } => {
            let mut rendered = Vec::with_capacity(params.len());
            for param in params {
                rendered.push(render_value(&param.ty, arena, context)?);
            }
            let ret_text = if ret.is_void() {
                String::new()
            } else {
                format!(" -> {}", render_value(ret, arena, context)?)
            };
            Ok(format!(
                "extern \"C\" fn({}){}",
                rendered.join(", "),
                ret_text
            ))
        }
        Type::Reference { name, args, .. } => render_named(name, args, arena, context),
        Type::Instantiated { name, args, .. } => render_named(name, args, arena, context),
        Type::Conditional { .. } => Err(BridgeError::unsupported("conditional", context)),
    }
}

fn render_named(
    name: &str,
    args: &[Type],
    arena: &DeclArena,
    context: &str,
) -> Result<String, BridgeError> {
    if args.is_empty() {
        return Ok(short_name(name).to_string());
    }
    let mut rendered = Vec::with_capacity(args.len());
    for arg in args {
        rendered.push(render_value(arg, arena, context)?);
    }
    Ok(format!("{}<{}>", short_name(name), rendered.join(", ")))
}

/// Render one declared parameter, expanding arrays to a length/pointer pair
/// and optionals to a presence-flag/base pair
pub fn render_extern_param(
    name: &str,
    declared: &Type,
    arena: &DeclArena,
    context: &str,
) -> Result<String, BridgeError> {
    let reduced = reduce_param(declared, arena, context)?;
    match &reduced {
        Type::Array(element) => {
            let elem = render_value(element, arena, context)?;
            Ok(format!("{n}_len: u32, {n}_ptr: *const {elem}", n = name))
        }
        Type::Optional(base) => {
            let base = render_value(base, arena, context)?;
            Ok(format!("{n}_has: bool, {n}: {base}", n = name))
        }
        other => {
            let rendered = render_reduced(other, arena, context)?;
            Ok(format!("{}: {}", name, rendered))
        }
    }
}

/// Render a declared return type as `" -> T"`, or empty for void
pub fn render_extern_return(
    declared: &Type,
    arena: &DeclArena,
    context: &str,
) -> Result<String, BridgeError> {
    let reduced = reduce(declared, arena, context)?;
    if matches!(
        reduced,
        Type::Keyword(Keyword::Void | Keyword::Null | Keyword::Undefined)
    ) {
        return Ok(String::new());
    }
    Ok(format!(" -> {}", render_reduced(&reduced, arena, context)?))
}
