//! Wrapper generator
//!
//! Emits the idiomatic systems-side layer over the foreign-linkage
//! declarations: one value type per struct holding the opaque handle, with
//! accessor and method bodies that box the receiver and re-wrap returned
//! handles in their declared wrapper type. Top-level functions get the same
//! treatment, but a wrapper is only emitted when it actually differs from
//! calling the foreign declaration directly.

use crate::render::{render_reduced, render_value, short_name};
use crate::GenConfig;
use tsb_common::{mangle, mangle_member, BridgeError, CallKind, Diagnostics};
use tsb_ir::{
    reduce, reduce_param, reduces_to_handle, DeclArena, Declaration, EnumMember, EnumMemberKind,
    EnumValue, Keyword, Param, Program, StructMember, Type,
};

/// Generate the wrapper artifact
pub fn generate_wrappers(program: &Program, config: &GenConfig) -> (String, Diagnostics) {
    let mut diags = Diagnostics::new();
    let mut blocks: Vec<String> = Vec::new();

    for decl in program.declarations() {
        let result = match decl {
            Declaration::Alias {
                name, type_params, ty,
            } => alias_block(name, type_params, ty, &program.arena).map(Some),
            Declaration::Enum { name, members } => Ok(Some(enum_block(name, members))),
            Declaration::Struct { name, members, .. } => {
                struct_block(name, members, &program.arena).map(Some)
            }
            Declaration::Function {
                name, params, ret, ..
            } => function_block(name, params, ret, &program.arena),
            _ => Ok(None),
        };
        match result {
            Ok(Some(block)) => blocks.push(block),
            Ok(None) => {}
            Err(err) => diags.error(&err, decl.name()),
        }
    }

    let mut out = String::new();
    out.push_str(&format!("// {}\n", config.banner));
    out.push_str("#![allow(non_snake_case, non_camel_case_types)]\n\n");
    out.push_str(&format!("use {}::*;\n", config.support_crate.replace('-', "_")));
    out.push_str(&format!("use {}::*;\n\n", config.externs_module));
    out.push_str(&blocks.join("\n"));

    (out, diags)
}

/// Declared types whose values cross as handles but deserve their wrapper's
/// name on the idiomatic side
fn wrap_target(ty: &Type, arena: &DeclArena) -> Option<String> {
    match ty {
        Type::Reference { name, .. } | Type::Instantiated { name, .. }
            if reduces_to_handle(ty, arena) =>
        {
            Some(short_name(name).to_string())
        }
        _ => None,
    }
}

enum WrapParam {
    /// Array parameter taken as a slice, forwarded as length + pointer
    Slice(String),
    /// Optional parameter, forwarded as presence flag + value
    Opt { base: String, wrapped: bool },
    /// Struct-typed parameter taken as its wrapper, forwarded as its handle
    Wrapper(String),
    Plain(String),
}

impl WrapParam {
    fn classify(ty: &Type, arena: &DeclArena, context: &str) -> Result<WrapParam, BridgeError> {
        if let Some(target) = wrap_target(ty, arena) {
            return Ok(WrapParam::Wrapper(target));
        }
        let reduced = reduce_param(ty, arena, context)?;
        match &reduced {
            Type::Array(element) => Ok(WrapParam::Slice(render_value(element, arena, context)?)),
            Type::Optional(base) => match wrap_target(base, arena) {
                Some(target) => Ok(WrapParam::Opt {
                    base: target,
                    wrapped: true,
                }),
                None => Ok(WrapParam::Opt {
                    base: render_value(base, arena, context)?,
                    wrapped: false,
                }),
            },
            other => Ok(WrapParam::Plain(render_reduced(other, arena, context)?)),
        }
    }

    fn signature(&self, name: &str) -> String {
        match self {
            WrapParam::Slice(elem) => format!("{}: &[{}]", name, elem),
            WrapParam::Opt { base, .. } => format!("{}: Option<{}>", name, base),
            WrapParam::Wrapper(target) => format!("{}: {}", name, target),
            WrapParam::Plain(ty) => format!("{}: {}", name, ty),
        }
    }

    fn forward(&self, name: &str) -> String {
        match self {
            WrapParam::Slice(_) => format!("{n}.len() as u32, {n}.as_ptr()", n = name),
            WrapParam::Opt { wrapped: true, .. } => format!(
                "{n}.is_some(), {n}.map(|v| v.handle()).unwrap_or_default()",
                n = name
            ),
            WrapParam::Opt { wrapped: false, .. } => {
                format!("{n}.is_some(), {n}.unwrap_or_default()", n = name)
            }
            WrapParam::Wrapper(_) => format!("{}.handle()", name),
            WrapParam::Plain(_) => name.to_string(),
        }
    }

    fn needs_wrapping(&self) -> bool {
        matches!(
            self,
            WrapParam::Wrapper(_) | WrapParam::Opt { wrapped: true, .. }
        )
    }
}

enum WrapRet {
    Void,
    /// Raw handle re-wrapped in the declared wrapper type
    Wrapped(String),
    Plain(String),
}

impl WrapRet {
    fn classify(ty: &Type, arena: &DeclArena, context: &str) -> Result<WrapRet, BridgeError> {
        if let Some(target) = wrap_target(ty, arena) {
            return Ok(WrapRet::Wrapped(target));
        }
        let reduced = reduce(ty, arena, context)?;
        if matches!(
            reduced,
            Type::Keyword(Keyword::Void | Keyword::Null | Keyword::Undefined)
        ) {
            return Ok(WrapRet::Void);
        }
        Ok(WrapRet::Plain(render_reduced(&reduced, arena, context)?))
    }

    fn signature(&self) -> String {
        match self {
            WrapRet::Void => String::new(),
            WrapRet::Wrapped(target) => format!(" -> {}", target),
            WrapRet::Plain(ty) => format!(" -> {}", ty),
        }
    }

    fn body(&self, call: String) -> String {
        match self {
            WrapRet::Wrapped(target) => format!("{}::from_handle(unsafe {{ {} }})", target, call),
            _ => format!("unsafe {{ {} }}", call),
        }
    }
}

fn alias_block(
    name: &str,
    type_params: &[String],
    ty: &Type,
    arena: &DeclArena,
) -> Result<String, BridgeError> {
    let context = format!("alias {}", name);
    let body = match wrap_target(ty, arena) {
        Some(target) => target,
        None => render_value(ty, arena, &context)?,
    };
    let generics = if type_params.is_empty() {
        String::new()
    } else {
        format!("<{}>", type_params.join(", "))
    };
    Ok(format!(
        "pub type {}{} = {};\n",
        short_name(name),
        generics,
        body
    ))
}

fn enum_block(name: &str, members: &[EnumMember]) -> String {
    let name = short_name(name);
    let all_numeric = members
        .iter()
        .all(|m| matches!(m.kind, EnumMemberKind::Number | EnumMemberKind::Enum));
    let all_string = !members.is_empty()
        && members
            .iter()
            .all(|m| matches!(m.kind, EnumMemberKind::String));

    let mut out = String::new();
    out.push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq)]\n");
    out.push_str(&format!("pub enum {} {{\n", name));
    for member in members {
        match (&member.value, all_numeric) {
            (EnumValue::Number(n), true) => {
                out.push_str(&format!("    {} = {},\n", member.name, *n as i64));
            }
            _ => out.push_str(&format!("    {},\n", member.name)),
        }
    }
    out.push_str("}\n");

    if all_string {
        out.push('\n');
        out.push_str(&format!("impl {} {{\n", name));
        out.push_str("    /// Host-side string value of this member\n");
        out.push_str("    pub fn value(&self) -> &'static str {\n");
        out.push_str("        match self {\n");
        for member in members {
            if let EnumValue::String(value) = &member.value {
                out.push_str(&format!(
                    "            {}::{} => {:?},\n",
                    name, member.name, value
                ));
            }
        }
        out.push_str("        }\n    }\n}\n");
    }

    out
}

fn struct_block(
    name: &str,
    members: &[StructMember],
    arena: &DeclArena,
) -> Result<String, BridgeError> {
    let name = short_name(name);
    let mut methods: Vec<String> = Vec::new();

    for member in members {
        match member {
            StructMember::Property { name: prop, ty } => {
                if ty.is_stateless() {
                    continue;
                }
                let context = format!("property {}.{}", name, prop);
                let ret = WrapRet::classify(ty, arena, &context)?;
                let getter_call = format!(
                    "{}(self.handle)",
                    mangle_member(name, prop, CallKind::Getter)
                );
                methods.push(format!(
                    "    pub fn {}(&self){} {{\n        {}\n    }}",
                    prop,
                    ret.signature(),
                    ret.body(getter_call)
                ));

                let value = WrapParam::classify(ty, arena, &context)?;
                methods.push(format!(
                    "    pub fn set_{}(&self, {}) {{\n        unsafe {{ {}(self.handle, {}) }}\n    }}",
                    prop,
                    value.signature("value"),
                    mangle_member(name, prop, CallKind::Setter),
                    value.forward("value")
                ));
            }
            StructMember::Method {
                name: method,
                params,
                ret,
                ..
            } => {
                let context = format!("method {}.{}", name, method);
                let ret = WrapRet::classify(ret, arena, &context)?;
                let mut sig_params = vec!["&self".to_string()];
                let mut args = vec!["self.handle".to_string()];
                for param in params {
                    let wrap = WrapParam::classify(&param.ty, arena, &context)?;
                    sig_params.push(wrap.signature(&param.name));
                    args.push(wrap.forward(&param.name));
                }
                let call = format!(
                    "{}({})",
                    mangle_member(name, method, CallKind::NoMangle),
                    args.join(", ")
                );
                methods.push(format!(
                    "    pub fn {}({}){} {{\n        {}\n    }}",
                    method,
                    sig_params.join(", "),
                    ret.signature(),
                    ret.body(call)
                ));
            }
        }
    }

    let mut out = String::new();
    out.push_str(&format!("/// Bridge wrapper over a host `{}` object\n", name));
    out.push_str("#[derive(Debug, Clone, Copy)]\n");
    out.push_str(&format!("pub struct {} {{\n    handle: JsHandle,\n}}\n\n", name));
    out.push_str(&format!("impl {} {{\n", name));
    out.push_str("    pub fn from_handle(handle: JsHandle) -> Self {\n");
    out.push_str("        Self { handle }\n    }\n\n");
    out.push_str("    pub fn handle(&self) -> JsHandle {\n");
    out.push_str("        self.handle\n    }");
    for method in &methods {
        out.push_str("\n\n");
        out.push_str(method);
    }
    out.push_str("\n}\n");
    Ok(out)
}

fn function_block(
    name: &str,
    params: &[Param],
    ret: &Type,
    arena: &DeclArena,
) -> Result<Option<String>, BridgeError> {
    let context = format!("function {}", name);
    let ret = WrapRet::classify(ret, arena, &context)?;
    let mut wraps = Vec::with_capacity(params.len());
    for param in params {
        wraps.push(WrapParam::classify(&param.ty, arena, &context)?);
    }

    // A wrapper with nothing to wrap is pure duplication of the extern.
    let needs_wrapper =
        matches!(ret, WrapRet::Wrapped(_)) || wraps.iter().any(WrapParam::needs_wrapping);
    if !needs_wrapper {
        return Ok(None);
    }

    let sig_params: Vec<String> = params
        .iter()
        .zip(&wraps)
        .map(|(p, w)| w.signature(&p.name))
        .collect();
    let args: Vec<String> = params
        .iter()
        .zip(&wraps)
        .map(|(p, w)| w.forward(&p.name))
        .collect();
    let call = format!(
        "{}({})",
        mangle(short_name(name), CallKind::Root),
        args.join(", ")
    );

    Ok(Some(format!(
        "pub fn {}({}){} {{\n    {}\n}}\n",
        short_name(name),
        sig_params.join(", "),
        ret.signature(),
        ret.body(call)
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tsb_ir::LiteralBase;

    fn point_arena() -> (DeclArena, u32) {
        let mut arena = DeclArena::new();
        let point = arena.reserve();
        arena.fill(
            point,
            Declaration::Struct {
                name: "Point".to_string(),
                type_params: vec![],
                members: vec![
                    StructMember::Property {
                        name: "x".to_string(),
                        ty: Type::Keyword(Keyword::Double),
                    },
                    StructMember::Property {
                        name: "y".to_string(),
                        ty: Type::Keyword(Keyword::Double),
                    },
                ],
                source_origin: "geometry.d.ts".to_string(),
            },
        );
        (arena, point)
    }

    #[test]
    fn test_struct_wrapper_shape() {
        let (arena, point) = point_arena();
        let program = Program::new(arena, vec![point]);
        let (text, diags) = generate_wrappers(&program, &GenConfig::default());
        assert!(!diags.has_errors());

        assert!(text.contains("pub struct Point {\n    handle: JsHandle,\n}"));
        assert!(text.contains("pub fn from_handle(handle: JsHandle) -> Self"));
        assert!(text.contains("unsafe { Point_x_g(self.handle) }"));
        assert!(text.contains("pub fn set_x(&self, value: f64)"));
        assert!(text.contains("unsafe { Point_x_s(self.handle, value) }"));
    }

    #[test]
    fn test_handle_free_function_gets_no_wrapper() {
        let mut arena = DeclArena::new();
        let id = arena.alloc(Declaration::Function {
            name: "sqrt".to_string(),
            type_params: vec![],
            params: vec![Param::new("x", Type::Keyword(Keyword::Double))],
            ret: Type::Keyword(Keyword::Double),
        });
        let program = Program::new(arena, vec![id]);
        let (text, diags) = generate_wrappers(&program, &GenConfig::default());
        assert!(!diags.has_errors());
        assert!(!text.contains("pub fn sqrt"));
    }

    #[test]
    fn test_handle_bearing_function_gets_wrapper() {
        let (mut arena, point) = point_arena();
        let mirror = arena.alloc(Declaration::Function {
            name: "mirror".to_string(),
            type_params: vec![],
            params: vec![Param::new("p", Type::reference("Point", vec![], point))],
            ret: Type::reference("Point", vec![], point),
        });
        let program = Program::new(arena, vec![point, mirror]);
        let (text, diags) = generate_wrappers(&program, &GenConfig::default());
        assert!(!diags.has_errors());

        assert!(text.contains("pub fn mirror(p: Point) -> Point {"));
        assert!(text.contains("Point::from_handle(unsafe { mirror_r(p.handle()) })"));
    }

    #[test]
    fn test_array_setter_takes_slice() {
        let mut arena = DeclArena::new();
        let id = arena.alloc(Declaration::Struct {
            name: "Path".to_string(),
            type_params: vec![],
            members: vec![StructMember::Property {
                name: "weights".to_string(),
                ty: Type::array(Type::Keyword(Keyword::Double)),
            }],
            source_origin: "geometry.d.ts".to_string(),
        });
        let program = Program::new(arena, vec![id]);
        let (text, diags) = generate_wrappers(&program, &GenConfig::default());
        assert!(!diags.has_errors());

        assert!(text.contains("pub fn set_weights(&self, value: &[f64])"));
        assert!(text
            .contains("Path_weights_s(self.handle, value.len() as u32, value.as_ptr())"));
    }

    #[test]
    fn test_string_enum_mirrors_values() {
        let mut arena = DeclArena::new();
        let id = arena.alloc(Declaration::Enum {
            name: "Color".to_string(),
            members: vec![
                EnumMember {
                    name: "Red".to_string(),
                    value: EnumValue::String("red".to_string()),
                    kind: EnumMemberKind::String,
                },
                EnumMember {
                    name: "Green".to_string(),
                    value: EnumValue::String("green".to_string()),
                    kind: EnumMemberKind::String,
                },
            ],
        });
        let program = Program::new(arena, vec![id]);
        let (text, diags) = generate_wrappers(&program, &GenConfig::default());
        assert!(!diags.has_errors());

        assert!(text.contains("pub enum Color {\n    Red,\n    Green,\n}"));
        assert!(text.contains("Color::Red => \"red\","));
    }

    #[test]
    fn test_numeric_enum_keeps_discriminants() {
        let mut arena = DeclArena::new();
        let id = arena.alloc(Declaration::Enum {
            name: "Direction".to_string(),
            members: vec![
                EnumMember {
                    name: "Up".to_string(),
                    value: EnumValue::Number(0.0),
                    kind: EnumMemberKind::Number,
                },
                EnumMember {
                    name: "Down".to_string(),
                    value: EnumValue::Number(1.0),
                    kind: EnumMemberKind::Number,
                },
            ],
        });
        let program = Program::new(arena, vec![id]);
        let (text, _) = generate_wrappers(&program, &GenConfig::default());
        assert!(text.contains("Up = 0,"));
        assert!(text.contains("Down = 1,"));
    }

    #[test]
    fn test_alias_of_struct_names_the_wrapper() {
        let (mut arena, point) = point_arena();
        let alias = arena.alloc(Declaration::Alias {
            name: "Origin".to_string(),
            type_params: vec![],
            ty: Type::reference("Point", vec![], point),
        });
        let program = Program::new(arena, vec![point, alias]);
        let (text, diags) = generate_wrappers(&program, &GenConfig::default());
        assert!(!diags.has_errors());
        assert!(text.contains("pub type Origin = Point;"));
    }

    #[test]
    fn test_literal_property_is_skipped() {
        let mut arena = DeclArena::new();
        let id = arena.alloc(Declaration::Struct {
            name: "Circle".to_string(),
            type_params: vec![],
            members: vec![StructMember::Property {
                name: "kind".to_string(),
                ty: Type::Literal {
                    value: "circle".to_string(),
                    base: LiteralBase::String,
                },
            }],
            source_origin: "shapes.d.ts".to_string(),
        });
        let program = Program::new(arena, vec![id]);
        let (text, diags) = generate_wrappers(&program, &GenConfig::default());
        assert!(!diags.has_errors());
        assert!(!text.contains("fn kind"));
        assert!(!text.contains("set_kind"));
    }

    #[test]
    fn test_optional_struct_param_forwards_handle() {
        let (mut arena, point) = point_arena();
        let id = arena.alloc(Declaration::Function {
            name: "snap".to_string(),
            type_params: vec![],
            params: vec![Param::new(
                "anchor",
                Type::optional(Type::reference("Point", vec![], point)),
            )],
            ret: Type::Keyword(Keyword::Void),
        });
        let program = Program::new(arena, vec![point, id]);
        let (text, diags) = generate_wrappers(&program, &GenConfig::default());
        assert!(!diags.has_errors());

        assert!(text.contains("pub fn snap(anchor: Option<Point>)"));
        assert_eq!(
            text.contains("anchor.is_some(), anchor.map(|v| v.handle()).unwrap_or_default()"),
            true
        );
    }
}
