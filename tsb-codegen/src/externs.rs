//! Foreign-linkage generator
//!
//! Emits the raw `extern "C"` declarations the compiled module links
//! against: one per top-level function, plus getter/setter/method
//! declarations per struct member. Properties typed as a single literal or
//! the `undefined` keyword carry no runtime state and get no accessors.
//!
//! A declaration that cannot be reduced is reported and skipped; the rest
//! of the artifact is still produced.

use crate::render::{render_extern_param, render_extern_return, short_name};
use crate::GenConfig;
use tsb_common::{mangle, mangle_member, CallKind, Diagnostics};
use tsb_ir::{DeclArena, Declaration, Param, Program, StructMember, Type};

/// Generate the foreign-linkage artifact
pub fn generate_externs(program: &Program, config: &GenConfig) -> (String, Diagnostics) {
    let mut diags = Diagnostics::new();
    let mut items: Vec<String> = Vec::new();

    for decl in program.declarations() {
        match decl {
            Declaration::Function {
                name, params, ret, ..
            } => match extern_function(name, params, ret, &program.arena) {
                Ok(item) => items.push(item),
                Err(err) => diags.error(&err, Some(name.as_str())),
            },
            Declaration::Struct { name, members, .. } => {
                match extern_struct(name, members, &program.arena) {
                    Ok(mut struct_items) => items.append(&mut struct_items),
                    Err(err) => diags.error(&err, Some(name.as_str())),
                }
            }
            _ => {}
        }
    }

    let mut out = String::new();
    out.push_str(&format!("// {}\n", config.banner));
    out.push_str("#![allow(non_snake_case, non_camel_case_types)]\n\n");
    out.push_str(&format!("use {}::*;\n\n", config.support_crate.replace('-', "_")));

    if !items.is_empty() {
        out.push_str("extern \"C\" {\n");
        let body: Vec<String> = items.iter().map(|item| format!("    {}", item)).collect();
        out.push_str(&body.join("\n\n"));
        out.push_str("\n}\n");
    }

    (out, diags)
}

fn extern_function(
    name: &str,
    params: &[Param],
    ret: &Type,
    arena: &DeclArena,
) -> Result<String, tsb_common::BridgeError> {
    let context = format!("function {}", name);
    let mut rendered = Vec::with_capacity(params.len());
    for param in params {
        rendered.push(render_extern_param(&param.name, &param.ty, arena, &context)?);
    }
    let ret_text = render_extern_return(ret, arena, &context)?;
    Ok(format!(
        "pub fn {}({}){};",
        mangle(short_name(name), CallKind::Root),
        rendered.join(", "),
        ret_text
    ))
}

fn extern_struct(
    name: &str,
    members: &[StructMember],
    arena: &DeclArena,
) -> Result<Vec<String>, tsb_common::BridgeError> {
    let owner = short_name(name);
    let mut items = Vec::new();
    for member in members {
        match member {
            StructMember::Property { name: prop, ty } => {
                if ty.is_stateless() {
                    continue;
                }
                let context = format!("property {}.{}", name, prop);
                let ret_text = render_extern_return(ty, arena, &context)?;
                items.push(format!(
                    "pub fn {}(self_: JsHandle){};",
                    mangle_member(owner, prop, CallKind::Getter),
                    ret_text
                ));
                let value = render_extern_param("value", ty, arena, &context)?;
                items.push(format!(
                    "pub fn {}(self_: JsHandle, {});",
                    mangle_member(owner, prop, CallKind::Setter),
                    value
                ));
            }
            StructMember::Method {
                name: method,
                params,
                ret,
                ..
            } => {
                let context = format!("method {}.{}", name, method);
                let mut rendered = vec!["self_: JsHandle".to_string()];
                for param in params {
                    rendered.push(render_extern_param(&param.name, &param.ty, arena, &context)?);
                }
                let ret_text = render_extern_return(ret, arena, &context)?;
                items.push(format!(
                    "pub fn {}({}){};",
                    mangle_member(owner, method, CallKind::NoMangle),
                    rendered.join(", "),
                    ret_text
                ));
            }
        }
    }
    Ok(items)
}
