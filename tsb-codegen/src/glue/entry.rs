//! Exported entry point generation
//!
//! One exported JavaScript function per top-level function, property
//! accessor, and method. The parameter list is the value-returnable subset
//! passed straight through (handles resolved via registry lookup), plus a
//! slot parameter for every type needing an explicit decode, plus a leading
//! `out` slot when the return type needs an explicit encode.

use crate::glue::codec::{
    canonical, is_handle_like, is_value_returnable, is_void_like, CodecSet, Slot,
};
use crate::render::short_name;
use tsb_common::{mangle, mangle_member, BridgeError, CallKind};
use tsb_ir::{Param, Type};

/// How one declared parameter crosses into the entry point
enum ParamPass {
    /// Value-returnable: passed straight through
    Direct,
    /// Registry handle, resolved on entry
    HandleLookup,
    /// Slot offset, decoded on entry
    Decode(String),
}

struct CallShape {
    params: Vec<String>,
    prologue: Vec<String>,
    args: Vec<String>,
}

fn shape_params(
    params: &[Param],
    codecs: &mut CodecSet<'_>,
    context: &str,
) -> Result<CallShape, BridgeError> {
    let mut shape = CallShape {
        params: Vec::new(),
        prologue: Vec::new(),
        args: Vec::new(),
    };
    for param in params {
        let pass = classify_param(&param.ty, codecs, context)?;
        let n = &param.name;
        match pass {
            ParamPass::Direct => shape.params.push(n.clone()),
            ParamPass::HandleLookup => {
                shape.params.push(format!("{}_handle", n));
                shape
                    .prologue
                    .push(format!("const {} = registry.get({}_handle);", n, n));
            }
            ParamPass::Decode(codec) => {
                shape.params.push(format!("{}_ptr", n));
                shape.prologue.push(format!(
                    "const {} = decode_{}(view(), {}_ptr);",
                    n, codec, n
                ));
            }
        }
        shape.args.push(n.clone());
    }
    Ok(shape)
}

fn classify_param(
    ty: &Type,
    codecs: &mut CodecSet<'_>,
    context: &str,
) -> Result<ParamPass, BridgeError> {
    let canon = canonical(ty, codecs.program(), context)?;
    if is_handle_like(&canon, codecs.program()) {
        return Ok(ParamPass::HandleLookup);
    }
    if is_value_returnable(&canon, codecs.program()) {
        return Ok(ParamPass::Direct);
    }
    match codecs.slot_for(ty, context)? {
        Slot::Codec { name, .. } => Ok(ParamPass::Decode(name)),
        _ => Ok(ParamPass::Direct),
    }
}

/// How the result crosses back out
enum RetPass {
    None,
    Direct,
    /// Registered and returned as a handle
    Insert,
    /// Encoded into the leading `out` slot
    Encode(String),
}

fn classify_return(
    ty: &Type,
    codecs: &mut CodecSet<'_>,
    context: &str,
) -> Result<RetPass, BridgeError> {
    let canon = canonical(ty, codecs.program(), context)?;
    if is_void_like(&canon) {
        return Ok(RetPass::None);
    }
    if is_handle_like(&canon, codecs.program()) {
        return Ok(RetPass::Insert);
    }
    if is_value_returnable(&canon, codecs.program()) {
        return Ok(RetPass::Direct);
    }
    match codecs.slot_for(ty, context)? {
        Slot::Codec { name, .. } => Ok(RetPass::Encode(name)),
        _ => Ok(RetPass::Direct),
    }
}

fn assemble(
    export: &str,
    leading: &[&str],
    shape: &CallShape,
    ret: &RetPass,
    call: String,
) -> String {
    let mut params: Vec<String> = Vec::new();
    if matches!(ret, RetPass::Encode(_)) {
        params.push("out".to_string());
    }
    params.extend(leading.iter().map(|p| p.to_string()));
    params.extend(shape.params.iter().cloned());

    let mut body: Vec<String> = shape.prologue.clone();
    match ret {
        RetPass::None => body.push(format!("{};", call)),
        RetPass::Direct => body.push(format!("return {};", call)),
        RetPass::Insert => body.push(format!("return registry.insert({});", call)),
        RetPass::Encode(codec) => {
            body.push(format!("const result = {};", call));
            body.push(format!("encode_{}(view(), out, result);", codec));
        }
    }

    let mut out = format!("export function {}({}) {{\n", export, params.join(", "));
    for line in body {
        out.push_str(&format!("    {}\n", line));
    }
    out.push_str("}\n");
    out
}

/// Entry point for a top-level function
pub fn function_entry(
    name: &str,
    params: &[Param],
    ret: &Type,
    codecs: &mut CodecSet<'_>,
) -> Result<String, BridgeError> {
    let context = format!("function {}", name);
    let shape = shape_params(params, codecs, &context)?;
    let ret = classify_return(ret, codecs, &context)?;
    let call = format!("impl.{}({})", name, shape.args.join(", "));
    Ok(assemble(
        &mangle(short_name(name), CallKind::Root),
        &[],
        &shape,
        &ret,
        call,
    ))
}

/// Getter and setter entry points for a struct property
pub fn property_entries(
    owner: &str,
    prop: &str,
    ty: &Type,
    codecs: &mut CodecSet<'_>,
) -> Result<Vec<String>, BridgeError> {
    let context = format!("property {}.{}", owner, prop);
    let owner = short_name(owner);

    let ret = match classify_return(ty, codecs, &context)? {
        // A getter always observes a value, even for nullish-typed props.
        RetPass::None => RetPass::Direct,
        other => other,
    };
    let empty = CallShape {
        params: Vec::new(),
        prologue: Vec::new(),
        args: Vec::new(),
    };
    let getter = assemble(
        &mangle_member(owner, prop, CallKind::Getter),
        &["self"],
        &empty,
        &ret,
        format!("registry.get(self).{}", prop),
    );

    let value = Param::new("value", ty.clone());
    let shape = shape_params(std::slice::from_ref(&value), codecs, &context)?;
    let mut setter_params = vec!["self".to_string()];
    setter_params.extend(shape.params.iter().cloned());
    let mut body: Vec<String> = shape.prologue.clone();
    body.push(format!("registry.get(self).{} = value;", prop));
    let mut setter = format!(
        "export function {}({}) {{\n",
        mangle_member(owner, prop, CallKind::Setter),
        setter_params.join(", ")
    );
    for line in body {
        setter.push_str(&format!("    {}\n", line));
    }
    setter.push_str("}\n");

    Ok(vec![getter, setter])
}

/// Entry point for a struct method
pub fn method_entry(
    owner: &str,
    method: &str,
    params: &[Param],
    ret: &Type,
    codecs: &mut CodecSet<'_>,
) -> Result<String, BridgeError> {
    let context = format!("method {}.{}", owner, method);
    let owner = short_name(owner);
    let shape = shape_params(params, codecs, &context)?;
    let ret = classify_return(ret, codecs, &context)?;
    let call = format!(
        "registry.get(self).{}({})",
        method,
        shape.args.join(", ")
    );
    Ok(assemble(
        &mangle_member(owner, method, CallKind::NoMangle),
        &["self"],
        &shape,
        &ret,
        call,
    ))
}
