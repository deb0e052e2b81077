//! Codec synthesis for the marshalling artifact
//!
//! Every type that cannot be passed as a plain return/parameter value gets a
//! pair of JavaScript functions: an encoder (host value into boundary
//! storage) and a decoder (boundary storage into host value). Codecs are
//! deduplicated by canonical mangled type name, a structural encoding of the
//! type's shape, so two aliases resolving to the same shape share one codec.
//!
//! Layout conventions:
//! - optional: presence flag at a fixed offset past the base's storage
//! - array: `(length, offset)` pair at the call site, elements allocated in
//!   host buffer space and encoded in sequence
//! - struct reference: integer handle from the live-object registry
//! - string-base literal union: index into a declaration-ordered value table
//! - union: discriminant index, payload at a fixed secondary offset

use crate::glue::discriminant::{self, Guard};
use std::collections::BTreeMap;
use tsb_common::{BridgeError, Diagnostics};
use tsb_ir::{Declaration, Keyword, LiteralBase, Program, Type};

/// Offset of a union's payload past its discriminant index
pub const UNION_PAYLOAD_OFFSET: u32 = 8;

/// Cap on alias expansion; reaching it means the front end fed a cycle
const MAX_EXPANSION_DEPTH: u32 = 64;

/// Keep identifier-safe characters; everything else becomes an underscore
pub fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Emit a quoted, escaped JavaScript string literal
pub fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Expand a type to the form that keys codec deduplication: aliases are
/// replaced by their targets, string-kind enums and string literals by the
/// plain string keyword, instantiations by their base.
pub fn canonical(ty: &Type, program: &Program, context: &str) -> Result<Type, BridgeError> {
    canonical_at(ty, program, context, 0)
}

fn canonical_at(
    ty: &Type,
    program: &Program,
    context: &str,
    depth: u32,
) -> Result<Type, BridgeError> {
    if depth > MAX_EXPANSION_DEPTH {
        return Err(BridgeError::Internal {
            message: format!("type expansion too deep in {} (alias cycle?)", context),
        });
    }
    match ty {
        Type::Reference { name, decl, .. } => {
            match program.arena.resolve(*decl, name, context)? {
                Declaration::Alias { ty: aliased, .. } => {
                    canonical_at(aliased, program, context, depth + 1)
                }
                decl @ Declaration::Enum { .. } if !decl.is_numeric_enum() => {
                    // String-kind enums marshal as plain strings.
                    Ok(Type::Keyword(Keyword::String))
                }
                _ => Ok(ty.clone()),
            }
        }
        Type::Literal {
            base: LiteralBase::String,
            ..
        } => Ok(Type::Keyword(Keyword::String)),
        Type::Array(el) => Ok(Type::Array(Box::new(canonical_at(
            el,
            program,
            context,
            depth + 1,
        )?))),
        Type::Optional(base) => Ok(Type::Optional(Box::new(canonical_at(
            base,
            program,
            context,
            depth + 1,
        )?))),
        Type::Union(members) => {
            let mut canon = Vec::with_capacity(members.len());
            for member in members {
                canon.push(canonical_at(member, program, context, depth + 1)?);
            }
            Ok(Type::Union(canon))
        }
        Type::Instantiated { base, .. } => canonical_at(base, program, context, depth + 1),
        other => Ok(other.clone()),
    }
}

/// Types whose plain boundary value is a registry handle
pub fn is_handle_like(canon: &Type, program: &Program) -> bool {
    match canon {
        Type::Handle
        | Type::Mapped
        | Type::Intersection(_)
        | Type::Indexed { .. }
        | Type::Keyword(Keyword::Any) => true,
        Type::Reference { decl, .. } => matches!(
            program.arena.get(*decl),
            Some(
                Declaration::Struct { .. }
                    | Declaration::TypeParameter { .. }
                    | Declaration::Function { .. }
            )
        ),
        _ => false,
    }
}

/// Types with no boundary storage at all
pub fn is_void_like(canon: &Type) -> bool {
    matches!(
        canon,
        Type::Keyword(Keyword::Void | Keyword::Null | Keyword::Undefined)
    )
}

fn is_direct(canon: &Type, program: &Program) -> bool {
    match canon {
        Type::Keyword(Keyword::Bool | Keyword::Double) => true,
        Type::Literal { base, .. } | Type::LiteralUnion { base, .. } => {
            matches!(base, LiteralBase::Number | LiteralBase::Bool)
        }
        Type::Predicate(_) => true,
        Type::Reference { decl, .. } => program
            .arena
            .get(*decl)
            .map(Declaration::is_numeric_enum)
            .unwrap_or(false),
        _ => false,
    }
}

/// The value-returnable predicate: a type needing no explicit encode/decode
/// call at a return/parameter position
pub fn is_value_returnable(canon: &Type, program: &Program) -> bool {
    is_void_like(canon) || is_direct(canon, program) || is_handle_like(canon, program)
}

/// How a value of some type is written into or read out of a boundary slot
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    F64,
    Bool,
    /// Numeric/enum-kind enum member values, implementation-defined width
    I32,
    /// Registry handle
    Handle,
    /// No storage; decodes to a fixed expression (`null`/`undefined`)
    Unit(&'static str),
    Codec {
        name: String,
        width: u32,
    },
}

impl Slot {
    pub fn width(&self) -> u32 {
        match self {
            Slot::F64 => 8,
            Slot::Bool => 1,
            Slot::I32 => 4,
            Slot::Handle => 4,
            Slot::Unit(_) => 0,
            Slot::Codec { width, .. } => *width,
        }
    }

    /// Statement writing `value` at byte offset `off`, if storage exists
    pub fn write_stmt(&self, off: &str, value: &str) -> Option<String> {
        match self {
            Slot::F64 => Some(format!("view.setFloat64({}, {}, true);", off, value)),
            Slot::Bool => Some(format!("view.setUint8({}, {} ? 1 : 0);", off, value)),
            Slot::I32 => Some(format!("view.setInt32({}, {}, true);", off, value)),
            Slot::Handle => Some(format!(
                "view.setUint32({}, registry.insert({}), true);",
                off, value
            )),
            Slot::Unit(_) => None,
            Slot::Codec { name, .. } => Some(format!("encode_{}(view, {}, {});", name, off, value)),
        }
    }

    /// Expression reading the value back from byte offset `off`
    pub fn read_expr(&self, off: &str) -> String {
        match self {
            Slot::F64 => format!("view.getFloat64({}, true)", off),
            Slot::Bool => format!("view.getUint8({}) !== 0", off),
            Slot::I32 => format!("view.getInt32({}, true)", off),
            Slot::Handle => format!("registry.get(view.getUint32({}, true))", off),
            Slot::Unit(value) => (*value).to_string(),
            Slot::Codec { name, .. } => format!("decode_{}(view, {})", name, off),
        }
    }
}

/// Canonical mangled type name: the codec deduplication key
pub fn mangled_type_name(canon: &Type, program: &Program) -> String {
    match canon {
        Type::Keyword(kw) => kw.name().to_string(),
        Type::Literal { value, base } => format!("lit_{}_{}", base.name(), sanitize(value)),
        Type::LiteralUnion { members, base: _ } => {
            let values: Vec<String> = members.iter().map(|m| sanitize(m)).collect();
            format!("litunion{}_{}", members.len(), values.join("_"))
        }
        Type::Reference { name, .. } => sanitize(name),
        Type::Array(el) => format!("array_{}", mangled_type_name(el, program)),
        Type::Optional(base) => format!("optional_{}", mangled_type_name(base, program)),
        Type::Union(members) => {
            let parts: Vec<String> = members
                .iter()
                .map(|m| mangled_type_name(m, program))
                .collect();
            format!("union{}_{}", members.len(), parts.join("_"))
        }
        Type::Intersection(members) => {
            let parts: Vec<String> = members
                .iter()
                .map(|m| mangled_type_name(m, program))
                .collect();
            format!("intersection{}_{}", members.len(), parts.join("_"))
        }
        Type::Function { params, ret, .. } => {
            let parts: Vec<String> = params
                .iter()
                .map(|p| mangled_type_name(&p.ty, program))
                .collect();
            format!(
                "fn{}_{}_ret_{}",
                params.len(),
                parts.join("_"),
                mangled_type_name(ret, program)
            )
        }
        Type::Mapped => "mapped".to_string(),
        Type::Handle => "handle".to_string(),
        Type::Indexed { object, .. } => format!("indexed_{}", mangled_type_name(object, program)),
        Type::Predicate(_) => "predicate".to_string(),
        Type::Instantiated { name, args, .. } => {
            let parts: Vec<String> = args.iter().map(|a| mangled_type_name(a, program)).collect();
            format!("{}_{}", sanitize(name), parts.join("_"))
        }
        Type::Conditional { .. } => "conditional".to_string(),
    }
}

/// Slot classification for a canonical type. Pure; registration of nested
/// codecs happens in [`CodecSet::slot_for`].
pub fn slot_of(canon: &Type, program: &Program, context: &str) -> Result<Slot, BridgeError> {
    match canon {
        Type::Keyword(Keyword::Null) => Ok(Slot::Unit("null")),
        Type::Keyword(Keyword::Void | Keyword::Undefined) => Ok(Slot::Unit("undefined")),
        Type::Keyword(Keyword::Double) => Ok(Slot::F64),
        Type::Keyword(Keyword::Bool) => Ok(Slot::Bool),
        Type::Literal { base, .. } | Type::LiteralUnion { base, .. }
            if matches!(base, LiteralBase::Number) =>
        {
            Ok(Slot::F64)
        }
        Type::Literal { base, .. } | Type::LiteralUnion { base, .. }
            if matches!(base, LiteralBase::Bool) =>
        {
            Ok(Slot::Bool)
        }
        Type::Predicate(_) => Ok(Slot::Bool),
        Type::Reference { decl, .. }
            if program
                .arena
                .get(*decl)
                .map(Declaration::is_numeric_enum)
                .unwrap_or(false) =>
        {
            Ok(Slot::I32)
        }
        _ if is_handle_like(canon, program) => Ok(Slot::Handle),
        Type::Keyword(Keyword::String) => Ok(Slot::Codec {
            name: "string".to_string(),
            width: 8,
        }),
        Type::Keyword(Keyword::BigInt) => Ok(Slot::Codec {
            name: "bigint".to_string(),
            width: 8,
        }),
        Type::LiteralUnion { .. } => Ok(Slot::Codec {
            name: mangled_type_name(canon, program),
            width: 4,
        }),
        Type::Array(_) => Ok(Slot::Codec {
            name: mangled_type_name(canon, program),
            width: 8,
        }),
        Type::Optional(base) => {
            let base_width = slot_of(base, program, context)?.width();
            Ok(Slot::Codec {
                name: mangled_type_name(canon, program),
                width: base_width + 1,
            })
        }
        Type::Union(members) => {
            let mut payload = 0;
            for member in members {
                payload = payload.max(slot_of(member, program, context)?.width());
            }
            Ok(Slot::Codec {
                name: mangled_type_name(canon, program),
                width: UNION_PAYLOAD_OFFSET + payload,
            })
        }
        Type::Function { .. } => Ok(Slot::Codec {
            name: mangled_type_name(canon, program),
            width: 4,
        }),
        other => Err(BridgeError::unsupported(other.variant_name(), context)),
    }
}

/// Deduplicated set of codecs discovered while building entry points
pub struct CodecSet<'a> {
    program: &'a Program,
    codecs: BTreeMap<String, Type>,
}

impl<'a> CodecSet<'a> {
    pub fn new(program: &'a Program) -> Self {
        Self {
            program,
            codecs: BTreeMap::new(),
        }
    }

    pub fn program(&self) -> &'a Program {
        self.program
    }

    /// Classify a declared type's slot, registering its codec (and every
    /// nested codec) on first sight
    pub fn slot_for(&mut self, ty: &Type, context: &str) -> Result<Slot, BridgeError> {
        let canon = canonical(ty, self.program, context)?;
        let slot = slot_of(&canon, self.program, context)?;
        if let Slot::Codec { name, .. } = &slot {
            if !self.codecs.contains_key(name) {
                self.codecs.insert(name.clone(), canon.clone());
                match &canon {
                    Type::Array(el) | Type::Optional(el) => {
                        self.slot_for(el, context)?;
                    }
                    Type::Union(members) => {
                        for member in members {
                            self.slot_for(member, context)?;
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(slot)
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /// Render the encoder and decoder blocks, lexicographic by mangled name
    pub fn render(&self, diags: &mut Diagnostics) -> (String, String) {
        let mut encoders = Vec::new();
        let mut decoders = Vec::new();
        for (name, canon) in &self.codecs {
            let (enc, dec) = self.render_codec(name, canon, diags);
            encoders.push(enc);
            decoders.push(dec);
        }
        (encoders.join("\n"), decoders.join("\n"))
    }

    fn render_codec(&self, name: &str, canon: &Type, diags: &mut Diagnostics) -> (String, String) {
        match canon {
            Type::Keyword(Keyword::String) => (
                concat!(
                    "function encode_string(view, base, value) {\n",
                    "    const bytes = utf8Encoder.encode(value);\n",
                    "    const ptr = runtime.alloc(bytes.length);\n",
                    "    new Uint8Array(runtime.memory.buffer, ptr, bytes.length).set(bytes);\n",
                    "    view.setUint32(base, bytes.length, true);\n",
                    "    view.setUint32(base + 4, ptr, true);\n",
                    "}\n"
                )
                .to_string(),
                concat!(
                    "function decode_string(view, base) {\n",
                    "    const len = view.getUint32(base, true);\n",
                    "    const ptr = view.getUint32(base + 4, true);\n",
                    "    return utf8Decoder.decode(new Uint8Array(runtime.memory.buffer, ptr, len));\n",
                    "}\n"
                )
                .to_string(),
            ),
            Type::Keyword(Keyword::BigInt) => (
                concat!(
                    "function encode_bigint(view, base, value) {\n",
                    "    view.setBigInt64(base, value, true);\n",
                    "}\n"
                )
                .to_string(),
                concat!(
                    "function decode_bigint(view, base) {\n",
                    "    return view.getBigInt64(base, true);\n",
                    "}\n"
                )
                .to_string(),
            ),
            Type::Array(el) => self.render_array(name, el),
            Type::Optional(base) => self.render_optional(name, base),
            Type::LiteralUnion { members, .. } => render_literal_union(name, members),
            Type::Union(members) => self.render_union(name, canon, members, diags),
            Type::Function { .. } => (
                format!(
                    concat!(
                        "function encode_{n}(view, base, value) {{\n",
                        "    view.setUint32(base, registry.insert(value), true);\n",
                        "}}\n"
                    ),
                    n = name
                ),
                format!(
                    concat!(
                        "function decode_{n}(view, base) {{\n",
                        "    return registry.get(view.getUint32(base, true));\n",
                        "}}\n"
                    ),
                    n = name
                ),
            ),
            // Only the kinds above are ever registered.
            _ => (String::new(), String::new()),
        }
    }

    fn render_array(&self, name: &str, el: &Type) -> (String, String) {
        let slot = slot_of(el, self.program, "<array element>")
            .expect("array element slot was validated at registration");
        let width = slot.width().max(1);
        let off = format!("ptr + i * {}", width);

        let mut enc = format!("function encode_{}(view, base, value) {{\n", name);
        enc.push_str(&format!(
            "    const ptr = runtime.alloc(value.length * {});\n",
            width
        ));
        enc.push_str("    view.setUint32(base, value.length, true);\n");
        enc.push_str("    view.setUint32(base + 4, ptr, true);\n");
        enc.push_str("    for (let i = 0; i < value.length; i++) {\n");
        if let Some(write) = slot.write_stmt(&off, "value[i]") {
            enc.push_str(&format!("        {}\n", write));
        }
        enc.push_str("    }\n}\n");

        let mut dec = format!("function decode_{}(view, base) {{\n", name);
        dec.push_str("    const len = view.getUint32(base, true);\n");
        dec.push_str("    const ptr = view.getUint32(base + 4, true);\n");
        dec.push_str("    const value = new Array(len);\n");
        dec.push_str("    for (let i = 0; i < len; i++) {\n");
        dec.push_str(&format!("        value[i] = {};\n", slot.read_expr(&off)));
        dec.push_str("    }\n    return value;\n}\n");

        (enc, dec)
    }

    fn render_optional(&self, name: &str, base: &Type) -> (String, String) {
        let slot = slot_of(base, self.program, "<optional base>")
            .expect("optional base slot was validated at registration");
        let flag_off = format!("base + {}", slot.width());

        let mut enc = format!("function encode_{}(view, base, value) {{\n", name);
        enc.push_str("    if (value === undefined || value === null) {\n");
        enc.push_str(&format!("        view.setUint8({}, 0);\n", flag_off));
        enc.push_str("        return;\n    }\n");
        enc.push_str(&format!("    view.setUint8({}, 1);\n", flag_off));
        if let Some(write) = slot.write_stmt("base", "value") {
            enc.push_str(&format!("    {}\n", write));
        }
        enc.push_str("}\n");

        let mut dec = format!("function decode_{}(view, base) {{\n", name);
        dec.push_str(&format!("    if (view.getUint8({}) === 0) {{\n", flag_off));
        dec.push_str("        return undefined;\n    }\n");
        dec.push_str(&format!("    return {};\n}}\n", slot.read_expr("base")));

        (enc, dec)
    }

    fn render_union(
        &self,
        name: &str,
        canon: &Type,
        members: &[Type],
        diags: &mut Diagnostics,
    ) -> (String, String) {
        let fqn = canon.fqn();
        let guards = discriminant::synthesize(&fqn, members, self.program, diags);
        let payload_off = format!("base + {}", UNION_PAYLOAD_OFFSET);

        let mut enc = format!("function encode_{}(view, base, value) {{\n", name);
        for (i, gm) in guards.iter().enumerate() {
            let cond = discriminant::render_guard(&gm.guard, "value");
            if i == 0 {
                enc.push_str(&format!("    if ({}) {{\n", cond));
            } else if matches!(gm.guard, Guard::Always) {
                enc.push_str("    } else {\n");
            } else {
                enc.push_str(&format!("    }} else if ({}) {{\n", cond));
            }
            enc.push_str(&format!(
                "        view.setUint32(base, {}, true);\n",
                gm.decl_index
            ));
            let slot = slot_of(&members[gm.decl_index], self.program, "<union member>")
                .expect("union member slot was validated at registration");
            if let Some(write) = slot.write_stmt(&payload_off, "value") {
                enc.push_str(&format!("        {}\n", write));
            }
        }
        let has_fallback = guards
            .last()
            .map(|gm| matches!(gm.guard, Guard::Always))
            .unwrap_or(false);
        if !has_fallback {
            enc.push_str("    } else {\n");
            enc.push_str(&format!(
                "        throw new TypeError({});\n",
                js_string(&format!("value matches no member of `{}`", fqn))
            ));
        }
        enc.push_str("    }\n}\n");

        let mut dec = format!("function decode_{}(view, base) {{\n", name);
        dec.push_str("    switch (view.getUint32(base, true)) {\n");
        for (i, member) in members.iter().enumerate() {
            let slot = slot_of(member, self.program, "<union member>")
                .expect("union member slot was validated at registration");
            dec.push_str(&format!(
                "        case {}: return {};\n",
                i,
                slot.read_expr(&payload_off)
            ));
        }
        dec.push_str(&format!(
            "        default: throw new RangeError({});\n",
            js_string(&format!("bad discriminant for `{}`", fqn))
        ));
        dec.push_str("    }\n}\n");

        (enc, dec)
    }
}

fn render_literal_union(name: &str, members: &[String]) -> (String, String) {
    let values: Vec<String> = members.iter().map(|m| js_string(m)).collect();
    let table = format!("const VALUES_{} = [{}];\n", name, values.join(", "));

    let enc = format!(
        concat!(
            "{table}",
            "function encode_{n}(view, base, value) {{\n",
            "    view.setUint32(base, VALUES_{n}.indexOf(value), true);\n",
            "}}\n"
        ),
        table = table,
        n = name
    );
    let dec = format!(
        concat!(
            "function decode_{n}(view, base) {{\n",
            "    return VALUES_{n}[view.getUint32(base, true)];\n",
            "}}\n"
        ),
        n = name
    );
    (enc, dec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsb_ir::{DeclArena, Declaration, EnumMember, EnumMemberKind, EnumValue};

    fn empty_program() -> Program {
        Program::default()
    }

    #[test]
    fn test_structurally_identical_types_share_a_codec() {
        let mut arena = DeclArena::new();
        let a = arena.alloc(Declaration::Alias {
            name: "Maybe".to_string(),
            type_params: vec![],
            ty: Type::optional(Type::Keyword(Keyword::Double)),
        });
        let b = arena.alloc(Declaration::Alias {
            name: "OrNull".to_string(),
            type_params: vec![],
            ty: Type::optional(Type::Keyword(Keyword::Double)),
        });
        let program = Program::new(arena, vec![a, b]);

        let mut codecs = CodecSet::new(&program);
        let slot_a = codecs
            .slot_for(&Type::reference("Maybe", vec![], a), "t")
            .unwrap();
        let slot_b = codecs
            .slot_for(&Type::reference("OrNull", vec![], b), "t")
            .unwrap();
        assert_eq!(slot_a, slot_b);
        assert!(matches!(
            slot_a,
            Slot::Codec { ref name, .. } if name == "optional_double"
        ));
    }

    #[test]
    fn test_string_enum_uses_default_string_codec() {
        let mut arena = DeclArena::new();
        let id = arena.alloc(Declaration::Enum {
            name: "Color".to_string(),
            members: vec![EnumMember {
                name: "Red".to_string(),
                value: EnumValue::String("red".to_string()),
                kind: EnumMemberKind::String,
            }],
        });
        let program = Program::new(arena, vec![id]);

        let mut codecs = CodecSet::new(&program);
        let slot = codecs
            .slot_for(&Type::reference("Color", vec![], id), "t")
            .unwrap();
        assert!(matches!(slot, Slot::Codec { ref name, .. } if name == "string"));
    }

    #[test]
    fn test_numeric_enum_is_value_returnable() {
        let mut arena = DeclArena::new();
        let id = arena.alloc(Declaration::Enum {
            name: "Direction".to_string(),
            members: vec![EnumMember {
                name: "Up".to_string(),
                value: EnumValue::Number(0.0),
                kind: EnumMemberKind::Number,
            }],
        });
        let program = Program::new(arena, vec![id]);
        let ty = Type::reference("Direction", vec![], id);
        let canon = canonical(&ty, &program, "t").unwrap();
        assert!(is_value_returnable(&canon, &program));
        assert_eq!(slot_of(&canon, &program, "t").unwrap(), Slot::I32);
    }

    #[test]
    fn test_optional_flag_sits_past_base_storage() {
        let program = empty_program();
        let ty = Type::optional(Type::Keyword(Keyword::Double));
        let mut codecs = CodecSet::new(&program);
        let slot = codecs.slot_for(&ty, "t").unwrap();
        // 8 bytes of double plus the flag byte
        assert_eq!(slot.width(), 9);

        let mut diags = Diagnostics::new();
        let (enc, dec) = codecs.render(&mut diags);
        assert!(enc.contains("view.setUint8(base + 8, 1);"));
        assert!(enc.contains("view.setFloat64(base, value, true);"));
        assert!(dec.contains("if (view.getUint8(base + 8) === 0)"));
    }

    #[test]
    fn test_array_codec_allocates_and_steps_by_width() {
        let program = empty_program();
        let ty = Type::array(Type::Keyword(Keyword::Double));
        let mut codecs = CodecSet::new(&program);
        codecs.slot_for(&ty, "t").unwrap();

        let mut diags = Diagnostics::new();
        let (enc, dec) = codecs.render(&mut diags);
        assert!(enc.contains("function encode_array_double(view, base, value)"));
        assert!(enc.contains("const ptr = runtime.alloc(value.length * 8);"));
        assert!(enc.contains("view.setFloat64(ptr + i * 8, value[i], true);"));
        assert!(dec.contains("value[i] = view.getFloat64(ptr + i * 8, true);"));
    }

    #[test]
    fn test_literal_union_value_table_is_declaration_ordered() {
        let program = empty_program();
        let ty = Type::literal_union(
            vec!["square".to_string(), "circle".to_string()],
            LiteralBase::String,
        )
        .unwrap();
        let mut codecs = CodecSet::new(&program);
        codecs.slot_for(&ty, "t").unwrap();

        let mut diags = Diagnostics::new();
        let (enc, dec) = codecs.render(&mut diags);
        // Declaration order, not sorted.
        assert!(enc.contains("const VALUES_litunion2_square_circle = [\"square\", \"circle\"];"));
        assert!(dec.contains("return VALUES_litunion2_square_circle[view.getUint32(base, true)];"));
    }

    #[test]
    fn test_codec_blocks_are_lexicographically_ordered() {
        let program = empty_program();
        let mut codecs = CodecSet::new(&program);
        codecs
            .slot_for(&Type::Keyword(Keyword::String), "t")
            .unwrap();
        codecs
            .slot_for(&Type::array(Type::Keyword(Keyword::Double)), "t")
            .unwrap();

        let mut diags = Diagnostics::new();
        let (enc, _) = codecs.render(&mut diags);
        let array_pos = enc.find("encode_array_double").unwrap();
        let string_pos = enc.find("encode_string").unwrap();
        assert!(array_pos < string_pos);
    }
}
