//! Marshalling generator
//!
//! Produces the host-side JavaScript artifact: the live-object registry and
//! runtime binding preamble, the deduplicated encoder and decoder blocks
//! (lexicographic by mangled type name so output is deterministic regardless
//! of discovery order), and one exported entry point per exposed function,
//! property, and method, in input order.

pub mod codec;
pub mod discriminant;
mod entry;

use crate::GenConfig;
use codec::CodecSet;
use tsb_common::Diagnostics;
use tsb_ir::{Declaration, Program, StructMember};

/// Generate the marshalling artifact
pub fn generate_glue(program: &Program, config: &GenConfig) -> (String, Diagnostics) {
    let mut diags = Diagnostics::new();
    let mut codecs = CodecSet::new(program);
    let mut entries: Vec<String> = Vec::new();

    for decl in program.declarations() {
        match decl {
            Declaration::Function {
                name, params, ret, ..
            } => match entry::function_entry(name, params, ret, &mut codecs) {
                Ok(text) => entries.push(text),
                Err(err) => diags.error(&err, Some(name.as_str())),
            },
            Declaration::Struct { name, members, .. } => {
                for member in members {
                    match member {
                        StructMember::Property { name: prop, ty } => {
                            if ty.is_stateless() {
                                continue;
                            }
                            match entry::property_entries(name, prop, ty, &mut codecs) {
                                Ok(mut pair) => entries.append(&mut pair),
                                Err(err) => {
                                    let context = format!("{}.{}", name, prop);
                                    diags.error(&err, Some(context.as_str()));
                                }
                            }
                        }
                        StructMember::Method {
                            name: method,
                            params,
                            ret,
                            ..
                        } => match entry::method_entry(name, method, params, ret, &mut codecs) {
                            Ok(text) => entries.push(text),
                            Err(err) => {
                                let context = format!("{}.{}", name, method);
                                diags.error(&err, Some(context.as_str()));
                            }
                        },
                    }
                }
            }
            _ => {}
        }
    }

    let (encoders, decoders) = codecs.render(&mut diags);

    let mut out = String::new();
    out.push_str(&format!("// {}\n\n", config.banner));
    out.push_str(&preamble(&config.impl_module));
    if !encoders.is_empty() {
        out.push_str("\n// ---- encoders ----\n\n");
        out.push_str(&encoders);
    }
    if !decoders.is_empty() {
        out.push_str("\n// ---- decoders ----\n\n");
        out.push_str(&decoders);
    }
    if !entries.is_empty() {
        out.push_str("\n// ---- entry points ----\n\n");
        out.push_str(&entries.join("\n"));
    }

    (out, diags)
}

fn preamble(impl_module: &str) -> String {
    format!(
        concat!(
            "import * as impl from {impl_mod};\n",
            "\n",
            "// Live-object registry. Handles index into `objects`; released slots\n",
            "// are recycled through the free list, and encoding the same object\n",
            "// twice reuses its existing handle. Handle 0 is never live.\n",
            "const registry = {{\n",
            "    objects: [null],\n",
            "    handles: new Map(),\n",
            "    free: [],\n",
            "    insert(obj) {{\n",
            "        const existing = this.handles.get(obj);\n",
            "        if (existing !== undefined) {{\n",
            "            return existing;\n",
            "        }}\n",
            "        const handle = this.free.length > 0 ? this.free.pop() : this.objects.length;\n",
            "        this.objects[handle] = obj;\n",
            "        this.handles.set(obj, handle);\n",
            "        return handle;\n",
            "    }},\n",
            "    get(handle) {{\n",
            "        return this.objects[handle];\n",
            "    }},\n",
            "    release(handle) {{\n",
            "        this.handles.delete(this.objects[handle]);\n",
            "        this.objects[handle] = null;\n",
            "        this.free.push(handle);\n",
            "    }},\n",
            "}};\n",
            "\n",
            "let runtime = null;\n",
            "\n",
            "// Must run before any entry point: binds the compiled module's memory\n",
            "// and allocator.\n",
            "export function bindRuntime(rt) {{\n",
            "    runtime = rt;\n",
            "}}\n",
            "\n",
            "export function releaseHandle(handle) {{\n",
            "    registry.release(handle);\n",
            "}}\n",
            "\n",
            "function view() {{\n",
            "    return new DataView(runtime.memory.buffer);\n",
            "}}\n",
            "\n",
            "const utf8Encoder = new TextEncoder();\n",
            "const utf8Decoder = new TextDecoder();\n",
        ),
        impl_mod = codec::js_string(impl_module)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsb_ir::{DeclArena, Keyword, LiteralBase, Param, Type};

    #[test]
    fn test_blocks_come_in_fixed_order() {
        let mut arena = DeclArena::new();
        let id = arena.alloc(Declaration::Function {
            name: "greet".to_string(),
            type_params: vec![],
            params: vec![Param::new("name", Type::Keyword(Keyword::String))],
            ret: Type::Keyword(Keyword::String),
        });
        let program = Program::new(arena, vec![id]);

        let (text, diags) = generate_glue(&program, &GenConfig::default());
        assert!(!diags.has_errors());

        let registry_pos = text.find("const registry").unwrap();
        let enc_pos = text.find("// ---- encoders ----").unwrap();
        let dec_pos = text.find("// ---- decoders ----").unwrap();
        let entry_pos = text.find("// ---- entry points ----").unwrap();
        assert!(registry_pos < enc_pos);
        assert!(enc_pos < dec_pos);
        assert!(dec_pos < entry_pos);
    }

    #[test]
    fn test_codec_error_fails_only_the_affected_entry() {
        let mut arena = DeclArena::new();
        let bad = arena.alloc(Declaration::Function {
            name: "broken".to_string(),
            type_params: vec![],
            params: vec![Param::new(
                "x",
                Type::Conditional {
                    check: Box::new(Type::Keyword(Keyword::Any)),
                    extends: Box::new(Type::Keyword(Keyword::String)),
                    true_ty: Box::new(Type::Keyword(Keyword::Double)),
                    false_ty: Box::new(Type::Keyword(Keyword::Bool)),
                },
            )],
            ret: Type::Keyword(Keyword::Void),
        });
        let good = arena.alloc(Declaration::Function {
            name: "fine".to_string(),
            type_params: vec![],
            params: vec![],
            ret: Type::Keyword(Keyword::Double),
        });
        let program = Program::new(arena, vec![bad, good]);

        let (text, diags) = generate_glue(&program, &GenConfig::default());
        assert_eq!(diags.error_count(), 1);
        assert!(!text.contains("broken_r"));
        assert!(text.contains("export function fine_r()"));
    }

    #[test]
    fn test_ambiguous_union_warns_but_succeeds() {
        let mut arena = DeclArena::new();
        let a = arena.alloc(Declaration::Struct {
            name: "Left".to_string(),
            type_params: vec![],
            members: vec![],
            source_origin: "pair.d.ts".to_string(),
        });
        let b = arena.alloc(Declaration::Struct {
            name: "Right".to_string(),
            type_params: vec![],
            members: vec![],
            source_origin: "pair.d.ts".to_string(),
        });
        let c = arena.alloc(Declaration::Struct {
            name: "Middle".to_string(),
            type_params: vec![],
            members: vec![],
            source_origin: "pair.d.ts".to_string(),
        });
        let pick = arena.alloc(Declaration::Function {
            name: "pick".to_string(),
            type_params: vec![],
            params: vec![],
            ret: Type::Union(vec![
                Type::reference("Left", vec![], a),
                Type::reference("Right", vec![], b),
                Type::reference("Middle", vec![], c),
            ]),
        });
        let program = Program::new(arena, vec![a, b, c, pick]);

        let (text, diags) = generate_glue(&program, &GenConfig::default());
        assert!(!diags.has_errors());
        assert!(diags.warning_count() >= 1);
        // Best-effort placeholder guards still let the artifact emit.
        assert!(text.contains("export function pick_r(out)"));
        assert!(text.contains("} else if (false) {"));
    }

    #[test]
    fn test_shared_literal_discriminant_union() {
        let mut arena = DeclArena::new();
        let circle = arena.alloc(Declaration::Struct {
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
        let square = arena.alloc(Declaration::Struct {
            name: "Square".to_string(),
            type_params: vec![],
            members: vec![StructMember::Property {
                name: "kind".to_string(),
                ty: Type::Literal {
                    value: "square".to_string(),
                    base: LiteralBase::String,
                },
            }],
            source_origin: "shapes.d.ts".to_string(),
        });
        let parse = arena.alloc(Declaration::Function {
            name: "parseShape".to_string(),
            type_params: vec![],
            params: vec![],
            ret: Type::Union(vec![
                Type::reference("Circle", vec![], circle),
                Type::reference("Square", vec![], square),
            ]),
        });
        let program = Program::new(arena, vec![circle, square, parse]);

        let (text, diags) = generate_glue(&program, &GenConfig::default());
        assert!(!diags.has_errors());
        assert_eq!(diags.warning_count(), 0);

        assert!(text.contains("if (value.kind === \"circle\") {"));
        assert!(text.contains("} else if (value.kind === \"square\") {"));
        // Discriminant is the declaration-order index; payload is a handle.
        assert!(text.contains("view.setUint32(base, 0, true);"));
        assert!(text.contains("view.setUint32(base, 1, true);"));
        assert!(text.contains("view.setUint32(base + 8, registry.insert(value), true);"));
        assert!(text.contains("case 1: return registry.get(view.getUint32(base + 8, true));"));
    }
}
