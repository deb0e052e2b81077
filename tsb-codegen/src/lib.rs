//! TypeScript Bridge Generator - Artifact Generation Backend
//!
//! This crate turns a declaration [`Program`] into the three bridge
//! artifacts:
//!
//! - Foreign-linkage text: raw `extern "C"` declarations (Rust)
//! - Wrapper text: idiomatic handle-wrapping types and functions (Rust)
//! - Marshalling text: codecs, registry, and exported entry points (JS)
//!
//! The generators are independent pure functions of the same immutable
//! input; each produces one complete text output in a single pass.

pub mod externs;
pub mod glue;
pub mod render;
pub mod wrappers;

use tsb_common::Diagnostics;
use tsb_ir::Program;

pub use externs::generate_externs;
pub use glue::generate_glue;
pub use wrappers::generate_wrappers;

/// Generation options shared by the three generators
#[derive(Debug, Clone)]
pub struct GenConfig {
    /// Module specifier the glue imports the host implementation from
    pub impl_module: String,
    /// Crate the foreign-linkage/wrapper artifacts take support types from
    pub support_crate: String,
    /// Module path the wrapper artifact imports the externs from
    pub externs_module: String,
    /// First line of every generated file
    pub banner: String,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            impl_module: "./impl.js".to_string(),
            support_crate: "tsb_support".to_string(),
            externs_module: "super::externs".to_string(),
            banner: "Generated by tsb. Do not edit.".to_string(),
        }
    }
}

/// The three text artifacts plus everything reported along the way
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub externs: String,
    pub wrappers: String,
    pub glue: String,
    pub diagnostics: Diagnostics,
}

/// Run all three generators over a program
pub fn generate(program: &Program, config: &GenConfig) -> Artifacts {
    let (externs, mut diagnostics) = generate_externs(program, config);
    let (wrappers, wrapper_diags) = generate_wrappers(program, config);
    let (glue, glue_diags) = generate_glue(program, config);
    diagnostics.extend(wrapper_diags);
    diagnostics.extend(glue_diags);

    Artifacts {
        externs,
        wrappers,
        glue,
        diagnostics,
    }
}
