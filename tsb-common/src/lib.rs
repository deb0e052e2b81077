//! TypeScript Bridge Generator - Common Types and Utilities
//!
//! This crate provides the pieces shared by every generator phase:
//! - Error types and the diagnostics collector
//! - The deterministic symbol mangler

pub mod error;
pub mod mangle;

pub use error::{BridgeError, Diagnostic, Diagnostics, Severity};
pub use mangle::{mangle, mangle_member, CallKind};
