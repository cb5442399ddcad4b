//! Java-specific helpers for collcheck's type model.
//!
//! The module intentionally avoids pulling in source-level context (imports, enclosing scopes).
//! Signatures are written with binary names, and the formatters here are "Java-like" and stable,
//! intended for diagnostics.

pub mod decl;
pub mod format;
pub mod helpers;
pub mod signature;
pub mod subtyping;
