//! Detect container calls whose `Object`-typed argument cannot be an element (or key) of the
//! container.
//!
//! A [`CallSite`] is matched against catalog entries; for each match the receiver's type arguments
//! for the entry's base type are resolved and the relevant one is compared with the argument.
//! Every stage degrades to [`Verdict::Inconclusive`] when information is missing (raw receivers,
//! unknown types, unmatched calls); only [`Verdict::Incompatible`] produces a [`Finding`].

mod analysis;
mod call;
mod catalog;
mod checks;
mod decide;

pub use analysis::{analyze, analyze_with, match_call, Analysis, Mismatch};
pub use call::CallSite;
pub use catalog::{
    Catalog, CatalogEntry, CatalogError, ResolvedCatalog, ResolvedEntry, CATALOG_FORMAT_VERSION,
};
pub use checks::{Check, CheckKind, Checker, Finding};
pub use decide::{decide, decide_with, CompatibilityPolicy, Verdict};
