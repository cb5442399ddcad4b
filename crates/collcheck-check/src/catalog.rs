//! Static, versioned catalogs of container methods whose `Object` parameter is constrained by a
//! type parameter of the container.
//!
//! ```toml
//! version = 1
//!
//! [[entry]]
//! base_type = "java.util.Map"
//! method = "containsValue"
//! erased_params = ["java.lang.Object"]
//! type_param_index = 1
//! arg_index = 0
//! ```
//!
//! A [`Catalog`] is plain data. [`Catalog::resolve`] binds it to one type universe, dropping the
//! entries that universe cannot express; the [`ResolvedCatalog`] is what the matcher consumes.

use std::collections::HashMap;
use std::path::Path;

use collcheck_types::{erasure, parse_type, ClassId, Type, TypeEnv};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Catalog format understood by this crate.
pub const CATALOG_FORMAT_VERSION: u32 = 1;

const STRICT_COLLECTION_INCOMPATIBLE_TYPE: &str =
    include_str!("../catalog/strict_collection_incompatible_type.toml");
const UNEXPECTED_TYPE: &str = include_str!("../catalog/unexpected_type.toml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog: {0}")]
    Toml(String),
    #[error("unsupported catalog version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("catalog entry #{index} ({method}): {message}")]
    InvalidEntry {
        index: usize,
        method: String,
        message: &'static str,
    },
}

impl From<toml::de::Error> for CatalogError {
    fn from(err: toml::de::Error) -> Self {
        CatalogError::Toml(err.message().to_owned())
    }
}

/// One API shape of interest: `base_type.method(erased_params)` whose argument `arg_index` should
/// be compatible with the receiver's type argument `type_param_index` for `base_type`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogEntry {
    pub base_type: String,
    pub method: String,
    pub erased_params: Vec<String>,
    pub type_param_index: usize,
    pub arg_index: usize,
}

impl CatalogEntry {
    pub fn new(
        base_type: impl Into<String>,
        method: impl Into<String>,
        erased_params: &[&str],
        type_param_index: usize,
        arg_index: usize,
    ) -> Self {
        Self {
            base_type: base_type.into(),
            method: method.into(),
            erased_params: erased_params.iter().map(|p| p.to_string()).collect(),
            type_param_index,
            arg_index,
        }
    }

    /// `java.util.Map.getOrDefault(java.lang.Object, java.lang.Object)`
    pub fn signature(&self) -> String {
        format!(
            "{}.{}({})",
            self.base_type,
            self.method,
            self.erased_params.join(", ")
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
    pub version: u32,
    #[serde(default, rename = "entry")]
    pub entries: Vec<CatalogEntry>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            version: CATALOG_FORMAT_VERSION,
            entries: Vec::new(),
        }
    }
}

impl Catalog {
    pub fn from_toml_str(text: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = toml::from_str(text)?;
        if catalog.version != CATALOG_FORMAT_VERSION {
            return Err(CatalogError::UnsupportedVersion {
                found: catalog.version,
                supported: CATALOG_FORMAT_VERSION,
            });
        }
        for (index, entry) in catalog.entries.iter().enumerate() {
            let invalid = |message| CatalogError::InvalidEntry {
                index,
                method: entry.method.clone(),
                message,
            };
            if entry.method.is_empty() {
                return Err(invalid("method name must not be empty"));
            }
            if entry.arg_index >= entry.erased_params.len() {
                return Err(invalid("arg_index is out of range for erased_params"));
            }
        }
        Ok(catalog)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// The 17-entry catalog checked with the bidirectional-subtype policy.
    pub fn strict_collection_incompatible_type() -> Self {
        Self::builtin(STRICT_COLLECTION_INCOMPATIBLE_TYPE)
    }

    /// `Map.get/containsKey/remove` and `Collection.contains/remove`.
    pub fn unexpected_type() -> Self {
        Self::builtin(UNEXPECTED_TYPE)
    }

    fn builtin(text: &str) -> Self {
        // Covered by `builtin_catalogs_parse`; an unparsable bundled file degrades to empty.
        Self::from_toml_str(text).unwrap_or_else(|err| {
            tracing::error!(target: "collcheck.catalog", error = %err, "bundled catalog is invalid");
            Self::default()
        })
    }

    /// Append `other`'s entries, skipping exact duplicates.
    pub fn extend(&mut self, other: Catalog) {
        for entry in other.entries {
            if !self.entries.contains(&entry) {
                self.entries.push(entry);
            }
        }
    }

    /// Bind the catalog to `env`. Entries whose base type or parameter types are unknown, or whose
    /// base type has no type parameter at `type_param_index`, are dropped with a warning.
    pub fn resolve(&self, env: &dyn TypeEnv) -> ResolvedCatalog {
        let mut resolved = ResolvedCatalog::default();
        for entry in &self.entries {
            match resolve_entry(env, entry) {
                Ok(entry) => resolved.push(entry),
                Err(reason) => tracing::warn!(
                    target: "collcheck.catalog",
                    entry = %entry.signature(),
                    reason,
                    "dropping catalog entry"
                ),
            }
        }
        tracing::debug!(
            target: "collcheck.catalog",
            entries = resolved.len(),
            dropped = self.entries.len() - resolved.len(),
            "catalog resolved"
        );
        resolved
    }
}

fn resolve_entry(env: &dyn TypeEnv, entry: &CatalogEntry) -> Result<ResolvedEntry, &'static str> {
    let base = env
        .lookup_class(&entry.base_type)
        .ok_or("base type is unknown")?;
    let base_def = env.class(base).ok_or("base type is not defined")?;
    if entry.type_param_index >= base_def.type_params.len() {
        return Err("type_param_index is out of range for the base type");
    }
    let erased_params = entry
        .erased_params
        .iter()
        .map(|src| {
            parse_type(env, src)
                .ok()
                .and_then(|ty| erasure(env, &ty))
                .ok_or("parameter type is unknown")
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ResolvedEntry {
        entry: entry.clone(),
        base,
        erased_params,
    })
}

/// A [`CatalogEntry`] with its names bound to one type universe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedEntry {
    pub entry: CatalogEntry,
    pub base: ClassId,
    pub erased_params: Vec<Type>,
}

impl ResolvedEntry {
    pub fn type_param_index(&self) -> usize {
        self.entry.type_param_index
    }

    pub fn arg_index(&self) -> usize {
        self.entry.arg_index
    }
}

/// Immutable, method-name indexed view of a resolved catalog.
#[derive(Clone, Debug, Default)]
pub struct ResolvedCatalog {
    entries: Vec<ResolvedEntry>,
    by_method: HashMap<String, Vec<usize>>,
}

impl ResolvedCatalog {
    fn push(&mut self, entry: ResolvedEntry) {
        self.by_method
            .entry(entry.entry.method.clone())
            .or_default()
            .push(self.entries.len());
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ResolvedEntry] {
        &self.entries
    }

    /// Entries named `method`, in catalog order.
    pub fn by_method<'a>(&'a self, method: &str) -> impl Iterator<Item = &'a ResolvedEntry> + 'a {
        self.by_method
            .get(method)
            .into_iter()
            .flatten()
            .map(|&idx| &self.entries[idx])
    }
}
