//! Declarative class definitions.
//!
//! Hosts that do not implement [`crate::TypeEnv`] themselves can describe their class graph with
//! [`ClassDecl`] records, either built in code or read from TOML:
//!
//! ```toml
//! [[class]]
//! name = "com.example.A"
//! type_params = ["X"]
//! extends = "com.example.B<java.util.List<X>>"
//!
//! [[class]]
//! name = "com.example.B"
//! kind = "interface"
//! type_params = ["Y extends java.lang.Object"]
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::signature::{parse_type_signature, SignatureError};
use crate::{ClassDef, ClassId, ClassKind, Type, TypeEnv, TypeParamDef, TypeStore, TypeVarId};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeclarationError {
    #[error("failed to parse declarations: {0}")]
    Toml(String),
    #[error("`{0}` is declared more than once")]
    DuplicateClass(String),
    #[error("`{class}` declares type parameter `{param}` more than once")]
    DuplicateTypeParam { class: String, param: String },
    #[error("invalid type parameter `{param}` on `{class}`")]
    InvalidTypeParam { class: String, param: String },
    #[error("class `{0}` extends more than one class")]
    MultipleSuperclasses(String),
    #[error("in declaration of `{class}`: {source}")]
    Signature {
        class: String,
        #[source]
        source: SignatureError,
    },
}

impl From<toml::de::Error> for DeclarationError {
    fn from(err: toml::de::Error) -> Self {
        // Keep just the message; the default `Display` embeds a source snippet.
        DeclarationError::Toml(err.message().to_string())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassDecl {
    /// Binary name.
    pub name: String,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default, rename = "final")]
    pub is_final: bool,
    /// `"T"` or `"T extends Bound1 & Bound2"`.
    #[serde(default)]
    pub type_params: Vec<String>,
    /// Superclass for classes (at most one), superinterfaces for interfaces.
    #[serde(default, deserialize_with = "one_or_many")]
    pub extends: Vec<String>,
    #[serde(default)]
    pub implements: Vec<String>,
}

impl ClassDecl {
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::Interface,
            ..Self::default()
        }
    }

    pub fn type_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn extends(mut self, signature: impl Into<String>) -> Self {
        self.extends.push(signature.into());
        self
    }

    pub fn implements(mut self, signature: impl Into<String>) -> Self {
        self.implements.push(signature.into());
        self
    }

    pub fn mark_final(mut self) -> Self {
        self.is_final = true;
        self
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(one) => vec![one],
        OneOrMany::Many(many) => many,
    })
}

/// A TOML document of `[[class]]` tables.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Declarations {
    #[serde(default, rename = "class")]
    pub classes: Vec<ClassDecl>,
}

impl Declarations {
    pub fn from_toml_str(text: &str) -> Result<Self, DeclarationError> {
        Ok(toml::from_str(text)?)
    }

    pub fn declare_into(&self, store: &mut TypeStore) -> Result<Vec<ClassId>, DeclarationError> {
        store.declare(&self.classes)
    }
}

pub(crate) fn declare(
    store: &mut TypeStore,
    decls: &[ClassDecl],
) -> Result<Vec<ClassId>, DeclarationError> {
    let mut names = HashSet::new();
    for decl in decls {
        if !names.insert(decl.name.as_str()) {
            return Err(DeclarationError::DuplicateClass(decl.name.clone()));
        }
    }

    let ids: Vec<ClassId> = decls
        .iter()
        .map(|decl| store.intern_class_id(&decl.name))
        .collect();

    // Allocate every type parameter first so bounds may refer to any of them
    // (`E extends Enum<E>`).
    let object = Type::class(store.well_known().object, vec![]);
    let mut scopes: Vec<(Vec<TypeVarId>, HashMap<String, TypeVarId>)> = Vec::new();
    let mut bounds_src: Vec<Vec<(TypeVarId, Vec<&str>)>> = Vec::new();
    for decl in decls {
        let mut formals = Vec::with_capacity(decl.type_params.len());
        let mut scope = HashMap::new();
        let mut bounds = Vec::new();
        for param in &decl.type_params {
            let (name, bound_list) = split_type_param(param).ok_or_else(|| {
                DeclarationError::InvalidTypeParam {
                    class: decl.name.clone(),
                    param: param.clone(),
                }
            })?;
            let id = store.add_type_param(name, vec![object.clone()]);
            if scope.insert(name.to_string(), id).is_some() {
                return Err(DeclarationError::DuplicateTypeParam {
                    class: decl.name.clone(),
                    param: name.to_string(),
                });
            }
            formals.push(id);
            bounds.push((id, bound_list));
        }
        scopes.push((formals, scope));
        bounds_src.push(bounds);
    }

    for ((decl, (_, scope)), bounds) in decls.iter().zip(&scopes).zip(&bounds_src) {
        for (id, bound_list) in bounds {
            if bound_list.is_empty() {
                continue;
            }
            let upper_bounds = bound_list
                .iter()
                .map(|src| resolve(store, decl, src, scope))
                .collect::<Result<Vec<_>, _>>()?;
            let name = store
                .type_param(*id)
                .map(|tp| tp.name.clone())
                .unwrap_or_default();
            store.define_type_param(
                *id,
                TypeParamDef {
                    name,
                    upper_bounds,
                    lower_bound: None,
                },
            );
        }
    }

    let object_id = store.well_known().object;
    for ((decl, (formals, scope)), id) in decls.iter().zip(scopes).zip(&ids) {
        let extends = decl
            .extends
            .iter()
            .map(|src| resolve(store, decl, src, &scope))
            .collect::<Result<Vec<_>, _>>()?;
        let implements = decl
            .implements
            .iter()
            .map(|src| resolve(store, decl, src, &scope))
            .collect::<Result<Vec<_>, _>>()?;

        let (super_class, interfaces) = match decl.kind {
            ClassKind::Interface => {
                let mut interfaces = extends;
                interfaces.extend(implements);
                (None, interfaces)
            }
            ClassKind::Class => {
                if extends.len() > 1 {
                    return Err(DeclarationError::MultipleSuperclasses(decl.name.clone()));
                }
                let super_class = match extends.into_iter().next() {
                    Some(sc) => Some(sc),
                    None if *id == object_id => None,
                    None => Some(object.clone()),
                };
                (super_class, implements)
            }
        };

        store.define_class(
            *id,
            ClassDef {
                name: decl.name.clone(),
                kind: decl.kind,
                is_final: decl.is_final,
                type_params: formals,
                super_class,
                interfaces,
            },
        );
    }

    Ok(ids)
}

fn resolve(
    store: &TypeStore,
    decl: &ClassDecl,
    src: &str,
    scope: &HashMap<String, TypeVarId>,
) -> Result<Type, DeclarationError> {
    parse_type_signature(src)
        .and_then(|sig| sig.resolve(store, scope))
        .map_err(|source| DeclarationError::Signature {
            class: decl.name.clone(),
            source,
        })
}

/// Split `"T extends A & B"` into `("T", ["A", "B"])`.
fn split_type_param(param: &str) -> Option<(&str, Vec<&str>)> {
    let param = param.trim();
    let (name, bounds) = match param.split_once(" extends ") {
        Some((name, bounds)) => (
            name.trim(),
            bounds.split('&').map(str::trim).collect::<Vec<_>>(),
        ),
        None => (param, Vec::new()),
    };
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$');
    if !valid || bounds.iter().any(|b| b.is_empty()) {
        return None;
    }
    Some((name, bounds))
}
