use collcheck_config::{CheckConfig, CollcheckConfig};
use collcheck_types::{format_type, Diagnostic, Severity, Span, SupertypeIndex, TypeEnv};

use crate::analysis::{analyze_with, Mismatch};
use crate::catalog::{Catalog, CatalogError, ResolvedCatalog};
use crate::decide::{CompatibilityPolicy, Verdict};
use crate::CallSite;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
    StrictCollectionIncompatibleType,
    UnexpectedType,
}

impl CheckKind {
    pub const ALL: [CheckKind; 2] = [
        CheckKind::StrictCollectionIncompatibleType,
        CheckKind::UnexpectedType,
    ];

    /// Config table name under `[checks]`.
    pub fn name(self) -> &'static str {
        match self {
            CheckKind::StrictCollectionIncompatibleType => "strict_collection_incompatible_type",
            CheckKind::UnexpectedType => "unexpected_type",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            CheckKind::StrictCollectionIncompatibleType => "STRICT_COLLECTION_INCOMPATIBLE_TYPE",
            CheckKind::UnexpectedType => "UNEXPECTED_TYPE",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            CheckKind::StrictCollectionIncompatibleType => {
                "Likely programming error due to using incompatible types as arguments for a \
                 collection method that accepts Object."
            }
            CheckKind::UnexpectedType => {
                "Likely programming error due to using the wrong type in a method that accepts \
                 Object."
            }
        }
    }

    pub fn policy(self) -> CompatibilityPolicy {
        match self {
            CheckKind::StrictCollectionIncompatibleType => CompatibilityPolicy::Strict,
            CheckKind::UnexpectedType => CompatibilityPolicy::Castable,
        }
    }

    pub fn enabled_by_default(self) -> bool {
        matches!(self, CheckKind::StrictCollectionIncompatibleType)
    }

    pub fn builtin_catalog(self) -> Catalog {
        match self {
            CheckKind::StrictCollectionIncompatibleType => {
                Catalog::strict_collection_incompatible_type()
            }
            CheckKind::UnexpectedType => Catalog::unexpected_type(),
        }
    }

    fn config(self, config: &CollcheckConfig) -> &CheckConfig {
        match self {
            CheckKind::StrictCollectionIncompatibleType => {
                &config.checks.strict_collection_incompatible_type
            }
            CheckKind::UnexpectedType => &config.checks.unexpected_type,
        }
    }
}

/// A named catalog checked under one compatibility policy.
#[derive(Debug, Clone)]
pub struct Check {
    pub kind: CheckKind,
    pub severity: Severity,
    pub policy: CompatibilityPolicy,
    pub catalog: ResolvedCatalog,
}

impl Check {
    /// `kind` with its built-in catalog, default policy, and warning severity.
    pub fn builtin(env: &dyn TypeEnv, kind: CheckKind) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            policy: kind.policy(),
            catalog: kind.builtin_catalog().resolve(env),
        }
    }
}

/// A reportable incompatibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub check: CheckKind,
    pub severity: Severity,
    pub span: Option<Span>,
    pub mismatch: Mismatch,
}

impl Finding {
    pub fn message(&self, env: &dyn TypeEnv) -> String {
        format!(
            "{} `{}.{}` is called with `{}`, which is unrelated to the container's `{}`.",
            self.check.summary(),
            simple_name(&self.mismatch.entry.base_type),
            self.mismatch.entry.method,
            format_type(env, &self.mismatch.argument),
            format_type(env, &self.mismatch.parameter),
        )
    }

    pub fn to_diagnostic(&self, env: &dyn TypeEnv) -> Diagnostic {
        Diagnostic::new(self.severity, self.check.code(), self.message(env), self.span)
    }
}

fn simple_name(binary_name: &str) -> &str {
    binary_name.rsplit('.').next().unwrap_or(binary_name)
}

/// The configured set of checks plus the supertype index they share.
///
/// A `Checker` is immutable after construction and may be shared between threads. It is tied to
/// the environment it was built from; pass that same environment to [`Checker::check_call`].
#[derive(Debug, Clone)]
pub struct Checker {
    index: SupertypeIndex,
    checks: Vec<Check>,
}

impl Checker {
    /// Build a checker indexing every class `class_ids` yields.
    pub fn new(
        env: &dyn TypeEnv,
        class_ids: impl IntoIterator<Item = collcheck_types::ClassId>,
        checks: Vec<Check>,
    ) -> Self {
        let index = SupertypeIndex::build(env, class_ids);
        tracing::debug!(
            target: "collcheck.analysis",
            classes = index.len(),
            checks = checks.len(),
            "checker built"
        );
        Self { index, checks }
    }

    /// Build the checks `config` enables. Extra catalog files are merged into the
    /// strict-collection check.
    pub fn from_config(
        env: &dyn TypeEnv,
        class_ids: impl IntoIterator<Item = collcheck_types::ClassId>,
        config: &CollcheckConfig,
    ) -> Result<Self, CatalogError> {
        let mut extra = Catalog::default();
        for path in &config.catalog.extra {
            extra.extend(Catalog::load_from_path(path)?);
        }

        let mut checks = Vec::new();
        for kind in CheckKind::ALL {
            let check_config = kind.config(config);
            if !check_config.is_enabled(kind.enabled_by_default()) {
                tracing::debug!(target: "collcheck.analysis", check = kind.name(), "check disabled");
                continue;
            }
            let mut catalog = kind.builtin_catalog();
            if kind == CheckKind::StrictCollectionIncompatibleType {
                catalog.extend(extra.clone());
            }
            checks.push(Check {
                kind,
                severity: check_config.severity,
                policy: kind.policy(),
                catalog: catalog.resolve(env),
            });
        }

        Ok(Self::new(env, class_ids, checks))
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// Findings for one call site, at most one per check.
    pub fn check_call(&self, env: &dyn TypeEnv, call: &CallSite) -> Vec<Finding> {
        self.checks
            .iter()
            .filter_map(|check| {
                let analysis =
                    analyze_with(env, Some(&self.index), check.policy, call, &check.catalog);
                if analysis.verdict != Verdict::Incompatible {
                    return None;
                }
                Some(Finding {
                    check: check.kind,
                    severity: check.severity,
                    span: call.span,
                    mismatch: analysis.mismatch?,
                })
            })
            .collect()
    }

    /// [`Checker::check_call`] rendered as diagnostics.
    pub fn diagnostics(&self, env: &dyn TypeEnv, call: &CallSite) -> Vec<Diagnostic> {
        self.check_call(env, call)
            .iter()
            .map(|finding| finding.to_diagnostic(env))
            .collect()
    }
}
