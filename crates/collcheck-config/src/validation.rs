use std::path::Path;

use crate::diagnostics::{ConfigValidationError, ConfigWarning, ValidationDiagnostics};
use crate::{CollcheckConfig, LoggingConfig};

/// Context for semantic config validation.
///
/// Catalog paths are relative to the config file; without a `config_dir` their existence is not
/// checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigValidationContext<'a> {
    /// Directory containing the loaded config file.
    pub config_dir: Option<&'a Path>,
}

impl CollcheckConfig {
    /// Validate semantic invariants, reporting as many problems as possible in one pass.
    #[must_use]
    pub fn validate(&self) -> ValidationDiagnostics {
        self.validate_with_context(ConfigValidationContext::default())
    }

    #[must_use]
    pub fn validate_with_context(&self, ctx: ConfigValidationContext<'_>) -> ValidationDiagnostics {
        let mut out = ValidationDiagnostics::default();

        validate_logging(self, &mut out);
        validate_checks(self, &mut out);
        validate_catalog(self, ctx, &mut out);

        out
    }
}

fn validate_logging(config: &CollcheckConfig, out: &mut ValidationDiagnostics) {
    let normalized = LoggingConfig::normalize_level_directives(&config.logging.level);
    if !config.logging.level.trim().is_empty()
        && tracing_subscriber::EnvFilter::try_new(normalized.clone()).is_err()
    {
        out.warnings.push(ConfigWarning::LoggingLevelInvalid {
            value: config.logging.level.clone(),
            normalized,
        });
    }
}

fn validate_checks(config: &CollcheckConfig, out: &mut ValidationDiagnostics) {
    let checks = &config.checks;
    if !checks.strict_collection_incompatible_type.is_enabled(true)
        && !checks.unexpected_type.is_enabled(false)
    {
        out.warnings.push(ConfigWarning::NoChecksEnabled);
    }
}

fn validate_catalog(
    config: &CollcheckConfig,
    ctx: ConfigValidationContext<'_>,
    out: &mut ValidationDiagnostics,
) {
    for (idx, path) in config.catalog.extra.iter().enumerate() {
        let toml_path = format!("catalog.extra[{idx}]");
        if path.as_os_str().is_empty() {
            out.errors.push(ConfigValidationError::InvalidValue {
                toml_path,
                message: "catalog path must not be empty".to_string(),
            });
            continue;
        }

        let Some(base) = ctx.config_dir else {
            continue;
        };
        let resolved = if path.is_relative() {
            base.join(path)
        } else {
            path.clone()
        };
        if !resolved.is_file() {
            out.warnings
                .push(ConfigWarning::CatalogPathMissing { toml_path, resolved });
        }
    }
}
