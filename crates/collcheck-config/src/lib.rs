use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Once, OnceLock};

use collcheck_types::Severity;
use parking_lot::ReentrantMutex;
use thiserror::Error;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;

mod diagnostics;
mod schema;
mod validation;

pub use diagnostics::{
    ConfigDiagnostics, ConfigValidationError, ConfigWarning, ValidationDiagnostics,
};
pub use schema::json_schema;
pub use validation::ConfigValidationContext;

/// Top-level `collcheck.toml` configuration.
///
/// ```toml
/// [logging]
/// level = "info"
///
/// [checks.strict_collection_incompatible_type]
/// enabled = true
/// severity = "warning"
///
/// [checks.unexpected_type]
/// enabled = false
///
/// [catalog]
/// extra = ["catalogs/guava.toml"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct CollcheckConfig {
    /// Global logging settings for collcheck crates.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Per-check enablement and severity.
    #[serde(default)]
    pub checks: ChecksConfig,

    /// Additional catalog files merged into the built-in catalogs.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct ChecksConfig {
    /// Bidirectional-subtype check over the full container catalog. Enabled unless set otherwise.
    #[serde(default)]
    pub strict_collection_incompatible_type: CheckConfig,

    /// Castability check over `Map.get/containsKey/remove` and `Collection.contains/remove`.
    /// Disabled unless set otherwise.
    #[serde(default)]
    pub unexpected_type: CheckConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct CheckConfig {
    /// Overrides the check's built-in default when set.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity of the reported diagnostics.
    #[serde(default = "CheckConfig::default_severity")]
    pub severity: Severity,
}

impl CheckConfig {
    fn default_severity() -> Severity {
        Severity::Warning
    }

    pub fn is_enabled(&self, enabled_by_default: bool) -> bool {
        self.enabled.unwrap_or(enabled_by_default)
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            enabled: None,
            severity: Self::default_severity(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Catalog TOML files. Relative paths are resolved against the directory containing the
    /// config file.
    #[serde(default)]
    #[schemars(with = "Vec<String>")]
    pub extra: Vec<PathBuf>,
}

impl CatalogConfig {
    /// `extra` with relative entries joined onto `base_dir`.
    pub fn resolved_paths(&self, base_dir: Option<&Path>) -> Vec<PathBuf> {
        self.extra
            .iter()
            .map(|path| match base_dir {
                Some(base) if path.is_relative() => base.join(path),
                _ => path.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level for all collcheck crates.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,

    /// Write logs to stderr. When disabled the subscriber still filters but discards output.
    #[serde(default = "LoggingConfig::default_stderr")]
    pub stderr: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    fn default_stderr() -> bool {
        true
    }

    pub(crate) fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }

        match trimmed.to_ascii_lowercase().as_str() {
            // Simple levels should be forgiving about casing and synonyms.
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            // Anything else is treated as an `EnvFilter` directive string.
            _ => trimmed.to_owned(),
        }
    }

    fn config_env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        })
    }

    /// Create the effective `EnvFilter`.
    ///
    /// `level` may be either a simple level (`info`, `debug`, ...) or a full
    /// `tracing_subscriber::EnvFilter` directive string such as `warn,collcheck.analysis=debug`.
    ///
    /// If `RUST_LOG` is set, it is merged into the resulting filter.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let config_directives = Self::normalize_level_directives(&self.level);

        match env_directives {
            Some(env_directives) => {
                let combined = format!("{config_directives},{env_directives}");
                tracing_subscriber::EnvFilter::try_new(combined)
                    .or_else(|_| tracing_subscriber::EnvFilter::try_new(env_directives))
                    .unwrap_or_else(|_| self.config_env_filter())
            }
            None => self.config_env_filter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: Self::default_stderr(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // The default `Display` embeds a snippet of the input; keep just the message.
        ConfigError::Toml(err.message().to_owned())
    }
}

impl CollcheckConfig {
    /// Load a config file from TOML.
    ///
    /// Unknown keys are logged and otherwise ignored. Relative `catalog.extra` paths are resolved
    /// against the directory containing `path`.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let (config, diagnostics) = Self::load_from_path_with_diagnostics(path)?;
        for key in &diagnostics.unknown_keys {
            tracing::warn!(target: "collcheck.config", key = %key, "ignoring unknown config key");
        }
        Ok(config)
    }

    /// Load a config file from TOML and return diagnostics (unknown keys and semantic validation
    /// failures).
    pub fn load_from_path_with_diagnostics(
        path: impl AsRef<Path>,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let ctx = ConfigValidationContext {
            config_dir: path.parent(),
        };
        let (mut config, diagnostics) = Self::load_from_str_with_diagnostics_inner(&text, ctx)?;
        config.catalog.extra = config.catalog.resolved_paths(ctx.config_dir);
        Ok((config, diagnostics))
    }

    /// Load a config from a TOML string. Relative catalog paths are left untouched.
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a config from a TOML string and return diagnostics.
    pub fn load_from_str_with_diagnostics(
        text: &str,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        Self::load_from_str_with_diagnostics_inner(text, ConfigValidationContext::default())
    }

    fn load_from_str_with_diagnostics_inner(
        text: &str,
        ctx: ConfigValidationContext<'_>,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let (config, unknown_keys) =
            diagnostics::deserialize_toml_with_unknown_keys::<CollcheckConfig>(text)?;

        let mut diagnostics = ConfigDiagnostics {
            unknown_keys,
            ..ConfigDiagnostics::default()
        };
        diagnostics.extend_validation(config.validate_with_context(ctx));

        Ok((config, diagnostics))
    }
}

pub const COLLCHECK_CONFIG_ENV_VAR: &str = "COLLCHECK_CONFIG_PATH";

static CONFIG_ENV_LOCK: OnceLock<ReentrantMutex<()>> = OnceLock::new();

fn config_env_lock() -> &'static ReentrantMutex<()> {
    CONFIG_ENV_LOCK.get_or_init(|| ReentrantMutex::new(()))
}

/// Run `f` while holding the config environment lock.
///
/// Environment variables are process-global; tests that set [`COLLCHECK_CONFIG_ENV_VAR`] wrap the
/// mutation and the discovery call in this helper so concurrent discovery cannot observe it.
pub fn with_config_env_lock<R>(f: impl FnOnce() -> R) -> R {
    let _guard = config_env_lock().lock();
    f()
}

/// Discover the configuration file for a project root.
///
/// Search order:
/// 1) `COLLCHECK_CONFIG_PATH` (absolute or relative to `root`)
/// 2) `collcheck.toml` in `root`
/// 3) `.collcheck.toml` in `root`
pub fn discover_config_path(root: &Path) -> Option<PathBuf> {
    let _guard = config_env_lock().lock();
    if let Some(value) = std::env::var_os(COLLCHECK_CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(value);
        let path = if candidate.is_absolute() {
            candidate
        } else {
            root.join(candidate)
        };
        return Some(path.canonicalize().unwrap_or(path));
    }

    ["collcheck.toml", ".collcheck.toml"]
        .into_iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
        .map(|path| path.canonicalize().unwrap_or(path))
}

/// Load the configuration for a project root.
///
/// If no config is present, returns [`CollcheckConfig::default`] and `None`.
pub fn load_for_root(root: &Path) -> Result<(CollcheckConfig, Option<PathBuf>), ConfigError> {
    let Some(path) = discover_config_path(root) else {
        return Ok((CollcheckConfig::default(), None));
    };

    let config = CollcheckConfig::load_from_path(&path)?;
    Ok((config, Some(path)))
}

static TRACING_INIT: Once = Once::new();

/// Initializes structured `tracing` logging.
///
/// This function is safe to call multiple times; only the first call installs a global
/// subscriber. Returns `true` if this call installed it.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let mut installed = false;
    TRACING_INIT.call_once(|| {
        let filter = config.env_filter();

        let make_writer = if !config.stderr {
            BoxMakeWriter::new(std::io::sink)
        } else if cfg!(debug_assertions) {
            // Output capture in `cargo test` only covers `print!`-style writes.
            BoxMakeWriter::new(tracing_subscriber::fmt::writer::TestWriter::with_stderr)
        } else {
            BoxMakeWriter::new(std::io::stderr)
        };

        let layer: Box<dyn tracing_subscriber::Layer<_> + Send + Sync> = if config.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(make_writer)
                .with_ansi(false)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(make_writer)
                .with_ansi(false)
                .boxed()
        };

        let subscriber = tracing_subscriber::registry().with(filter).with(layer);
        installed = tracing::subscriber::set_global_default(subscriber).is_ok();
        if installed {
            tracing::debug!(
                target: "collcheck.config",
                level = %config.level,
                json = config.json,
                "tracing initialized"
            );
        }
    });
    installed
}
