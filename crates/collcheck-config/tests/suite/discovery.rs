use std::ffi::OsString;
use std::sync::Mutex;

use collcheck_config::{
    discover_config_path, load_for_root, CollcheckConfig, COLLCHECK_CONFIG_ENV_VAR,
};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

struct EnvVarGuard {
    key: &'static str,
    prev: Option<OsString>,
}

impl EnvVarGuard {
    fn set(key: &'static str, value: &std::path::Path) -> Self {
        let prev = std::env::var_os(key);
        std::env::set_var(key, value);
        Self { key, prev }
    }

    fn unset(key: &'static str) -> Self {
        let prev = std::env::var_os(key);
        std::env::remove_var(key);
        Self { key, prev }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => std::env::set_var(self.key, v),
            None => std::env::remove_var(self.key),
        }
    }
}

#[test]
fn discovers_collcheck_toml_in_root() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(COLLCHECK_CONFIG_ENV_VAR);

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("collcheck.toml");
    std::fs::write(&config_path, "[logging]\nlevel = \"debug\"\n").unwrap();

    let discovered = discover_config_path(dir.path())
        .expect("collcheck.toml should be discovered when present in the root");
    assert_eq!(discovered, config_path.canonicalize().unwrap_or(config_path));
}

#[test]
fn hidden_config_is_a_fallback() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(COLLCHECK_CONFIG_ENV_VAR);

    let dir = tempdir().unwrap();
    let hidden = dir.path().join(".collcheck.toml");
    std::fs::write(&hidden, "").unwrap();
    assert_eq!(
        discover_config_path(dir.path()),
        Some(hidden.canonicalize().unwrap_or(hidden))
    );

    let visible = dir.path().join("collcheck.toml");
    std::fs::write(&visible, "").unwrap();
    assert_eq!(
        discover_config_path(dir.path()),
        Some(visible.canonicalize().unwrap_or(visible)),
        "collcheck.toml should win over .collcheck.toml"
    );
}

#[test]
fn env_override_wins_over_root_file() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");

    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("collcheck.toml"),
        "[checks.unexpected_type]\nenabled = false\n",
    )
    .unwrap();

    let override_path = dir.path().join("override.toml");
    std::fs::write(
        &override_path,
        "[checks.unexpected_type]\nenabled = true\n[logging]\nlevel = \"debug\"\n",
    )
    .unwrap();
    let _env = EnvVarGuard::set(COLLCHECK_CONFIG_ENV_VAR, &override_path);

    let (config, path) = load_for_root(dir.path()).expect("config should load");
    assert_eq!(path, Some(override_path.canonicalize().unwrap_or(override_path)));
    assert!(config.checks.unexpected_type.is_enabled(false));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn missing_config_yields_defaults() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(COLLCHECK_CONFIG_ENV_VAR);

    let dir = tempdir().unwrap();
    let (config, path) = load_for_root(dir.path()).expect("absent config is not an error");
    assert_eq!(path, None);
    assert_eq!(config, CollcheckConfig::default());
}

#[test]
fn catalog_paths_are_relative_to_the_config_file() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("conf");
    std::fs::create_dir(&nested).unwrap();
    let config_path = nested.join("collcheck.toml");
    std::fs::write(&config_path, "[catalog]\nextra = [\"more.toml\"]\n").unwrap();

    let config = CollcheckConfig::load_from_path(&config_path).expect("config should load");
    assert_eq!(config.catalog.extra, vec![nested.join("more.toml")]);
}

#[test]
fn unreadable_path_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = CollcheckConfig::load_from_path(dir.path().join("absent.toml")).unwrap_err();
    assert!(
        matches!(err, collcheck_config::ConfigError::Io { .. }),
        "unexpected error: {err:?}"
    );
}
