use collcheck_config::{CollcheckConfig, ConfigValidationError, ConfigWarning};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[test]
fn unknown_keys_are_reported_with_full_paths() {
    let text = r#"
[logging]
levle = "debug"

[checks.unexpected_type]
enabeld = true

[checks.no_such_check]
enabled = true
"#;
    let (config, diagnostics) =
        CollcheckConfig::load_from_str_with_diagnostics(text).expect("config should parse");
    assert_eq!(
        diagnostics.unknown_keys,
        vec![
            "checks.no_such_check".to_string(),
            "checks.unexpected_type.enabeld".to_string(),
            "logging.levle".to_string(),
        ]
    );
    assert_eq!(config.logging.level, "info");
    assert!(diagnostics.is_ok());
}

#[test]
fn clean_config_has_no_diagnostics() {
    let (_, diagnostics) = CollcheckConfig::load_from_str_with_diagnostics(
        "[logging]\nlevel = \"warn,collcheck.analysis=debug\"\njson = true\n",
    )
    .expect("config should parse");
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

#[test]
fn invalid_level_and_disabled_checks_warn() {
    let text = r#"
[logging]
level = "collcheck=[unclosed"

[checks.strict_collection_incompatible_type]
enabled = false
"#;
    let (_, diagnostics) =
        CollcheckConfig::load_from_str_with_diagnostics(text).expect("config should parse");
    assert_eq!(
        diagnostics.warnings,
        vec![
            ConfigWarning::LoggingLevelInvalid {
                value: "collcheck=[unclosed".to_string(),
                normalized: "collcheck=[unclosed".to_string(),
            },
            ConfigWarning::NoChecksEnabled,
        ]
    );
}

#[test]
fn missing_and_empty_catalog_paths() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("present.toml"), "version = 1\n").unwrap();
    let config_path = dir.path().join("collcheck.toml");
    std::fs::write(
        &config_path,
        "[catalog]\nextra = [\"present.toml\", \"absent.toml\", \"\"]\n",
    )
    .unwrap();

    let (_, diagnostics) = CollcheckConfig::load_from_path_with_diagnostics(&config_path)
        .expect("config should parse");
    assert_eq!(
        diagnostics.warnings,
        vec![ConfigWarning::CatalogPathMissing {
            toml_path: "catalog.extra[1]".to_string(),
            resolved: dir.path().join("absent.toml"),
        }]
    );
    assert_eq!(
        diagnostics.errors,
        vec![ConfigValidationError::InvalidValue {
            toml_path: "catalog.extra[2]".to_string(),
            message: "catalog path must not be empty".to_string(),
        }]
    );
}
