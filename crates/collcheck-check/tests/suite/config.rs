use collcheck_check::{CatalogError, CheckKind, Checker};
use collcheck_config::CollcheckConfig;
use collcheck_types::{Severity, TypeStore};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

use super::object_call;

const EXTRA_CATALOG: &str = r#"
version = 1

[[entry]]
base_type = "java.util.function.Function"
method = "apply"
erased_params = ["java.lang.Object"]
type_param_index = 0
arg_index = 0

# Not part of the minimal JDK; dropped at resolution.
[[entry]]
base_type = "com.google.common.collect.Multimap"
method = "containsKey"
erased_params = ["java.lang.Object"]
type_param_index = 0
arg_index = 0
"#;

#[test]
fn extra_catalogs_extend_the_strict_check() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("extra.toml"), EXTRA_CATALOG).unwrap();
    let config_path = dir.path().join("collcheck.toml");
    std::fs::write(
        &config_path,
        r#"
[checks.strict_collection_incompatible_type]
severity = "error"

[catalog]
extra = ["extra.toml"]
"#,
    )
    .unwrap();

    let config = CollcheckConfig::load_from_path(&config_path).expect("config should load");
    let env = TypeStore::with_minimal_jdk();
    let checker =
        Checker::from_config(&env, env.class_ids(), &config).expect("extra catalog should load");

    let strict = &checker.checks()[0];
    assert_eq!(strict.kind, CheckKind::StrictCollectionIncompatibleType);
    assert_eq!(strict.catalog.len(), 18);

    let findings = checker.check_call(
        &env,
        &object_call(&env, "java.util.function.Function<String, Integer>", "apply", "Integer"),
    );
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].severity, Severity::Error);
    assert_eq!(findings[0].mismatch.entry.method, "apply");
}

#[test]
fn missing_extra_catalog_is_an_error() {
    let dir = tempdir().unwrap();
    let config = CollcheckConfig::load_from_str(&format!(
        "[catalog]\nextra = [{:?}]\n",
        dir.path().join("absent.toml").display().to_string()
    ))
    .expect("config should parse");

    let env = TypeStore::with_minimal_jdk();
    let err = Checker::from_config(&env, env.class_ids(), &config).unwrap_err();
    assert!(matches!(err, CatalogError::Io { .. }), "unexpected error: {err:?}");
}

#[test]
fn disabling_every_check_yields_no_findings() {
    let config = CollcheckConfig::load_from_str(
        "[checks.strict_collection_incompatible_type]\nenabled = false\n",
    )
    .expect("config should parse");
    let env = TypeStore::with_minimal_jdk();
    let checker = Checker::from_config(&env, env.class_ids(), &config).expect("checker should build");
    assert!(checker.checks().is_empty());
    assert!(checker
        .check_call(&env, &object_call(&env, "java.util.Set<String>", "contains", "Integer"))
        .is_empty());
}
