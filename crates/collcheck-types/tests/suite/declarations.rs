use collcheck_types::{
    format_type, is_castable, is_subtype, parse_type, ClassKind, Declarations, TypeEnv, TypeStore,
};

use pretty_assertions::assert_eq;

const PROJECT: &str = r#"
[[class]]
name = "com.example.Repository"
kind = "interface"
type_params = ["T extends java.lang.Comparable<T>"]
extends = ["java.util.Collection<T>"]

[[class]]
name = "com.example.UserRepository"
final = true
extends = "java.util.AbstractCollection<com.example.User>"
implements = ["com.example.Repository<com.example.User>"]

[[class]]
name = "com.example.User"
implements = ["java.lang.Comparable<com.example.User>"]
"#;

#[test]
fn toml_declarations_join_the_minimal_jdk() {
    let mut env = TypeStore::with_minimal_jdk();
    let decls = Declarations::from_toml_str(PROJECT).expect("declarations should parse");
    assert_eq!(decls.classes.len(), 3);
    let ids = decls.declare_into(&mut env).expect("declarations should load");

    let repo = env.class(ids[0]).expect("Repository should be defined");
    assert_eq!(repo.kind, ClassKind::Interface);
    assert_eq!(repo.super_class, None);

    let user_repo = parse_type(&env, "com.example.UserRepository").unwrap();
    assert!(is_subtype(&env, &user_repo, &parse_type(&env, "java.util.Collection").unwrap()));
    assert!(is_subtype(&env, &user_repo, &parse_type(&env, "Object").unwrap()));
    assert!(!is_castable(
        &env,
        &user_repo,
        &parse_type(&env, "java.util.Map").unwrap()
    ));

    let bound = &env
        .type_param(repo.type_params[0])
        .expect("type param should be defined")
        .upper_bounds[0];
    assert_eq!(format_type(&env, bound), "Comparable<T>");
}

#[test]
fn unknown_fields_are_rejected() {
    let err = Declarations::from_toml_str(
        r#"
[[class]]
name = "com.example.A"
extend = "java.lang.Object"
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("extend"), "{err}");
}
