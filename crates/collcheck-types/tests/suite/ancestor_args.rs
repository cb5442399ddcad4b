use collcheck_types::{
    parse_type, resolve_ancestor_type_args, ClassDecl, SupertypeIndex, Type, TypeStore,
};

use pretty_assertions::assert_eq;

fn ty(env: &TypeStore, src: &str) -> Type {
    parse_type(env, src).unwrap_or_else(|err| panic!("`{src}` should parse: {err}"))
}

fn both(env: &TypeStore, receiver: &str, ancestor: &str) -> Option<Vec<Type>> {
    let receiver = ty(env, receiver);
    let ancestor = env
        .class_id(ancestor)
        .unwrap_or_else(|| panic!("`{ancestor}` should be declared"));
    let walked = resolve_ancestor_type_args(env, &receiver, ancestor);
    let index = SupertypeIndex::build(env, env.class_ids());
    assert_eq!(
        index.resolve(env, &receiver, ancestor),
        walked,
        "index and graph walk disagree"
    );
    walked
}

#[test]
fn chained_substitution_through_user_hierarchy() {
    let mut env = TypeStore::with_minimal_jdk();
    env.declare(&[
        ClassDecl::class("com.example.B")
            .type_params(["Y"])
            .implements("java.util.Collection<Y>"),
        ClassDecl::class("com.example.A")
            .type_params(["X"])
            .extends("com.example.B<java.util.List<X>>"),
    ])
    .expect("declarations should load");

    assert_eq!(
        both(&env, "com.example.A<String>", "com.example.B"),
        Some(vec![ty(&env, "java.util.List<String>")])
    );
    assert_eq!(
        both(&env, "com.example.A<String>", "java.util.Collection"),
        Some(vec![ty(&env, "java.util.List<String>")])
    );
}

#[test]
fn custom_map_interface_resolves_through_extends() {
    let mut env = TypeStore::with_minimal_jdk();
    env.declare(&[ClassDecl::interface("com.example.CustomMap")
        .extends("java.util.Map<Integer, String>")])
        .expect("declarations should load");

    assert_eq!(
        both(&env, "com.example.CustomMap", "java.util.Map"),
        Some(vec![ty(&env, "Integer"), ty(&env, "String")])
    );
}

#[test]
fn non_generic_jdk_subclass_resolves_fixed_arguments() {
    let env = TypeStore::with_minimal_jdk();
    assert_eq!(
        both(&env, "java.util.Properties", "java.util.Map"),
        Some(vec![ty(&env, "Object"), ty(&env, "Object")])
    );
    assert_eq!(
        both(&env, "java.util.Stack<Number>", "java.util.Collection"),
        Some(vec![ty(&env, "Number")])
    );
}

#[test]
fn raw_receivers_never_resolve() {
    let mut env = TypeStore::with_minimal_jdk();
    env.declare(&[ClassDecl::class("com.example.RawList").extends("java.util.ArrayList")])
        .expect("declarations should load");

    assert_eq!(both(&env, "java.util.HashMap", "java.util.Map"), None);
    assert_eq!(both(&env, "java.util.ArrayList", "java.util.Collection"), None);
    // Rawness is preserved through a non-generic subclass of a raw supertype.
    assert_eq!(both(&env, "com.example.RawList", "java.util.Collection"), None);
}

#[test]
fn unrelated_ancestor_is_none() {
    let env = TypeStore::with_minimal_jdk();
    assert_eq!(both(&env, "java.util.ArrayList<String>", "java.util.Map"), None);
    assert_eq!(both(&env, "String", "java.util.Collection"), None);
}

#[test]
fn non_generic_ancestor_resolves_to_no_arguments() {
    let env = TypeStore::with_minimal_jdk();
    assert_eq!(
        both(&env, "java.util.ArrayList<String>", "java.util.RandomAccess"),
        Some(vec![])
    );
}

#[test]
fn wrong_argument_count_never_resolves() {
    let env = TypeStore::with_minimal_jdk();
    // Neither is valid Java; no binding is recovered from either.
    assert_eq!(both(&env, "java.util.HashMap<String>", "java.util.Map"), None);
    assert_eq!(both(&env, "java.util.HashMap<String>", "java.util.HashMap"), None);
    assert_eq!(
        both(&env, "java.util.ArrayList<String, Long>", "java.util.Collection"),
        None
    );
    assert_eq!(both(&env, "String<Integer>", "java.lang.Comparable"), None);
}

#[test]
fn wrong_argument_count_in_a_declared_supertype_stops_the_walk() {
    let mut env = TypeStore::with_minimal_jdk();
    env.declare(&[ClassDecl::class("com.example.HalfMap")
        .type_params(["T"])
        .implements("java.util.Map<T>")])
        .expect("declarations should load");

    assert_eq!(both(&env, "com.example.HalfMap<String>", "java.util.Map"), None);
    assert_eq!(
        both(&env, "com.example.HalfMap<String>", "com.example.HalfMap"),
        Some(vec![ty(&env, "String")])
    );
}
