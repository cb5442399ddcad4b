use collcheck_types::{
    parse_type, resolve_ancestor_type_args, ClassDecl, SupertypeIndex, Type, TypeStore,
};
use proptest::prelude::*;

const PROPTEST_CASES: u32 = 128;

/// How one level of a generated hierarchy forwards its type parameter to its parent.
#[derive(Clone, Copy, Debug)]
enum Step {
    PassThrough,
    WrapInList,
    Fixed,
}

impl Step {
    fn apply(self, inner: &str) -> String {
        match self {
            Step::PassThrough => inner.to_string(),
            Step::WrapInList => format!("java.util.List<{inner}>"),
            Step::Fixed => "java.lang.String".to_string(),
        }
    }
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::PassThrough),
        Just(Step::WrapInList),
        Just(Step::Fixed),
    ]
}

/// `C0<X> implements Collection<f0(X)>`, `Ci<X> extends C(i-1)<fi(X)>`.
fn build_chain(steps: &[Step]) -> (TypeStore, String) {
    let mut env = TypeStore::with_minimal_jdk();
    let mut decls = Vec::with_capacity(steps.len());
    for (idx, step) in steps.iter().enumerate() {
        let decl = ClassDecl::class(format!("gen.C{idx}")).type_params(["X"]);
        let forwarded = step.apply("X");
        decls.push(if idx == 0 {
            decl.implements(format!("java.util.Collection<{forwarded}>"))
        } else {
            decl.extends(format!("gen.C{}<{forwarded}>", idx - 1))
        });
    }
    env.declare(&decls).expect("generated declarations should load");
    (env, format!("gen.C{}", steps.len() - 1))
}

proptest! {
    #![proptest_config(ProptestConfig { cases: PROPTEST_CASES, .. ProptestConfig::default() })]

    #[test]
    fn chained_substitution_matches_manual_fold(steps in prop::collection::vec(arb_step(), 1..6)) {
        let (env, leaf) = build_chain(&steps);
        let collection = env.class_id("java.util.Collection").unwrap();
        let receiver = parse_type(&env, &format!("{leaf}<java.lang.Integer>")).unwrap();

        let expected = steps
            .iter()
            .rev()
            .fold("java.lang.Integer".to_string(), |acc, step| step.apply(&acc));
        let expected = parse_type(&env, &expected).unwrap();

        let walked = resolve_ancestor_type_args(&env, &receiver, collection);
        prop_assert_eq!(walked.clone(), Some(vec![expected]));

        let index = SupertypeIndex::build(&env, env.class_ids());
        prop_assert_eq!(index.resolve(&env, &receiver, collection), walked);
    }

    #[test]
    fn raw_leaf_never_resolves(steps in prop::collection::vec(arb_step(), 1..6)) {
        let (env, leaf) = build_chain(&steps);
        let collection = env.class_id("java.util.Collection").unwrap();
        let receiver = parse_type(&env, &leaf).unwrap();

        prop_assert_eq!(resolve_ancestor_type_args(&env, &receiver, collection), None);
        let index = SupertypeIndex::build(&env, env.class_ids());
        prop_assert_eq!(index.resolve(&env, &receiver, collection), None);
    }

    #[test]
    fn resolution_is_deterministic(steps in prop::collection::vec(arb_step(), 1..6)) {
        let (env, leaf) = build_chain(&steps);
        let collection = env.class_id("java.util.Collection").unwrap();
        let receiver: Type = parse_type(&env, &format!("{leaf}<java.lang.Number>")).unwrap();

        let first = resolve_ancestor_type_args(&env, &receiver, collection);
        for _ in 0..3 {
            prop_assert_eq!(resolve_ancestor_type_args(&env, &receiver, collection), first.clone());
        }
    }
}
