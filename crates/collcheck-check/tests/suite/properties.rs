use collcheck_check::{analyze, analyze_with, decide_with, Catalog, CompatibilityPolicy, Verdict};
use collcheck_types::{erasure, SupertypeIndex, TypeStore};
use proptest::prelude::*;

use super::{object_call, ty};

const PROPTEST_CASES: u32 = 256;

const TYPES: &[&str] = &[
    "null",
    "int",
    "long",
    "char",
    "boolean",
    "Object",
    "String",
    "CharSequence",
    "Integer",
    "Long",
    "Number",
    "StringBuilder",
    "java.util.List<String>",
    "java.util.ArrayList<Integer>",
    "java.util.Collection<Number>",
    "java.util.Map<String, Integer>",
    "java.util.HashMap",
    "java.util.Set<CharSequence>",
    "java.util.Deque<Long>",
    "java.util.Properties",
    "java.util.Stack<Number>",
    "String[]",
    "Object[]",
    "int[]",
    "Integer[]",
];

const RECEIVERS: &[&str] = &[
    "java.util.List<String>",
    "java.util.ArrayList<Integer>",
    "java.util.LinkedList",
    "java.util.HashMap<String, Integer>",
    "java.util.Hashtable<Integer, String>",
    "java.util.Properties",
    "java.util.Stack<Number>",
    "java.util.ArrayDeque<CharSequence>",
    "java.util.HashSet<String>",
    "String",
];

const METHODS: &[&str] = &[
    "contains",
    "remove",
    "get",
    "containsKey",
    "containsValue",
    "search",
    "removeFirstOccurrence",
    "indexOf",
];

const POLICIES: [CompatibilityPolicy; 2] = [CompatibilityPolicy::Strict, CompatibilityPolicy::Castable];

fn any_type() -> impl Strategy<Value = &'static str> {
    proptest::sample::select(TYPES)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: PROPTEST_CASES, .. ProptestConfig::default() })]

    #[test]
    fn decide_is_symmetric(a in any_type(), b in any_type()) {
        let env = TypeStore::with_minimal_jdk();
        let (a, b) = (ty(&env, a), ty(&env, b));
        for policy in POLICIES {
            prop_assert_eq!(decide_with(&env, policy, &a, &b), decide_with(&env, policy, &b, &a));
        }
    }

    #[test]
    fn decide_is_reflexive(a in any_type()) {
        let env = TypeStore::with_minimal_jdk();
        let a = ty(&env, a);
        for policy in POLICIES {
            prop_assert_eq!(decide_with(&env, policy, &a, &a), Verdict::Match);
        }
    }

    #[test]
    fn strict_match_implies_castable_match_for_erased_types(a in any_type(), b in any_type()) {
        let env = TypeStore::with_minimal_jdk();
        // Castability also compares type arguments, which the strict policy ignores.
        let (Some(a), Some(b)) = (erasure(&env, &ty(&env, a)), erasure(&env, &ty(&env, b))) else {
            return Ok(());
        };
        if decide_with(&env, CompatibilityPolicy::Strict, &a, &b) == Verdict::Match {
            prop_assert_eq!(decide_with(&env, CompatibilityPolicy::Castable, &a, &b), Verdict::Match);
        }
    }

    #[test]
    fn analysis_is_deterministic_and_index_agrees_with_walk(
        receiver in proptest::sample::select(RECEIVERS),
        method in proptest::sample::select(METHODS),
        argument in any_type(),
    ) {
        let env = TypeStore::with_minimal_jdk();
        let index = SupertypeIndex::build(&env, env.class_ids());
        let catalog = Catalog::strict_collection_incompatible_type().resolve(&env);
        let call = object_call(&env, receiver, method, argument);

        let walked = analyze(&env, &call, &catalog);
        prop_assert_eq!(&analyze(&env, &call, &catalog), &walked);
        for policy in POLICIES {
            prop_assert_eq!(
                analyze_with(&env, Some(&index), policy, &call, &catalog),
                analyze_with(&env, None, policy, &call, &catalog)
            );
        }
        prop_assert_eq!(
            analyze_with(&env, Some(&index), CompatibilityPolicy::Strict, &call, &catalog),
            walked
        );
    }
}
