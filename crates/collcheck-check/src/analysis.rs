use collcheck_types::{
    erasure, format_type, is_subtype, resolve_ancestor_type_args, ClassType, SupertypeIndex, Type,
    TypeEnv,
};

use crate::catalog::{CatalogEntry, ResolvedCatalog, ResolvedEntry};
use crate::decide::{decide_with, CompatibilityPolicy, Verdict};
use crate::CallSite;

/// Outcome of analyzing one call site against one catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Analysis {
    pub verdict: Verdict,
    /// Set iff `verdict` is [`Verdict::Incompatible`].
    pub mismatch: Option<Mismatch>,
}

impl Analysis {
    fn inconclusive() -> Self {
        Self {
            verdict: Verdict::Inconclusive,
            mismatch: None,
        }
    }
}

/// The resolved types that were found incompatible, and the entry that linked them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mismatch {
    pub entry: CatalogEntry,
    /// The receiver's type argument for the entry's base type.
    pub parameter: Type,
    pub argument: Type,
}

/// Catalog entries `call` matches, each paired with the relevant argument's static type.
///
/// An entry matches when the method name and erased parameter list are equal, the receiver is an
/// erased subtype of the entry's base type, and the call has an argument at `arg_index`.
pub fn match_call<'a>(
    env: &'a dyn TypeEnv,
    call: &'a CallSite,
    catalog: &'a ResolvedCatalog,
) -> impl Iterator<Item = (&'a ResolvedEntry, &'a Type)> + 'a {
    match_call_inner(env, None, call, catalog)
}

fn match_call_inner<'a>(
    env: &'a dyn TypeEnv,
    index: Option<&'a SupertypeIndex>,
    call: &'a CallSite,
    catalog: &'a ResolvedCatalog,
) -> impl Iterator<Item = (&'a ResolvedEntry, &'a Type)> + 'a {
    let receiver = erasure(env, &call.receiver);
    let params: Option<Vec<Type>> = call
        .erased_params
        .iter()
        .map(|param| erasure(env, param))
        .collect();

    catalog
        .by_method(&call.method)
        .filter(move |entry| params.as_deref() == Some(entry.erased_params.as_slice()))
        .filter(move |entry| match &receiver {
            Some(receiver) => receiver_is_descendant(env, index, receiver, entry),
            None => false,
        })
        .filter_map(move |entry| Some((entry, call.args.get(entry.arg_index())?)))
}

fn receiver_is_descendant(
    env: &dyn TypeEnv,
    index: Option<&SupertypeIndex>,
    receiver: &Type,
    entry: &ResolvedEntry,
) -> bool {
    if let (Some(index), Type::Class(ClassType { def, .. })) = (index, receiver) {
        if let Some(found) = index.has_ancestor(*def, entry.base) {
            return found;
        }
    }
    is_subtype(env, receiver, &Type::class(entry.base, vec![]))
}

/// Analyze `call` against `catalog` under [`CompatibilityPolicy::Strict`].
pub fn analyze(env: &dyn TypeEnv, call: &CallSite, catalog: &ResolvedCatalog) -> Analysis {
    analyze_with(env, None, CompatibilityPolicy::Strict, call, catalog)
}

/// Analyze `call` against `catalog`.
///
/// Matching entries are tried in catalog order. The first `Match` or `Incompatible` verdict is
/// final; `Inconclusive` moves on to the next entry. When `index` is given it must have been built
/// from `env`.
pub fn analyze_with(
    env: &dyn TypeEnv,
    index: Option<&SupertypeIndex>,
    policy: CompatibilityPolicy,
    call: &CallSite,
    catalog: &ResolvedCatalog,
) -> Analysis {
    for (entry, argument) in match_call_inner(env, index, call, catalog) {
        let verdict = analyze_entry(env, index, policy, call, entry, argument);
        tracing::trace!(
            target: "collcheck.analysis",
            entry = %entry.entry.signature(),
            receiver = %format_type(env, &call.receiver),
            argument = %format_type(env, argument),
            ?verdict,
            "decided call site"
        );
        match verdict {
            Verdict::Inconclusive => continue,
            Verdict::Match => {
                return Analysis {
                    verdict,
                    mismatch: None,
                }
            }
            Verdict::Incompatible => {
                let parameter = resolve(env, index, &call.receiver, entry)
                    .and_then(|mut args| {
                        let idx = entry.type_param_index();
                        (idx < args.len()).then(|| args.swap_remove(idx))
                    })
                    .unwrap_or(Type::Unknown);
                return Analysis {
                    verdict,
                    mismatch: Some(Mismatch {
                        entry: entry.entry.clone(),
                        parameter,
                        argument: argument.clone(),
                    }),
                };
            }
        }
    }
    Analysis::inconclusive()
}

fn analyze_entry(
    env: &dyn TypeEnv,
    index: Option<&SupertypeIndex>,
    policy: CompatibilityPolicy,
    call: &CallSite,
    entry: &ResolvedEntry,
    argument: &Type,
) -> Verdict {
    let Some(args) = resolve(env, index, &call.receiver, entry) else {
        tracing::debug!(
            target: "collcheck.analysis",
            entry = %entry.entry.signature(),
            receiver = %format_type(env, &call.receiver),
            "receiver type arguments unavailable for base type (raw or unrelated)"
        );
        return Verdict::Inconclusive;
    };
    let Some(parameter) = args.get(entry.type_param_index()) else {
        tracing::debug!(
            target: "collcheck.analysis",
            entry = %entry.entry.signature(),
            arity = args.len(),
            "type parameter index out of range"
        );
        return Verdict::Inconclusive;
    };

    let verdict = decide_with(env, policy, parameter, argument);
    if verdict == Verdict::Inconclusive {
        tracing::debug!(
            target: "collcheck.analysis",
            entry = %entry.entry.signature(),
            parameter = %format_type(env, parameter),
            argument = %format_type(env, argument),
            "parameter or argument has no erasure"
        );
    }
    verdict
}

fn resolve(
    env: &dyn TypeEnv,
    index: Option<&SupertypeIndex>,
    receiver: &Type,
    entry: &ResolvedEntry,
) -> Option<Vec<Type>> {
    match index {
        Some(index) => index.resolve(env, receiver, entry.base),
        None => resolve_ancestor_type_args(env, receiver, entry.base),
    }
}
