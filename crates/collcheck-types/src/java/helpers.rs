use std::collections::{HashMap, HashSet, VecDeque};

use crate::{ClassId, ClassKind, ClassType, Type, TypeEnv, TypeVarId};

/// Immediate supertypes of `ty` with the receiver's type arguments substituted in.
///
/// A raw receiver (`List` rather than `List<String>`) yields raw supertypes: type arguments cannot
/// be recovered for anything above a raw usage. A receiver whose argument count differs from the
/// class's declared arity has no supertypes at all. Interfaces implicitly have `Object` as a
/// supertype (JLS 4.10.2).
pub fn direct_supertypes(env: &dyn TypeEnv, ty: &Type) -> Vec<Type> {
    let Type::Class(ClassType { def, args }) = crate::canonicalize_named(env, ty) else {
        return Vec::new();
    };
    let Some(class_def) = env.class(def) else {
        return Vec::new();
    };

    let raw = args.is_empty() && class_def.is_generic();
    if !args.is_empty() && args.len() != class_def.type_params.len() {
        // Wrong argument count: no binding above this type can be trusted.
        return Vec::new();
    }
    let mut out = Vec::with_capacity(class_def.interfaces.len() + 1);

    if raw {
        out.extend(class_def.super_class.iter().filter_map(|sc| raw_class_type(env, sc)));
        let mut ifaces: Vec<Type> = class_def
            .interfaces
            .iter()
            .filter_map(|iface| raw_class_type(env, iface))
            .collect();
        ifaces.sort_by_cached_key(|ty| crate::type_sort_key(env, ty));
        out.extend(ifaces);
    } else {
        let subst: HashMap<TypeVarId, Type> = class_def
            .type_params
            .iter()
            .copied()
            .zip(args)
            .collect();

        if let Some(sc) = &class_def.super_class {
            out.push(crate::canonicalize_named(env, &crate::substitute(sc, &subst)));
        }
        let mut ifaces: Vec<Type> = class_def
            .interfaces
            .iter()
            .map(|iface| crate::canonicalize_named(env, &crate::substitute(iface, &subst)))
            .collect();
        ifaces.sort_by_cached_key(|ty| crate::type_sort_key(env, ty));
        out.extend(ifaces);
    }

    if class_def.kind == ClassKind::Interface {
        out.push(Type::class(env.well_known().object, vec![]));
    }
    out
}

/// `ty` followed by every class type reachable through [`direct_supertypes`], breadth-first.
///
/// The first instantiation found for each class wins; later paths to an already-visited class are
/// not expanded again, which also makes the walk terminate on malformed (cyclic) graphs.
pub fn supertype_closure(env: &dyn TypeEnv, ty: &Type) -> Vec<Type> {
    let mut out = Vec::new();
    let mut seen: HashSet<ClassId> = HashSet::new();
    let mut queue: VecDeque<Type> = VecDeque::new();
    queue.push_back(crate::canonicalize_named(env, ty));

    while let Some(current) = queue.pop_front() {
        let Type::Class(ClassType { def, .. }) = &current else {
            continue;
        };
        if !seen.insert(*def) {
            continue;
        }
        queue.extend(direct_supertypes(env, &current));
        out.push(current);
    }

    out
}

/// Return `ty` viewed as `target` by walking the supertype graph and applying type argument
/// substitution along the way.
///
/// This is a best-effort helper. It never panics: missing class metadata simply returns `None`.
///
/// Example: `ArrayList<String>` instantiated as `Collection` returns `Collection<String>`.
pub fn instantiate_as_supertype(env: &dyn TypeEnv, ty: &Type, target: ClassId) -> Option<Type> {
    fn inner(
        env: &dyn TypeEnv,
        ty: &Type,
        target: ClassId,
        seen_type_vars: &mut HashSet<TypeVarId>,
    ) -> Option<Type> {
        // Handle a few non-class cases up front.
        match ty {
            Type::Array(_) => {
                let wk = env.well_known();
                if target == wk.object || target == wk.cloneable || target == wk.serializable {
                    return Some(Type::class(target, vec![]));
                }
                return None;
            }
            Type::Intersection(parts) => {
                // Deterministically iterate intersection components.
                let mut sorted: Vec<&Type> = parts.iter().collect();
                sorted.sort_by_cached_key(|ty| crate::type_sort_key(env, ty));

                // If several parts can be viewed as `target`, they must agree; conflicting
                // instantiations are ambiguous and yield `None`.
                let mut out: Option<Type> = None;
                for part in sorted {
                    let Some(found) = inner(env, part, target, seen_type_vars) else {
                        continue;
                    };
                    out = match out {
                        None => Some(found),
                        Some(existing) => Some(merge_instantiated_supertypes(existing, found)?),
                    };
                }
                return out;
            }
            Type::TypeVar(id) => {
                if !seen_type_vars.insert(*id) {
                    return None;
                }

                let mut out: Option<Type> = None;
                if let Some(tp) = env.type_param(*id) {
                    let mut sorted: Vec<&Type> = tp.upper_bounds.iter().collect();
                    sorted.sort_by_cached_key(|ty| crate::type_sort_key(env, ty));

                    for bound in sorted {
                        let Some(found) = inner(env, bound, target, seen_type_vars) else {
                            continue;
                        };
                        out = match out {
                            None => Some(found),
                            Some(existing) => match merge_instantiated_supertypes(existing, found) {
                                Some(merged) => Some(merged),
                                None => {
                                    // Ensure recursion guard is cleared before returning.
                                    seen_type_vars.remove(id);
                                    return None;
                                }
                            },
                        };
                    }
                }

                seen_type_vars.remove(id);
                return out;
            }
            Type::Wildcard(crate::WildcardBound::Extends(upper)) => {
                return inner(env, upper, target, seen_type_vars);
            }
            _ => {}
        }

        supertype_closure(env, ty).into_iter().find(|sup| {
            matches!(sup, Type::Class(ClassType { def, .. }) if *def == target)
        })
    }

    let mut seen_type_vars = HashSet::new();
    inner(env, ty, target, &mut seen_type_vars)
}

/// Type arguments of generic ancestor `ancestor` as seen through `concrete`.
///
/// `A<X> extends B<List<X>>` viewed through `A<String>` gives `[List<String>]` for `B`.
///
/// Returns `None` when `ancestor` is not a supertype, when the path to it is raw, or when the
/// recovered argument count differs from the ancestor's declared arity.
pub fn resolve_ancestor_type_args(
    env: &dyn TypeEnv,
    concrete: &Type,
    ancestor: ClassId,
) -> Option<Vec<Type>> {
    let instantiated = instantiate_as_supertype(env, concrete, ancestor)?;
    checked_args(env, instantiated, ancestor)
}

fn checked_args(env: &dyn TypeEnv, instantiated: Type, ancestor: ClassId) -> Option<Vec<Type>> {
    let Type::Class(ClassType { def, args }) = instantiated else {
        return None;
    };
    let arity = env.class(def)?.type_params.len();
    if def != ancestor || args.len() != arity {
        return None;
    }
    Some(args)
}

fn merge_instantiated_supertypes(a: Type, b: Type) -> Option<Type> {
    if a == b {
        return Some(a);
    }

    // Prefer the more informative instantiation; equal scores with different arguments are
    // genuinely ambiguous.
    let a_score = placeholder_score(&a);
    let b_score = placeholder_score(&b);
    match a_score.cmp(&b_score) {
        std::cmp::Ordering::Less => Some(a),
        std::cmp::Ordering::Greater => Some(b),
        std::cmp::Ordering::Equal => None,
    }
}

fn placeholder_score(ty: &Type) -> usize {
    match ty {
        Type::Unknown | Type::Error => 1,
        Type::Array(elem) => placeholder_score(elem),
        Type::Class(ClassType { args, .. }) => args.iter().map(placeholder_score).sum(),
        Type::Wildcard(crate::WildcardBound::Extends(upper))
        | Type::Wildcard(crate::WildcardBound::Super(upper)) => placeholder_score(upper),
        Type::Intersection(parts) => parts.iter().map(placeholder_score).sum(),
        _ => 0,
    }
}

fn raw_class_type(env: &dyn TypeEnv, ty: &Type) -> Option<Type> {
    match crate::canonicalize_named(env, ty) {
        Type::Class(ClassType { def, .. }) => Some(Type::class(def, vec![])),
        _ => None,
    }
}

/// Precomputed ancestor instantiations for every class of an environment.
///
/// For each class `C<T1..Tn>` the index stores every ancestor instantiated in terms of `C`'s own
/// formals, e.g. `A<X> extends B<List<X>>` stores `B -> B<List<X>>`. Resolving through a concrete
/// receiver is then a single substitution instead of a graph walk. The index is immutable once
/// built and can be shared between threads.
#[derive(Clone, Debug, Default)]
pub struct SupertypeIndex {
    ancestors: HashMap<ClassId, HashMap<ClassId, Type>>,
}

impl SupertypeIndex {
    pub fn build(env: &dyn TypeEnv, classes: impl IntoIterator<Item = ClassId>) -> Self {
        let mut ancestors = HashMap::new();
        for id in classes {
            let Some(class_def) = env.class(id) else {
                continue;
            };
            let generic_self = Type::class(
                id,
                class_def.type_params.iter().copied().map(Type::TypeVar).collect(),
            );
            let mut by_ancestor = HashMap::new();
            for sup in supertype_closure(env, &generic_self) {
                if let Type::Class(ClassType { def, .. }) = &sup {
                    by_ancestor.entry(*def).or_insert(sup);
                }
            }
            ancestors.insert(id, by_ancestor);
        }
        Self { ancestors }
    }

    pub fn len(&self) -> usize {
        self.ancestors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ancestors.is_empty()
    }

    /// Whether `ancestor` is a (reflexive) supertype of class `id`, if `id` is indexed.
    pub fn has_ancestor(&self, id: ClassId, ancestor: ClassId) -> Option<bool> {
        self.ancestors.get(&id).map(|m| m.contains_key(&ancestor))
    }

    /// Same contract as [`resolve_ancestor_type_args`]. Receivers that are not plain class types
    /// (type variables, intersections, ...) or not indexed fall back to the graph walk.
    pub fn resolve(&self, env: &dyn TypeEnv, concrete: &Type, ancestor: ClassId) -> Option<Vec<Type>> {
        let concrete = crate::canonicalize_named(env, concrete);
        let Type::Class(ClassType { def, args }) = &concrete else {
            return resolve_ancestor_type_args(env, &concrete, ancestor);
        };
        let Some(by_ancestor) = self.ancestors.get(def) else {
            return resolve_ancestor_type_args(env, &concrete, ancestor);
        };

        let class_def = env.class(*def)?;
        if args.is_empty() && class_def.is_generic() {
            // Raw receiver; only non-generic ancestors can still resolve.
            return resolve_ancestor_type_args(env, &concrete, ancestor);
        }
        if args.len() != class_def.type_params.len() {
            return None;
        }
        let subst: HashMap<TypeVarId, Type> = class_def
            .type_params
            .iter()
            .copied()
            .zip(args.iter().cloned())
            .collect();

        let generic = by_ancestor.get(&ancestor)?;
        checked_args(env, crate::substitute(generic, &subst), ancestor)
    }
}
