//! Subtyping and castability over *erased* types.
//!
//! Generic type arguments never participate here: `List<String>` and `List<Integer>` erase to the
//! same `List`. That is the comparison the container-argument checks want, and it keeps every
//! query a walk over the declared class graph.

use std::collections::{HashSet, VecDeque};

use crate::java::helpers::instantiate_as_supertype;
use crate::{ClassId, ClassKind, ClassType, PrimitiveType, Type, TypeEnv, TypeVarId, WildcardBound};

/// Map a primitive to its wrapper class type (JLS 5.1.7); every other type is returned as is.
pub fn boxed_form(env: &dyn TypeEnv, ty: &Type) -> Type {
    match ty {
        Type::Primitive(p) => Type::class(env.well_known().boxed(*p), vec![]),
        other => other.clone(),
    }
}

/// Erase `ty` (JLS 4.6). Returns `None` when there is nothing sound to erase to: `void`,
/// unknown/error placeholders, unresolvable names, and type variables without a definition.
pub fn erasure(env: &dyn TypeEnv, ty: &Type) -> Option<Type> {
    fn inner(env: &dyn TypeEnv, ty: &Type, seen_type_vars: &mut HashSet<TypeVarId>) -> Option<Type> {
        let object = || Type::class(env.well_known().object, vec![]);
        match ty {
            Type::Void | Type::Unknown | Type::Error => None,
            Type::Primitive(_) | Type::Null => Some(ty.clone()),
            Type::Class(ClassType { def, .. }) => Some(Type::class(*def, vec![])),
            Type::Named(name) => env.lookup_class(name).map(|id| Type::class(id, vec![])),
            Type::Array(elem) => Some(Type::Array(Box::new(inner(env, elem, seen_type_vars)?))),
            Type::TypeVar(id) => {
                if !seen_type_vars.insert(*id) {
                    return None;
                }
                let out = env
                    .type_param(*id)
                    .and_then(|tp| match tp.upper_bounds.first() {
                        Some(bound) => inner(env, bound, seen_type_vars),
                        None => Some(object()),
                    });
                seen_type_vars.remove(id);
                out
            }
            Type::Wildcard(WildcardBound::Extends(upper)) => inner(env, upper, seen_type_vars),
            Type::Wildcard(WildcardBound::Unbounded | WildcardBound::Super(_)) => Some(object()),
            // The erasure of an intersection is the erasure of its leftmost component.
            Type::Intersection(parts) => inner(env, parts.first()?, seen_type_vars),
        }
    }

    let mut seen_type_vars = HashSet::new();
    inner(env, ty, &mut seen_type_vars)
}

/// Erased subtype test: reflexive, transitive, and consistent with the declared class graph.
///
/// Types that cannot be erased are never subtypes of anything.
pub fn is_subtype(env: &dyn TypeEnv, sub: &Type, sup: &Type) -> bool {
    let (Some(sub), Some(sup)) = (erasure(env, sub), erasure(env, sup)) else {
        return false;
    };
    is_erased_subtype(env, &sub, &sup)
}

/// Castability (JLS 5.5), restricted to what matters for container arguments: primitives are
/// boxed first, class/interface pairs are castable unless both are classes or the class side is
/// `final`.
///
/// The erased types decide, except that two parameterizations of related classes are not castable
/// when their type arguments are provably distinct (JLS 4.5): `List<String>` to
/// `ArrayList<Integer>` fails, `List<String>` to `ArrayList<? extends Number>` does not.
pub fn is_castable(env: &dyn TypeEnv, from: &Type, to: &Type) -> bool {
    let (from, to) = (boxed_form(env, from), boxed_form(env, to));
    let (Some(erased_from), Some(erased_to)) = (erasure(env, &from), erasure(env, &to)) else {
        return false;
    };
    is_erased_castable(env, &erased_from, &erased_to) && !has_provably_distinct_args(env, &from, &to)
}

fn is_erased_subtype(env: &dyn TypeEnv, sub: &Type, sup: &Type) -> bool {
    if sub == sup {
        return true;
    }

    let wk = env.well_known();
    match (sub, sup) {
        (Type::Null, other) => other.is_reference(),
        (Type::Primitive(from), Type::Primitive(to)) => primitive_widens(*from, *to),
        (Type::Class(sub), Type::Class(sup)) => {
            sup.def == wk.object || class_ancestors(env, sub.def).contains(&sup.def)
        }
        (Type::Array(sub_elem), Type::Array(sup_elem)) => match (&**sub_elem, &**sup_elem) {
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (a, b) if a.is_reference() && b.is_reference() => is_erased_subtype(env, a, b),
            _ => false,
        },
        // JLS 4.10.3
        (Type::Array(_), Type::Class(sup)) => {
            sup.def == wk.object || sup.def == wk.cloneable || sup.def == wk.serializable
        }
        _ => false,
    }
}

fn is_erased_castable(env: &dyn TypeEnv, from: &Type, to: &Type) -> bool {
    if is_erased_subtype(env, from, to) || is_erased_subtype(env, to, from) {
        return true;
    }

    match (from, to) {
        (Type::Class(a), Type::Class(b)) => {
            let (Some(a_def), Some(b_def)) = (env.class(a.def), env.class(b.def)) else {
                // Missing metadata: nothing proves the cast impossible.
                return true;
            };
            match (a_def.kind, b_def.kind) {
                (ClassKind::Class, ClassKind::Class) => false,
                (ClassKind::Interface, ClassKind::Interface) => true,
                (ClassKind::Class, ClassKind::Interface) => !a_def.is_final,
                (ClassKind::Interface, ClassKind::Class) => !b_def.is_final,
            }
        }
        (Type::Array(a), Type::Array(b)) => {
            a.is_reference() && b.is_reference() && is_erased_castable(env, a, b)
        }
        _ => false,
    }
}

/// Whether `a` and `b` are parameterizations of one class hierarchy whose arguments cannot agree.
///
/// The subtype side is viewed as the supertype's class first, so `ArrayList<Integer>` is compared
/// with `List<String>` as `List<Integer>`. Unrelated classes and raw usages never count.
fn has_provably_distinct_args(env: &dyn TypeEnv, a: &Type, b: &Type) -> bool {
    let (a, b) = (crate::canonicalize_named(env, a), crate::canonicalize_named(env, b));
    let (Type::Class(a_class), Type::Class(b_class)) = (&a, &b) else {
        return false;
    };
    let is_raw = |class: &ClassType| {
        class.args.is_empty() && env.class(class.def).map_or(true, |def| def.is_generic())
    };
    if is_raw(a_class) || is_raw(b_class) {
        return false;
    }

    let (viewed, other) = if class_ancestors(env, a_class.def).contains(&b_class.def) {
        (instantiate_as_supertype(env, &a, b_class.def), b_class)
    } else if class_ancestors(env, b_class.def).contains(&a_class.def) {
        (instantiate_as_supertype(env, &b, a_class.def), a_class)
    } else {
        return false;
    };
    let Some(Type::Class(viewed)) = viewed else {
        return false;
    };
    viewed.args.len() == other.args.len()
        && viewed
            .args
            .iter()
            .zip(&other.args)
            .any(|(x, y)| is_fully_concrete(x) && is_fully_concrete(y) && x != y)
}

/// No type variables, wildcards, placeholders or unresolved names anywhere inside.
fn is_fully_concrete(ty: &Type) -> bool {
    match ty {
        Type::Primitive(_) => true,
        Type::Class(ClassType { args, .. }) => args.iter().all(is_fully_concrete),
        Type::Array(elem) => is_fully_concrete(elem),
        _ => false,
    }
}

/// Every class and interface reachable through `extends` / `implements` from `id`, including `id`.
fn class_ancestors(env: &dyn TypeEnv, id: ClassId) -> HashSet<ClassId> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([id]);
    while let Some(current) = queue.pop_front() {
        if !seen.insert(current) {
            continue;
        }
        let Some(def) = env.class(current) else {
            continue;
        };
        for sup in def.super_class.iter().chain(&def.interfaces) {
            if let Some(Type::Class(ClassType { def, .. })) = erasure(env, sup) {
                queue.push_back(def);
            }
        }
    }
    seen
}

/// Primitive subtyping (JLS 4.10.1): `byte <: short <: int <: long <: float <: double`,
/// `char <: int`.
fn primitive_widens(from: PrimitiveType, to: PrimitiveType) -> bool {
    fn rank(p: PrimitiveType) -> Option<u8> {
        match p {
            PrimitiveType::Byte => Some(0),
            PrimitiveType::Short => Some(1),
            PrimitiveType::Int => Some(2),
            PrimitiveType::Long => Some(3),
            PrimitiveType::Float => Some(4),
            PrimitiveType::Double => Some(5),
            PrimitiveType::Boolean | PrimitiveType::Char => None,
        }
    }

    if from == to {
        return true;
    }
    match (from, rank(to)) {
        (PrimitiveType::Char, Some(to_rank)) => to_rank >= 2,
        (_, Some(to_rank)) => rank(from).is_some_and(|from_rank| from_rank <= to_rank),
        (_, None) => false,
    }
}
