use collcheck_types::{boxed_form, erasure, is_castable, is_subtype, Type, TypeEnv};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
    Match,
    Incompatible,
    /// Not enough information to decide; callers stay silent.
    Inconclusive,
}

impl Verdict {
    pub fn is_conclusive(self) -> bool {
        !matches!(self, Verdict::Inconclusive)
    }
}

/// How a container's type argument and a call argument are compared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityPolicy {
    /// Compatible when either erased type is a subtype of the other.
    #[default]
    Strict,
    /// Compatible when the erased types are cast-convertible.
    Castable,
}

/// [`decide_with`] under [`CompatibilityPolicy::Strict`].
pub fn decide(env: &dyn TypeEnv, parameter: &Type, argument: &Type) -> Verdict {
    decide_with(env, CompatibilityPolicy::Strict, parameter, argument)
}

/// Compare boxed forms of `parameter` and `argument`.
///
/// Symmetric in its two type arguments. The strict policy looks at erased types only; the
/// castable policy also rejects provably distinct type arguments (see [`is_castable`]). Types
/// without an erasure (unknown, error, unresolved names) yield [`Verdict::Inconclusive`].
pub fn decide_with(
    env: &dyn TypeEnv,
    policy: CompatibilityPolicy,
    parameter: &Type,
    argument: &Type,
) -> Verdict {
    let (parameter, argument) = (boxed_form(env, parameter), boxed_form(env, argument));
    let (Some(erased_parameter), Some(erased_argument)) =
        (erasure(env, &parameter), erasure(env, &argument))
    else {
        return Verdict::Inconclusive;
    };

    let compatible = match policy {
        CompatibilityPolicy::Strict => {
            is_subtype(env, &erased_argument, &erased_parameter)
                || is_subtype(env, &erased_parameter, &erased_argument)
        }
        CompatibilityPolicy::Castable => is_castable(env, &argument, &parameter),
    };
    if compatible {
        Verdict::Match
    } else {
        Verdict::Incompatible
    }
}
