use collcheck_check::CallSite;
use collcheck_types::{parse_type, Type, TypeStore};

mod config;
mod properties;

/// Parse `src` against `env`; `null` is the null literal type.
pub(crate) fn ty(env: &TypeStore, src: &str) -> Type {
    if src == "null" {
        return Type::Null;
    }
    parse_type(env, src).unwrap_or_else(|err| panic!("`{src}` should parse: {err}"))
}

/// A single-argument `method(Object)` call.
pub(crate) fn object_call(env: &TypeStore, receiver: &str, method: &str, arg: &str) -> CallSite {
    CallSite::new(ty(env, receiver), method)
        .with_params([ty(env, "java.lang.Object")])
        .with_args([ty(env, arg)])
}
