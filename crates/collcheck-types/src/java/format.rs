use std::fmt::Write;

use crate::{ClassType, Type, TypeEnv, WildcardBound};

/// Render `ty` the way Java source would spell it, using simple class names
/// (`Map<Integer, List<String>>`).
pub fn format_type(env: &dyn TypeEnv, ty: &Type) -> String {
    let mut out = String::new();
    TypeFormatter {
        env,
        qualified: false,
    }
    .write(&mut out, ty);
    out
}

/// Like [`format_type`] but with binary class names. Stable, so usable as a sort key.
pub fn format_type_qualified(env: &dyn TypeEnv, ty: &Type) -> String {
    let mut out = String::new();
    TypeFormatter {
        env,
        qualified: true,
    }
    .write(&mut out, ty);
    out
}

struct TypeFormatter<'a> {
    env: &'a dyn TypeEnv,
    qualified: bool,
}

impl TypeFormatter<'_> {
    fn write(&self, out: &mut String, ty: &Type) {
        match ty {
            Type::Void => out.push_str("void"),
            Type::Primitive(p) => out.push_str(p.keyword()),
            Type::Class(ClassType { def, args }) => {
                match self.env.class(*def) {
                    Some(class_def) if self.qualified => out.push_str(&class_def.name),
                    Some(class_def) => out.push_str(&simple_name(&class_def.name)),
                    None => {
                        let _ = write!(out, "<class#{}>", def.to_raw());
                    }
                }
                if !args.is_empty() {
                    out.push('<');
                    self.write_list(out, args, ", ");
                    out.push('>');
                }
            }
            Type::Array(elem) => {
                self.write(out, elem);
                out.push_str("[]");
            }
            Type::TypeVar(id) => match self.env.type_param(*id) {
                Some(tp) => out.push_str(&tp.name),
                None => {
                    let _ = write!(out, "<tv#{}>", id.to_raw());
                }
            },
            Type::Wildcard(WildcardBound::Unbounded) => out.push('?'),
            Type::Wildcard(WildcardBound::Extends(upper)) => {
                out.push_str("? extends ");
                self.write(out, upper);
            }
            Type::Wildcard(WildcardBound::Super(lower)) => {
                out.push_str("? super ");
                self.write(out, lower);
            }
            Type::Intersection(parts) => self.write_list(out, parts, " & "),
            Type::Null => out.push_str("null"),
            Type::Named(name) => out.push_str(name),
            Type::Unknown => out.push_str("<unknown>"),
            Type::Error => out.push_str("<error>"),
        }
    }

    fn write_list(&self, out: &mut String, tys: &[Type], sep: &str) {
        for (idx, ty) in tys.iter().enumerate() {
            if idx > 0 {
                out.push_str(sep);
            }
            self.write(out, ty);
        }
    }
}

/// `java.util.Map$Entry` -> `Map.Entry`
fn simple_name(binary_name: &str) -> String {
    let last = binary_name.rsplit('.').next().unwrap_or(binary_name);
    last.replace('$', ".")
}
