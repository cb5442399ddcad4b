use std::collections::HashMap;

use crate::java::decl::{ClassDecl, DeclarationError};
use crate::{
    ClassDef, ClassId, ClassKind, PrimitiveType, Type, TypeEnv, TypeParamDef, TypeVarId,
    WellKnownTypes,
};

/// In-memory [`TypeEnv`] backed by flat class and type-parameter tables.
///
/// Class ids are interned by binary name, so a class can be referenced (for example from another
/// class's `extends` clause) before it is defined.
#[derive(Clone, Debug)]
pub struct TypeStore {
    classes: Vec<Option<ClassDef>>,
    by_name: HashMap<String, ClassId>,
    type_params: Vec<TypeParamDef>,
    well_known: WellKnownTypes,
}

impl Default for TypeStore {
    /// A store holding only `java.lang.Object`, `String`, `Number`, the primitive wrappers,
    /// `Cloneable` and `java.io.Serializable`.
    fn default() -> Self {
        let placeholder = ClassId::from_raw(0);
        let mut store = TypeStore {
            classes: Vec::new(),
            by_name: HashMap::new(),
            type_params: Vec::new(),
            well_known: WellKnownTypes {
                object: placeholder,
                string: placeholder,
                integer: placeholder,
                cloneable: placeholder,
                serializable: placeholder,
                boxes: [placeholder; 8],
            },
        };

        let object = store.intern_class_id("java.lang.Object");
        let string = store.intern_class_id("java.lang.String");
        let cloneable = store.intern_class_id("java.lang.Cloneable");
        let serializable = store.intern_class_id("java.io.Serializable");
        let number = store.intern_class_id("java.lang.Number");
        let boxes = PrimitiveType::ALL.map(|p| store.intern_class_id(p.box_class_name()));
        store.well_known = WellKnownTypes {
            object,
            string,
            integer: boxes[PrimitiveType::Int as usize],
            cloneable,
            serializable,
            boxes,
        };

        let object_ty = Type::class(object, vec![]);
        let serializable_ty = Type::class(serializable, vec![]);
        let core = |name: &str, kind, is_final, super_class: Option<Type>, interfaces| ClassDef {
            name: name.to_string(),
            kind,
            is_final,
            type_params: vec![],
            super_class,
            interfaces,
        };

        store.define_class(object, core("java.lang.Object", ClassKind::Class, false, None, vec![]));
        store.define_class(
            cloneable,
            core("java.lang.Cloneable", ClassKind::Interface, false, None, vec![]),
        );
        store.define_class(
            serializable,
            core("java.io.Serializable", ClassKind::Interface, false, None, vec![]),
        );
        store.define_class(
            string,
            core(
                "java.lang.String",
                ClassKind::Class,
                true,
                Some(object_ty.clone()),
                vec![serializable_ty.clone()],
            ),
        );
        store.define_class(
            number,
            core(
                "java.lang.Number",
                ClassKind::Class,
                false,
                Some(object_ty.clone()),
                vec![serializable_ty.clone()],
            ),
        );
        for (primitive, id) in PrimitiveType::ALL.into_iter().zip(boxes) {
            let super_class = match primitive {
                PrimitiveType::Boolean | PrimitiveType::Char => object_ty.clone(),
                _ => Type::class(number, vec![]),
            };
            store.define_class(
                id,
                core(
                    primitive.box_class_name(),
                    ClassKind::Class,
                    true,
                    Some(super_class),
                    vec![serializable_ty.clone()],
                ),
            );
        }

        store
    }
}

/// `(kind, name, final, type params, extends, implements)`
type JdkDecl = (
    ClassKind,
    &'static str,
    bool,
    &'static [&'static str],
    &'static [&'static str],
    &'static [&'static str],
);

const MINIMAL_JDK: &[JdkDecl] = &[
    (ClassKind::Interface, "java.lang.Comparable", false, &["T"], &[], &[]),
    (ClassKind::Interface, "java.lang.CharSequence", false, &[], &[], &[]),
    (ClassKind::Interface, "java.lang.Iterable", false, &["T"], &[], &[]),
    (ClassKind::Interface, "java.lang.Runnable", false, &[], &[], &[]),
    (
        ClassKind::Class,
        "java.lang.String",
        true,
        &[],
        &[],
        &[
            "java.io.Serializable",
            "java.lang.Comparable<java.lang.String>",
            "java.lang.CharSequence",
        ],
    ),
    (
        ClassKind::Class,
        "java.lang.StringBuilder",
        true,
        &[],
        &[],
        &["java.io.Serializable", "java.lang.CharSequence"],
    ),
    (
        ClassKind::Class,
        "java.lang.Enum",
        false,
        &["E extends java.lang.Enum<E>"],
        &[],
        &["java.lang.Comparable<E>", "java.io.Serializable"],
    ),
    (ClassKind::Class, "java.lang.Record", false, &[], &[], &[]),
    (ClassKind::Interface, "java.lang.annotation.Annotation", false, &[], &[], &[]),
    (
        ClassKind::Interface,
        "java.util.Collection",
        false,
        &["E"],
        &["java.lang.Iterable<E>"],
        &[],
    ),
    (
        ClassKind::Interface,
        "java.util.List",
        false,
        &["E"],
        &["java.util.Collection<E>"],
        &[],
    ),
    (
        ClassKind::Interface,
        "java.util.Set",
        false,
        &["E"],
        &["java.util.Collection<E>"],
        &[],
    ),
    (
        ClassKind::Interface,
        "java.util.Queue",
        false,
        &["E"],
        &["java.util.Collection<E>"],
        &[],
    ),
    (
        ClassKind::Interface,
        "java.util.Deque",
        false,
        &["E"],
        &["java.util.Queue<E>"],
        &[],
    ),
    (ClassKind::Interface, "java.util.Map", false, &["K", "V"], &[], &[]),
    (ClassKind::Interface, "java.util.RandomAccess", false, &[], &[], &[]),
    (
        ClassKind::Class,
        "java.util.AbstractCollection",
        false,
        &["E"],
        &[],
        &["java.util.Collection<E>"],
    ),
    (
        ClassKind::Class,
        "java.util.AbstractList",
        false,
        &["E"],
        &["java.util.AbstractCollection<E>"],
        &["java.util.List<E>"],
    ),
    (
        ClassKind::Class,
        "java.util.AbstractSet",
        false,
        &["E"],
        &["java.util.AbstractCollection<E>"],
        &["java.util.Set<E>"],
    ),
    (
        ClassKind::Class,
        "java.util.ArrayList",
        false,
        &["E"],
        &["java.util.AbstractList<E>"],
        &[
            "java.util.List<E>",
            "java.util.RandomAccess",
            "java.lang.Cloneable",
            "java.io.Serializable",
        ],
    ),
    (
        ClassKind::Class,
        "java.util.LinkedList",
        false,
        &["E"],
        &["java.util.AbstractList<E>"],
        &[
            "java.util.List<E>",
            "java.util.Deque<E>",
            "java.lang.Cloneable",
            "java.io.Serializable",
        ],
    ),
    (
        ClassKind::Class,
        "java.util.ArrayDeque",
        false,
        &["E"],
        &["java.util.AbstractCollection<E>"],
        &["java.util.Deque<E>", "java.lang.Cloneable", "java.io.Serializable"],
    ),
    (
        ClassKind::Class,
        "java.util.HashSet",
        false,
        &["E"],
        &["java.util.AbstractSet<E>"],
        &["java.util.Set<E>", "java.lang.Cloneable", "java.io.Serializable"],
    ),
    (
        ClassKind::Class,
        "java.util.Vector",
        false,
        &["E"],
        &["java.util.AbstractList<E>"],
        &[
            "java.util.List<E>",
            "java.util.RandomAccess",
            "java.lang.Cloneable",
            "java.io.Serializable",
        ],
    ),
    (
        ClassKind::Class,
        "java.util.Stack",
        false,
        &["E"],
        &["java.util.Vector<E>"],
        &[],
    ),
    (
        ClassKind::Class,
        "java.util.AbstractMap",
        false,
        &["K", "V"],
        &[],
        &["java.util.Map<K, V>"],
    ),
    (
        ClassKind::Class,
        "java.util.HashMap",
        false,
        &["K", "V"],
        &["java.util.AbstractMap<K, V>"],
        &["java.util.Map<K, V>", "java.lang.Cloneable", "java.io.Serializable"],
    ),
    (ClassKind::Class, "java.util.Dictionary", false, &["K", "V"], &[], &[]),
    (
        ClassKind::Class,
        "java.util.Hashtable",
        false,
        &["K", "V"],
        &["java.util.Dictionary<K, V>"],
        &["java.util.Map<K, V>", "java.lang.Cloneable", "java.io.Serializable"],
    ),
    (
        ClassKind::Class,
        "java.util.Properties",
        false,
        &[],
        &["java.util.Hashtable<java.lang.Object, java.lang.Object>"],
        &[],
    ),
    (
        ClassKind::Interface,
        "java.util.function.Function",
        false,
        &["T", "R"],
        &[],
        &[],
    ),
];

impl TypeStore {
    /// A store seeded with the `java.lang` / `java.util` types the built-in catalogs refer to.
    pub fn with_minimal_jdk() -> Self {
        let mut store = TypeStore::default();
        let decls: Vec<ClassDecl> = MINIMAL_JDK
            .iter()
            .map(|(kind, name, is_final, params, extends, implements)| ClassDecl {
                name: name.to_string(),
                kind: *kind,
                is_final: *is_final,
                type_params: params.iter().map(|p| p.to_string()).collect(),
                extends: extends.iter().map(|s| s.to_string()).collect(),
                implements: implements.iter().map(|s| s.to_string()).collect(),
            })
            .collect();
        store
            .declare(&decls)
            .expect("bundled minimal JDK declarations should be well-formed");
        store
    }

    /// Return the id for `name`, allocating an undefined placeholder if needed.
    pub fn intern_class_id(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let raw: u32 = self
            .classes
            .len()
            .try_into()
            .expect("too many classes in TypeStore");
        let id = ClassId::from_raw(raw);
        self.classes.push(None);
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Define (or redefine) the class behind an interned id.
    pub fn define_class(&mut self, id: ClassId, def: ClassDef) {
        let idx = id.to_raw() as usize;
        if idx >= self.classes.len() {
            return;
        }
        self.classes[idx] = Some(def);
    }

    /// Define a class under its binary name, replacing any previous definition.
    pub fn upsert_class(&mut self, def: ClassDef) -> ClassId {
        let id = self.intern_class_id(&def.name);
        self.define_class(id, def);
        id
    }

    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        self.upsert_class(def)
    }

    pub fn class_mut(&mut self, id: ClassId) -> Option<&mut ClassDef> {
        self.classes.get_mut(id.to_raw() as usize)?.as_mut()
    }

    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.lookup_class(name)
    }

    /// Ids of every defined class, in allocation order.
    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.classes
            .iter()
            .enumerate()
            .filter(|(_, def)| def.is_some())
            .map(|(idx, _)| ClassId::from_raw(idx as u32))
    }

    pub fn add_type_param(&mut self, name: impl Into<String>, upper_bounds: Vec<Type>) -> TypeVarId {
        let raw: u32 = self
            .type_params
            .len()
            .try_into()
            .expect("too many type params in TypeStore");
        self.type_params.push(TypeParamDef {
            name: name.into(),
            upper_bounds,
            lower_bound: None,
        });
        TypeVarId::from_raw(raw)
    }

    pub fn define_type_param(&mut self, id: TypeVarId, def: TypeParamDef) {
        if let Some(slot) = self.type_params.get_mut(id.to_raw() as usize) {
            *slot = def;
        }
    }

    /// Load declarative class definitions (see [`ClassDecl`]) into the store.
    ///
    /// All names in `decls` are interned before any signature is resolved, so declarations may
    /// refer to each other in any order. On error the store keeps the ids interned so far.
    pub fn declare(&mut self, decls: &[ClassDecl]) -> Result<Vec<ClassId>, DeclarationError> {
        crate::java::decl::declare(self, decls)
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.to_raw() as usize)?.as_ref()
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        self.type_params.get(id.to_raw() as usize)
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        if let Some(id) = self.by_name.get(name) {
            return Some(*id);
        }
        // Implicit `java.lang.*` import for simple names.
        if !name.contains('.') {
            return self.by_name.get(&format!("java.lang.{name}")).copied();
        }
        None
    }

    fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }
}
