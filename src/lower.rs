use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ir::{Accessor, ClassRef, CollectionKind, Constant, GeneratedType};
use crate::model::{InterfaceDescriptor, ProgramModel};
use crate::synth::GeneratedMember;

// leading type name, generics stripped: `java.util.List<Class<?>>` → `java.util.List`
static ERASURE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*([A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*)").unwrap());

// bare collection names not already qualified, with the preceding char in group 1
static BARE_COLLECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|[^\w$.])(Set|List|Collection|ArrayList|LinkedList|HashSet|LinkedHashSet|Iterable)\b").unwrap()
});

const LIST_TYPES: &[&str] = &["List", "ArrayList", "LinkedList"];
const CONCRETE_TYPES: &[&str] = &["ArrayList", "LinkedList", "HashSet", "LinkedHashSet"];

pub fn lower_to_ir<M: ProgramModel + ?Sized>(
    model: &M,
    iface: &InterfaceDescriptor,
    impl_name: String,
    members: &[GeneratedMember],
) -> GeneratedType {
    let mut namer = UniqueNamer::default();
    let mut constants = Vec::with_capacity(members.len());
    let mut accessors = Vec::with_capacity(members.len());

    for member in members {
        let return_type = qualify_collections(&member.return_type);
        let erased = erasure(&return_type);
        let simple = simple_name(erased);
        let kind = collection_kind(simple);
        let constant = namer.generate(&lower_first(simple));

        constants.push(Constant {
            name: constant.clone(),
            ty: erased.to_string(),
            concrete: CONCRETE_TYPES.contains(&simple),
            kind,
            classes: member
                .matches
                .iter()
                .map(|ty| ClassRef { ty, name: model.qualified_name(ty).to_string() })
                .collect(),
        });
        accessors.push(Accessor {
            name: member.name.clone(),
            return_type,
            constant,
        });
    }

    GeneratedType {
        package: iface.package.clone(),
        simple_name: impl_name,
        implements: iface.qualified_name.clone(),
        constants,
        accessors,
    }
}

/// `Set<Class<?>>` → `java.util.Set<Class<?>>`; generated units carry no imports.
fn qualify_collections(return_type: &str) -> String {
    BARE_COLLECTION
        .replace_all(return_type, |caps: &regex::Captures| {
            let package = if &caps[2] == "Iterable" { "java.lang" } else { "java.util" };
            format!("{}{package}.{}", &caps[1], &caps[2])
        })
        .into_owned()
}

fn erasure(return_type: &str) -> &str {
    ERASURE
        .captures(return_type)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or("java.util.Set")
}

fn simple_name(erased: &str) -> &str {
    erased.rsplit('.').next().unwrap_or(erased)
}

fn collection_kind(erasure: &str) -> CollectionKind {
    if LIST_TYPES.contains(&erasure) { CollectionKind::List } else { CollectionKind::Set }
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => "value".to_string(),
    }
}

/// `set0`, `set1`, `list0`, ... fresh per generated type.
#[derive(Debug, Default)]
struct UniqueNamer {
    counts: IndexMap<String, usize>,
}

impl UniqueNamer {
    fn generate(&mut self, base: &str) -> String {
        let n = self.counts.entry(base.to_string()).or_insert(0);
        let name = format!("{base}{n}");
        *n += 1;
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::SelectionCriterion;
    use crate::model::{TypeKind, TypeRef};
    use crate::program::ProgramBuilder;
    use crate::scan::scan;

    #[test]
    fn erasure_and_kind() {
        assert_eq!(erasure("java.util.Set<java.lang.Class<?>>"), "java.util.Set");
        assert_eq!(erasure("  List<Class<?>>"), "List");
        assert_eq!(simple_name(erasure("java.util.Collection")), "Collection");
        assert_eq!(simple_name("Outer$Inner"), "Outer$Inner");
        assert_eq!(collection_kind("List"), CollectionKind::List);
        assert_eq!(collection_kind("Collection"), CollectionKind::Set);
        assert_eq!(collection_kind("Iterable"), CollectionKind::Set);
    }

    #[test]
    fn bare_collection_names_are_qualified() {
        assert_eq!(qualify_collections("Set<Class<?>>"), "java.util.Set<Class<?>>");
        assert_eq!(qualify_collections("List<List<Class<?>>>"), "java.util.List<java.util.List<Class<?>>>");
        assert_eq!(qualify_collections("Iterable<Class<?>>"), "java.lang.Iterable<Class<?>>");
        assert_eq!(qualify_collections("java.util.Set<Class<?>>"), "java.util.Set<Class<?>>");
        assert_eq!(qualify_collections("com.ex.Set"), "com.ex.Set");
        assert_eq!(qualify_collections("Settings"), "Settings");
    }

    #[test]
    fn lowers_simple_name_return_types_to_qualified_java() {
        let mut b = ProgramBuilder::new();
        let a = b.declare("app.A", TypeKind::Class).unwrap();
        let iface = b.declare("app.Reg", TypeKind::Interface).unwrap();
        let program = b.build();
        let descriptor = program.interface(iface).unwrap();

        let members = vec![
            GeneratedMember {
                name: "all".into(),
                return_type: "Set<Class<?>>".into(),
                criteria: Vec::new(),
                matches: scan(&[a], |_| true),
            },
            GeneratedMember {
                name: "ordered".into(),
                return_type: "ArrayList<Class<?>>".into(),
                criteria: Vec::new(),
                matches: scan(&[a], |_| true),
            },
        ];
        let generated = lower_to_ir(&program, &descriptor, "Reg$$Impl".into(), &members);

        assert_eq!(generated.simple_name, "Reg$$Impl");
        assert_eq!(generated.constants[0].ty, "java.util.Set");
        assert_eq!(generated.accessors[0].return_type, "java.util.Set<Class<?>>");
        assert_eq!(generated.constants[1].ty, "java.util.ArrayList");
        assert!(generated.constants[1].concrete);
        assert!(!generated.constants[0].concrete);
        assert_eq!(generated.constants[1].kind, CollectionKind::List);
        assert_eq!(generated.accessors[1].return_type, "java.util.ArrayList<Class<?>>");

        let mut cg = crate::codegen::Codegen::new();
        cg.emit(&generated);
        let src = cg.into_string();
        assert!(src.contains("private static final java.util.Set set0 = buildSet(app.A.class);"));
        assert!(src.contains("public java.util.Set<Class<?>> all() {"));
        assert!(src.contains("private static final java.util.ArrayList list0 = new java.util.ArrayList(buildList(app.A.class));"));
        assert!(!src.contains(" Set "));
    }

    #[test]
    fn namer_counts_per_base() {
        let mut namer = UniqueNamer::default();
        assert_eq!(namer.generate("set"), "set0");
        assert_eq!(namer.generate("list"), "list0");
        assert_eq!(namer.generate("set"), "set1");
    }

    #[test]
    fn lowers_members_in_method_order() {
        let mut b = ProgramBuilder::new();
        let a = b.declare("q.A", TypeKind::Class).unwrap();
        let c = b.declare("q.C", TypeKind::Class).unwrap();
        let iface = b.declare("q.Reg", TypeKind::Interface).unwrap();
        let program = b.build();
        let descriptor = program.interface(iface).unwrap();

        let members = vec![
            GeneratedMember {
                name: "all".into(),
                return_type: "java.util.Set<java.lang.Class<?>>".into(),
                criteria: vec![SelectionCriterion::InheritsFrom(a)],
                matches: scan(&[c, a], |t: TypeRef| t != iface),
            },
            GeneratedMember {
                name: "ordered".into(),
                return_type: "java.util.List<java.lang.Class<?>>".into(),
                criteria: Vec::new(),
                matches: scan(&[a], |_| false),
            },
        ];
        let generated = lower_to_ir(&program, &descriptor, "Reg$$Impl".into(), &members);

        assert_eq!(generated.qualified_name(), "q.Reg$$Impl");
        assert_eq!(generated.implements, "q.Reg");
        let names: Vec<_> = generated.constants[0].classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["q.C", "q.A"]);
        assert_eq!(generated.constants[0].ty, "java.util.Set");
        assert_eq!(generated.constants[1].name, "list0");
        assert_eq!(generated.constants[1].kind, CollectionKind::List);
        assert!(generated.constants[1].classes.is_empty());
        assert_eq!(generated.accessors[0].constant, "set0");
        assert_eq!(generated.accessors[1].name, "ordered");
    }
}
