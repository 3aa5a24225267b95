// Strongly-typed emission IR. No program-model lookups past this point.

use crate::model::TypeRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedType {
    pub package: String,         // "" for the default package
    pub simple_name: String,     // e.g. `Outer$Registry$$Impl`
    pub implements: String,      // source-form interface name
    pub constants: Vec<Constant>,
    pub accessors: Vec<Accessor>,
}

/// `private static final <ty> <name> = build<Kind>(A.class, ...);`
///
/// When `ty` is a concrete collection class the helper's result is copied:
/// `... = new <ty>(build<Kind>(A.class, ...));`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant {
    pub name: String,
    pub ty: String,              // erasure of the accessor's return type
    pub concrete: bool,
    pub kind: CollectionKind,
    pub classes: Vec<ClassRef>,  // discovery order
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRef {
    pub ty: TypeRef,
    pub name: String,            // source-form, usable as `<name>.class`
}

/// `public <return_type> <name>() { return <constant>; }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    pub name: String,
    pub return_type: String,
    pub constant: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectionKind {
    Set,
    List,
}

impl GeneratedType {
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.simple_name.clone()
        } else {
            format!("{}.{}", self.package, self.simple_name)
        }
    }
}

impl CollectionKind {
    /// Name of the private helper that materializes this kind.
    pub fn builder_name(self) -> &'static str {
        match self {
            Self::Set => "buildSet",
            Self::List => "buildList",
        }
    }
}
