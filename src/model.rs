//! Program-model capability seam.
//!
//! Everything the matching engine knows about the program being compiled goes
//! through [`ProgramModel`]: declared members, annotations, inheritance and the
//! target interfaces' method lists. Declarations are plain immutable values;
//! types are referred to by [`TypeRef`] handles.
use crate::criteria::CriteriaSet;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Opaque handle to a type known to the program model.
///
/// Two handles are equal iff they denote the same declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef(pub(crate) u32);

impl TypeRef {
    pub fn index(self) -> usize { self.0 as usize }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Referenced by name only; nothing is declared in this unit.
    External,
    Class,
    Interface,
    Annotation,
    Enum,
}

/// A declared annotation use. `value` is the class-literal argument, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub ty: TypeRef,
    pub value: Option<TypeRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: String,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub return_type: String,
    pub annotations: Vec<Annotation>,
    pub params: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: String,
    pub annotations: Vec<Annotation>,
}

/// A target interface as seen by the synthesizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDescriptor {
    pub ty: TypeRef,
    /// Source-form qualified name (`com.example.Outer.Inner`).
    pub qualified_name: String,
    pub package: String,
    /// Enclosing simple names joined with `$` (`Outer$Inner`).
    pub binary_simple_name: String,
    pub methods: Vec<TargetMethod>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetMethod {
    pub name: String,
    pub return_type: String,
    pub criteria: CriteriaSet,
}

// ————————————————————————————————————————————————————————————————————————————
// CAPABILITY
// ————————————————————————————————————————————————————————————————————————————

pub trait ProgramModel {
    /// Resolve a source-form qualified name.
    fn lookup(&self, qualified_name: &str) -> Option<TypeRef>;
    /// True if this unit declares (not merely references) the name.
    fn declares(&self, qualified_name: &str) -> bool {
        self.lookup(qualified_name).is_some()
    }
    fn qualified_name(&self, ty: TypeRef) -> &str;
    fn annotations(&self, ty: TypeRef) -> &[Annotation];
    fn methods(&self, ty: TypeRef) -> &[Method];
    fn fields(&self, ty: TypeRef) -> &[Field];
    /// Reflexive: every type inherits from itself.
    fn inherits_from(&self, ty: TypeRef, base: TypeRef) -> bool;
    /// `None` unless `ty` is a declared interface.
    fn interface(&self, ty: TypeRef) -> Option<InterfaceDescriptor>;
}

// ————————————————————————————————————————————————————————————————————————————
// CONSTRUCTION HELPERS
// ————————————————————————————————————————————————————————————————————————————

impl Annotation {
    pub fn marker(ty: TypeRef) -> Self { Self { ty, value: None } }
    pub fn with_value(ty: TypeRef, value: TypeRef) -> Self { Self { ty, value: Some(value) } }
}

impl Param {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self { name: name.into(), ty: ty.into(), annotations: Vec::new() }
    }
    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

impl Method {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            annotations: Vec::new(),
            params: Vec::new(),
        }
    }
    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }
}

impl Field {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self { name: name.into(), ty: ty.into(), annotations: Vec::new() }
    }
    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}
