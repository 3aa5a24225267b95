//! In-memory program model.
//!
//! [`ProgramBuilder`] interns qualified names into [`TypeRef`]s and records
//! declarations; [`Program`] is the frozen, read-only result and the
//! [`ProgramModel`] the engine queries. A name that is only ever referenced
//! (e.g. `java.lang.Object`) stays [`TypeKind::External`]: it has a handle but
//! no members and is never part of a round.
use indexmap::IndexMap;

use crate::criteria::{self, CriteriaSet, SelectionCriterion};
use crate::error::{Result, SilverError};
use crate::model::{
    Annotation, Field, InterfaceDescriptor, Method, ProgramModel, TargetMethod, TypeKind, TypeRef,
};

#[derive(Debug, Clone)]
struct TypeDecl {
    name: String,
    kind: TypeKind,
    enclosing: Option<TypeRef>,
    supertypes: Vec<TypeRef>,
    annotations: Vec<Annotation>,
    methods: Vec<Method>,
    fields: Vec<Field>,
}

impl TypeDecl {
    fn external(name: String) -> Self {
        Self {
            name,
            kind: TypeKind::External,
            enclosing: None,
            supertypes: Vec::new(),
            annotations: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
        }
    }
}

// ------------------------------- Builder ---------------------------------- //

#[derive(Debug, Default)]
pub struct ProgramBuilder {
    decls: Vec<TypeDecl>,
    by_name: IndexMap<String, TypeRef>,
    round: Option<Vec<TypeRef>>,
}

impl ProgramBuilder {
    pub fn new() -> Self { Self::default() }

    /// Handle for `name`, creating an external placeholder on first sight.
    pub fn type_ref(&mut self, name: &str) -> TypeRef {
        if let Some(ty) = self.by_name.get(name) {
            return *ty;
        }
        let ty = TypeRef(self.decls.len() as u32);
        self.decls.push(TypeDecl::external(name.to_string()));
        self.by_name.insert(name.to_string(), ty);
        ty
    }

    pub fn declare(&mut self, name: &str, kind: TypeKind) -> Result<TypeRef> {
        let ty = self.type_ref(name);
        let decl = &mut self.decls[ty.index()];
        if decl.kind != TypeKind::External {
            return Err(SilverError::DuplicateDeclaration { name: name.to_string() });
        }
        decl.kind = kind;
        Ok(ty)
    }

    pub fn lookup_declared(&self, name: &str) -> Option<TypeRef> {
        let ty = *self.by_name.get(name)?;
        (self.decls[ty.index()].kind != TypeKind::External).then_some(ty)
    }

    /// Records an inheritance edge (`extends` and `implements` alike).
    pub fn extends(&mut self, ty: TypeRef, base: TypeRef) -> &mut Self {
        self.decls[ty.index()].supertypes.push(base);
        self
    }

    pub fn enclose(&mut self, ty: TypeRef, outer: TypeRef) -> &mut Self {
        self.decls[ty.index()].enclosing = Some(outer);
        self
    }

    pub fn annotate(&mut self, ty: TypeRef, annotation: Annotation) -> &mut Self {
        self.decls[ty.index()].annotations.push(annotation);
        self
    }

    pub fn method(&mut self, ty: TypeRef, method: Method) -> &mut Self {
        self.decls[ty.index()].methods.push(method);
        self
    }

    pub fn field(&mut self, ty: TypeRef, field: Field) -> &mut Self {
        self.decls[ty.index()].fields.push(field);
        self
    }

    /// Overrides the default round (all declared top-level types).
    pub fn round(&mut self, roots: Vec<TypeRef>) -> &mut Self {
        self.round = Some(roots);
        self
    }

    pub fn build(self) -> Program {
        Program { decls: self.decls, by_name: self.by_name, round: self.round }
    }
}

// ------------------------------- Program ---------------------------------- //

#[derive(Debug, Clone)]
pub struct Program {
    decls: Vec<TypeDecl>,
    by_name: IndexMap<String, TypeRef>,
    round: Option<Vec<TypeRef>>,
}

impl Program {
    fn decl(&self, ty: TypeRef) -> Option<&TypeDecl> {
        self.decls.get(ty.index())
    }

    pub fn kind(&self, ty: TypeRef) -> TypeKind {
        self.decl(ty).map(|d| d.kind).unwrap_or(TypeKind::External)
    }

    /// This round's root types, in declaration order.
    pub fn roots(&self) -> Vec<TypeRef> {
        if let Some(round) = &self.round {
            return round.clone();
        }
        self.decls
            .iter()
            .enumerate()
            .filter(|(_, d)| d.kind != TypeKind::External && d.enclosing.is_none())
            .map(|(i, _)| TypeRef(i as u32))
            .collect()
    }

    /// Declared interfaces carrying the `org.silver.Silver` marker, nested ones
    /// included, in declaration order.
    pub fn marked_interfaces(&self) -> Vec<TypeRef> {
        let Some(marker) = self.lookup(criteria::SILVER_MARKER) else {
            return Vec::new();
        };
        (0..self.decls.len())
            .map(|i| TypeRef(i as u32))
            .filter(|ty| self.kind(*ty) == TypeKind::Interface)
            .filter(|ty| self.annotations(*ty).iter().any(|a| a.ty == marker))
            .collect()
    }

    pub fn simple_name(&self, ty: TypeRef) -> &str {
        let name = self.qualified_name(ty);
        name.rsplit('.').next().unwrap_or(name)
    }

    fn outermost(&self, ty: TypeRef) -> TypeRef {
        let mut current = ty;
        let mut hops = 0;
        while let Some(outer) = self.decl(current).and_then(|d| d.enclosing) {
            current = outer;
            hops += 1;
            if hops > self.decls.len() { break } // enclosing cycle
        }
        current
    }

    pub fn package_of(&self, ty: TypeRef) -> &str {
        let top = self.qualified_name(self.outermost(ty));
        match top.rfind('.') {
            Some(i) => &top[..i],
            None => "",
        }
    }

    /// `Outer$Inner` for nested types, the simple name otherwise.
    pub fn binary_simple_name(&self, ty: TypeRef) -> String {
        let mut chain = vec![self.simple_name(ty)];
        let mut current = ty;
        while let Some(outer) = self.decl(current).and_then(|d| d.enclosing) {
            if chain.len() > self.decls.len() { break }
            chain.push(self.simple_name(outer));
            current = outer;
        }
        chain.reverse();
        chain.join("$")
    }

    /// Parses the selection markers on one interface method.
    pub fn criteria_of(&self, method: &Method) -> CriteriaSet {
        let annotated_by = self.lookup(criteria::ANNOTATED_BY_MARKER);
        let inherits = self.lookup(criteria::INHERITS_MARKER);
        method
            .annotations
            .iter()
            .filter_map(|a| {
                let value = a.value?;
                if Some(a.ty) == annotated_by {
                    Some(SelectionCriterion::AnnotatedBy(value))
                } else if Some(a.ty) == inherits {
                    Some(SelectionCriterion::InheritsFrom(value))
                } else {
                    None
                }
            })
            .collect()
    }
}

impl ProgramModel for Program {
    fn lookup(&self, qualified_name: &str) -> Option<TypeRef> {
        self.by_name.get(qualified_name).copied()
    }

    fn declares(&self, qualified_name: &str) -> bool {
        self.lookup(qualified_name).is_some_and(|ty| self.kind(ty) != TypeKind::External)
    }

    fn qualified_name(&self, ty: TypeRef) -> &str {
        self.decl(ty).map(|d| d.name.as_str()).unwrap_or("")
    }

    fn annotations(&self, ty: TypeRef) -> &[Annotation] {
        self.decl(ty).map(|d| d.annotations.as_slice()).unwrap_or(&[])
    }

    fn methods(&self, ty: TypeRef) -> &[Method] {
        self.decl(ty).map(|d| d.methods.as_slice()).unwrap_or(&[])
    }

    fn fields(&self, ty: TypeRef) -> &[Field] {
        self.decl(ty).map(|d| d.fields.as_slice()).unwrap_or(&[])
    }

    fn inherits_from(&self, ty: TypeRef, base: TypeRef) -> bool {
        let mut seen = vec![false; self.decls.len()];
        let mut stack = vec![ty];
        while let Some(current) = stack.pop() {
            if current == base {
                return true;
            }
            let Some(decl) = self.decl(current) else { continue };
            if std::mem::replace(&mut seen[current.index()], true) {
                continue;
            }
            stack.extend(decl.supertypes.iter().copied());
        }
        false
    }

    fn interface(&self, ty: TypeRef) -> Option<InterfaceDescriptor> {
        let decl = self.decl(ty)?;
        if decl.kind != TypeKind::Interface {
            return None;
        }
        let methods = decl
            .methods
            .iter()
            .map(|m| TargetMethod {
                name: m.name.clone(),
                return_type: m.return_type.clone(),
                criteria: self.criteria_of(m),
            })
            .collect();
        Some(InterfaceDescriptor {
            ty,
            qualified_name: decl.name.clone(),
            package: self.package_of(ty).to_string(),
            binary_simple_name: self.binary_simple_name(ty),
            methods,
        })
    }
}

// ------------------------------- Tests ------------------------------------ //
