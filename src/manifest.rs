//! JSON program manifests.
//!
//! A manifest describes one compilation unit: its declared types, an optional
//! explicit round, and optional generation targets. Referenced names that are
//! never declared (`java.lang.Object`, the selection markers, ...) become
//! external types.
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{Result, SilverError};
use crate::model::{self, TypeKind, TypeRef};
use crate::program::{Program, ProgramBuilder};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub types: Vec<TypeEntry>,
    /// Root types of this round; defaults to every declared top-level type.
    #[serde(default)]
    pub round: Option<Vec<String>>,
    #[serde(default)]
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TypeEntry {
    pub name: String,
    pub kind: KindEntry,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub enclosing: Option<String>,
    #[serde(default)]
    pub annotations: Vec<AnnotationEntry>,
    #[serde(default)]
    pub methods: Vec<MethodEntry>,
    #[serde(default)]
    pub fields: Vec<FieldEntry>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KindEntry {
    Class,
    Interface,
    Annotation,
    Enum,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AnnotationEntry {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MethodEntry {
    pub name: String,
    #[serde(default = "void")]
    pub returns: String,
    #[serde(default)]
    pub annotations: Vec<AnnotationEntry>,
    #[serde(default)]
    pub params: Vec<VarEntry>,
}

/// A parameter or a field.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct VarEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub annotations: Vec<AnnotationEntry>,
}

pub type FieldEntry = VarEntry;

fn void() -> String { "void".to_string() }

// ————————————————————————————————————————————————————————————————————————————
// LOADING
// ————————————————————————————————————————————————————————————————————————————

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, String> {
    let de = &mut serde_json::Deserializer::from_str(src);
    match serde_path_to_error::deserialize::<_, T>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(format!("at JSON path {path} → {}", err.into_inner()))
        }
    }
}

/// Same, for an already-parsed document (e.g. a `--json-pointer` selection).
pub fn from_value_with_path<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, String> {
    match serde_path_to_error::deserialize::<_, T>(value) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(format!("at JSON path {path} → {}", err.into_inner()))
        }
    }
}

impl Manifest {
    pub fn parse(src: &str, origin: &str) -> Result<Self> {
        from_str_with_path(src).map_err(|message| SilverError::Manifest { path: origin.to_string(), message })
    }

    pub fn from_value(value: serde_json::Value, origin: &str) -> Result<Self> {
        from_value_with_path(value).map_err(|message| SilverError::Manifest { path: origin.to_string(), message })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let src = std::fs::read_to_string(path)?;
        Self::parse(&src, &path.to_string_lossy())
    }

    /// Builds the program; declarations first so forward references resolve.
    pub fn to_program(&self) -> Result<Program> {
        let mut b = ProgramBuilder::new();
        let declared = self
            .types
            .iter()
            .map(|entry| b.declare(&entry.name, entry.kind.into()))
            .collect::<Result<Vec<_>>>()?;

        for (entry, &ty) in self.types.iter().zip(&declared) {
            if let Some(outer) = &entry.enclosing {
                let outer = resolve_declared(&b, outer)?;
                b.enclose(ty, outer);
            }
            for base in entry.extends.iter().chain(&entry.implements) {
                let base = b.type_ref(base);
                b.extends(ty, base);
            }
            for annotation in &entry.annotations {
                let annotation = annotation.to_model(&mut b);
                b.annotate(ty, annotation);
            }
            for method in &entry.methods {
                let method = method.to_model(&mut b);
                b.method(ty, method);
            }
            for field in &entry.fields {
                let field = model::Field {
                    name: field.name.clone(),
                    ty: field.ty.clone(),
                    annotations: annotations(&mut b, &field.annotations),
                };
                b.field(ty, field);
            }
        }

        if let Some(round) = &self.round {
            let roots = round.iter().map(|name| resolve_declared(&b, name)).collect::<Result<Vec<_>>>()?;
            b.round(roots);
        }
        Ok(b.build())
    }
}

fn resolve_declared(b: &ProgramBuilder, name: &str) -> Result<TypeRef> {
    b.lookup_declared(name).ok_or_else(|| SilverError::UnknownType { name: name.to_string() })
}

fn annotations(b: &mut ProgramBuilder, entries: &[AnnotationEntry]) -> Vec<model::Annotation> {
    entries.iter().map(|a| a.to_model(b)).collect()
}

impl AnnotationEntry {
    fn to_model(&self, b: &mut ProgramBuilder) -> model::Annotation {
        model::Annotation {
            ty: b.type_ref(&self.ty),
            value: self.value.as_deref().map(|v| b.type_ref(v)),
        }
    }
}

impl MethodEntry {
    fn to_model(&self, b: &mut ProgramBuilder) -> model::Method {
        model::Method {
            name: self.name.clone(),
            return_type: self.returns.clone(),
            annotations: annotations(b, &self.annotations),
            params: self
                .params
                .iter()
                .map(|p| model::Param {
                    name: p.name.clone(),
                    ty: p.ty.clone(),
                    annotations: annotations(b, &p.annotations),
                })
                .collect(),
        }
    }
}

impl From<KindEntry> for TypeKind {
    fn from(kind: KindEntry) -> Self {
        match kind {
            KindEntry::Class => TypeKind::Class,
            KindEntry::Interface => TypeKind::Interface,
            KindEntry::Annotation => TypeKind::Annotation,
            KindEntry::Enum => TypeKind::Enum,
        }
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::SelectionCriterion;
    use crate::model::ProgramModel;
    use crate::reach::reachable_annotations;
    use serde_json::json;

    fn manifest(value: serde_json::Value) -> Manifest {
        Manifest::from_value(value, "test").unwrap()
    }

    #[test]
    fn builds_members_and_forward_references() {
        let m = manifest(json!({
            "types": [
                { "name": "m.Leaf", "kind": "class", "extends": "m.Base",
                  "methods": [{ "name": "run", "params": [
                      { "name": "x", "type": "int", "annotations": [{ "type": "m.Tag" }] }
                  ]}]},
                { "name": "m.Base", "kind": "class", "extends": "java.lang.Object" },
                { "name": "m.Tag", "kind": "annotation" }
            ]
        }));
        let program = m.to_program().unwrap();
        let leaf = program.lookup("m.Leaf").unwrap();
        let base = program.lookup("m.Base").unwrap();
        let tag = program.lookup("m.Tag").unwrap();
        let object = program.lookup("java.lang.Object").unwrap();

        assert!(program.inherits_from(leaf, object));
        assert!(program.inherits_from(leaf, base));
        assert!(reachable_annotations(&program, leaf).contains(&tag));
        assert_eq!(program.methods(leaf)[0].return_type, "void");
        assert_eq!(program.roots(), vec![leaf, base, tag]);
        assert!(!program.declares("java.lang.Object"));
    }

    #[test]
    fn marker_values_become_criteria() {
        let m = manifest(json!({
            "types": [
                { "name": "m.Registry", "kind": "interface",
                  "annotations": [{ "type": "org.silver.Silver" }], "methods": [{
                    "name": "all", "returns": "java.util.Set<java.lang.Class<?>>",
                    "annotations": [
                        { "type": "org.silver.AnnotatedBy", "value": "m.Tag" },
                        { "type": "org.silver.Inherits", "value": "m.Base" }
                    ]
                }]},
                { "name": "m.Tag", "kind": "annotation" }
            ],
            "targets": ["m.Registry"]
        }));
        let program = m.to_program().unwrap();
        let iface = program.interface(program.lookup("m.Registry").unwrap()).unwrap();
        let tag = program.lookup("m.Tag").unwrap();
        let base = program.lookup("m.Base").unwrap();
        assert_eq!(
            iface.methods[0].criteria,
            vec![SelectionCriterion::AnnotatedBy(tag), SelectionCriterion::InheritsFrom(base)]
        );
        assert_eq!(m.targets, vec!["m.Registry".to_string()]);
        assert_eq!(program.marked_interfaces(), vec![iface.ty]);
    }

    #[test]
    fn nested_types_leave_the_round() {
        let m = manifest(json!({
            "types": [
                { "name": "n.Outer", "kind": "class" },
                { "name": "n.Outer.Inner", "kind": "class", "enclosing": "n.Outer" }
            ]
        }));
        let program = m.to_program().unwrap();
        assert_eq!(program.roots(), vec![program.lookup("n.Outer").unwrap()]);
    }

    #[test]
    fn explicit_round_must_name_declared_types() {
        let m = manifest(json!({
            "types": [{ "name": "r.A", "kind": "class" }],
            "round": ["r.Missing"]
        }));
        let err = m.to_program().unwrap_err();
        assert!(matches!(err, SilverError::UnknownType { name } if name == "r.Missing"));
    }

    #[test]
    fn duplicate_declarations_fail() {
        let m = manifest(json!({
            "types": [{ "name": "d.A", "kind": "class" }, { "name": "d.A", "kind": "enum" }]
        }));
        assert!(matches!(m.to_program(), Err(SilverError::DuplicateDeclaration { .. })));
    }

    #[test]
    fn parse_errors_carry_json_path() {
        let src = r#"{ "types": [ { "name": "x.A", "kind": "struct" } ] }"#;
        let err = Manifest::parse(src, "unit.json").unwrap_err();
        match err {
            SilverError::Manifest { path, message } => {
                assert_eq!(path, "unit.json");
                assert!(message.contains("types[0].kind"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Manifest::from_value(json!({ "types": [], "extra": 1 }), "v").unwrap_err();
        assert!(matches!(err, SilverError::Manifest { .. }));
    }
}
