//! Code-emission backend seam and the Java source backend.
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use thiserror::Error;

use crate::error::SilverError;
use crate::ir::{CollectionKind, GeneratedType};

// ————————————————————————————————————————————————————————————————————————————
// BACKEND SEAM
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmitError {
    #[error("type `{0}` already exists")]
    TypeAlreadyExists(String),
}

impl From<EmitError> for SilverError {
    fn from(err: EmitError) -> Self {
        match err {
            EmitError::TypeAlreadyExists(name) => SilverError::DuplicateGeneratedType { name },
        }
    }
}

/// Accepts described types and turns them into compilable artifacts.
pub trait EmitBackend {
    fn define(&mut self, generated: &GeneratedType) -> Result<(), EmitError>;
}

// ————————————————————————————————————————————————————————————————————————————
// JAVA BACKEND
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaUnit {
    pub package: String,
    pub simple_name: String,
    pub source: String,
}

/// Java sources keyed by qualified name, in emission order.
#[derive(Debug, Default)]
pub struct JavaBackend {
    units: IndexMap<String, JavaUnit>,
}

impl EmitBackend for JavaBackend {
    fn define(&mut self, generated: &GeneratedType) -> Result<(), EmitError> {
        let name = generated.qualified_name();
        if self.units.contains_key(&name) {
            return Err(EmitError::TypeAlreadyExists(name));
        }
        let mut cg = Codegen::new();
        cg.emit(generated);
        self.units.insert(name, JavaUnit {
            package: generated.package.clone(),
            simple_name: generated.simple_name.clone(),
            source: cg.into_string(),
        });
        Ok(())
    }
}

impl JavaBackend {
    pub fn new() -> Self { Self::default() }
    pub fn len(&self) -> usize { self.units.len() }
    pub fn is_empty(&self) -> bool { self.units.is_empty() }

    pub fn source(&self, qualified_name: &str) -> Option<&str> {
        self.units.get(qualified_name).map(|u| u.source.as_str())
    }

    pub fn units(&self) -> impl Iterator<Item = (&str, &JavaUnit)> {
        self.units.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Writes every unit to `<dir>/<package path>/<Name>.java`.
    pub fn write_to(&self, dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.units.len());
        for unit in self.units.values() {
            let mut path = dir.to_path_buf();
            path.extend(unit.package.split('.').filter(|s| !s.is_empty()));
            std::fs::create_dir_all(&path)?;
            path.push(format!("{}.java", unit.simple_name));
            std::fs::write(&path, &unit.source)?;
            written.push(path);
        }
        Ok(written)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// RENDERING
// ————————————————————————————————————————————————————————————————————————————

const INDENT: &str = "    ";
const CLASS: &str = "java.lang.Class<?>";

pub struct Codegen {
    out: String,
}

impl Codegen {
    pub fn new() -> Self { Self { out: String::new() } }

    pub fn into_string(self) -> String { self.out }

    pub fn emit(&mut self, ty: &GeneratedType) {
        self.emit_type(ty).expect("writing to a String cannot fail");
    }

    fn emit_type(&mut self, ty: &GeneratedType) -> std::fmt::Result {
        let o = &mut self.out;
        writeln!(o, "// Generated by silver. Do not edit.")?;
        if !ty.package.is_empty() {
            writeln!(o, "package {};", ty.package)?;
        }
        writeln!(o)?;
        writeln!(o, "public class {} implements {} {{", ty.simple_name, ty.implements)?;

        for constant in &ty.constants {
            let classes = constant
                .classes
                .iter()
                .map(|c| format!("{}.class", c.name))
                .collect::<Vec<_>>()
                .join(", ");
            let init = format!("{}({})", constant.kind.builder_name(), classes);
            let init = if constant.concrete { format!("new {}({init})", constant.ty) } else { init };
            writeln!(o)?;
            writeln!(o, "{INDENT}private static final {} {} = {init};", constant.ty, constant.name)?;
        }

        for accessor in &ty.accessors {
            writeln!(o)?;
            writeln!(o, "{INDENT}@SuppressWarnings(\"unchecked\")")?;
            writeln!(o, "{INDENT}public {} {}() {{", accessor.return_type, accessor.name)?;
            writeln!(o, "{INDENT}{INDENT}return {};", accessor.constant)?;
            writeln!(o, "{INDENT}}}")?;
        }

        let kinds: BTreeSet<CollectionKind> = ty.constants.iter().map(|c| c.kind).collect();
        for kind in kinds {
            writeln!(o)?;
            emit_builder(o, kind)?;
        }

        writeln!(o, "}}")
    }
}

impl Default for Codegen {
    fn default() -> Self { Self::new() }
}

fn emit_builder(o: &mut String, kind: CollectionKind) -> std::fmt::Result {
    let name = kind.builder_name();
    match kind {
        CollectionKind::Set => {
            writeln!(o, "{INDENT}private static java.util.Set<{CLASS}> {name}({CLASS}... classes) {{")?;
            writeln!(o, "{INDENT}{INDENT}java.util.Set<{CLASS}> set = new java.util.LinkedHashSet<{CLASS}>();")?;
            writeln!(o, "{INDENT}{INDENT}java.util.Collections.addAll(set, classes);")?;
            writeln!(o, "{INDENT}{INDENT}return java.util.Collections.unmodifiableSet(set);")?;
        }
        CollectionKind::List => {
            writeln!(o, "{INDENT}private static java.util.List<{CLASS}> {name}({CLASS}... classes) {{")?;
            writeln!(o, "{INDENT}{INDENT}return java.util.Collections.unmodifiableList(java.util.Arrays.asList(classes));")?;
        }
    }
    writeln!(o, "{INDENT}}}")
}
