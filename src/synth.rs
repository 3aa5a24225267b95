//! Implementation synthesis for one target interface.
//!
//! One pass: for every interface method compile its criteria, scan the round's
//! candidates, and pair the method with its match set ([`GeneratedMember`]).
//! The members are lowered to a [`GeneratedType`] and handed to an
//! [`EmitBackend`]. A pass is read-only over the model, so passes for distinct
//! interfaces may run concurrently; only emission needs exclusive access.
use tracing::{debug, debug_span, info};

use crate::codegen::EmitBackend;
use crate::criteria::CriteriaSet;
use crate::error::{Result, SilverError};
use crate::ir::GeneratedType;
use crate::model::{InterfaceDescriptor, ProgramModel, TypeRef};
use crate::predicate;
use crate::scan::{scan, MatchResult};

pub const DEFAULT_SUFFIX: &str = "$$Impl";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthOptions {
    /// Appended to the interface's binary simple name.
    pub suffix: String,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self { suffix: DEFAULT_SUFFIX.to_string() }
    }
}

/// A target method paired with the types it selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMember {
    pub name: String,
    pub return_type: String,
    pub criteria: CriteriaSet,
    pub matches: MatchResult,
}

pub struct Synthesizer<'m, M: ?Sized> {
    model: &'m M,
    candidates: &'m [TypeRef],
    options: &'m SynthOptions,
}

impl<'m, M: ProgramModel + ?Sized> Synthesizer<'m, M> {
    pub fn new(model: &'m M, candidates: &'m [TypeRef], options: &'m SynthOptions) -> Self {
        Self { model, candidates, options }
    }

    pub fn implementation_name(&self, iface: &InterfaceDescriptor) -> String {
        format!("{}{}", iface.binary_simple_name, self.options.suffix)
    }

    /// Package-qualified implementation name.
    pub fn generated_name(&self, iface: &InterfaceDescriptor) -> String {
        qualify(&iface.package, &self.implementation_name(iface))
    }

    pub fn members(&self, iface: &InterfaceDescriptor) -> Vec<GeneratedMember> {
        iface
            .methods
            .iter()
            .map(|method| {
                let compiled = predicate::compile(self.model, &method.criteria);
                let matches = scan(self.candidates, compiled.as_fn());
                debug!(
                    method = %method.name,
                    criteria = method.criteria.len(),
                    matched = matches.len(),
                    "scanned candidates"
                );
                GeneratedMember {
                    name: method.name.clone(),
                    return_type: method.return_type.clone(),
                    criteria: method.criteria.clone(),
                    matches,
                }
            })
            .collect()
    }

    /// Builds the generated type without emitting it.
    ///
    /// Fails if the program already declares a type with the derived name.
    pub fn describe(&self, iface: &InterfaceDescriptor) -> Result<GeneratedType> {
        let _span = debug_span!("pass", interface = %iface.qualified_name).entered();
        let simple_name = self.implementation_name(iface);
        let qualified = self.generated_name(iface);
        if self.model.declares(&qualified) {
            return Err(SilverError::DuplicateGeneratedType { name: qualified });
        }
        let members = self.members(iface);
        Ok(crate::lower::lower_to_ir(self.model, iface, simple_name, &members))
    }

    pub fn synthesize<B: EmitBackend + ?Sized>(
        &self,
        iface: &InterfaceDescriptor,
        backend: &mut B,
    ) -> Result<GeneratedType> {
        let generated = self.describe(iface)?;
        emit(&generated, backend)?;
        Ok(generated)
    }
}

/// Hands a described type to the backend; a name clash aborts the pass.
pub fn emit<B: EmitBackend + ?Sized>(generated: &GeneratedType, backend: &mut B) -> Result<()> {
    backend.define(generated)?;
    info!(generated = %generated.qualified_name(), accessors = generated.accessors.len(), "generated type");
    Ok(())
}

fn qualify(package: &str, simple_name: &str) -> String {
    if package.is_empty() {
        simple_name.to_string()
    } else {
        format!("{package}.{simple_name}")
    }
}
