//! JSON view of a pass: what each accessor selects and why.
use serde::Serialize;

use crate::criteria::SelectionCriterion;
use crate::model::{InterfaceDescriptor, ProgramModel, TypeRef};
use crate::synth::GeneratedMember;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PassReport {
    pub interface: String,
    pub generated: String,
    pub methods: Vec<MethodReport>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MethodReport {
    pub name: String,
    pub criteria: Vec<CriterionReport>,
    pub matches: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CriterionReport {
    AnnotatedBy(String),
    InheritsFrom(String),
}

impl PassReport {
    pub fn new<M: ProgramModel + ?Sized>(
        model: &M,
        iface: &InterfaceDescriptor,
        generated: String,
        members: &[GeneratedMember],
    ) -> Self {
        let name = |ty: TypeRef| model.qualified_name(ty).to_string();
        let methods = members
            .iter()
            .map(|m| MethodReport {
                name: m.name.clone(),
                criteria: m
                    .criteria
                    .iter()
                    .map(|c| match *c {
                        SelectionCriterion::AnnotatedBy(ty) => CriterionReport::AnnotatedBy(name(ty)),
                        SelectionCriterion::InheritsFrom(ty) => CriterionReport::InheritsFrom(name(ty)),
                    })
                    .collect(),
                matches: m.matches.iter().map(name).collect(),
            })
            .collect();
        Self { interface: iface.qualified_name.clone(), generated, methods }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::INHERITS_MARKER;
    use crate::model::{Annotation, Method, TypeKind};
    use crate::program::ProgramBuilder;
    use crate::synth::{SynthOptions, Synthesizer};
    use serde_json::json;

    #[test]
    fn serializes_names_in_scan_order() {
        let mut b = ProgramBuilder::new();
        let inherits = b.type_ref(INHERITS_MARKER);
        let base = b.declare("r.Base", TypeKind::Class).unwrap();
        let one = b.declare("r.One", TypeKind::Class).unwrap();
        let two = b.declare("r.Two", TypeKind::Class).unwrap();
        let iface = b.declare("r.Reg", TypeKind::Interface).unwrap();
        b.extends(two, base)
            .extends(one, base)
            .method(iface, Method::new("subs", "java.util.Set").annotated(Annotation::with_value(inherits, base)));
        let program = b.build();

        let descriptor = program.interface(iface).unwrap();
        let roots = program.roots();
        let options = SynthOptions::default();
        let synth = Synthesizer::new(&program, &roots, &options);
        let members = synth.members(&descriptor);
        let report = PassReport::new(&program, &descriptor, synth.generated_name(&descriptor), &members);

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "interface": "r.Reg",
                "generated": "r.Reg$$Impl",
                "methods": [{
                    "name": "subs",
                    "criteria": [{ "inherits_from": "r.Base" }],
                    "matches": ["r.One", "r.Two"]
                }]
            })
        );
    }
}
