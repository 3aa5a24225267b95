//! Reachable annotations of a type.
//!
//! Only what the type itself declares counts: its own annotations plus those
//! on its declared methods, their parameters, and its declared fields.
//! Members inherited from supertypes are not visited.
use indexmap::IndexSet;

use crate::model::{Annotation, ProgramModel, TypeRef};

pub fn reachable_annotations<M: ProgramModel + ?Sized>(model: &M, ty: TypeRef) -> IndexSet<TypeRef> {
    let mut out = IndexSet::new();
    let mut add = |annotations: &[Annotation]| out.extend(annotations.iter().map(|a| a.ty));

    for method in model.methods(ty) {
        add(&method.annotations);
        for param in &method.params {
            add(&param.annotations);
        }
    }
    for field in model.fields(ty) {
        add(&field.annotations);
    }
    add(model.annotations(ty));

    out
}
