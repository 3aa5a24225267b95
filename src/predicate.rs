//! Criteria → predicate compilation.
//!
//! A [`CompiledPredicate`] is the conjunction of one clause per criterion,
//! evaluated left to right with short-circuit. An empty criteria set compiles
//! to a predicate that rejects every type: a method without selection markers
//! matches nothing.
use crate::criteria::{CriteriaSet, SelectionCriterion};
use crate::model::{ProgramModel, TypeRef};
use crate::reach::reachable_annotations;

pub struct CompiledPredicate<'m, M: ?Sized> {
    model: &'m M,
    clauses: Vec<SelectionCriterion>,
}

pub fn compile<'m, M: ProgramModel + ?Sized>(model: &'m M, criteria: &CriteriaSet) -> CompiledPredicate<'m, M> {
    CompiledPredicate { model, clauses: criteria.clone() }
}

impl<M: ProgramModel + ?Sized> CompiledPredicate<'_, M> {
    pub fn matches(&self, ty: TypeRef) -> bool {
        if self.clauses.is_empty() {
            return false;
        }
        self.clauses.iter().all(|clause| self.clause_matches(*clause, ty))
    }

    fn clause_matches(&self, clause: SelectionCriterion, ty: TypeRef) -> bool {
        match clause {
            SelectionCriterion::AnnotatedBy(annotation) => {
                reachable_annotations(self.model, ty).contains(&annotation)
            }
            // the relation is reflexive; the base itself never matches
            SelectionCriterion::InheritsFrom(base) => {
                ty != base && self.model.inherits_from(ty, base)
            }
        }
    }

    /// Borrow as a plain `TypeRef -> bool` function.
    pub fn as_fn(&self) -> impl Fn(TypeRef) -> bool + '_ {
        move |ty| self.matches(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Annotation, Field, Method, TypeKind};
    use crate::program::{Program, ProgramBuilder};

    struct Fixture {
        program: Program,
        widget: TypeRef,
        base: TypeRef,
        annotated_sub: TypeRef,
        plain_sub: TypeRef,
        annotated_only: TypeRef,
    }

    fn fixture() -> Fixture {
        let mut b = ProgramBuilder::new();
        let widget = b.declare("p.Widget", TypeKind::Annotation).unwrap();
        let base = b.declare("p.Base", TypeKind::Class).unwrap();
        let annotated_sub = b.declare("p.AnnotatedSub", TypeKind::Class).unwrap();
        let plain_sub = b.declare("p.PlainSub", TypeKind::Class).unwrap();
        let annotated_only = b.declare("p.AnnotatedOnly", TypeKind::Class).unwrap();
        b.extends(annotated_sub, base)
            .extends(plain_sub, base)
            .method(annotated_sub, Method::new("go", "void").annotated(Annotation::marker(widget)))
            .field(annotated_only, Field::new("w", "int").annotated(Annotation::marker(widget)))
            .annotate(base, Annotation::marker(widget));
        Fixture { program: b.build(), widget, base, annotated_sub, plain_sub, annotated_only }
    }

    #[test]
    fn empty_criteria_reject_everything() {
        let f = fixture();
        let predicate = compile(&f.program, &Vec::new());
        for ty in f.program.roots() {
            assert!(!predicate.matches(ty));
        }
    }

    #[test]
    fn inherits_from_excludes_the_base() {
        let f = fixture();
        let predicate = compile(&f.program, &vec![SelectionCriterion::InheritsFrom(f.base)]);
        assert!(!predicate.matches(f.base));
        assert!(predicate.matches(f.annotated_sub));
        assert!(predicate.matches(f.plain_sub));
        assert!(!predicate.matches(f.annotated_only));
    }

    #[test]
    fn annotated_by_uses_reachable_set() {
        let f = fixture();
        let predicate = compile(&f.program, &vec![SelectionCriterion::AnnotatedBy(f.widget)]);
        assert!(predicate.matches(f.base));
        assert!(predicate.matches(f.annotated_sub));
        assert!(predicate.matches(f.annotated_only));
        assert!(!predicate.matches(f.plain_sub));
    }

    #[test]
    fn conjunction_is_order_independent() {
        let f = fixture();
        let ab = compile(
            &f.program,
            &vec![SelectionCriterion::AnnotatedBy(f.widget), SelectionCriterion::InheritsFrom(f.base)],
        );
        let ba = compile(
            &f.program,
            &vec![SelectionCriterion::InheritsFrom(f.base), SelectionCriterion::AnnotatedBy(f.widget)],
        );
        for ty in f.program.roots() {
            assert_eq!(ab.matches(ty), ba.matches(ty));
        }
        let hits: Vec<_> = f.program.roots().into_iter().filter(|t| ab.matches(*t)).collect();
        assert_eq!(hits, vec![f.annotated_sub]);
    }
}
