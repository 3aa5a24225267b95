use crate::model::TypeRef;

/// Marks an interface as a generation target for the CLI driver.
pub const SILVER_MARKER: &str = "org.silver.Silver";
/// `@AnnotatedBy(X.class)` on a target method.
pub const ANNOTATED_BY_MARKER: &str = "org.silver.AnnotatedBy";
/// `@Inherits(Y.class)` on a target method.
pub const INHERITS_MARKER: &str = "org.silver.Inherits";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionCriterion {
    /// Matches types whose reachable annotation set contains the annotation type.
    AnnotatedBy(TypeRef),
    /// Matches strict subtypes of the base type.
    InheritsFrom(TypeRef),
}

/// Criteria declared on one target method, in declaration order.
pub type CriteriaSet = Vec<SelectionCriterion>;
