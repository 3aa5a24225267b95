use indexmap::IndexSet;

use crate::model::TypeRef;

/// Matched types in discovery order, unique by identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult(IndexSet<TypeRef>);

impl MatchResult {
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn contains(&self, ty: TypeRef) -> bool { self.0.contains(&ty) }
    pub fn iter(&self) -> impl Iterator<Item = TypeRef> + '_ { self.0.iter().copied() }
    pub fn to_vec(&self) -> Vec<TypeRef> { self.iter().collect() }
}

/// Filters this round's root types through `predicate`, once each, in order.
///
/// Types outside `candidates` are never found, whatever the predicate says.
pub fn scan(candidates: &[TypeRef], predicate: impl Fn(TypeRef) -> bool) -> MatchResult {
    let mut matched = IndexSet::new();
    for &ty in candidates {
        if predicate(ty) {
            matched.insert(ty);
        }
    }
    MatchResult(matched)
}
