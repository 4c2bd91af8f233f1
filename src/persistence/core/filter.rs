use std::borrow::Cow;

// ============================================================================
// Filter Predicates - Store-agnostic query descriptions
// ============================================================================
//
// A filter is a conjunction of field = value constraints over a field-key
// type `K`. The empty filter matches everything. Stores translate filters
// into their own query language at the repository boundary.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint<K> {
    pub field: K,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter<K> {
    constraints: Vec<Constraint<K>>,
}

impl<K> Filter<K> {
    /// The empty predicate, matching every entity.
    pub fn all() -> Self {
        Self {
            constraints: Vec::new(),
        }
    }

    /// Add an equality constraint, preserving insertion order.
    pub fn where_eq(mut self, field: K, value: impl Into<String>) -> Self {
        self.constraints.push(Constraint {
            field,
            value: value.into(),
        });
        self
    }

    pub fn constraints(&self) -> &[Constraint<K>] {
        &self.constraints
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Evaluate the predicate against an in-process entity.
    pub fn matches<E>(&self, entity: &E) -> bool
    where
        E: Filterable<Field = K>,
    {
        self.constraints
            .iter()
            .all(|c| entity.field_value(&c.field) == c.value.as_str())
    }
}

impl<K> Default for Filter<K> {
    fn default() -> Self {
        Self::all()
    }
}

/// Entities whose fields can be read back for in-process filter evaluation.
pub trait Filterable {
    type Field;

    fn field_value(&self, field: &Self::Field) -> Cow<'_, str>;
}
