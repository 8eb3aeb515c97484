//! Query-capability contract for authentication lookups

use std::fmt;

/// Filter set a user query resolves to.
///
/// The ORM runtime turns this into SQL; the bridge only carries it between
/// the configured query object and the user provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    pub table: String,
    pub conditions: Vec<(String, String)>,
}

impl Criteria {
    pub fn for_table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            conditions: Vec::new(),
        }
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table)?;
        for (column, value) in &self.conditions {
            write!(f, " [{column} = {value}]")?;
        }
        Ok(())
    }
}

/// Minimal operation set a type must expose to stand in for an
/// authentication query object.
pub trait UserQuery: Send + Sync {
    /// Add an equality filter on a column.
    fn filter(&mut self, column: &str, value: &str);

    /// Resolve the accumulated filters into criteria.
    fn build(&self) -> Criteria;

    /// Drop any accumulated filter state.
    fn clear(&mut self);

    fn boxed_clone(&self) -> Box<dyn UserQuery>;
}

impl Clone for Box<dyn UserQuery> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

/// Model capability the auth installer falls back to when no query is
/// configured directly: derive a query from the model's primary-key criteria.
pub trait AuthModel: Send + Sync {
    /// Table the model maps to.
    fn table(&self) -> &str;

    /// Build a query pre-filtered to the model's primary key, or `None` for
    /// models without one.
    fn build_pk_criteria(&self) -> Option<Box<dyn UserQuery>>;
}

/// Plain criteria-backed query, the default shape generated model queries
/// take.
#[derive(Debug, Clone, Default)]
pub struct CriteriaQuery {
    criteria: Criteria,
}

impl CriteriaQuery {
    pub fn for_table(table: impl Into<String>) -> Self {
        Self {
            criteria: Criteria::for_table(table),
        }
    }
}

impl UserQuery for CriteriaQuery {
    fn filter(&mut self, column: &str, value: &str) {
        self.criteria
            .conditions
            .push((column.to_string(), value.to_string()));
    }

    fn build(&self) -> Criteria {
        self.criteria.clone()
    }

    fn clear(&mut self) {
        self.criteria.conditions.clear();
    }

    fn boxed_clone(&self) -> Box<dyn UserQuery> {
        Box::new(self.clone())
    }
}
