//! The declarative query tree and its in-memory interpreter.
//!
//! A [`Query`] is a backend-agnostic boolean expression over named
//! [`Field`]s. The same tree is evaluated in memory by [`Query::matches`]
//! and lowered to SQL by the storage adapter, so a rule written once has
//! identical meaning in both places.

use moments_types::Moment;

use crate::field::Field;

/// A boolean expression over indexed fields.
///
/// Comparisons against multi-valued fields (tags) hold when *any* value
/// satisfies them. Comparisons against an unset field never hold, except
/// [`Query::IsNull`] and [`Query::NotEqual`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Query {
    /// Matches every record.
    #[default]
    All,
    /// The field has at least one value.
    Exists(Field),
    /// The field has no value.
    IsNull(Field),
    Equal(Field, String),
    NotEqual(Field, String),
    /// String comparison; timestamps must be in canonical form.
    GreaterThanOrEqual(Field, String),
    LessThanOrEqual(Field, String),
    And(Vec<Query>),
    Or(Vec<Query>),
    Not(Box<Query>),
}

impl Query {
    pub fn equal(field: Field, value: impl Into<String>) -> Self {
        Self::Equal(field, value.into())
    }

    pub fn not_equal(field: Field, value: impl Into<String>) -> Self {
        Self::NotEqual(field, value.into())
    }

    pub fn greater_than_or_equal(field: Field, value: impl Into<String>) -> Self {
        Self::GreaterThanOrEqual(field, value.into())
    }

    pub fn less_than_or_equal(field: Field, value: impl Into<String>) -> Self {
        Self::LessThanOrEqual(field, value.into())
    }

    /// Conjunction of two queries. `All` operands are dropped and nested
    /// conjunctions are flattened.
    pub fn and(self, other: Query) -> Self {
        Self::all_of([self, other])
    }

    /// Disjunction of two queries, flattening nested disjunctions.
    pub fn or(self, other: Query) -> Self {
        let mut terms = Vec::new();
        for q in [self, other] {
            match q {
                Self::Or(inner) => terms.extend(inner),
                q => terms.push(q),
            }
        }
        Self::Or(terms)
    }

    /// Conjunction of any number of queries; an empty input is `All`.
    pub fn all_of(queries: impl IntoIterator<Item = Query>) -> Self {
        let mut terms = Vec::new();
        for q in queries {
            match q {
                Self::All => {}
                Self::And(inner) => terms.extend(inner),
                q => terms.push(q),
            }
        }
        match terms.len() {
            0 => Self::All,
            1 => terms.remove(0),
            _ => Self::And(terms),
        }
    }

    /// Negation.
    pub fn negate(self) -> Self {
        match self {
            Self::Not(inner) => *inner,
            q => Self::Not(Box::new(q)),
        }
    }

    /// Evaluates the query against a moment held in memory.
    pub fn matches(&self, moment: &Moment) -> bool {
        match self {
            Self::All => true,
            Self::Exists(field) => !field.values(moment).is_empty(),
            Self::IsNull(field) => field.values(moment).is_empty(),
            Self::Equal(field, value) => field.values(moment).iter().any(|v| v == value),
            Self::NotEqual(field, value) => !field.values(moment).iter().any(|v| v == value),
            Self::GreaterThanOrEqual(field, value) => {
                field.values(moment).iter().any(|v| v.as_str() >= value.as_str())
            }
            Self::LessThanOrEqual(field, value) => {
                field.values(moment).iter().any(|v| v.as_str() <= value.as_str())
            }
            Self::And(terms) => terms.iter().all(|q| q.matches(moment)),
            Self::Or(terms) => terms.iter().any(|q| q.matches(moment)),
            Self::Not(inner) => !inner.matches(moment),
        }
    }
}

/// Options handed to the storage collaborator alongside a sort or page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Combined label and field selector.
    pub query: Query,
}

impl ListOptions {
    pub fn new(query: Query) -> Self {
        Self { query }
    }

    /// Narrows the options with an additional conjunct.
    pub fn and_query(self, query: Query) -> Self {
        Self {
            query: self.query.and(query),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moments_types::{Metadata, MomentSpec};

    fn tagged(tags: &[&str]) -> Moment {
        Moment {
            metadata: Metadata {
                name: "m".to_string(),
                ..Default::default()
            },
            spec: MomentSpec {
                owner: "alice".to_string(),
                release_time: "2024-03-01T00:00:00.000Z".to_string(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                approved: true,
                ..Default::default()
            },
        }
    }

    #[test]
    fn and_drops_all_and_flattens() {
        let q = Query::All
            .and(Query::equal(Field::Owner, "alice"))
            .and(Query::equal(Field::Tags, "go"));
        assert_eq!(
            q,
            Query::And(vec![
                Query::equal(Field::Owner, "alice"),
                Query::equal(Field::Tags, "go"),
            ])
        );
        assert_eq!(Query::all_of([]), Query::All);
    }

    #[test]
    fn tags_match_by_membership() {
        let m = tagged(&["go", "rust"]);
        assert!(Query::equal(Field::Tags, "rust").matches(&m));
        assert!(!Query::equal(Field::Tags, "java").matches(&m));
        assert!(Query::not_equal(Field::Tags, "java").matches(&m));
        assert!(Query::Exists(Field::Tags).matches(&m));
        assert!(!Query::Exists(Field::Tags).matches(&tagged(&[])));
    }

    #[test]
    fn range_is_inclusive() {
        let m = tagged(&[]);
        assert!(Query::greater_than_or_equal(Field::ReleaseTime, "2024-03-01T00:00:00.000Z").matches(&m));
        assert!(Query::less_than_or_equal(Field::ReleaseTime, "2024-03-01T00:00:00.000Z").matches(&m));
        assert!(!Query::greater_than_or_equal(Field::ReleaseTime, "2024-03-01T00:00:00.001Z").matches(&m));
    }

    #[test]
    fn unset_field_comparisons() {
        let m = tagged(&[]);
        assert!(Query::IsNull(Field::DeletionTimestamp).matches(&m));
        assert!(!Query::equal(Field::Label("k".into()), "v").matches(&m));
        assert!(Query::not_equal(Field::Label("k".into()), "v").matches(&m));
        assert!(Query::equal(Field::Label("k".into()), "v").negate().matches(&m));
    }

    #[test]
    fn empty_disjunction_matches_nothing() {
        assert!(!Query::Or(vec![]).matches(&tagged(&[])));
        assert!(Query::And(vec![]).matches(&tagged(&[])));
    }
}
