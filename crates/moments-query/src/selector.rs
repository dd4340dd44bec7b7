//! Label and field selector parsing.
//!
//! Selectors arrive as repeatable query parameters, each holding one or
//! more comma-separated requirements. Every requirement becomes a conjunct.
//!
//! | Selector | Syntax | Query |
//! |----------|--------|-------|
//! | field | `spec.owner=alice`, `spec.owner==alice` | `Equal` |
//! | field | `spec.owner!=alice` | `NotEqual` |
//! | label | `key=value`, `key==value` | `Equal` on `metadata.labels.key` |
//! | label | `key!=value` | `NotEqual` |
//! | label | `key` | `Exists` |
//! | label | `!key` | `IsNull` |

use crate::error::QueryError;
use crate::field::Field;
use crate::query::Query;

enum Op {
    Equal,
    NotEqual,
}

/// Splits `lhs<op>rhs` into its parts, preferring `!=` and `==` over `=`.
fn split_requirement(term: &str) -> Option<(&str, Op, &str)> {
    if let Some((lhs, rhs)) = term.split_once("!=") {
        return Some((lhs.trim(), Op::NotEqual, rhs.trim()));
    }
    if let Some((lhs, rhs)) = term.split_once("==") {
        return Some((lhs.trim(), Op::Equal, rhs.trim()));
    }
    term.split_once('=')
        .map(|(lhs, rhs)| (lhs.trim(), Op::Equal, rhs.trim()))
}

fn terms<'a>(selectors: &'a [String]) -> impl Iterator<Item = &'a str> {
    selectors
        .iter()
        .flat_map(|s| s.split(','))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Parses field selector requirements into a conjunction.
///
/// # Errors
///
/// Returns [`QueryError::InvalidSelector`] for a requirement without an
/// operator and [`QueryError::UnknownField`] for an unindexed field.
pub fn parse_field_selector(selectors: &[String]) -> Result<Query, QueryError> {
    let mut queries = Vec::new();
    for term in terms(selectors) {
        let (lhs, op, rhs) =
            split_requirement(term).ok_or_else(|| QueryError::InvalidSelector(term.to_string()))?;
        let field: Field = lhs.parse()?;
        queries.push(match op {
            Op::Equal => Query::equal(field, rhs),
            Op::NotEqual => Query::not_equal(field, rhs),
        });
    }
    Ok(Query::all_of(queries))
}

/// Parses label selector requirements into a conjunction.
///
/// # Errors
///
/// Returns [`QueryError::InvalidSelector`] for a requirement with an empty
/// key.
pub fn parse_label_selector(selectors: &[String]) -> Result<Query, QueryError> {
    let mut queries = Vec::new();
    for term in terms(selectors) {
        let query = match split_requirement(term) {
            Some((key, op, value)) => {
                let field = label_field(key, term)?;
                match op {
                    Op::Equal => Query::equal(field, value),
                    Op::NotEqual => Query::not_equal(field, value),
                }
            }
            None => match term.strip_prefix('!') {
                Some(key) => Query::IsNull(label_field(key.trim(), term)?),
                None => Query::Exists(label_field(term, term)?),
            },
        };
        queries.push(query);
    }
    Ok(Query::all_of(queries))
}

fn label_field(key: &str, term: &str) -> Result<Field, QueryError> {
    if key.is_empty() {
        return Err(QueryError::InvalidSelector(term.to_string()));
    }
    Ok(Field::Label(key.to_string()))
}
