//! Lowering of [`Query`] trees and [`Sort`]s to SQLite.
//!
//! Every predicate produced here evaluates to 0 or 1, never NULL, so `NOT`
//! and `OR` behave the same as the in-memory interpreter when a field is
//! unset. Scalar comparisons use `IS` / `IS NOT` or `COALESCE(..., 0)`;
//! tags are matched through `EXISTS` over `moment_tags`.
//!
//! The moments table is always aliased as `m`.

use moments_query::{Field, Query, Sort};
use rusqlite::types::Value;

/// A `WHERE` fragment with its positional parameters, in order.
#[derive(Debug, Default)]
pub(crate) struct SqlFilter {
    pub sql: String,
    pub params: Vec<Value>,
}

enum Column {
    /// A single-valued expression that may be NULL.
    Scalar(String),
    Tags,
}

/// Plain column backing a scalar field, if it has one.
pub(crate) fn column_name(field: &Field) -> Option<&'static str> {
    match field {
        Field::Name => Some("m.name"),
        Field::CreationTimestamp => Some("m.creation_timestamp"),
        Field::DeletionTimestamp => Some("m.deletion_timestamp"),
        Field::Owner => Some("m.owner"),
        Field::Visible => Some("m.visible"),
        Field::ReleaseTime => Some("m.release_time"),
        Field::Approved | Field::Label(_) | Field::Tags => None,
    }
}

fn column(field: &Field, params: &mut Vec<Value>) -> Column {
    if let Some(name) = column_name(field) {
        return Column::Scalar(name.to_string());
    }
    match field {
        Field::Approved => {
            Column::Scalar("(CASE m.approved WHEN 0 THEN 'false' ELSE 'true' END)".to_string())
        }
        Field::Label(key) => {
            params.push(Value::Text(key.clone()));
            Column::Scalar(
                "(SELECT l.value FROM moment_labels l WHERE l.moment_name = m.name AND l.key = ?)"
                    .to_string(),
            )
        }
        _ => Column::Tags,
    }
}

fn tag_exists(condition: Option<&str>) -> String {
    match condition {
        Some(cond) => format!(
            "EXISTS (SELECT 1 FROM moment_tags t WHERE t.moment_name = m.name AND t.tag {cond} ?)"
        ),
        None => "EXISTS (SELECT 1 FROM moment_tags t WHERE t.moment_name = m.name)".to_string(),
    }
}

fn write(query: &Query, sql: &mut String, params: &mut Vec<Value>) {
    match query {
        Query::All => sql.push('1'),
        Query::Exists(field) => match column(field, params) {
            Column::Scalar(col) => sql.push_str(&format!("({col} IS NOT NULL)")),
            Column::Tags => sql.push_str(&tag_exists(None)),
        },
        Query::IsNull(field) => match column(field, params) {
            Column::Scalar(col) => sql.push_str(&format!("({col} IS NULL)")),
            Column::Tags => sql.push_str(&format!("(NOT {})", tag_exists(None))),
        },
        Query::Equal(field, value) => {
            let lowered = match column(field, params) {
                Column::Scalar(col) => format!("({col} IS ?)"),
                Column::Tags => tag_exists(Some("=")),
            };
            sql.push_str(&lowered);
            params.push(Value::Text(value.clone()));
        }
        Query::NotEqual(field, value) => {
            let lowered = match column(field, params) {
                Column::Scalar(col) => format!("({col} IS NOT ?)"),
                Column::Tags => format!("(NOT {})", tag_exists(Some("="))),
            };
            sql.push_str(&lowered);
            params.push(Value::Text(value.clone()));
        }
        Query::GreaterThanOrEqual(field, value) | Query::LessThanOrEqual(field, value) => {
            let op = if matches!(query, Query::GreaterThanOrEqual(..)) {
                ">="
            } else {
                "<="
            };
            let lowered = match column(field, params) {
                Column::Scalar(col) => format!("COALESCE({col} {op} ?, 0)"),
                Column::Tags => tag_exists(Some(op)),
            };
            sql.push_str(&lowered);
            params.push(Value::Text(value.clone()));
        }
        Query::And(terms) => write_joined(terms, " AND ", "1", sql, params),
        Query::Or(terms) => write_joined(terms, " OR ", "0", sql, params),
        Query::Not(inner) => {
            sql.push_str("(NOT ");
            write(inner, sql, params);
            sql.push(')');
        }
    }
}

fn write_joined(
    terms: &[Query],
    separator: &str,
    empty: &str,
    sql: &mut String,
    params: &mut Vec<Value>,
) {
    if terms.is_empty() {
        sql.push_str(empty);
        return;
    }
    sql.push('(');
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            sql.push_str(separator);
        }
        write(term, sql, params);
    }
    sql.push(')');
}

/// Lowers a query tree to a `WHERE` fragment.
pub(crate) fn lower(query: &Query) -> SqlFilter {
    let mut filter = SqlFilter::default();
    write(query, &mut filter.sql, &mut filter.params);
    filter
}

/// Lowers a sort to an `ORDER BY` list. `m.name` is appended as a final
/// key when absent so that paging is deterministic.
pub(crate) fn order_by(sort: &Sort) -> String {
    let mut keys = Vec::new();
    let mut has_name = false;
    for order in sort.orders() {
        match column_name(&order.field) {
            Some(col) => {
                has_name |= order.field == Field::Name;
                keys.push(format!("{col} {}", order.direction.as_sql()));
            }
            None => {
                tracing::debug!(field = %order.field, "ignoring sort on non-scalar field");
            }
        }
    }
    if !has_name {
        keys.push("m.name ASC".to_string());
    }
    keys.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use moments_query::Order;

    #[test]
    fn all_lowers_to_true() {
        let filter = lower(&Query::All);
        assert_eq!(filter.sql, "1");
        assert!(filter.params.is_empty());
    }

    #[test]
    fn label_key_precedes_value_param() {
        let filter = lower(&Query::equal(Field::Label("theme".into()), "dark"));
        assert!(filter.sql.contains("l.key = ?) IS ?"));
        assert_eq!(
            filter.params,
            vec![Value::Text("theme".into()), Value::Text("dark".into())]
        );
    }

    #[test]
    fn empty_disjunction_is_false() {
        let filter = lower(&Query::Or(Vec::new()).negate());
        assert_eq!(filter.sql, "(NOT 0)");
    }

    #[test]
    fn order_by_appends_name_tiebreak() {
        let sort = Sort::by(vec![Order::desc(Field::ReleaseTime)]);
        assert_eq!(order_by(&sort), "m.release_time DESC, m.name ASC");
        assert_eq!(
            order_by(&Sort::default_sort()),
            "m.release_time DESC, m.creation_timestamp DESC, m.name ASC"
        );
    }
}
