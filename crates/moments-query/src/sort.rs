//! Sort specifications.

use std::cmp::Ordering;

use moments_types::Moment;

use crate::error::QueryError;
use crate::field::Field;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub field: Field,
    pub direction: Direction,
}

impl Order {
    pub fn asc(field: Field) -> Self {
        Self {
            field,
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: Field) -> Self {
        Self {
            field,
            direction: Direction::Desc,
        }
    }
}

/// An ordered list of sort keys. Empty means unsorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn by(orders: Vec<Order>) -> Self {
        Self { orders }
    }

    /// Newest release first, then newest creation, then name.
    ///
    /// The trailing keys make the order total, so pages never overlap.
    pub fn default_sort() -> Self {
        Self::by(vec![
            Order::desc(Field::ReleaseTime),
            Order::desc(Field::CreationTimestamp),
            Order::asc(Field::Name),
        ])
    }

    /// Parses `sort` parameters of the form `field` or `field,asc|desc`.
    ///
    /// A single parameter may name several fields before the direction
    /// (`spec.owner,metadata.name,desc`); they all share that direction.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidSort`] for an empty term or a field that
    /// cannot be sorted on, and [`QueryError::UnknownField`] for an unknown
    /// field.
    pub fn parse(params: &[String]) -> Result<Self, QueryError> {
        let mut orders = Vec::new();
        for param in params.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
            let mut parts: Vec<&str> = param.split(',').map(str::trim).collect();
            let last = parts.last().map(|p| p.to_ascii_lowercase());
            let direction = match last.as_deref() {
                Some("asc") => {
                    parts.pop();
                    Direction::Asc
                }
                Some("desc") => {
                    parts.pop();
                    Direction::Desc
                }
                _ => Direction::Asc,
            };
            if parts.is_empty() || parts.iter().any(|p| p.is_empty()) {
                return Err(QueryError::InvalidSort(param.to_string()));
            }
            for part in parts {
                let field: Field = part.parse()?;
                if !field.is_sortable() {
                    return Err(QueryError::InvalidSort(param.to_string()));
                }
                orders.push(Order { field, direction });
            }
        }
        Ok(Self { orders })
    }

    pub fn is_unsorted(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Appends the keys of `other` whose field is not already sorted on.
    pub fn and(mut self, other: Sort) -> Self {
        for order in other.orders {
            if !self.orders.iter().any(|o| o.field == order.field) {
                self.orders.push(order);
            }
        }
        self
    }

    /// Compares two moments under this sort. Unset keys sort first in
    /// ascending order, matching SQLite's NULL ordering.
    pub fn compare(&self, a: &Moment, b: &Moment) -> Ordering {
        for order in &self.orders {
            let ord = order.field.sort_key(a).cmp(&order.field.sort_key(b));
            let ord = match order.direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_direction_suffix() {
        let sort = Sort::parse(&params(&["spec.releaseTime,desc", "metadata.name"])).unwrap();
        assert_eq!(
            sort.orders(),
            &[Order::desc(Field::ReleaseTime), Order::asc(Field::Name)]
        );
    }

    #[test]
    fn shared_direction_for_multiple_fields() {
        let sort = Sort::parse(&params(&["spec.owner,metadata.name,DESC"])).unwrap();
        assert_eq!(
            sort.orders(),
            &[Order::desc(Field::Owner), Order::desc(Field::Name)]
        );
    }

    #[test]
    fn rejects_unsortable_fields() {
        assert!(matches!(
            Sort::parse(&params(&["spec.tags,asc"])),
            Err(QueryError::InvalidSort(_))
        ));
        assert!(matches!(
            Sort::parse(&params(&["spec.nope"])),
            Err(QueryError::UnknownField(_))
        ));
        assert!(Sort::parse(&params(&[",desc"])).is_err());
    }

    #[test]
    fn and_skips_fields_already_sorted() {
        let sort = Sort::by(vec![Order::asc(Field::ReleaseTime)]).and(Sort::default_sort());
        assert_eq!(
            sort.orders(),
            &[
                Order::asc(Field::ReleaseTime),
                Order::desc(Field::CreationTimestamp),
                Order::asc(Field::Name),
            ]
        );
    }
}
