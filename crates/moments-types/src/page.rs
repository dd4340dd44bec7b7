//! Page envelope shared by storage and the HTTP surface.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// A page of items with its position in the full result set.
///
/// `page` is 1-based. Serialization adds the derived navigation fields
/// (`first`, `last`, `hasNext`, `hasPrevious`, `totalPages`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListResult<T> {
    pub page: u32,
    pub size: u32,
    pub total: u64,
    pub items: Vec<T>,
}

impl<T> ListResult<T> {
    pub fn new(page: u32, size: u32, total: u64, items: Vec<T>) -> Self {
        Self {
            page,
            size,
            total,
            items,
        }
    }

    /// An empty page echoing the requested position.
    pub fn empty(page: u32, size: u32) -> Self {
        Self::new(page, size, 0, Vec::new())
    }

    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.size))
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn is_first(&self) -> bool {
        self.page <= 1
    }

    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    /// Transforms the items while keeping the page position.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ListResult<U> {
        ListResult {
            page: self.page,
            size: self.size,
            total: self.total,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

impl<T: Serialize> Serialize for ListResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ListResult", 9)?;
        s.serialize_field("page", &self.page)?;
        s.serialize_field("size", &self.size)?;
        s.serialize_field("total", &self.total)?;
        s.serialize_field("items", &self.items)?;
        s.serialize_field("first", &self.is_first())?;
        s.serialize_field("last", &self.is_last())?;
        s.serialize_field("hasNext", &self.has_next())?;
        s.serialize_field("hasPrevious", &self.has_previous())?;
        s.serialize_field("totalPages", &self.total_pages())?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_fields_follow_total() {
        let page = ListResult::new(2, 2, 5, vec!["c", "d"]);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
        assert!(page.has_previous());

        let last = ListResult::new(3, 2, 5, vec!["e"]);
        assert!(last.is_last());
        assert!(!last.has_next());

        let beyond = ListResult::<&str>::new(4, 2, 5, vec![]);
        assert!(beyond.is_last());
    }

    #[test]
    fn empty_page_serializes_navigation() {
        let page = ListResult::<u8>::empty(1, 10);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["total"], 0);
        assert_eq!(json["totalPages"], 0);
        assert_eq!(json["first"], true);
        assert_eq!(json["last"], true);
        assert_eq!(json["items"].as_array().unwrap().len(), 0);
    }
}
