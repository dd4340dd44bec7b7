//! Translation of caller filters into list options and page requests.
//!
//! Parsing is eager: every parameter is validated when the query object is
//! built, so a malformed filter fails before any storage query exists.

use chrono::{DateTime, Utc};
use moments_types::format_timestamp;
use serde::Deserialize;

use crate::error::QueryError;
use crate::field::Field;
use crate::page::PageRequest;
use crate::query::{ListOptions, Query};
use crate::selector::{parse_field_selector, parse_label_selector};
use crate::sort::Sort;

/// Returns `value` unless it is blank.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_instant(param: &'static str, value: &str) -> Result<DateTime<Utc>, QueryError> {
    moments_types::parse_timestamp(value).map_err(|_| QueryError::InvalidTimestamp {
        param,
        value: value.to_string(),
    })
}

fn parse_u32(param: &'static str, value: &str) -> Result<u32, QueryError> {
    value.trim().parse().map_err(|_| QueryError::InvalidNumber {
        param,
        value: value.to_string(),
    })
}

/// Conjunction of the optional owner/tag/date filters.
fn filter_query(
    owner: Option<&str>,
    tag: Option<&str>,
    start: Option<&DateTime<Utc>>,
    end: Option<&DateTime<Utc>>,
) -> Query {
    let mut query = Query::All;
    if let Some(owner) = owner {
        query = query.and(Query::equal(Field::Owner, owner));
    }
    if let Some(tag) = tag {
        query = query.and(Query::equal(Field::Tags, tag));
    }
    if let Some(start) = start {
        query = query.and(Query::greater_than_or_equal(
            Field::ReleaseTime,
            format_timestamp(start),
        ));
    }
    if let Some(end) = end {
        query = query.and(Query::less_than_or_equal(
            Field::ReleaseTime,
            format_timestamp(end),
        ));
    }
    query
}

/// Explicit sort keys with the default sort appended as tiebreak.
fn with_default_sort(sort: Sort) -> Sort {
    if sort.is_unsorted() {
        Sort::default_sort()
    } else {
        sort.and(Sort::default_sort())
    }
}

/// Filters accepted by the public `GET /moments` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicMomentQuery {
    pub owner_name: Option<String>,
    pub tag: Option<String>,
    /// Inclusive lower bound on release time.
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on release time.
    pub end_date: Option<DateTime<Utc>>,
    /// Parsed label and field selectors.
    pub selector: Query,
    pub sort: Sort,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl PublicMomentQuery {
    /// Parses raw query-string pairs. Repeated keys accumulate for
    /// `labelSelector`, `fieldSelector` and `sort`; for the scalar keys the
    /// first occurrence wins.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] for malformed dates, numbers, selectors or
    /// sort terms.
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, QueryError> {
        let first = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        };
        let all = |key: &str| -> Vec<String> {
            pairs
                .iter()
                .filter(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .collect()
        };

        let start_date = non_blank(first("startDate"))
            .map(|v| parse_instant("startDate", &v))
            .transpose()?;
        let end_date = non_blank(first("endDate"))
            .map(|v| parse_instant("endDate", &v))
            .transpose()?;
        let page = non_blank(first("page"))
            .map(|v| parse_u32("page", &v))
            .transpose()?;
        let size = non_blank(first("size"))
            .map(|v| parse_u32("size", &v))
            .transpose()?;
        let selector = parse_label_selector(&all("labelSelector"))?
            .and(parse_field_selector(&all("fieldSelector"))?);
        let sort = Sort::parse(&all("sort"))?;

        Ok(Self {
            owner_name: non_blank(first("ownerName")),
            tag: non_blank(first("tag")),
            start_date,
            end_date,
            selector,
            sort,
            page,
            size,
        })
    }

    /// Caller filters as list options (visibility is added by the finder).
    pub fn to_list_options(&self) -> ListOptions {
        let query = filter_query(
            self.owner_name.as_deref(),
            self.tag.as_deref(),
            self.start_date.as_ref(),
            self.end_date.as_ref(),
        );
        ListOptions::new(query.and(self.selector.clone()))
    }

    /// Page request; an unsorted query gets the default sort.
    pub fn to_page_request(&self) -> PageRequest {
        PageRequest::of(self.page, self.size, with_default_sort(self.sort.clone()))
    }
}

/// Map-style finder parameters, as passed by templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinderQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub tag_name: Option<String>,
    pub owner: Option<String>,
    pub sort: Vec<String>,
}

impl FinderQuery {
    /// Builds a finder query from a JSON object; `null` yields defaults.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidParams`] if the value has the wrong shape.
    pub fn from_value(value: serde_json::Value) -> Result<Self, QueryError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value).map_err(|e| QueryError::InvalidParams(e.to_string()))
    }

    pub fn to_list_options(&self) -> ListOptions {
        let owner = non_blank(self.owner.clone());
        let tag = non_blank(self.tag_name.clone());
        ListOptions::new(filter_query(owner.as_deref(), tag.as_deref(), None, None))
    }

    /// # Errors
    ///
    /// Returns a [`QueryError`] if a sort term is malformed.
    pub fn to_page_request(&self) -> Result<PageRequest, QueryError> {
        let sort = Sort::parse(&self.sort)?;
        Ok(PageRequest::of(self.page, self.size, with_default_sort(sort)))
    }
}
