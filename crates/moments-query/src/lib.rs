//! Query construction for moment listings.
//!
//! Caller filters, selectors and the visibility rule are all expressed as a
//! single [`Query`] tree plus a [`Sort`]. The tree can be evaluated against
//! an in-memory [`moments_types::Moment`] or lowered to SQL by
//! `moments-store`.

mod builder;
mod error;
mod field;
mod page;
mod query;
mod selector;
mod sort;
mod visibility;

pub use builder::{FinderQuery, PublicMomentQuery};
pub use error::QueryError;
pub use field::Field;
pub use page::PageRequest;
pub use query::{ListOptions, Query};
pub use selector::{parse_field_selector, parse_label_selector};
pub use sort::{Direction, Order, Sort};
pub use visibility::VisibilityPolicy;
