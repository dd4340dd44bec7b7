//! SQLite persistence for moments and the auxiliary records the finder
//! reads: engagement counters and users.
//!
//! Listing functions take a [`moments_query::ListOptions`] and lower its
//! query tree to a parameterised `WHERE` clause, so visibility and caller
//! filters are evaluated by the database rather than after the fact.
//!
//! The listing service only reads. The write side (`upsert_*`,
//! `mark_deleted`, `delete_moment`) and `get_moment` are the seeding and
//! administration surface used by fixtures and maintenance tooling.

mod error;
mod moment;
mod record;
mod sql;

pub use error::StoreError;
pub use moment::{
    count_moments, delete_moment, find_moment, get_moment, list_moments, mark_deleted,
    page_moments, upsert_moment,
};
pub use record::{find_counter, find_user, upsert_counter, upsert_user};
