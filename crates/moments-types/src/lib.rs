//! Shared record types and constants for the Moments service.
//!
//! This crate holds the transient, request-scoped projections that flow
//! between the query layer, the storage adapter and the HTTP surface:
//! [`Moment`] records as they come out of storage, the auxiliary
//! [`Counter`] and [`User`] records, and the enriched [`MomentView`] that is
//! the only entity returned across the service boundary.
//!
//! Nothing here performs I/O. Every crate in the workspace depends on
//! `moments-types` for cross-cutting definitions, which keeps the
//! dependency graph acyclic.

mod moment;
mod page;
mod record;
mod time;
mod view;
mod viewer;

pub use moment::{
    MediaType, Metadata, Moment, MomentContent, MomentMedia, MomentSpec, MomentVisibility,
    ParseVisibilityError,
};
pub use page::ListResult;
pub use record::{counter_name, Counter, User};
pub use time::{format_timestamp, parse_timestamp};
pub use view::{Contributor, MomentView, Stats, TagSummary};
pub use viewer::Viewer;

/// API group that owns the `Moment` kind.
pub const MOMENT_GROUP: &str = "moment.halo.run";

/// Kind name of a moment record.
pub const MOMENT_KIND: &str = "Moment";

/// Plural resource name used in counter keys and URLs.
pub const MOMENT_PLURAL: &str = "moments";

/// Principal name the host assigns to unauthenticated callers.
pub const ANONYMOUS_USER: &str = "anonymousUser";

/// Default page size when a caller does not provide one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
