//! Who may see which moments.
//!
//! The rule is written once, as a [`Query`]. The in-memory predicate is the
//! query's own interpreter, and the storage adapter lowers the very same
//! tree to SQL, so the two forms cannot drift apart.
//!
//! A moment is visible to a viewer iff it is live, approved, and either
//! public or owned by that viewer. Anonymous callers only see public
//! moments. Unapproved or soft-deleted moments are hidden from everyone,
//! owners included.

use moments_types::{Moment, MomentVisibility, Viewer};

use crate::field::Field;
use crate::query::{ListOptions, Query};

/// Visibility rule for moments.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilityPolicy;

impl VisibilityPolicy {
    /// Declarative form of the rule for `viewer`.
    pub fn query_for(viewer: Option<&Viewer>) -> Query {
        let eligible = Query::IsNull(Field::DeletionTimestamp)
            .and(Query::equal(Field::Approved, "true"));
        let public = Query::equal(Field::Visible, MomentVisibility::Public.as_str());
        let visible = match viewer {
            Some(viewer) => public.or(Query::equal(Field::Owner, viewer.username())),
            None => public,
        };
        eligible.and(visible)
    }

    /// Predicate form of the rule for `viewer`.
    pub fn predicate_for(viewer: Option<&Viewer>) -> impl Fn(&Moment) -> bool {
        let query = Self::query_for(viewer);
        move |moment| query.matches(moment)
    }

    /// Base list options every listing starts from.
    pub fn list_options_for(viewer: Option<&Viewer>) -> ListOptions {
        ListOptions::new(Self::query_for(viewer))
    }
}
