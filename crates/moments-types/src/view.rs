//! Enriched projections returned across the service boundary.

use serde::{Deserialize, Serialize};

use crate::{Counter, Metadata, Moment, MomentSpec, User};

/// Per-moment aggregate statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub upvote: i64,
    pub total_comment: i64,
    pub approved_comment: i64,
}

impl From<&Counter> for Stats {
    fn from(counter: &Counter) -> Self {
        Self {
            upvote: counter.upvote,
            total_comment: counter.total_comment,
            approved_comment: counter.approved_comment,
        }
    }
}

/// Display projection of a moment's owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    pub name: String,
    pub display_name: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
}

impl From<&User> for Contributor {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            display_name: user.display_name.clone(),
            avatar: user.avatar.clone(),
            bio: user.bio.clone(),
        }
    }
}

/// A moment with its statistics and owner attached.
///
/// Built fresh for every query and never mutated after enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentView {
    pub metadata: Metadata,
    pub spec: MomentSpec,
    /// `None` when the owner's user record cannot be found.
    pub owner: Option<Contributor>,
    pub stats: Stats,
}

impl MomentView {
    /// Base view: a verbatim copy of the moment with zero stats and no owner.
    pub fn from_moment(moment: &Moment) -> Self {
        Self {
            metadata: moment.metadata.clone(),
            spec: moment.spec.clone(),
            owner: None,
            stats: Stats::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

/// One entry of the tag summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSummary {
    pub name: String,
    /// Number of visible moments carrying the tag.
    pub moment_count: u64,
    pub permalink: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_copy_counter_fields() {
        let counter = Counter {
            name: "moments.moment.halo.run/m1".to_string(),
            visit: 40,
            upvote: 3,
            total_comment: 5,
            approved_comment: 2,
        };
        let stats = Stats::from(&counter);
        assert_eq!(stats.upvote, 3);
        assert_eq!(stats.total_comment, 5);
        assert_eq!(stats.approved_comment, 2);
    }

    #[test]
    fn base_view_has_zero_stats_and_no_owner() {
        let view = MomentView::from_moment(&Moment::default());
        assert_eq!(view.stats, Stats::default());
        assert!(view.owner.is_none());

        let json = serde_json::to_value(&view).unwrap();
        assert!(json["owner"].is_null());
        assert_eq!(json["stats"]["totalComment"], 0);
    }
}
