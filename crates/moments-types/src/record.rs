//! Auxiliary records owned by other subsystems.

use serde::{Deserialize, Serialize};

use crate::{MOMENT_GROUP, MOMENT_PLURAL};

/// Aggregate counters kept by the host's counter subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counter {
    pub name: String,
    #[serde(default)]
    pub visit: i64,
    #[serde(default)]
    pub upvote: i64,
    #[serde(default)]
    pub total_comment: i64,
    #[serde(default)]
    pub approved_comment: i64,
}

/// A registered user of the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Returns the counter key for a moment: `moments.moment.halo.run/<name>`.
pub fn counter_name(moment_name: &str) -> String {
    format!("{MOMENT_PLURAL}.{MOMENT_GROUP}/{moment_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_name_is_plural_group_slash_name() {
        assert_eq!(counter_name("moment-1"), "moments.moment.halo.run/moment-1");
    }
}
