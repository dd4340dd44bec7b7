//! The `Moment` record as persisted by the storage collaborator.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Declared visibility of a moment, independent of ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MomentVisibility {
    /// Anyone may see the moment.
    #[default]
    #[serde(rename = "PUBLIC")]
    Public,
    /// Only the owner may see the moment.
    #[serde(rename = "PRIVATE")]
    Private,
}

impl MomentVisibility {
    /// Returns the canonical string label for this visibility.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "PUBLIC",
            Self::Private => "PRIVATE",
        }
    }
}

impl std::fmt::Display for MomentVisibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MomentVisibility {
    type Err = ParseVisibilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PUBLIC" => Ok(Self::Public),
            "PRIVATE" => Ok(Self::Private),
            _ => Err(ParseVisibilityError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown visibility string.
#[derive(Debug, Clone)]
pub struct ParseVisibilityError(pub String);

impl std::fmt::Display for ParseVisibilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown moment visibility: {}", self.0)
    }
}

impl std::error::Error for ParseVisibilityError {}

/// Kind of an attached media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
    Photo,
    Video,
    Post,
    Audio,
}

/// A media item attached to a moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentMedia {
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub url: String,
    /// MIME type of the original upload, if known.
    #[serde(default)]
    pub origin_type: Option<String>,
}

/// Body of a moment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentContent {
    /// Source text as written by the owner (may contain HTML).
    #[serde(default)]
    pub raw: Option<String>,
    /// Rendered HTML.
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub medium: Vec<MomentMedia>,
}

/// Identity and lifecycle metadata shared by every stored record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Unique identifier.
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Canonical timestamp (see [`crate::format_timestamp`]).
    #[serde(default)]
    pub creation_timestamp: Option<String>,
    /// Soft-deletion marker. A record is live iff this is unset.
    #[serde(default)]
    pub deletion_timestamp: Option<String>,
}

/// Owner-controlled fields of a moment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentSpec {
    #[serde(default)]
    pub content: MomentContent,
    /// Canonical release timestamp; the default sort key.
    pub release_time: String,
    pub visible: MomentVisibility,
    /// Username of the owner.
    pub owner: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub approved: bool,
    #[serde(default)]
    pub approved_time: Option<String>,
}

/// A short social post.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Moment {
    pub metadata: Metadata,
    pub spec: MomentSpec,
}

impl Moment {
    /// The moment's unique identifier.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// The owner's username.
    pub fn owner(&self) -> &str {
        &self.spec.owner
    }

    /// Whether the soft-deletion marker is unset.
    pub fn is_live(&self) -> bool {
        self.metadata.deletion_timestamp.is_none()
    }

    pub fn is_publicly_visible(&self) -> bool {
        self.spec.visible == MomentVisibility::Public
    }
}
