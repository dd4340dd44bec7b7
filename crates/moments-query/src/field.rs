//! Named fields a query or sort may reference.

use moments_types::Moment;

use crate::error::QueryError;

/// An indexed field of a moment record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    CreationTimestamp,
    DeletionTimestamp,
    /// A single metadata label, addressed by key.
    Label(String),
    Owner,
    Approved,
    Visible,
    ReleaseTime,
    Tags,
}

const LABEL_PREFIX: &str = "metadata.labels.";

impl Field {
    /// Returns the dotted path of this field, e.g. `spec.releaseTime`.
    pub fn path(&self) -> String {
        match self {
            Self::Name => "metadata.name".to_string(),
            Self::CreationTimestamp => "metadata.creationTimestamp".to_string(),
            Self::DeletionTimestamp => "metadata.deletionTimestamp".to_string(),
            Self::Label(key) => format!("{LABEL_PREFIX}{key}"),
            Self::Owner => "spec.owner".to_string(),
            Self::Approved => "spec.approved".to_string(),
            Self::Visible => "spec.visible".to_string(),
            Self::ReleaseTime => "spec.releaseTime".to_string(),
            Self::Tags => "spec.tags".to_string(),
        }
    }

    /// Whether a record may carry more than one value for this field.
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, Self::Tags)
    }

    /// Whether results may be ordered by this field.
    pub fn is_sortable(&self) -> bool {
        matches!(
            self,
            Self::Name | Self::CreationTimestamp | Self::ReleaseTime | Self::Owner
        )
    }

    /// Extracts the indexed values of this field from a moment.
    ///
    /// Unset fields yield an empty list; booleans and enums are rendered
    /// the way the storage index stores them (`"true"`, `"PUBLIC"`).
    pub fn values(&self, moment: &Moment) -> Vec<String> {
        match self {
            Self::Name => vec![moment.metadata.name.clone()],
            Self::CreationTimestamp => moment.metadata.creation_timestamp.iter().cloned().collect(),
            Self::DeletionTimestamp => moment.metadata.deletion_timestamp.iter().cloned().collect(),
            Self::Label(key) => moment.metadata.labels.get(key).cloned().into_iter().collect(),
            Self::Owner => vec![moment.spec.owner.clone()],
            Self::Approved => vec![moment.spec.approved.to_string()],
            Self::Visible => vec![moment.spec.visible.as_str().to_string()],
            Self::ReleaseTime => vec![moment.spec.release_time.clone()],
            Self::Tags => moment.spec.tags.iter().cloned().collect(),
        }
    }

    /// The first value of this field, used as the sort key.
    pub fn sort_key(&self, moment: &Moment) -> Option<String> {
        self.values(moment).into_iter().next()
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

impl std::str::FromStr for Field {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(key) = s.strip_prefix(LABEL_PREFIX) {
            if key.is_empty() {
                return Err(QueryError::UnknownField(s.to_string()));
            }
            return Ok(Self::Label(key.to_string()));
        }
        match s {
            "metadata.name" => Ok(Self::Name),
            "metadata.creationTimestamp" => Ok(Self::CreationTimestamp),
            "metadata.deletionTimestamp" => Ok(Self::DeletionTimestamp),
            "spec.owner" => Ok(Self::Owner),
            "spec.approved" => Ok(Self::Approved),
            "spec.visible" => Ok(Self::Visible),
            "spec.releaseTime" => Ok(Self::ReleaseTime),
            "spec.tags" => Ok(Self::Tags),
            _ => Err(QueryError::UnknownField(s.to_string())),
        }
    }
}
