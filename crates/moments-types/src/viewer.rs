//! Identity of whoever issues the current read request.

use serde::{Deserialize, Serialize};

use crate::{Moment, ANONYMOUS_USER};

/// An authenticated viewer.
///
/// Anonymous callers are represented by the absence of a viewer
/// (`Option<Viewer>::None`), never by a sentinel value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewer {
    username: String,
}

impl Viewer {
    /// Builds a viewer from a principal name.
    ///
    /// Blank names and the host's anonymous sentinel yield `None`.
    pub fn from_principal(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() || name == ANONYMOUS_USER {
            return None;
        }
        Some(Self {
            username: name.to_string(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn owns(&self, moment: &Moment) -> bool {
        self.username == moment.spec.owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_sentinel_is_not_a_viewer() {
        assert!(Viewer::from_principal(ANONYMOUS_USER).is_none());
        assert!(Viewer::from_principal("   ").is_none());
        assert_eq!(
            Viewer::from_principal(" alice ").map(|v| v.username().to_string()),
            Some("alice".to_string())
        );
    }
}
