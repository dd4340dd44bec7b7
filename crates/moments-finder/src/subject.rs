//! Comment-subject integration: lets the comment subsystem show what a
//! comment was left on.

use std::sync::Arc;

use moments_types::{Moment, MOMENT_GROUP, MOMENT_KIND};
use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::client::ExtensionClient;
use crate::error::FinderError;

/// Kind label shown next to a moment subject.
pub const SUBJECT_KIND_NAME: &str = "Moment";

const TITLE_MAX_CHARS: usize = 100;

/// Reference to the subject of a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRef {
    pub group: String,
    #[serde(default)]
    pub version: String,
    pub kind: String,
    pub name: String,
}

/// How a subject is rendered in comment listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectDisplay {
    pub title: String,
    pub url: String,
    pub kind_name: String,
}

pub struct MomentCommentSubject {
    client: Arc<dyn ExtensionClient>,
    external_url: String,
}

impl MomentCommentSubject {
    /// `external_url` prefixes the generated links; empty keeps them
    /// relative.
    pub fn new(client: Arc<dyn ExtensionClient>, external_url: impl Into<String>) -> Self {
        Self {
            client,
            external_url: external_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// The raw moment, regardless of visibility.
    pub async fn get(&self, name: &str) -> Result<Option<Moment>, FinderError> {
        Ok(self.client.fetch_moment(name).await?)
    }

    pub async fn subject_display(&self, name: &str) -> Result<Option<SubjectDisplay>, FinderError> {
        let Some(moment) = self.get(name).await? else {
            return Ok(None);
        };
        let title = moment
            .spec
            .content
            .raw
            .as_deref()
            .map(plain_text)
            .map(|text| text.chars().take(TITLE_MAX_CHARS).collect())
            .unwrap_or_else(|| name.to_string());
        Ok(Some(SubjectDisplay {
            title,
            url: format!("{}/moments/{name}", self.external_url),
            kind_name: SUBJECT_KIND_NAME.to_string(),
        }))
    }

    pub fn supports(&self, subject: &SubjectRef) -> bool {
        subject.group == MOMENT_GROUP && subject.kind == MOMENT_KIND
    }
}

/// Text content of an HTML fragment with every tag removed.
fn plain_text(html: &str) -> String {
    Html::parse_fragment(html)
        .root_element()
        .text()
        .collect::<String>()
}
