//! Listing operations.

use std::collections::BTreeMap;
use std::sync::Arc;

use moments_query::{
    Field, FinderQuery, ListOptions, PageRequest, PublicMomentQuery, Query, Sort, VisibilityPolicy,
};
use moments_types::{ListResult, MomentView, TagSummary, Viewer};

use crate::client::ExtensionClient;
use crate::enrich::EnrichmentPipeline;
use crate::error::FinderError;

/// Canonical link to the listing of one tag.
pub fn tag_permalink(tag: &str) -> String {
    format!("/moments?tag={}", urlencoding::encode(tag))
}

fn tag_query(tag: &str) -> Query {
    if tag.trim().is_empty() {
        Query::All
    } else {
        Query::equal(Field::Tags, tag)
    }
}

/// Visibility-aware listing of enriched moments.
///
/// Every operation starts from [`VisibilityPolicy::list_options_for`] and
/// narrows it with the caller's filters, so hidden moments never leave
/// storage.
#[derive(Clone)]
pub struct MomentFinder {
    client: Arc<dyn ExtensionClient>,
    list_all_limit: Option<u32>,
}

impl MomentFinder {
    pub fn new(client: Arc<dyn ExtensionClient>) -> Self {
        Self {
            client,
            list_all_limit: None,
        }
    }

    /// Caps the unpaginated listings (`list_all`, `list_by_tag`).
    pub fn with_list_all_limit(mut self, limit: Option<u32>) -> Self {
        self.list_all_limit = limit.filter(|l| *l > 0);
        self
    }

    fn pipeline(&self) -> EnrichmentPipeline<'_> {
        EnrichmentPipeline::new(self.client.as_ref())
    }

    fn visible(viewer: Option<&Viewer>, filter: Query) -> ListOptions {
        VisibilityPolicy::list_options_for(viewer).and_query(filter)
    }

    /// Runs an unpaginated listing, bounded by `list_all_limit` if set.
    async fn list_unpaged(
        &self,
        options: ListOptions,
    ) -> Result<Vec<MomentView>, FinderError> {
        let sort = Sort::default_sort();
        let moments = match self.list_all_limit {
            Some(limit) => {
                let request = PageRequest::of(Some(1), Some(limit), sort);
                let page = self.client.list_moments_page(&options, &request).await?;
                if page.total > page.items.len() as u64 {
                    tracing::warn!(
                        limit,
                        total = page.total,
                        "unpaginated listing truncated"
                    );
                }
                page.items
            }
            None => self.client.list_moments(&options, &sort).await?,
        };
        Ok(self.pipeline().enrich_all(&moments).await)
    }

    async fn list_paged(
        &self,
        options: ListOptions,
        request: PageRequest,
    ) -> Result<ListResult<MomentView>, FinderError> {
        tracing::debug!(page = request.page(), size = request.size(), "listing moments");
        let page = self.client.list_moments_page(&options, &request).await?;
        Ok(self.pipeline().enrich_page(page).await)
    }

    /// All visible moments under the default sort.
    pub async fn list_all(&self, viewer: Option<&Viewer>) -> Result<Vec<MomentView>, FinderError> {
        self.list_unpaged(VisibilityPolicy::list_options_for(viewer))
            .await
    }

    /// One page of visible moments under the default sort. A page past the
    /// end is empty.
    pub async fn list_page(
        &self,
        viewer: Option<&Viewer>,
        page: Option<u32>,
        size: Option<u32>,
    ) -> Result<ListResult<MomentView>, FinderError> {
        let request = PageRequest::of(page, size, Sort::default_sort());
        self.list_paged(VisibilityPolicy::list_options_for(viewer), request)
            .await
    }

    /// Visible moments matching the public endpoint's filters.
    pub async fn list_by_filters(
        &self,
        viewer: Option<&Viewer>,
        query: &PublicMomentQuery,
    ) -> Result<ListResult<MomentView>, FinderError> {
        let options = Self::visible(viewer, query.to_list_options().query);
        self.list_paged(options, query.to_page_request()).await
    }

    /// Visible moments matching a map-style finder query.
    pub async fn list_by_query(
        &self,
        viewer: Option<&Viewer>,
        query: &FinderQuery,
    ) -> Result<ListResult<MomentView>, FinderError> {
        let request = query.to_page_request()?;
        let options = Self::visible(viewer, query.to_list_options().query);
        self.list_paged(options, request).await
    }

    /// All visible moments carrying `tag`. A blank tag imposes nothing.
    pub async fn list_by_tag(
        &self,
        viewer: Option<&Viewer>,
        tag: &str,
    ) -> Result<Vec<MomentView>, FinderError> {
        self.list_unpaged(Self::visible(viewer, tag_query(tag)))
            .await
    }

    pub async fn list_by_tag_page(
        &self,
        viewer: Option<&Viewer>,
        page: Option<u32>,
        size: Option<u32>,
        tag: &str,
    ) -> Result<ListResult<MomentView>, FinderError> {
        let request = PageRequest::of(page, size, Sort::default_sort());
        self.list_paged(Self::visible(viewer, tag_query(tag)), request)
            .await
    }

    /// One summary per distinct tag over the visible moments, ordered by
    /// tag name.
    pub async fn list_tag_summaries(
        &self,
        viewer: Option<&Viewer>,
    ) -> Result<Vec<TagSummary>, FinderError> {
        let options = Self::visible(viewer, Query::Exists(Field::Tags));
        let moments = self
            .client
            .list_moments(&options, &Sort::default_sort())
            .await?;

        let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
        for tag in moments.iter().flat_map(|m| m.spec.tags.iter()) {
            *counts.entry(tag.as_str()).or_default() += 1;
        }

        Ok(counts
            .into_iter()
            .map(|(name, moment_count)| TagSummary {
                name: name.to_string(),
                moment_count,
                permalink: tag_permalink(name),
            })
            .collect())
    }

    /// A single moment, if it exists and `viewer` may see it.
    ///
    /// Hidden and missing moments both yield [`FinderError::NotFound`].
    pub async fn get_by_name(
        &self,
        viewer: Option<&Viewer>,
        name: &str,
    ) -> Result<MomentView, FinderError> {
        let visible = VisibilityPolicy::predicate_for(viewer);
        let moment = self
            .client
            .fetch_moment(name)
            .await?
            .filter(|m| visible(m))
            .ok_or_else(|| FinderError::NotFound(name.to_string()))?;
        Ok(self.pipeline().enrich(&moment).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permalink_percent_encodes_tag() {
        assert_eq!(tag_permalink("rust"), "/moments?tag=rust");
        assert_eq!(tag_permalink("a b/c"), "/moments?tag=a%20b%2Fc");
        assert_eq!(tag_permalink("生活"), "/moments?tag=%E7%94%9F%E6%B4%BB");
    }

    #[test]
    fn blank_tag_is_unconstrained() {
        assert_eq!(tag_query("  "), Query::All);
        assert_eq!(tag_query("go"), Query::equal(Field::Tags, "go"));
    }
}
