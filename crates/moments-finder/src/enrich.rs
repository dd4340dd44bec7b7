//! Attaches statistics and owner details to moments.
//!
//! Enrichment never fails. A missing or unreadable counter yields zero
//! stats, a missing or unreadable user leaves the owner unset.

use futures::future::join_all;
use moments_types::{counter_name, Contributor, ListResult, Moment, MomentView, Stats};

use crate::client::ExtensionClient;

/// Turns raw moments into [`MomentView`]s.
#[derive(Clone, Copy)]
pub struct EnrichmentPipeline<'a> {
    client: &'a dyn ExtensionClient,
}

impl<'a> EnrichmentPipeline<'a> {
    pub fn new(client: &'a dyn ExtensionClient) -> Self {
        Self { client }
    }

    /// Enriches one moment. The stats and owner lookups run concurrently.
    pub async fn enrich(&self, moment: &Moment) -> MomentView {
        let mut view = MomentView::from_moment(moment);
        let (stats, owner) = futures::join!(
            self.stats_for(moment.name()),
            self.contributor_for(moment.owner())
        );
        view.stats = stats;
        view.owner = owner;
        view
    }

    /// Enriches every moment concurrently, keeping the input order.
    pub async fn enrich_all(&self, moments: &[Moment]) -> Vec<MomentView> {
        join_all(moments.iter().map(|m| self.enrich(m))).await
    }

    pub async fn enrich_page(&self, page: ListResult<Moment>) -> ListResult<MomentView> {
        let items = self.enrich_all(&page.items).await;
        ListResult::new(page.page, page.size, page.total, items)
    }

    async fn stats_for(&self, moment_name: &str) -> Stats {
        match self.client.fetch_counter(&counter_name(moment_name)).await {
            Ok(Some(counter)) => Stats::from(&counter),
            Ok(None) => Stats::default(),
            Err(e) => {
                tracing::warn!(moment = moment_name, error = %e, "counter lookup failed, using zero stats");
                Stats::default()
            }
        }
    }

    async fn contributor_for(&self, owner: &str) -> Option<Contributor> {
        match self.client.fetch_user(owner).await {
            Ok(Some(user)) => Some(Contributor::from(&user)),
            Ok(None) => {
                tracing::debug!(owner, "owner not found, leaving contributor unset");
                None
            }
            Err(e) => {
                tracing::warn!(owner, error = %e, "user lookup failed, leaving contributor unset");
                None
            }
        }
    }
}
