//! Collaborator interfaces.

use async_trait::async_trait;
use moments_query::{ListOptions, PageRequest, Sort};
use moments_types::{Counter, ListResult, Moment, User, Viewer};

use crate::error::ClientError;

/// Storage and record-fetch collaborator.
///
/// Implementations execute the whole [`ListOptions`] query themselves;
/// the finder never filters listing results after the fact.
#[async_trait]
pub trait ExtensionClient: Send + Sync {
    /// Every moment matching `options`, ordered by `sort`.
    async fn list_moments(
        &self,
        options: &ListOptions,
        sort: &Sort,
    ) -> Result<Vec<Moment>, ClientError>;

    /// One page of the moments matching `options`.
    async fn list_moments_page(
        &self,
        options: &ListOptions,
        page: &PageRequest,
    ) -> Result<ListResult<Moment>, ClientError>;

    /// A moment by name, with no visibility filtering.
    async fn fetch_moment(&self, name: &str) -> Result<Option<Moment>, ClientError>;

    /// A counter by its full counter name.
    async fn fetch_counter(&self, name: &str) -> Result<Option<Counter>, ClientError>;

    async fn fetch_user(&self, name: &str) -> Result<Option<User>, ClientError>;
}

/// Resolves the identity behind the current request.
#[async_trait]
pub trait ViewerResolver: Send + Sync {
    async fn current_viewer(&self) -> Result<Option<Viewer>, ClientError>;
}

/// Resolves the viewer, treating a failed resolution as anonymous.
pub async fn resolve_or_anonymous(resolver: &dyn ViewerResolver) -> Option<Viewer> {
    match resolver.current_viewer().await {
        Ok(viewer) => viewer,
        Err(e) => {
            tracing::warn!(error = %e, "viewer resolution failed, continuing as anonymous");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Result<Option<Viewer>, ClientError>);

    #[async_trait]
    impl ViewerResolver for Fixed {
        async fn current_viewer(&self) -> Result<Option<Viewer>, ClientError> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn failed_resolution_degrades_to_anonymous() {
        let failing = Fixed(Err(ClientError::new("security context unavailable")));
        assert!(resolve_or_anonymous(&failing).await.is_none());

        let alice = Viewer::from_principal("alice");
        let ok = Fixed(Ok(alice.clone()));
        assert_eq!(resolve_or_anonymous(&ok).await, alice);
    }
}
