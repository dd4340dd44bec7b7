//! Viewer resolution for the moment routes.
//!
//! The username in `X-Moments-User` or `Authorization: Bearer` is taken at
//! face value. Only deploy this behind an authenticating proxy that sets
//! or strips these headers; otherwise any caller can read another user's
//! private moments.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use moments_finder::{resolve_or_anonymous, ClientError, ExtensionClient, ViewerResolver};
use moments_types::Viewer;
use std::sync::Arc;

use crate::AppState;

/// Header carrying the caller's username.
pub const USER_HEADER: &str = "X-Moments-User";

/// The resolved viewer, stored in request extensions. `None` is anonymous.
#[derive(Clone, Debug, Default)]
pub struct ViewerContext(pub Option<Viewer>);

/// Reads the principal name from `X-Moments-User` or `Authorization: Bearer`.
///
/// Unreadable headers and other authorization schemes yield `None`.
pub fn principal_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(val) = headers.get(USER_HEADER) {
        return val.to_str().ok().map(str::to_string);
    }
    headers
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

/// Resolves a principal against the user store: only existing users become
/// viewers.
pub struct UserStoreResolver {
    principal: Option<String>,
    client: Arc<dyn ExtensionClient>,
}

impl UserStoreResolver {
    pub fn new(principal: Option<String>, client: Arc<dyn ExtensionClient>) -> Self {
        Self { principal, client }
    }
}

#[async_trait]
impl ViewerResolver for UserStoreResolver {
    async fn current_viewer(&self) -> Result<Option<Viewer>, ClientError> {
        let Some(viewer) = self.principal.as_deref().and_then(Viewer::from_principal) else {
            return Ok(None);
        };
        match self.client.fetch_user(viewer.username()).await? {
            Some(_) => Ok(Some(viewer)),
            None => {
                tracing::debug!(username = viewer.username(), "unknown user, treating as anonymous");
                Ok(None)
            }
        }
    }
}

/// Middleware that attaches a [`ViewerContext`] to every request.
///
/// Never rejects a request: anything that cannot be resolved to a known
/// user is served as anonymous.
pub async fn viewer_middleware(mut req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    let state = req
        .extensions()
        .get::<Arc<AppState>>()
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?
        .clone();

    let resolver = UserStoreResolver::new(principal_from_headers(req.headers()), state.client.clone());
    let viewer = resolve_or_anonymous(&resolver).await;

    req.extensions_mut().insert(ViewerContext(viewer));
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn principal_sources() {
        let mut headers = HeaderMap::new();
        assert_eq!(principal_from_headers(&headers), None);

        headers.insert("Authorization", HeaderValue::from_static("Bearer alice"));
        assert_eq!(principal_from_headers(&headers).as_deref(), Some("alice"));

        headers.insert(USER_HEADER, HeaderValue::from_static("bob"));
        assert_eq!(principal_from_headers(&headers).as_deref(), Some("bob"));

        let mut basic = HeaderMap::new();
        basic.insert("Authorization", HeaderValue::from_static("Basic YWxpY2U="));
        assert_eq!(principal_from_headers(&basic), None);
    }
}
