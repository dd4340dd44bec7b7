//! SQLite-backed [`ExtensionClient`].
//!
//! Every call borrows a pooled connection inside `spawn_blocking`, so the
//! async runtime never waits on SQLite.

use async_trait::async_trait;
use moments_db::DbPool;
use moments_finder::{ClientError, ExtensionClient};
use moments_query::{ListOptions, PageRequest, Sort};
use moments_store::StoreError;
use moments_types::{Counter, ListResult, Moment, User};
use rusqlite::Connection;

#[derive(Clone)]
pub struct SqliteClient {
    pool: DbPool,
}

impl SqliteClient {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn with_conn<T, F>(&self, op: &'static str, f: F) -> Result<T, ClientError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| {
                tracing::error!(op, error = %e, "failed to get db connection");
                ClientError::new(format!("database unavailable: {e}"))
            })?;
            f(&*conn).map_err(|e| {
                tracing::error!(op, error = %e, "storage operation failed");
                ClientError::new(e.to_string())
            })
        })
        .await
        .map_err(|e| {
            tracing::error!(op, error = %e, "storage task join error");
            ClientError::new(format!("storage task failed: {e}"))
        })?
    }
}

#[async_trait]
impl ExtensionClient for SqliteClient {
    async fn list_moments(
        &self,
        options: &ListOptions,
        sort: &Sort,
    ) -> Result<Vec<Moment>, ClientError> {
        let (options, sort) = (options.clone(), sort.clone());
        self.with_conn("list_moments", move |conn| {
            moments_store::list_moments(conn, &options, &sort)
        })
        .await
    }

    async fn list_moments_page(
        &self,
        options: &ListOptions,
        page: &PageRequest,
    ) -> Result<ListResult<Moment>, ClientError> {
        let (options, page) = (options.clone(), page.clone());
        self.with_conn("list_moments_page", move |conn| {
            moments_store::page_moments(conn, &options, &page)
        })
        .await
    }

    async fn fetch_moment(&self, name: &str) -> Result<Option<Moment>, ClientError> {
        let name = name.to_string();
        self.with_conn("fetch_moment", move |conn| {
            moments_store::find_moment(conn, &name)
        })
        .await
    }

    async fn fetch_counter(&self, name: &str) -> Result<Option<Counter>, ClientError> {
        let name = name.to_string();
        self.with_conn("fetch_counter", move |conn| {
            moments_store::find_counter(conn, &name)
        })
        .await
    }

    async fn fetch_user(&self, name: &str) -> Result<Option<User>, ClientError> {
        let name = name.to_string();
        self.with_conn("fetch_user", move |conn| moments_store::find_user(conn, &name))
            .await
    }
}
