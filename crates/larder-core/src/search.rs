//! Per-category search index maintenance on top of a [`SearchClient`].
//!
//! Every operation runs a cluster health precheck first and fails with
//! [`AppError::IndexUnavailable`] before touching the index when no node
//! answers.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::models::{Category, ClusterHealth, IndexDocument, SearchResponse, WildcardQuery};

/// Index scope covering every category.
pub const ALL_INDICES: &str = "_all";

/// Low-level operations against the search engine.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Fails with `IndexUnavailable` when the cluster cannot be reached.
    async fn cluster_health(&self) -> Result<ClusterHealth, AppError>;

    async fn index_exists(&self, index: &str) -> Result<bool, AppError>;

    async fn create_index(&self, index: &str, mapping: &Value) -> Result<(), AppError>;

    async fn index_document(&self, index: &str, document: &IndexDocument)
        -> Result<Value, AppError>;

    async fn delete_by_query(&self, index: &str, query: &WildcardQuery)
        -> Result<Value, AppError>;

    async fn search(&self, scope: &str, query: &WildcardQuery)
        -> Result<SearchResponse, AppError>;
}

/// Mapping used when a category index is created on first write.
pub fn item_index_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "name": { "type": "text" },
                "quantity": { "type": "integer" }
            }
        }
    })
}

/// Search index client for item documents.
#[derive(Debug, Clone)]
pub struct SearchIndex<C> {
    client: C,
}

impl<C: SearchClient> SearchIndex<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    async fn ensure_healthy(&self) -> Result<ClusterHealth, AppError> {
        let health = self.client.cluster_health().await?;
        if health.number_of_nodes == 0 {
            return Err(AppError::IndexUnavailable(
                "cluster reports no nodes".to_string(),
            ));
        }
        Ok(health)
    }

    /// Indexes a document, creating the category index with
    /// [`item_index_mapping`] if it does not exist yet.
    ///
    /// Documents are not deduplicated: adding the same fields twice stores
    /// two documents.
    pub async fn add(&self, document: &IndexDocument) -> Result<Value, AppError> {
        self.ensure_healthy().await?;

        let index = document.category.index_name();
        if !self.client.index_exists(index).await? {
            self.client
                .create_index(index, &item_index_mapping())
                .await?;
        }

        self.client.index_document(index, document).await
    }

    /// Deletes every document in the category index whose name matches
    /// `name_pattern` as a wildcard pattern. Returns `None` when the index
    /// does not exist.
    pub async fn remove(
        &self,
        category: Category,
        name_pattern: &str,
    ) -> Result<Option<Value>, AppError> {
        self.ensure_healthy().await?;

        let index = category.index_name();
        if !self.client.index_exists(index).await? {
            return Ok(None);
        }

        let response = self
            .client
            .delete_by_query(index, &WildcardQuery::name(name_pattern))
            .await?;
        Ok(Some(response))
    }

    /// Finds documents across all categories whose name contains `query`.
    /// Results keep the engine's order.
    pub async fn search_by_name(&self, query: &str) -> Result<Vec<Value>, AppError> {
        self.ensure_healthy().await?;

        let response = self
            .client
            .search(ALL_INDICES, &WildcardQuery::name(format!("*{}*", query)))
            .await?;
        Ok(response.into_sources())
    }
}
