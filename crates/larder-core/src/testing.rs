//! In-memory collaborators that record every call.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::models::{ClusterHealth, IndexDocument, Item, NewItem, SearchResponse, WildcardQuery};
use crate::repository::ItemRepository;
use crate::search::SearchClient;

#[derive(Debug, Clone, PartialEq)]
pub enum SearchCall {
    Health,
    Exists(String),
    Create(String, Value),
    Index(String, IndexDocument),
    DeleteByQuery(String, WildcardQuery),
    Search(String, WildcardQuery),
}

pub struct FakeSearchClient {
    reachable: bool,
    nodes: u32,
    fail_index: bool,
    indices: Mutex<HashSet<String>>,
    hits: Vec<Value>,
    calls: Mutex<Vec<SearchCall>>,
}

impl FakeSearchClient {
    pub fn new() -> Self {
        Self {
            reachable: true,
            nodes: 1,
            fail_index: false,
            indices: Mutex::new(HashSet::new()),
            hits: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::new()
        }
    }

    pub fn with_index(self, index: &str) -> Self {
        self.indices.lock().unwrap().insert(index.to_string());
        self
    }

    pub fn with_nodes(mut self, nodes: u32) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn with_hits(mut self, hits: Vec<Value>) -> Self {
        self.hits = hits;
        self
    }

    pub fn failing_index(mut self) -> Self {
        self.fail_index = true;
        self
    }

    pub fn calls(&self) -> Vec<SearchCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: SearchCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl SearchClient for FakeSearchClient {
    async fn cluster_health(&self) -> Result<ClusterHealth, AppError> {
        self.record(SearchCall::Health);
        if !self.reachable {
            return Err(AppError::IndexUnavailable(
                "No alive nodes found in the cluster".to_string(),
            ));
        }
        Ok(ClusterHealth {
            status: "green".to_string(),
            number_of_nodes: self.nodes,
        })
    }

    async fn index_exists(&self, index: &str) -> Result<bool, AppError> {
        self.record(SearchCall::Exists(index.to_string()));
        Ok(self.indices.lock().unwrap().contains(index))
    }

    async fn create_index(&self, index: &str, mapping: &Value) -> Result<(), AppError> {
        self.record(SearchCall::Create(index.to_string(), mapping.clone()));
        self.indices.lock().unwrap().insert(index.to_string());
        Ok(())
    }

    async fn index_document(
        &self,
        index: &str,
        document: &IndexDocument,
    ) -> Result<Value, AppError> {
        self.record(SearchCall::Index(index.to_string(), document.clone()));
        if self.fail_index {
            return Err(AppError::IndexError("HTTP 400 from index".to_string()));
        }
        Ok(json!({"result": "created"}))
    }

    async fn delete_by_query(
        &self,
        index: &str,
        query: &WildcardQuery,
    ) -> Result<Value, AppError> {
        self.record(SearchCall::DeleteByQuery(index.to_string(), query.clone()));
        Ok(json!({"deleted": 1}))
    }

    async fn search(&self, scope: &str, query: &WildcardQuery) -> Result<SearchResponse, AppError> {
        self.record(SearchCall::Search(scope.to_string(), query.clone()));
        let hits: Vec<Value> = self.hits.iter().map(|h| json!({"_source": h})).collect();
        Ok(serde_json::from_value(json!({"hits": {"hits": hits}}))?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoCall {
    Add(NewItem),
    Find(i64),
    Delete(i64),
    FindAll,
    FindByName(String),
}

pub struct FakeRepository {
    items: Mutex<Vec<Item>>,
    next_id: Mutex<i64>,
    add_succeeds: bool,
    delete_succeeds: bool,
    calls: Mutex<Vec<RepoCall>>,
}

impl FakeRepository {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            next_id: Mutex::new(1),
            add_succeeds: true,
            delete_succeeds: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_items(self, items: Vec<Item>) -> Self {
        let next = items.iter().map(|i| i.id).max().unwrap_or(0) + 1;
        *self.items.lock().unwrap() = items;
        *self.next_id.lock().unwrap() = next;
        self
    }

    /// Inserts report that no row was written.
    pub fn failing_add(mut self) -> Self {
        self.add_succeeds = false;
        self
    }

    pub fn failing_delete(mut self) -> Self {
        self.delete_succeeds = false;
        self
    }

    pub fn calls(&self) -> Vec<RepoCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn items(&self) -> Vec<Item> {
        self.items.lock().unwrap().clone()
    }

    fn record(&self, call: RepoCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ItemRepository for FakeRepository {
    async fn add(&self, item: &NewItem) -> Result<bool, AppError> {
        self.record(RepoCall::Add(item.clone()));
        if !self.add_succeeds {
            return Ok(false);
        }
        let mut items = self.items.lock().unwrap();
        if items.iter().any(|i| i.name == item.name) {
            return Err(AppError::DatabaseError(sqlx::Error::Protocol(format!(
                "duplicate key value violates unique constraint: {}",
                item.name
            ))));
        }
        let mut next_id = self.next_id.lock().unwrap();
        items.push(Item {
            id: *next_id,
            name: item.name.clone(),
            quantity: item.quantity,
        });
        *next_id += 1;
        Ok(true)
    }

    async fn find(&self, id: i64) -> Result<Option<Item>, AppError> {
        self.record(RepoCall::Find(id));
        Ok(self.items.lock().unwrap().iter().find(|i| i.id == id).cloned())
    }

    async fn delete(&self, item: &Item) -> Result<bool, AppError> {
        self.record(RepoCall::Delete(item.id));
        if !self.delete_succeeds {
            return Ok(false);
        }
        self.items.lock().unwrap().retain(|i| i.id != item.id);
        Ok(true)
    }

    async fn find_all(&self) -> Result<Vec<Item>, AppError> {
        self.record(RepoCall::FindAll);
        Ok(self.items())
    }

    async fn find_by_name(&self, fragment: &str) -> Result<Vec<Item>, AppError> {
        self.record(RepoCall::FindByName(fragment.to_string()));
        let needle = fragment.to_lowercase();
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}
