//! Relational repository seam and category dispatch.

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{Category, Item, NewItem};

/// CRUD over one category's table in the system-of-record store.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Persists a new item. The store assigns the id and enforces unique names.
    async fn add(&self, item: &NewItem) -> Result<bool, AppError>;

    async fn find(&self, id: i64) -> Result<Option<Item>, AppError>;

    /// Deletes the item. Returns false when the store removed nothing.
    async fn delete(&self, item: &Item) -> Result<bool, AppError>;

    async fn find_all(&self) -> Result<Vec<Item>, AppError>;

    /// Items whose name contains `fragment`, case-insensitively.
    async fn find_by_name(&self, fragment: &str) -> Result<Vec<Item>, AppError>;
}

/// Maps a category to its repository.
///
/// # Examples
///
/// ```
/// use larder_core::RepositorySelector;
///
/// let selector = RepositorySelector::new("fruits", "vegetables");
/// assert_eq!(*selector.select("vegetable").unwrap(), "vegetables");
/// assert!(selector.select("meat").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct RepositorySelector<R> {
    fruit: R,
    vegetable: R,
}

impl<R> RepositorySelector<R> {
    pub fn new(fruit: R, vegetable: R) -> Self {
        Self { fruit, vegetable }
    }

    /// Resolves a category label, failing with `UnknownCategory` for anything
    /// but an exact match.
    pub fn select(&self, category: &str) -> Result<&R, AppError> {
        Category::parse(category).map(|c| self.get(c))
    }

    pub fn get(&self, category: Category) -> &R {
        match category {
            Category::Fruit => &self.fruit,
            Category::Vegetable => &self.vegetable,
        }
    }
}
