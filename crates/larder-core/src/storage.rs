//! Storage coordinator.
//!
//! Writes go to the relational store first and are then mirrored into the
//! search index. The two calls are sequential and share no transaction: if
//! the index call fails after the store write succeeded, the error reaches
//! the caller and the stores stay diverged. Nothing here retries, rolls back
//! or reconciles. A retry queue or outbox would hook in after the store
//! write in [`StorageService::add`] and [`StorageService::remove`].

use serde_json::Value;

use crate::error::AppError;
use crate::models::{AddItemRequest, Category, IndexDocument, Item, ListedItem, NewItem, Unit};
use crate::repository::{ItemRepository, RepositorySelector};
use crate::search::{SearchClient, SearchIndex};
use crate::units::{to_grams, to_kilograms};

/// Coordinates the per-category repositories and the search index.
pub struct StorageService<R, C> {
    repositories: RepositorySelector<R>,
    index: SearchIndex<C>,
}

impl<R: ItemRepository, C: SearchClient> StorageService<R, C> {
    pub fn new(repositories: RepositorySelector<R>, index: SearchIndex<C>) -> Self {
        Self {
            repositories,
            index,
        }
    }

    pub fn repositories(&self) -> &RepositorySelector<R> {
        &self.repositories
    }

    pub fn index(&self) -> &SearchIndex<C> {
        &self.index
    }

    /// Adds an item to its category's store, then to its search index.
    ///
    /// Quantities given in kilograms are converted to grams; any other unit,
    /// recognized or not, is taken as grams already. The quantity is rounded
    /// to whole grams before it is persisted.
    ///
    /// # Errors
    ///
    /// - `MissingCategory` before any store or index call when no category is given.
    /// - `UnknownCategory` for an unrecognized category label.
    /// - `InvalidQuantity` before any store call when the grams are not finite
    ///   or do not fit the store's integer column.
    /// - `DatabaseError` when the store write fails, including duplicate names.
    /// - Index errors after a successful store write; the stored row is kept.
    pub async fn add(&self, request: &AddItemRequest) -> Result<(), AppError> {
        let label = request
            .category
            .as_deref()
            .ok_or(AppError::MissingCategory)?;

        let quantity = if Unit::is_kilograms(request.unit.as_deref()) {
            to_grams(request.quantity)
        } else {
            request.quantity
        };

        let category = Category::parse(label)?;
        let repo = self.repositories.get(category);

        let item = NewItem {
            name: request.name.clone(),
            quantity: whole_grams(quantity)?,
        };

        if repo.add(&item).await? {
            self.index.add(&IndexDocument::new(category, &item)).await?;
        }
        Ok(())
    }

    /// Removes an item from its category's store, then removes documents with
    /// the same name from the category's search index.
    ///
    /// When the store reports that nothing was deleted, the index is left
    /// untouched and the call still succeeds.
    ///
    /// # Errors
    ///
    /// - `MissingCategory` when no category is given.
    /// - `UnknownCategory` for an unrecognized category label, whatever the id.
    /// - `ItemNotFound` when the id does not exist in that category.
    pub async fn remove(&self, id: i64, category: Option<&str>) -> Result<(), AppError> {
        let label = category.ok_or(AppError::MissingCategory)?;
        let category = Category::parse(label)?;
        let repo = self.repositories.get(category);

        let item = repo.find(id).await?.ok_or(AppError::ItemNotFound(id))?;

        if repo.delete(&item).await? {
            self.index.remove(category, &item.name).await?;
        }
        Ok(())
    }

    /// Lists a category's items, quantities converted to `unit`.
    ///
    /// A non-empty `name_filter` restricts the result to names containing it
    /// (case-insensitive). Quantities are in grams unless `unit` is `"kg"`.
    pub async fn list(
        &self,
        category: &str,
        unit: Option<&str>,
        name_filter: &str,
    ) -> Result<Vec<ListedItem>, AppError> {
        let repo = self.repositories.select(category)?;

        let items = if name_filter.is_empty() {
            repo.find_all().await?
        } else {
            repo.find_by_name(name_filter).await?
        };

        let in_kilograms = Unit::is_kilograms(unit);
        Ok(items
            .into_iter()
            .map(|item| present(item, in_kilograms))
            .collect())
    }

    /// Searches every category's index for names containing `query`.
    pub async fn search_by_name(&self, query: &str) -> Result<Vec<Value>, AppError> {
        self.index.search_by_name(query).await
    }
}

/// Rounds to the nearest gram, rejecting values an `i64` cannot hold.
fn whole_grams(grams: f64) -> Result<i64, AppError> {
    let rounded = grams.round();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    if !rounded.is_finite() || rounded.abs() >= i64::MAX as f64 {
        return Err(AppError::InvalidQuantity(grams.to_string()));
    }
    Ok(rounded as i64)
}

fn present(item: Item, in_kilograms: bool) -> ListedItem {
    let grams = item.quantity as f64;
    ListedItem {
        id: item.id,
        name: item.name,
        quantity: if in_kilograms {
            to_kilograms(grams)
        } else {
            grams
        },
    }
}
