//! Larder Core - Domain types, error handling, configuration and the storage
//! coordinator that keeps the relational store and the search index in step.

pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod search;
pub mod storage;
pub mod units;

#[cfg(test)]
mod testing;

pub use config::{
    default_config_path, load_config, DbConfig, HttpConfig, LarderConfig, SearchConfig,
};
pub use error::AppError;
pub use models::{
    parse_items_file, AddItemRequest, Category, ClusterHealth, IndexDocument, Item, ListedItem,
    NewItem, SearchResponse, Unit, WildcardQuery,
};
pub use repository::{ItemRepository, RepositorySelector};
pub use search::{item_index_mapping, SearchClient, SearchIndex, ALL_INDICES};
pub use storage::StorageService;
