//! Larder Client - HTTP client for the search cluster.
//!
//! [`ElasticsearchClient`] implements [`larder_core::SearchClient`] over the
//! Elasticsearch REST API.

pub mod elasticsearch;

pub use elasticsearch::ElasticsearchClient;
