//! Domain types shared by the coordinator, the repositories and the search client.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

/// Item category. Decides which table and which search index an item lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fruit,
    Vegetable,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Fruit, Category::Vegetable];

    /// Parses a category label. Matching is exact and case-sensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use larder_core::Category;
    ///
    /// assert_eq!(Category::parse("fruit").unwrap(), Category::Fruit);
    /// assert!(Category::parse("Fruit").is_err());
    /// ```
    pub fn parse(label: &str) -> Result<Self, AppError> {
        match label {
            "fruit" => Ok(Category::Fruit),
            "vegetable" => Ok(Category::Vegetable),
            other => Err(AppError::UnknownCategory(other.to_string())),
        }
    }

    /// Wire label, also used as the search index name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Fruit => "fruit",
            Category::Vegetable => "vegetable",
        }
    }

    /// Relational table holding this category's items.
    pub fn table_name(&self) -> &'static str {
        match self {
            Category::Fruit => "fruits",
            Category::Vegetable => "vegetables",
        }
    }

    pub fn index_name(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::parse(s)
    }
}

/// Quantity unit accepted at the read/write boundary. Storage is always grams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Grams,
    Kilograms,
}

impl Unit {
    /// Returns `None` for labels other than `"g"` and `"kg"`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "g" => Some(Unit::Grams),
            "kg" => Some(Unit::Kilograms),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Grams => "g",
            Unit::Kilograms => "kg",
        }
    }

    /// True only for a label that names kilograms. Anything else, including
    /// unrecognized labels and no label at all, is read as grams.
    pub fn is_kilograms(label: Option<&str>) -> bool {
        label.and_then(Unit::from_label) == Some(Unit::Kilograms)
    }
}

/// Request to add one item, as received from a caller or a batch file.
///
/// Batch files spell the category key `type`; `category` is accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddItemRequest {
    #[serde(rename = "type", alias = "category", default)]
    pub category: Option<String>,
    pub name: String,
    pub quantity: f64,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Item as handed to a repository for persistence. Quantity is in grams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub quantity: i64,
}

/// Stored item row. Quantity is in grams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub quantity: i64,
}

/// Document written to a category's search index. Carries no relational id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
    #[serde(rename = "type")]
    pub category: Category,
    pub name: String,
    pub quantity: i64,
}

impl IndexDocument {
    pub fn new(category: Category, item: &NewItem) -> Self {
        Self {
            category,
            name: item.name.clone(),
            quantity: item.quantity,
        }
    }
}

/// Item returned by a list operation, quantity expressed in the requested unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListedItem {
    pub id: i64,
    pub name: String,
    pub quantity: f64,
}

/// Subset of the `_cluster/health` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClusterHealth {
    pub status: String,
    #[serde(default)]
    pub number_of_nodes: u32,
}

/// Wildcard query against one document field.
///
/// # Examples
///
/// ```
/// use larder_core::WildcardQuery;
/// use serde_json::json;
///
/// let query = WildcardQuery::name("*app*");
/// assert_eq!(query.to_body(), json!({"query": {"wildcard": {"name": "*app*"}}}));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardQuery {
    pub field: String,
    pub pattern: String,
}

impl WildcardQuery {
    pub fn name(pattern: impl Into<String>) -> Self {
        Self {
            field: "name".to_string(),
            pattern: pattern.into(),
        }
    }

    /// Request body in the engine's query DSL.
    pub fn to_body(&self) -> Value {
        let mut wildcard = serde_json::Map::new();
        wildcard.insert(self.field.clone(), Value::String(self.pattern.clone()));
        serde_json::json!({ "query": { "wildcard": wildcard } })
    }
}

/// Search response envelope: `{"hits": {"hits": [{"_source": ...}]}}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    pub hits: SearchHits,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchHits {
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_source", default)]
    pub source: Value,
}

impl SearchResponse {
    /// Source documents in engine order.
    pub fn into_sources(self) -> Vec<Value> {
        self.hits.hits.into_iter().map(|hit| hit.source).collect()
    }
}

/// Parses a batch file: a JSON array of [`AddItemRequest`].
///
/// `source` names the file in error messages. An empty array or a `null`
/// document is rejected with [`AppError::NoItems`].
pub fn parse_items_file(contents: &str, source: &str) -> Result<Vec<AddItemRequest>, AppError> {
    let items: Option<Vec<AddItemRequest>> = serde_json::from_str(contents)?;
    match items {
        Some(items) if !items.is_empty() => Ok(items),
        _ => Err(AppError::NoItems(source.to_string())),
    }
}
