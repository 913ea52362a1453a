//! Item repositories for PostgreSQL, one per category table.
//!
//! Expected schema for both `fruits` and `vegetables` (see `migrations/`):
//! `id BIGSERIAL PRIMARY KEY, name VARCHAR(255) NOT NULL UNIQUE, quantity BIGINT NOT NULL`.
//! Quantities are stored in grams.

use async_trait::async_trait;
use larder_core::error::AppError;
use larder_core::models::{Category, Item, NewItem};
use larder_core::repository::{ItemRepository, RepositorySelector};
use sqlx::{PgPool, Pool, Postgres};
use tracing::debug;

/// Column list for SELECT queries. Must remain a const literal to ensure SQL safety
/// since format!() bypasses sqlx compile-time validation.
const ITEM_COLUMNS: &str = "id, name, quantity";

/// Repository for one category's items in PostgreSQL.
///
/// The table name comes from [`Category::table_name`], never from input.
///
/// # Examples
///
/// ```no_run
/// use sqlx::postgres::PgPoolOptions;
/// use larder_core::Category;
/// use larder_db::PgItemRepository;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = PgPoolOptions::new()
///     .max_connections(5)
///     .connect("postgresql://localhost/larder")
///     .await?;
///
/// let fruits = PgItemRepository::new(pool, Category::Fruit);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PgItemRepository {
    pool: Pool<Postgres>,
    category: Category,
}

impl PgItemRepository {
    pub fn new(pool: PgPool, category: Category) -> Self {
        Self { pool, category }
    }

    /// Builds the fruit and vegetable repositories over one shared pool.
    pub fn pair(pool: PgPool) -> RepositorySelector<Self> {
        RepositorySelector::new(
            Self::new(pool.clone(), Category::Fruit),
            Self::new(pool, Category::Vegetable),
        )
    }

    pub fn category(&self) -> Category {
        self.category
    }

    fn table(&self) -> &'static str {
        self.category.table_name()
    }
}

/// Wraps a name fragment for a substring `ILIKE` match.
fn contains_pattern(fragment: &str) -> String {
    format!("%{}%", fragment)
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    async fn add(&self, item: &NewItem) -> Result<bool, AppError> {
        let query = format!("INSERT INTO {} (name, quantity) VALUES ($1, $2)", self.table());
        debug!(table = self.table(), name = %item.name, quantity = item.quantity, "inserting item");

        let result = sqlx::query(&query)
            .bind(&item.name)
            .bind(item.quantity)
            .execute(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        Ok(result.rows_affected() > 0)
    }

    async fn find(&self, id: i64) -> Result<Option<Item>, AppError> {
        let query = format!("SELECT {} FROM {} WHERE id = $1", ITEM_COLUMNS, self.table());
        let result = sqlx::query_as::<_, Item>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        Ok(result)
    }

    async fn delete(&self, item: &Item) -> Result<bool, AppError> {
        let query = format!("DELETE FROM {} WHERE id = $1", self.table());
        let result = sqlx::query(&query)
            .bind(item.id)
            .execute(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        let deleted = result.rows_affected() > 0;
        debug!(table = self.table(), id = item.id, deleted, "deleted item");
        Ok(deleted)
    }

    async fn find_all(&self) -> Result<Vec<Item>, AppError> {
        let query = format!("SELECT {} FROM {} ORDER BY id", ITEM_COLUMNS, self.table());
        let items = sqlx::query_as::<_, Item>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        Ok(items)
    }

    async fn find_by_name(&self, fragment: &str) -> Result<Vec<Item>, AppError> {
        let query = format!(
            "SELECT {} FROM {} WHERE name ILIKE $1 ORDER BY id",
            ITEM_COLUMNS,
            self.table()
        );
        let items = sqlx::query_as::<_, Item>(&query)
            .bind(contains_pattern(fragment))
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        Ok(items)
    }
}
