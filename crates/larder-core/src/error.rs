use thiserror::Error;

/// Application-wide error types.
///
/// Every failure the storage coordinator can raise is one of these variants.
/// The coordinator never logs or formats errors itself; callers translate
/// them into user-facing output with [`AppError::user_message`].
///
/// # Error Conversion
///
/// - `sqlx::Error` → `AppError::DatabaseError`
/// - `serde_json::Error` → `AppError::SerializationError`
///
/// # Examples
///
/// ```
/// use larder_core::error::AppError;
///
/// fn example() -> Result<(), AppError> {
///     Err(AppError::UnknownCategory("meat".to_string()))
/// }
///
/// assert!(example().is_err());
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// The item type is not one of the recognized categories.
    #[error("Invalid item type provided: {0}")]
    UnknownCategory(String),

    /// The request carried no item type at all.
    #[error("Invalid item provided: missing item type")]
    MissingCategory,

    /// No item with this id exists in the selected category.
    #[error("No item found with id {0}")]
    ItemNotFound(i64),

    /// Database operation failed.
    ///
    /// Wraps every persistence failure, including connection errors and
    /// unique-name constraint violations.
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// The search cluster has no reachable nodes.
    #[error("Search index unavailable: {0}")]
    IndexUnavailable(String),

    /// The search engine rejected or failed a request.
    #[error("Search index error: {0}")]
    IndexError(String),

    /// JSON serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Request timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// A quantity that cannot be stored as whole grams.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    /// A batch file contained no items.
    #[error("No items found in {0}")]
    NoItems(String),

    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Returns a user-friendly error message suitable for CLI output.
    pub fn user_message(&self) -> String {
        match self {
            AppError::UnknownCategory(category) => {
                format!(
                    "Invalid item type \"{}\".\n   Use one of: fruit, vegetable",
                    category
                )
            }
            AppError::MissingCategory => {
                "Invalid item provided. Item type can not be blank.".to_string()
            }
            AppError::ItemNotFound(id) => format!("No item found with id {}.", id),
            AppError::DatabaseError(e) => {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_unique_violation() {
                        return "An item with this name already exists in this category."
                            .to_string();
                    }
                }
                if e.to_string().contains("connection") {
                    "Cannot connect to database. Is PostgreSQL running?\n   Try: docker-compose up -d".to_string()
                } else {
                    format!("Database error: {}", e)
                }
            }
            AppError::IndexUnavailable(msg) => {
                format!(
                    "No alive nodes found in the search cluster: {}\n   Check that Elasticsearch is running.",
                    msg
                )
            }
            AppError::Timeout(secs) => {
                format!("Request timed out after {} seconds.\n   The search cluster may be overloaded. Try again later.", secs)
            }
            AppError::InvalidQuantity(value) => {
                format!("Invalid quantity {}.\n   Provide a finite number of grams or kilograms.", value)
            }
            AppError::NoItems(source) => {
                format!("No items found in {}.\n   Provide a JSON array of items.", source)
            }
            _ => self.to_string(),
        }
    }

    /// Returns true if this error is a transient transport failure.
    ///
    /// Validation and persistence errors are never retryable.
    ///
    /// # Examples
    ///
    /// ```
    /// use larder_core::error::AppError;
    ///
    /// assert!(AppError::Timeout(30).is_retryable());
    /// assert!(!AppError::ItemNotFound(3).is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::IndexUnavailable(_) | AppError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::ItemNotFound(3);
        assert_eq!(err.to_string(), "No item found with id 3");
    }

    #[test]
    fn test_unknown_category_display() {
        let err = AppError::UnknownCategory("meat".to_string());
        assert_eq!(err.to_string(), "Invalid item type provided: meat");
    }

    #[test]
    fn test_user_message_unknown_category() {
        let msg = AppError::UnknownCategory("Fruit".to_string()).user_message();
        assert!(msg.contains("\"Fruit\""));
        assert!(msg.contains("fruit, vegetable"));
    }

    #[test]
    fn test_user_message_index_unavailable() {
        let msg = AppError::IndexUnavailable("connection refused".to_string()).user_message();
        assert!(msg.contains("No alive nodes"));
    }

    #[test]
    fn test_user_message_invalid_quantity() {
        let msg = AppError::InvalidQuantity("inf".to_string()).user_message();
        assert!(msg.contains("Invalid quantity inf"));
        assert!(!AppError::InvalidQuantity("NaN".to_string()).is_retryable());
    }

    #[test]
    fn test_error_from_serde() {
        let result: Result<serde_json::Value, _> = serde_json::from_str("{ invalid json }");
        let app_err: AppError = result.unwrap_err().into();
        assert!(matches!(app_err, AppError::SerializationError(_)));
    }

    #[test]
    fn test_user_message_database_connection() {
        let err = AppError::DatabaseError(sqlx::Error::PoolTimedOut);
        let msg = err.user_message();
        assert!(msg.contains("Cannot connect to database") || msg.contains("Database error"));
    }

    #[test]
    fn test_is_retryable() {
        assert!(AppError::IndexUnavailable("down".to_string()).is_retryable());
        assert!(AppError::Timeout(30).is_retryable());
        assert!(!AppError::MissingCategory.is_retryable());
        assert!(!AppError::IndexError("bad request".to_string()).is_retryable());
        assert!(!AppError::DatabaseError(sqlx::Error::RowNotFound).is_retryable());
    }
}
