//! Larder DB - PostgreSQL persistence for item collections.

pub mod repository;

pub use repository::PgItemRepository;
