//! Storage crate: session, message log, user and product persistence.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – SessionRecord, TurnRecord, UserRecord, ProductRecord
//! - [`session_repo`] – SessionRepository
//! - [`message_repo`] – MessageRepository (the per-session Message Log)
//! - [`user_repo`] – UserRepository
//! - [`product_repo`] – ProductRepository
//! - [`sqlite_pool`] – SqlitePoolManager
//!
//! All repositories share one [`SqlitePoolManager`]; [`Storage::connect`] builds the set.

mod error;
mod message_repo;
mod models;
mod product_repo;
mod session_repo;
mod sqlite_pool;
mod user_repo;

pub use error::StorageError;
pub use message_repo::MessageRepository;
pub use models::{first_word_key, ProductRecord, SessionRecord, TurnRecord, UserRecord};
pub use product_repo::ProductRepository;
pub use session_repo::SessionRepository;
pub use sqlite_pool::SqlitePoolManager;
pub use user_repo::UserRepository;

/// All repositories over one pool.
#[derive(Clone)]
pub struct Storage {
    pub sessions: SessionRepository,
    pub messages: MessageRepository,
    pub users: UserRepository,
    pub products: ProductRepository,
}

impl Storage {
    /// Opens the database at `database_url` and creates any missing tables.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        Self::with_pool(pool_manager).await
    }

    pub async fn with_pool(pool_manager: SqlitePoolManager) -> Result<Self, StorageError> {
        Ok(Self {
            sessions: SessionRepository::new(pool_manager.clone()).await?,
            messages: MessageRepository::new(pool_manager.clone()).await?,
            users: UserRepository::new(pool_manager.clone()).await?,
            products: ProductRepository::new(pool_manager).await?,
        })
    }
}
