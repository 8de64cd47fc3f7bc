//! Error types shared across modules.

/// Rejected estimator input. Raised before any computation happens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidInput {
    #[error("{field} must be between 0 and 100, got {value}")]
    SliderOutOfRange { field: &'static str, value: i64 },

    #[error("unknown organ: {name}")]
    UnknownOrgan { name: String },
}

/// Record store errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("user {user_id} not found")]
    UserNotFound { user_id: u64 },

    #[error("username already exists: {username}")]
    DuplicateUsername { username: String },

    #[error("user {user_id} already earned badge {badge}")]
    BadgeAlreadyEarned { user_id: u64, badge: String },

    #[error("quiz question {id} already exists")]
    DuplicateQuestion { id: String },

    #[error("store lock poisoned")]
    LockPoisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Sample catalog could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("malformed catalog data: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Failure while building an API instance.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("invalid configuration: {problems}")]
    InvalidConfig { problems: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
