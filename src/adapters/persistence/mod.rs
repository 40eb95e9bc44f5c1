use sqlx::PgPool;

use crate::application::app_error::AppError;

pub mod directory;
pub mod subscription;
pub mod usage;

/// Shared Postgres-backed implementation of the persistence ports.
pub struct PostgresPersistence {
    pub(crate) pool: PgPool,
}

impl PostgresPersistence {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e.to_string())
    }
}
