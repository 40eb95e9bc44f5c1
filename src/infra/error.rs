use thiserror::Error;

/// Infrastructure errors that can occur during application startup.
///
/// Display messages are sanitized and safe for logs/console output. Debug
/// output includes the full #[source] error chain which may contain secrets
/// (e.g., connection strings) - use Display (%e) not Debug (?e) in logs.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("Database connection failed. Check DATABASE_URL and ensure the database is running.")]
    DatabaseConnection(#[source] sqlx::Error),

    #[error("Plan catalog could not be loaded: {0}")]
    PlanCatalog(String),
}

impl From<sqlx::Error> for InfraError {
    fn from(e: sqlx::Error) -> Self {
        InfraError::DatabaseConnection(e)
    }
}
