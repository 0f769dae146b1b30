use thiserror::Error;

/// Postgres error code for a not-null violation, used to recognize the
/// deliberate reorg sentinel trip without string-matching driver messages.
const NOT_NULL_VIOLATION: &str = "23502";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a conflicting row already exists")]
    Conflict,

    #[error("block hash mismatch at existing height: a reorg occurred upstream")]
    ReorgDetected,

    #[error("store error: {0}")]
    Other(sqlx::Error),
}

/// Classifies a raw `sqlx::Error` into a [`StoreError`], recognizing the
/// not-null-violation reorg sentinel before falling back to `Other`.
pub(crate) fn classify(error: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.code().as_deref() == Some(NOT_NULL_VIOLATION) {
            return StoreError::ReorgDetected;
        }
        if db_error.is_unique_violation() {
            return StoreError::Conflict;
        }
    }
    StoreError::Other(error)
}
