use furnish_storage::StorageError;

const UNIQUE_VIOLATION: &str = "23505";

/// Maps a sqlx failure onto the storage error taxonomy.
///
/// `RowNotFound` is not mapped here; callers that distinguish a missing
/// row use `fetch_optional` or `rows_affected` and build the `NotFound`
/// themselves with the entity and id at hand.
pub(crate) fn map_sqlx(err: sqlx::Error) -> StorageError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            StorageError::already_exists("row", db.constraint().unwrap_or("unique"))
        }
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StorageError::connection(err.to_string())
        }
        _ => StorageError::internal(err.to_string()),
    }
}
