//! Diesel and pool error mapping into [`StoreError`].

use tracing::debug;

use crate::domain::ports::StoreError;

use super::pool::PoolError;

/// Map a pool failure to a connection error.
pub(crate) fn map_pool_error(error: PoolError) -> StoreError {
    StoreError::connection(error.to_string())
}

/// Map common Diesel error variants into query/connection constructors.
///
/// The database's own message is logged at debug level but not returned, so
/// row values never leak into caller-facing errors.
pub(crate) fn map_basic_diesel_error<Q, C>(
    error: diesel::result::Error,
    query: Q,
    connection: C,
) -> StoreError
where
    Q: Fn(&'static str) -> StoreError,
    C: Fn(&'static str) -> StoreError,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            query("identifier or unique value already exists")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            query("referenced row is missing or still referenced")
        }
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            query("transaction serialization failure")
        }
        _ => query("database error"),
    }
}

/// Mapping for reads.
pub(crate) fn map_read_error(error: diesel::result::Error) -> StoreError {
    map_basic_diesel_error(error, StoreError::query, StoreError::connection)
}

/// Mapping for the commit transaction.
pub(crate) fn map_commit_error(error: diesel::result::Error) -> StoreError {
    map_basic_diesel_error(error, StoreError::commit, StoreError::connection)
}
