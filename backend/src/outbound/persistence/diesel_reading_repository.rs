//! SQLite-backed `ReadingRepository` implementation using Diesel ORM.
//!
//! Rows are appended without a declared key. Retention and tie-breaking both
//! use SQLite's implicit `rowid`, which grows with insertion order.
//!
//! Reads skip rows that lack a required attribute, so a store inherited from
//! an older relay that accepted `null` values keeps serving its good rows.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::{debug, warn};

use crate::domain::ports::{ReadingRepository, ReadingRepositoryError};
use crate::domain::{Reading, ReadingLimit, RetentionCap};

use super::models::{NewReadingRow, ReadingRow};
use super::pool::{DbPool, PoolError};
use super::schema::entries;

/// SQLite reads a negative `LIMIT` as no limit.
const NO_ROW_LIMIT: i64 = -1;

/// Diesel-backed implementation of the `ReadingRepository` port.
#[derive(Clone)]
pub struct DieselReadingRepository {
    pool: DbPool,
}

impl DieselReadingRepository {
    /// Create a new repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to reading repository errors.
fn map_pool_error(error: PoolError) -> ReadingRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            ReadingRepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to reading repository errors.
fn map_diesel_error(error: diesel::result::Error) -> ReadingRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            ReadingRepositoryError::connection("database connection error")
        }
        DieselError::DatabaseError(_, info) => ReadingRepositoryError::query(info.message()),
        DieselError::QueryBuilderError(_) => ReadingRepositoryError::query("database query error"),
        _ => ReadingRepositoryError::query("database error"),
    }
}

/// Decode a stored row, skipping rows an older store let through.
fn decode_row(row: ReadingRow) -> Option<Reading> {
    Reading::try_from(row)
        .inspect_err(|defect| warn!(%defect, "skipping undecodable stored reading"))
        .ok()
}

fn to_u64(value: impl TryInto<u64>) -> u64 {
    value.try_into().unwrap_or(u64::MAX)
}

#[async_trait]
impl ReadingRepository for DieselReadingRepository {
    async fn insert(&self, reading: &Reading) -> Result<(), ReadingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(entries::table)
            .values(NewReadingRow::from(reading))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn trim_to_capacity(&self, cap: RetentionCap) -> Result<u64, ReadingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Newest row that falls outside the cap; everything at or below it goes.
        let cutoff = entries::table
            .select(entries::rowid)
            .order(entries::rowid.desc())
            .offset(i64::from(cap.get()))
            .first::<i64>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        let Some(cutoff) = cutoff else {
            return Ok(0);
        };

        let removed = diesel::delete(entries::table.filter(entries::rowid.le(cutoff)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(to_u64(removed))
    }

    async fn query_recent(
        &self,
        limit: Option<ReadingLimit>,
    ) -> Result<Vec<Reading>, ReadingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row_limit = limit.map_or(NO_ROW_LIMIT, |max| i64::from(max.get()));
        let rows = entries::table
            .select(ReadingRow::as_select())
            .filter(entries::device.is_not_null())
            .filter(entries::date.is_not_null())
            .filter(entries::date_string.is_not_null())
            .filter(entries::sgv.is_not_null())
            .filter(entries::direction.is_not_null())
            .filter(entries::kind.is_not_null())
            .order((entries::date.desc(), entries::rowid.desc()))
            .limit(row_limit)
            .load::<ReadingRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().filter_map(decode_row).collect())
    }

    async fn count(&self) -> Result<u64, ReadingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = entries::table
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(to_u64(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let mapped = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(mapped, ReadingRepositoryError::connection("timed out"));
    }

    #[rstest]
    #[case(
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, Box::new("gone".to_owned())),
        ReadingRepositoryError::connection("database connection error")
    )]
    #[case(
        DieselError::DatabaseError(DatabaseErrorKind::Unknown, Box::new("disk I/O error".to_owned())),
        ReadingRepositoryError::query("disk I/O error")
    )]
    #[case(DieselError::NotFound, ReadingRepositoryError::query("database error"))]
    fn diesel_errors_are_classified(
        #[case] error: DieselError,
        #[case] expected: ReadingRepositoryError,
    ) {
        assert_eq!(map_diesel_error(error), expected);
    }
}
