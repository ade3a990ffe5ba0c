//! Column conversions shared by the Postgres repositories.

use std::str::FromStr;

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{Row, postgres::PgRow};
use uuid::Uuid;

use crate::uuids::TypedUuid;

fn decode_error<E>(column: &str, source: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    }
}

pub(crate) fn try_get_uuid<T>(row: &PgRow, col: &str) -> Result<TypedUuid<T>, sqlx::Error> {
    row.try_get::<Uuid, _>(col).map(TypedUuid::from_uuid)
}

pub(crate) fn try_get_optional_uuid<T>(
    row: &PgRow,
    col: &str,
) -> Result<Option<TypedUuid<T>>, sqlx::Error> {
    row.try_get::<Option<Uuid>, _>(col)
        .map(|uuid| uuid.map(TypedUuid::from_uuid))
}

pub(crate) fn try_get_amount(row: &PgRow, col: &str) -> Result<u64, sqlx::Error> {
    let amount_i64: i64 = row.try_get(col)?;

    u64::try_from(amount_i64).map_err(|e| decode_error(col, e))
}

pub(crate) fn try_get_optional_amount(row: &PgRow, col: &str) -> Result<Option<u64>, sqlx::Error> {
    row.try_get::<Option<i64>, _>(col)?
        .map(|amount| u64::try_from(amount).map_err(|e| decode_error(col, e)))
        .transpose()
}

pub(crate) fn try_get_count(row: &PgRow, col: &str) -> Result<u32, sqlx::Error> {
    let count_i32: i32 = row.try_get(col)?;

    u32::try_from(count_i32).map_err(|e| decode_error(col, e))
}

pub(crate) fn try_get_optional_count(row: &PgRow, col: &str) -> Result<Option<u32>, sqlx::Error> {
    row.try_get::<Option<i32>, _>(col)?
        .map(|count| u32::try_from(count).map_err(|e| decode_error(col, e)))
        .transpose()
}

pub(crate) fn try_get_timestamp(row: &PgRow, col: &str) -> Result<Timestamp, sqlx::Error> {
    Ok(row.try_get::<SqlxTimestamp, _>(col)?.to_jiff())
}

pub(crate) fn try_get_optional_timestamp(
    row: &PgRow,
    col: &str,
) -> Result<Option<Timestamp>, sqlx::Error> {
    Ok(row
        .try_get::<Option<SqlxTimestamp>, _>(col)?
        .map(SqlxTimestamp::to_jiff))
}

/// Decode a text column into an enum with a `FromStr` implementation.
pub(crate) fn try_get_parsed<T>(row: &PgRow, col: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.try_get(col)?;

    raw.parse::<T>().map_err(|e| decode_error(col, e))
}

pub(crate) fn try_i64_from_u64(value: u64, column: &'static str) -> Result<i64, sqlx::Error> {
    i64::try_from(value).map_err(|e| decode_error(column, e))
}

pub(crate) fn try_optional_i64_from_u64(
    value: Option<u64>,
    column: &'static str,
) -> Result<Option<i64>, sqlx::Error> {
    value.map(|v| try_i64_from_u64(v, column)).transpose()
}

pub(crate) fn try_i32_from_u32(value: u32, column: &'static str) -> Result<i32, sqlx::Error> {
    i32::try_from(value).map_err(|e| decode_error(column, e))
}

pub(crate) fn try_optional_i32_from_u32(
    value: Option<u32>,
    column: &'static str,
) -> Result<Option<i32>, sqlx::Error> {
    value.map(|v| try_i32_from_u32(v, column)).transpose()
}
