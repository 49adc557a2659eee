use std::error::Error;
use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::Row;

pub mod attendance_repository;
pub mod labor_repository;
pub mod payment_repository;
pub mod settings_repository;
pub mod workplace_repository;

/// Reads a TEXT column and parses it into `T`. Decimal amounts and the
/// status/type enums are stored as their string forms; a value that fails to
/// parse is a corrupt row and surfaces as a conversion error.
pub(crate) fn parsed_column<T>(row: &Row<'_>, column: &str) -> Result<T, rusqlite::Error>
where
    T: FromStr,
    T::Err: Error + Send + Sync + 'static,
{
    let raw: String = row.get(column)?;
    raw.parse::<T>()
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(err)))
}
