use std::convert::TryFrom;

use chrono::NaiveDate;
use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::db::repositories::parsed_column;
use crate::error::AppResult;
use crate::models::attendance::AttendanceRecord;

const BASE_SELECT: &str = r#"
    SELECT
        id,
        workplace_id,
        labor_id,
        date,
        status,
        wage,
        created_at
    FROM attendance_records
"#;

impl TryFrom<&Row<'_>> for AttendanceRecord {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            workplace_id: row.get("workplace_id")?,
            labor_id: row.get("labor_id")?,
            date: row.get("date")?,
            status: parsed_column(row, "status")?,
            wage: parsed_column(row, "wage")?,
            created_at: row.get("created_at")?,
        })
    }
}

pub struct AttendanceRepository;

impl AttendanceRepository {
    pub fn list(conn: &Connection) -> AppResult<Vec<AttendanceRecord>> {
        let mut stmt = conn.prepare(&format!("{BASE_SELECT} ORDER BY date DESC, created_at DESC"))?;

        let rows = stmt
            .query_map([], |row| AttendanceRecord::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    pub fn find_by_labor_and_date(
        conn: &Connection,
        labor_id: &str,
        date: NaiveDate,
    ) -> AppResult<Option<AttendanceRecord>> {
        let mut stmt = conn.prepare(&format!("{BASE_SELECT} WHERE labor_id = ?1 AND date = ?2"))?;

        let row = stmt
            .query_row(rusqlite::params![labor_id, date], |row| {
                AttendanceRecord::try_from(row)
            })
            .optional()?;

        Ok(row)
    }

    /// Insert-or-replace keyed by `(labor_id, date)`. Marking a day twice
    /// replaces the earlier record entirely, id included; the unique index
    /// guarantees a single row per pair, so retries are idempotent.
    pub fn upsert(conn: &Connection, record: &AttendanceRecord) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO attendance_records
                    (id, workplace_id, labor_id, date, status, wage, created_at)
                VALUES
                    (:id, :workplace_id, :labor_id, :date, :status, :wage, :created_at)
                ON CONFLICT (labor_id, date) DO UPDATE SET
                    id = excluded.id,
                    workplace_id = excluded.workplace_id,
                    status = excluded.status,
                    wage = excluded.wage,
                    created_at = excluded.created_at
            "#,
            named_params! {
                ":id": &record.id,
                ":workplace_id": &record.workplace_id,
                ":labor_id": &record.labor_id,
                ":date": &record.date,
                ":status": record.status.as_str(),
                ":wage": record.wage.to_string(),
                ":created_at": &record.created_at,
            },
        )?;

        Ok(())
    }

    pub fn delete_all(conn: &Connection) -> AppResult<()> {
        conn.execute("DELETE FROM attendance_records", [])?;
        Ok(())
    }
}
