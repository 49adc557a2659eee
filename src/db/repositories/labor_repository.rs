use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::db::repositories::parsed_column;
use crate::error::{AppError, AppResult};
use crate::models::labor::Labor;

const BASE_SELECT: &str = r#"
    SELECT
        id,
        workplace_id,
        name,
        phone,
        daily_wage,
        created_at
    FROM labors
"#;

impl TryFrom<&Row<'_>> for Labor {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            workplace_id: row.get("workplace_id")?,
            name: row.get("name")?,
            phone: row.get("phone")?,
            daily_wage: parsed_column(row, "daily_wage")?,
            created_at: row.get("created_at")?,
        })
    }
}

pub struct LaborRepository;

impl LaborRepository {
    pub fn list(conn: &Connection) -> AppResult<Vec<Labor>> {
        let mut stmt = conn.prepare(&format!("{BASE_SELECT} ORDER BY created_at DESC"))?;

        let rows = stmt
            .query_map([], |row| Labor::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<Labor>> {
        let mut stmt = conn.prepare(&format!("{BASE_SELECT} WHERE id = ?1"))?;

        let row = stmt.query_row([id], |row| Labor::try_from(row)).optional()?;

        Ok(row)
    }

    pub fn insert(conn: &Connection, labor: &Labor) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO labors (id, workplace_id, name, phone, daily_wage, created_at)
                VALUES (:id, :workplace_id, :name, :phone, :daily_wage, :created_at)
            "#,
            named_params! {
                ":id": &labor.id,
                ":workplace_id": &labor.workplace_id,
                ":name": &labor.name,
                ":phone": &labor.phone,
                ":daily_wage": labor.daily_wage.to_string(),
                ":created_at": &labor.created_at,
            },
        )?;

        Ok(())
    }

    /// Wage changes here do not touch historical attendance rows; their
    /// `wage` stays as snapshotted at mark time.
    pub fn update(conn: &Connection, labor: &Labor) -> AppResult<()> {
        let affected = conn.execute(
            r#"
                UPDATE labors SET
                    name = :name,
                    phone = :phone,
                    daily_wage = :daily_wage
                WHERE id = :id
            "#,
            named_params! {
                ":id": &labor.id,
                ":name": &labor.name,
                ":phone": &labor.phone,
                ":daily_wage": labor.daily_wage.to_string(),
            },
        )?;

        if affected == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    pub fn delete(conn: &Connection, id: &str) -> AppResult<()> {
        let affected = conn.execute("DELETE FROM labors WHERE id = ?1", [id])?;
        if affected == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    pub fn delete_all(conn: &Connection) -> AppResult<()> {
        conn.execute("DELETE FROM labors", [])?;
        Ok(())
    }
}
