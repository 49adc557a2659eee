use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::workplace::Workplace;

const BASE_SELECT: &str = r#"
    SELECT
        id,
        name,
        description,
        is_active,
        created_at
    FROM workplaces
"#;

impl TryFrom<&Row<'_>> for Workplace {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            is_active: row.get::<_, i64>("is_active")? != 0,
            created_at: row.get("created_at")?,
        })
    }
}

pub struct WorkplaceRepository;

impl WorkplaceRepository {
    /// `created_at DESC` is the store's default ordering; the orchestrator's
    /// active-workplace fallback picks the head of this list.
    pub fn list(conn: &Connection) -> AppResult<Vec<Workplace>> {
        let mut stmt = conn.prepare(&format!("{BASE_SELECT} ORDER BY created_at DESC"))?;

        let rows = stmt
            .query_map([], |row| Workplace::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<Workplace>> {
        let mut stmt = conn.prepare(&format!("{BASE_SELECT} WHERE id = ?1"))?;

        let row = stmt
            .query_row([id], |row| Workplace::try_from(row))
            .optional()?;

        Ok(row)
    }

    pub fn insert(conn: &Connection, workplace: &Workplace) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO workplaces (id, name, description, is_active, created_at)
                VALUES (:id, :name, :description, :is_active, :created_at)
            "#,
            named_params! {
                ":id": &workplace.id,
                ":name": &workplace.name,
                ":description": &workplace.description,
                ":is_active": workplace.is_active as i64,
                ":created_at": &workplace.created_at,
            },
        )?;

        Ok(())
    }

    pub fn update(conn: &Connection, workplace: &Workplace) -> AppResult<()> {
        let affected = conn.execute(
            r#"
                UPDATE workplaces SET
                    name = :name,
                    description = :description,
                    is_active = :is_active
                WHERE id = :id
            "#,
            named_params! {
                ":id": &workplace.id,
                ":name": &workplace.name,
                ":description": &workplace.description,
                ":is_active": workplace.is_active as i64,
            },
        )?;

        if affected == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    /// Labors, attendance and payments under the workplace cascade away with
    /// it through the schema's foreign keys.
    pub fn delete(conn: &Connection, id: &str) -> AppResult<()> {
        let affected = conn.execute("DELETE FROM workplaces WHERE id = ?1", [id])?;
        if affected == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    pub fn delete_all(conn: &Connection) -> AppResult<()> {
        conn.execute("DELETE FROM workplaces", [])?;
        Ok(())
    }
}
