use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::db::repositories::parsed_column;
use crate::error::{AppError, AppResult};
use crate::models::payment::PaymentRecord;

const BASE_SELECT: &str = r#"
    SELECT
        id,
        workplace_id,
        labor_id,
        amount,
        date,
        type,
        notes,
        created_at
    FROM payment_records
"#;

impl TryFrom<&Row<'_>> for PaymentRecord {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            workplace_id: row.get("workplace_id")?,
            labor_id: row.get("labor_id")?,
            amount: parsed_column(row, "amount")?,
            date: row.get("date")?,
            payment_type: parsed_column(row, "type")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
        })
    }
}

pub struct PaymentRepository;

impl PaymentRepository {
    pub fn list(conn: &Connection) -> AppResult<Vec<PaymentRecord>> {
        let mut stmt = conn.prepare(&format!("{BASE_SELECT} ORDER BY date DESC, created_at DESC"))?;

        let rows = stmt
            .query_map([], |row| PaymentRecord::try_from(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> AppResult<Option<PaymentRecord>> {
        let mut stmt = conn.prepare(&format!("{BASE_SELECT} WHERE id = ?1"))?;

        let row = stmt
            .query_row([id], |row| PaymentRecord::try_from(row))
            .optional()?;

        Ok(row)
    }

    /// Plain append; several payments may share a labor and date.
    pub fn insert(conn: &Connection, payment: &PaymentRecord) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO payment_records
                    (id, workplace_id, labor_id, amount, date, type, notes, created_at)
                VALUES
                    (:id, :workplace_id, :labor_id, :amount, :date, :type, :notes, :created_at)
            "#,
            named_params! {
                ":id": &payment.id,
                ":workplace_id": &payment.workplace_id,
                ":labor_id": &payment.labor_id,
                ":amount": payment.amount.to_string(),
                ":date": &payment.date,
                ":type": payment.payment_type.as_str(),
                ":notes": &payment.notes,
                ":created_at": &payment.created_at,
            },
        )?;

        Ok(())
    }

    pub fn update(conn: &Connection, payment: &PaymentRecord) -> AppResult<()> {
        let affected = conn.execute(
            r#"
                UPDATE payment_records SET
                    amount = :amount,
                    date = :date,
                    type = :type,
                    notes = :notes
                WHERE id = :id
            "#,
            named_params! {
                ":id": &payment.id,
                ":amount": payment.amount.to_string(),
                ":date": &payment.date,
                ":type": payment.payment_type.as_str(),
                ":notes": &payment.notes,
            },
        )?;

        if affected == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    pub fn delete(conn: &Connection, id: &str) -> AppResult<()> {
        let affected = conn.execute("DELETE FROM payment_records WHERE id = ?1", [id])?;
        if affected == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    pub fn delete_all(conn: &Connection) -> AppResult<()> {
        conn.execute("DELETE FROM payment_records", [])?;
        Ok(())
    }
}
