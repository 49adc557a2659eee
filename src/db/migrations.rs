use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::info;

use crate::error::AppResult;

pub fn run(conn: &Connection) -> AppResult<()> {
    // Ensure migration history table exists
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS migration_history (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL,
            rollback_sql TEXT
        );
        "#,
    )?;

    let current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if current_version < 1 {
        info!(target: "app::db", version = current_version, "running migration v1");
        migrate_to_v1(conn)?;
        conn.execute("PRAGMA user_version = 1", [])?;
        record_migration(
            conn,
            1,
            "Scope labors, attendance and payments to workplaces",
            None,
        )?;
    }

    Ok(())
}

/// Upgrades a database written before workplaces existed: all records get
/// attached to a freshly created default workplace and the three child
/// tables are rebuilt with a `workplace_id` column and cascade rules. On a
/// database that already carries the column this only creates the indexes.
fn migrate_to_v1(conn: &Connection) -> AppResult<()> {
    if !table_has_column(conn, "labors", "workplace_id")? {
        rebuild_legacy_tables(conn)?;
    }

    conn.execute_batch(
        r#"
        CREATE INDEX IF NOT EXISTS idx_labors_workplace ON labors (workplace_id);
        CREATE INDEX IF NOT EXISTS idx_attendance_workplace ON attendance_records (workplace_id);
        CREATE INDEX IF NOT EXISTS idx_attendance_labor ON attendance_records (labor_id);
        CREATE INDEX IF NOT EXISTS idx_attendance_date ON attendance_records (date);
        CREATE INDEX IF NOT EXISTS idx_payments_workplace ON payment_records (workplace_id);
        CREATE INDEX IF NOT EXISTS idx_payments_labor ON payment_records (labor_id);
        CREATE INDEX IF NOT EXISTS idx_payments_date ON payment_records (date);
        "#,
    )?;

    Ok(())
}

fn rebuild_legacy_tables(conn: &Connection) -> AppResult<()> {
    let workplace_id = uuid::Uuid::new_v4().to_string();
    info!(
        target: "app::db",
        workplace_id = %workplace_id,
        "attaching legacy records to a default workplace"
    );

    // Table renames must not rewrite the foreign key clauses of the other
    // tables mid-rebuild, and the half-rebuilt state must not trip FK
    // enforcement.
    conn.pragma_update(None, "foreign_keys", &0)?;
    conn.pragma_update(None, "legacy_alter_table", &1)?;

    let result = (|| -> AppResult<()> {
        conn.execute(
            "INSERT INTO workplaces (id, name, description, is_active, created_at)
             VALUES (?1, 'Default Workplace', NULL, 1, ?2)",
            params![workplace_id, Utc::now()],
        )?;

        conn.execute_batch(
            r#"
            ALTER TABLE attendance_records RENAME TO attendance_records_legacy;
            CREATE TABLE attendance_records (
                id TEXT PRIMARY KEY,
                workplace_id TEXT NOT NULL REFERENCES workplaces (id) ON DELETE CASCADE,
                labor_id TEXT NOT NULL REFERENCES labors (id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                status TEXT NOT NULL CHECK (status IN ('present', 'absent', 'half')),
                wage TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (labor_id, date)
            );

            ALTER TABLE payment_records RENAME TO payment_records_legacy;
            CREATE TABLE payment_records (
                id TEXT PRIMARY KEY,
                workplace_id TEXT NOT NULL REFERENCES workplaces (id) ON DELETE CASCADE,
                labor_id TEXT NOT NULL REFERENCES labors (id) ON DELETE CASCADE,
                amount TEXT NOT NULL,
                date TEXT NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('daily', 'weekly', 'monthly', 'partial')),
                notes TEXT,
                created_at TEXT NOT NULL
            );

            ALTER TABLE labors RENAME TO labors_legacy;
            CREATE TABLE labors (
                id TEXT PRIMARY KEY,
                workplace_id TEXT NOT NULL REFERENCES workplaces (id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                phone TEXT NOT NULL,
                daily_wage TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )?;

        conn.execute(
            "INSERT INTO labors (id, workplace_id, name, phone, daily_wage, created_at)
             SELECT id, ?1, name, phone, CAST(daily_wage AS TEXT), created_at
             FROM labors_legacy",
            params![workplace_id],
        )?;
        conn.execute(
            "INSERT INTO attendance_records (id, workplace_id, labor_id, date, status, wage, created_at)
             SELECT id, ?1, labor_id, date, status, CAST(wage AS TEXT), created_at
             FROM attendance_records_legacy",
            params![workplace_id],
        )?;
        conn.execute(
            "INSERT INTO payment_records (id, workplace_id, labor_id, amount, date, type, notes, created_at)
             SELECT id, ?1, labor_id, CAST(amount AS TEXT), date, type, notes, created_at
             FROM payment_records_legacy",
            params![workplace_id],
        )?;

        conn.execute_batch(
            r#"
            DROP TABLE attendance_records_legacy;
            DROP TABLE payment_records_legacy;
            DROP TABLE labors_legacy;
            "#,
        )?;

        if !table_has_column(conn, "app_settings", "active_workplace_id")? {
            conn.execute_batch(
                "ALTER TABLE app_settings
                 ADD COLUMN active_workplace_id TEXT REFERENCES workplaces (id) ON DELETE SET NULL;",
            )?;
        }
        conn.execute(
            "UPDATE app_settings SET active_workplace_id = ?1 WHERE id = 1",
            params![workplace_id],
        )?;

        Ok(())
    })();

    conn.pragma_update(None, "legacy_alter_table", &0)?;
    conn.pragma_update(None, "foreign_keys", &1)?;

    result
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> AppResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn record_migration(
    conn: &Connection,
    version: i32,
    description: &str,
    rollback_sql: Option<&str>,
) -> AppResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO migration_history (version, description, applied_at, rollback_sql)
         VALUES (?1, ?2, ?3, ?4)",
        params![version, description, Utc::now().to_rfc3339(), rollback_sql],
    )?;
    Ok(())
}
