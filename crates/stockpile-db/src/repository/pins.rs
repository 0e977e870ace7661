//! # Map Pin Row Repository
//!
//! Owner-scoped storage for the `map_pins` table. Same contract as the
//! items repository: batch upserts are transactional, deletes are soft.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use stockpile_core::PinRow;

use crate::error::DbResult;

/// Repository for the `map_pins` table.
#[derive(Debug, Clone)]
pub struct PinRowRepository {
    pool: SqlitePool,
}

impl PinRowRepository {
    /// Creates a new PinRowRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PinRowRepository { pool }
    }

    /// Inserts or overwrites every row in `rows` inside one transaction.
    pub async fn upsert_many(&self, rows: &[PinRow]) -> DbResult<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        debug!(count = rows.len(), "Upserting pin rows");

        let mut tx = self.pool.begin().await?;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO map_pins (
                    id, owner_id, layer, pin_type, x, y, label, notes,
                    assignee, updated_at, deleted_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                ON CONFLICT(id, owner_id) DO UPDATE SET
                    layer = excluded.layer,
                    pin_type = excluded.pin_type,
                    x = excluded.x,
                    y = excluded.y,
                    label = excluded.label,
                    notes = excluded.notes,
                    assignee = excluded.assignee,
                    updated_at = excluded.updated_at,
                    deleted_at = excluded.deleted_at
                "#,
            )
            .bind(&row.id)
            .bind(&row.owner_id)
            .bind(&row.layer)
            .bind(&row.pin_type)
            .bind(row.x)
            .bind(row.y)
            .bind(&row.label)
            .bind(&row.notes)
            .bind(&row.assignee)
            .bind(row.updated_at)
            .bind(row.deleted_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(rows.len())
    }

    /// Lists the owner's live pins, most recently updated first.
    pub async fn list_live(&self, owner_id: &str) -> DbResult<Vec<PinRow>> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, layer, pin_type, x, y, label, notes,
                   assignee, updated_at, deleted_at
            FROM map_pins
            WHERE owner_id = ?1 AND deleted_at IS NULL
            ORDER BY updated_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_pin_row).collect()
    }

    /// Soft-deletes the owner's pins with the given ids.
    pub async fn soft_delete(
        &self,
        owner_id: &str,
        ids: &[String],
        at: DateTime<Utc>,
    ) -> DbResult<u64> {
        let mut tx = self.pool.begin().await?;
        let mut affected = 0;

        for id in ids {
            let result = sqlx::query(
                "UPDATE map_pins SET deleted_at = ?1 WHERE id = ?2 AND owner_id = ?3 AND deleted_at IS NULL",
            )
            .bind(at)
            .bind(id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;
            affected += result.rows_affected();
        }

        tx.commit().await?;
        Ok(affected)
    }
}

fn map_pin_row(row: &SqliteRow) -> DbResult<PinRow> {
    Ok(PinRow {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        layer: row.try_get("layer")?,
        pin_type: row.try_get("pin_type")?,
        x: row.try_get("x")?,
        y: row.try_get("y")?,
        label: row.try_get("label")?,
        notes: row.try_get("notes")?,
        assignee: row.try_get("assignee")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get("deleted_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use stockpile_core::MapPin;

    #[tokio::test]
    async fn test_pins_round_trip_through_table() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.pins();

        let mut pin = MapPin::new("utilities", "water_shutoff", 12.5, -3.0);
        pin.assignee = Some("sam".into());
        let row = PinRow::for_push(&pin, "alice", Utc::now());

        repo.upsert_many(&[row]).await.unwrap();

        let live = repo.list_live("alice").await.unwrap();
        assert_eq!(live.len(), 1);
        let back = live[0].clone().into_pin();
        assert_eq!(back, pin);

        assert!(repo.list_live("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_soft_delete_pin() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.pins();

        let pin = MapPin::new("hazards", "gas", 0.0, 0.0);
        repo.upsert_many(&[PinRow::for_push(&pin, "alice", Utc::now())]).await.unwrap();

        let n = repo.soft_delete("alice", &[pin.id.clone()], Utc::now()).await.unwrap();
        assert_eq!(n, 1);
        assert!(repo.list_live("alice").await.unwrap().is_empty());
    }
}
