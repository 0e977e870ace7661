//! # Item Row Repository
//!
//! Owner-scoped storage for the `items` table.
//!
//! ## Upsert Semantics
//! ```text
//! upsert_many([row1, row2, ...])        one transaction per call
//!     │
//!     ├── (id, owner_id) absent  → INSERT
//!     └── (id, owner_id) present → UPDATE every column, deleted_at = NULL
//! ```
//!
//! A batch either lands completely or not at all. Re-upserting a
//! soft-deleted row brings it back.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use stockpile_core::{ItemFields, ItemRow};

use super::{bind_u64, column_u32, column_u64};
use crate::error::DbResult;

/// Repository for the `items` table.
#[derive(Debug, Clone)]
pub struct ItemRowRepository {
    pool: SqlitePool,
}

impl ItemRowRepository {
    /// Creates a new ItemRowRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRowRepository { pool }
    }

    /// Inserts or overwrites every row in `rows` inside one transaction.
    pub async fn upsert_many(&self, rows: &[ItemRow]) -> DbResult<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        debug!(count = rows.len(), "Upserting item rows");

        let mut tx = self.pool.begin().await?;

        for row in rows {
            let fields = serde_json::to_string(&row.fields)?;
            let version = bind_u64("items.version", row.version)?;

            sqlx::query(
                r#"
                INSERT INTO items (
                    id, owner_id, category, sub_type, name, quantity, location,
                    fields, added_date, property_id, version, updated_at, deleted_at
                ) VALUES (
                    ?1, ?2, ?3, ?4, ?5, ?6, ?7,
                    ?8, ?9, ?10, ?11, ?12, ?13
                )
                ON CONFLICT(id, owner_id) DO UPDATE SET
                    category = excluded.category,
                    sub_type = excluded.sub_type,
                    name = excluded.name,
                    quantity = excluded.quantity,
                    location = excluded.location,
                    fields = excluded.fields,
                    added_date = excluded.added_date,
                    property_id = excluded.property_id,
                    version = excluded.version,
                    updated_at = excluded.updated_at,
                    deleted_at = excluded.deleted_at
                "#,
            )
            .bind(&row.id)
            .bind(&row.owner_id)
            .bind(&row.category)
            .bind(&row.sub_type)
            .bind(&row.name)
            .bind(i64::from(row.quantity))
            .bind(&row.location)
            .bind(fields)
            .bind(row.added_date)
            .bind(&row.property_id)
            .bind(version)
            .bind(row.updated_at)
            .bind(row.deleted_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(rows.len())
    }

    /// Lists the owner's live rows, most recently updated first.
    pub async fn list_live(&self, owner_id: &str) -> DbResult<Vec<ItemRow>> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, category, sub_type, name, quantity, location,
                   fields, added_date, property_id, version, updated_at, deleted_at
            FROM items
            WHERE owner_id = ?1 AND deleted_at IS NULL
            ORDER BY updated_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_item_row).collect()
    }

    /// Soft-deletes the owner's rows with the given ids.
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
                "UPDATE items SET deleted_at = ?1 WHERE id = ?2 AND owner_id = ?3 AND deleted_at IS NULL",
            )
            .bind(at)
            .bind(id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;
            affected += result.rows_affected();
        }

        tx.commit().await?;
        debug!(owner_id = %owner_id, affected, "Soft-deleted item rows");
        Ok(affected)
    }

    /// Counts the owner's live rows.
    pub async fn count_live(&self, owner_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM items WHERE owner_id = ?1 AND deleted_at IS NULL",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

fn map_item_row(row: &SqliteRow) -> DbResult<ItemRow> {
    let fields_json: String = row.try_get("fields")?;
    let fields: ItemFields = serde_json::from_str(&fields_json)?;

    Ok(ItemRow {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        category: row.try_get("category")?,
        sub_type: row.try_get("sub_type")?,
        name: row.try_get("name")?,
        quantity: column_u32("items.quantity", row.try_get("quantity")?)?,
        location: row.try_get("location")?,
        fields,
        added_date: row.try_get("added_date")?,
        property_id: row.try_get("property_id")?,
        version: column_u64("items.version", row.try_get("version")?)?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get("deleted_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;
    use stockpile_core::Item;

    fn row(name: &str, owner: &str, at: DateTime<Utc>) -> ItemRow {
        let mut item = Item::new("food", name);
        item.fields.notes = Some("pantry".into());
        ItemRow::for_push(&item, owner, at)
    }

    #[tokio::test]
    async fn test_upsert_and_list_live() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.items();
        let now = Utc::now();

        let older = row("Rice", "alice", now - Duration::seconds(10));
        let newer = row("Beans", "alice", now);
        let other = row("Salt", "bob", now);

        assert_eq!(repo.upsert_many(&[older.clone(), newer.clone(), other]).await.unwrap(), 3);

        let live = repo.list_live("alice").await.unwrap();
        assert_eq!(live.len(), 2);
        assert_eq!(live[0].name, "Beans");
        assert_eq!(live[1].name, "Rice");
        assert_eq!(live[1].fields.notes.as_deref(), Some("pantry"));
        assert_eq!(live[1].version, 1);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_same_key() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.items();

        let mut r = row("Rice", "alice", Utc::now());
        repo.upsert_many(&[r.clone()]).await.unwrap();

        r.quantity = 9;
        r.version = 2;
        repo.upsert_many(&[r.clone()]).await.unwrap();

        let live = repo.list_live("alice").await.unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].quantity, 9);
        assert_eq!(live[0].version, 2);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_row() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.items();

        let r = row("Rice", "alice", Utc::now());
        repo.upsert_many(&[r.clone()]).await.unwrap();

        let n = repo.soft_delete("alice", &[r.id.clone()], Utc::now()).await.unwrap();
        assert_eq!(n, 1);
        assert_eq!(repo.count_live("alice").await.unwrap(), 0);

        // Upserting again brings it back.
        repo.upsert_many(&[r]).await.unwrap();
        assert_eq!(repo.count_live("alice").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected_by_check() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut r = row("Rice", "alice", Utc::now());
        r.quantity = 0;

        let err = db.items().upsert_many(&[r]).await.unwrap_err();
        assert!(matches!(err, crate::DbError::ConstraintViolation(_)));
    }
}
