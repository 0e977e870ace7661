//! # Profile Repository
//!
//! One row per owner in the `profiles` table, keyed by the owner id.
//!
//! Rows are created when an account signs up (`ensure`); a push only ever
//! updates an existing row. Updating a missing row affects zero rows and is
//! not an error.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use stockpile_core::{ProfilePatch, ProfileRow};

use super::column_u32;
use crate::error::DbResult;

/// Repository for the `profiles` table.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    /// Creates a new ProfileRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProfileRepository { pool }
    }

    /// Fetches the owner's profile row.
    pub async fn get(&self, owner_id: &str) -> DbResult<Option<ProfileRow>> {
        let row = sqlx::query(
            r#"
            SELECT id, climate, people, prop_address, active_property_id, updated_at
            FROM profiles
            WHERE id = ?1
            "#,
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_profile_row).transpose()
    }

    /// Creates an empty profile row for the owner if none exists.
    pub async fn ensure(&self, owner_id: &str) -> DbResult<()> {
        sqlx::query("INSERT OR IGNORE INTO profiles (id) VALUES (?1)")
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Applies `patch` to the owner's row. Returns the number of rows updated.
    pub async fn update(&self, owner_id: &str, patch: &ProfilePatch) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE profiles SET
                climate = ?1,
                people = ?2,
                prop_address = ?3,
                active_property_id = ?4,
                updated_at = ?5
            WHERE id = ?6
            "#,
        )
        .bind(&patch.climate)
        .bind(i64::from(patch.people))
        .bind(&patch.prop_address)
        .bind(&patch.active_property_id)
        .bind(patch.updated_at)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        debug!(owner_id = %owner_id, rows = result.rows_affected(), "Profile updated");
        Ok(result.rows_affected())
    }
}

fn map_profile_row(row: &SqliteRow) -> DbResult<ProfileRow> {
    let people: Option<i64> = row.try_get("people")?;

    Ok(ProfileRow {
        id: row.try_get("id")?,
        climate: row.try_get("climate")?,
        people: people.map(|p| column_u32("profiles.people", p)).transpose()?,
        prop_address: row.try_get("prop_address")?,
        active_property_id: row.try_get("active_property_id")?,
        updated_at: row.try_get("updated_at")?,
    })
}
