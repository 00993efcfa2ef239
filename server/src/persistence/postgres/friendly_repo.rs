//! Postgres-backed friendly match repository.

use squash::ordering::sort_friendly_matches;
use squash::{FriendlyMatch, NewFriendlyMatch};

use super::PostgresStore;
use crate::persistence::codec::{decode_rows, encode_sets, insert_error, FriendlyMatchRow};
use crate::persistence::traits::FriendlyMatchRepository;
use crate::persistence::PersistenceError;

impl FriendlyMatchRepository for PostgresStore {
    async fn list_friendly_matches(&self) -> Result<Vec<FriendlyMatch>, PersistenceError> {
        let rows: Vec<FriendlyMatchRow> = sqlx::query_as(
            r#"
            SELECT id, player_a_id, player_b_id, sets, status, reported_by,
                   confirmed_by, played_at, created_at
            FROM friendly_matches
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        let mut matches = decode_rows(rows, FriendlyMatchRow::into_friendly_match)?;
        sort_friendly_matches(&mut matches);
        Ok(matches)
    }

    async fn get_friendly_match(&self, id: &str) -> Result<Option<FriendlyMatch>, PersistenceError> {
        let row: Option<FriendlyMatchRow> = sqlx::query_as(
            r#"
            SELECT id, player_a_id, player_b_id, sets, status, reported_by,
                   confirmed_by, played_at, created_at
            FROM friendly_matches
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.map(FriendlyMatchRow::into_friendly_match).transpose()
    }

    async fn create_friendly_match(
        &self,
        m: NewFriendlyMatch,
    ) -> Result<FriendlyMatch, PersistenceError> {
        let m = m.into_friendly_match();

        sqlx::query(
            r#"
            INSERT INTO friendly_matches
                (id, player_a_id, player_b_id, sets, status, reported_by,
                 confirmed_by, played_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&m.id)
        .bind(&m.player_a_id)
        .bind(&m.player_b_id)
        .bind(encode_sets(&m.sets)?)
        .bind(m.status.as_str())
        .bind(&m.reported_by)
        .bind(&m.confirmed_by)
        .bind(m.played_at)
        .bind(m.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| insert_error(e, "friendly match", &m.id))?;

        Ok(m)
    }

    async fn update_friendly_match(&self, m: &FriendlyMatch) -> Result<(), PersistenceError> {
        let result = sqlx::query(
            r#"
            UPDATE friendly_matches
            SET player_a_id = $1, player_b_id = $2, sets = $3, status = $4, reported_by = $5,
                confirmed_by = $6, played_at = $7, created_at = $8
            WHERE id = $9
            "#,
        )
        .bind(&m.player_a_id)
        .bind(&m.player_b_id)
        .bind(encode_sets(&m.sets)?)
        .bind(m.status.as_str())
        .bind(&m.reported_by)
        .bind(&m.confirmed_by)
        .bind(m.played_at)
        .bind(m.created_at)
        .bind(&m.id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("friendly match", &m.id));
        }
        Ok(())
    }
}
