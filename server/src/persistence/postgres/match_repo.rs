//! Postgres-backed league match repository.

use squash::ordering::sort_matches;
use squash::{Match, NewMatch};

use super::PostgresStore;
use crate::persistence::codec::{decode_rows, encode_sets, insert_error, MatchRow};
use crate::persistence::traits::MatchRepository;
use crate::persistence::PersistenceError;

impl MatchRepository for PostgresStore {
    async fn list_matches(&self, league_id: &str) -> Result<Vec<Match>, PersistenceError> {
        let rows: Vec<MatchRow> = sqlx::query_as(
            r#"
            SELECT id, league_id, player_a_id, player_b_id, sets, status,
                   reported_by, confirmed_by, created_at
            FROM matches
            WHERE league_id = $1
            "#,
        )
        .bind(league_id)
        .fetch_all(self.pool())
        .await?;

        let mut matches = decode_rows(rows, MatchRow::into_match)?;
        sort_matches(&mut matches);
        Ok(matches)
    }

    async fn list_all_matches(&self) -> Result<Vec<Match>, PersistenceError> {
        let rows: Vec<MatchRow> = sqlx::query_as(
            r#"
            SELECT id, league_id, player_a_id, player_b_id, sets, status,
                   reported_by, confirmed_by, created_at
            FROM matches
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        let mut matches = decode_rows(rows, MatchRow::into_match)?;
        sort_matches(&mut matches);
        Ok(matches)
    }

    async fn get_match(&self, id: &str) -> Result<Option<Match>, PersistenceError> {
        let row: Option<MatchRow> = sqlx::query_as(
            r#"
            SELECT id, league_id, player_a_id, player_b_id, sets, status,
                   reported_by, confirmed_by, created_at
            FROM matches
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.map(MatchRow::into_match).transpose()
    }

    async fn create_match(&self, m: NewMatch) -> Result<Match, PersistenceError> {
        let m = m.into_match();

        sqlx::query(
            r#"
            INSERT INTO matches
                (id, league_id, player_a_id, player_b_id, sets, status,
                 reported_by, confirmed_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&m.id)
        .bind(&m.league_id)
        .bind(&m.player_a_id)
        .bind(&m.player_b_id)
        .bind(encode_sets(&m.sets)?)
        .bind(m.status.as_str())
        .bind(&m.reported_by)
        .bind(&m.confirmed_by)
        .bind(m.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| insert_error(e, "match", &m.id))?;

        Ok(m)
    }

    async fn update_match(&self, m: &Match) -> Result<(), PersistenceError> {
        let result = sqlx::query(
            r#"
            UPDATE matches
            SET league_id = $1, player_a_id = $2, player_b_id = $3, sets = $4, status = $5,
                reported_by = $6, confirmed_by = $7, created_at = $8
            WHERE id = $9
            "#,
        )
        .bind(&m.league_id)
        .bind(&m.player_a_id)
        .bind(&m.player_b_id)
        .bind(encode_sets(&m.sets)?)
        .bind(m.status.as_str())
        .bind(&m.reported_by)
        .bind(&m.confirmed_by)
        .bind(m.created_at)
        .bind(&m.id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("match", &m.id));
        }
        Ok(())
    }
}
