//! Postgres-backed league repository.
//!
//! Membership operations use the read-modify-write defaults from
//! [`LeagueRepository`].

use squash::ordering::sort_leagues;
use squash::{League, NewLeague};

use super::PostgresStore;
use crate::persistence::codec::{
    decode_rows, encode_admin_roles, encode_player_ids, encode_sets_per_match, insert_error,
    LeagueRow,
};
use crate::persistence::traits::LeagueRepository;
use crate::persistence::PersistenceError;

impl LeagueRepository for PostgresStore {
    async fn list_leagues(&self) -> Result<Vec<League>, PersistenceError> {
        let rows: Vec<LeagueRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, location, owner_id, admin_roles, player_ids,
                   sets_per_match, start_date, end_date, status, created_at
            FROM leagues
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        let mut leagues = decode_rows(rows, LeagueRow::into_league)?;
        sort_leagues(&mut leagues);
        Ok(leagues)
    }

    async fn get_league(&self, id: &str) -> Result<Option<League>, PersistenceError> {
        let row: Option<LeagueRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, location, owner_id, admin_roles, player_ids,
                   sets_per_match, start_date, end_date, status, created_at
            FROM leagues
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.map(LeagueRow::into_league).transpose()
    }

    async fn create_league(&self, league: NewLeague) -> Result<League, PersistenceError> {
        let league = league.into_league();

        sqlx::query(
            r#"
            INSERT INTO leagues
                (id, name, description, location, owner_id, admin_roles, player_ids,
                 sets_per_match, start_date, end_date, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(&league.id)
        .bind(&league.name)
        .bind(&league.description)
        .bind(&league.location)
        .bind(&league.owner_id)
        .bind(encode_admin_roles(&league.admin_roles)?)
        .bind(encode_player_ids(&league.player_ids)?)
        .bind(encode_sets_per_match(league.sets_per_match))
        .bind(league.start_date)
        .bind(league.end_date)
        .bind(league.status.as_str())
        .bind(league.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| insert_error(e, "league", &league.id))?;

        Ok(league)
    }

    async fn update_league(&self, league: &League) -> Result<(), PersistenceError> {
        let result = sqlx::query(
            r#"
            UPDATE leagues
            SET name = $1, description = $2, location = $3, owner_id = $4, admin_roles = $5,
                player_ids = $6, sets_per_match = $7, start_date = $8, end_date = $9,
                status = $10, created_at = $11
            WHERE id = $12
            "#,
        )
        .bind(&league.name)
        .bind(&league.description)
        .bind(&league.location)
        .bind(&league.owner_id)
        .bind(encode_admin_roles(&league.admin_roles)?)
        .bind(encode_player_ids(&league.player_ids)?)
        .bind(encode_sets_per_match(league.sets_per_match))
        .bind(league.start_date)
        .bind(league.end_date)
        .bind(league.status.as_str())
        .bind(league.created_at)
        .bind(&league.id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("league", &league.id));
        }
        Ok(())
    }
}

