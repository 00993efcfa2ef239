//! Postgres-backed join request repository.

use squash::ordering::sort_join_requests;
use squash::{JoinRequestStatus, LeagueJoinRequest, NewJoinRequest};

use super::PostgresStore;
use crate::persistence::codec::{decode_rows, insert_error, JoinRequestRow};
use crate::persistence::traits::JoinRequestRepository;
use crate::persistence::PersistenceError;

impl JoinRequestRepository for PostgresStore {
    async fn create_join_request(
        &self,
        request: NewJoinRequest,
    ) -> Result<LeagueJoinRequest, PersistenceError> {
        let request = request.into_join_request();

        sqlx::query(
            r#"
            INSERT INTO league_join_requests
                (id, league_id, user_id, status, decided_by, decided_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&request.id)
        .bind(&request.league_id)
        .bind(&request.user_id)
        .bind(request.status.as_str())
        .bind(&request.decided_by)
        .bind(request.decided_at)
        .bind(request.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| insert_error(e, "join request", &request.id))?;

        Ok(request)
    }

    async fn list_join_requests(
        &self,
        league_id: &str,
    ) -> Result<Vec<LeagueJoinRequest>, PersistenceError> {
        let rows: Vec<JoinRequestRow> = sqlx::query_as(
            r#"
            SELECT id, league_id, user_id, status, decided_by, decided_at, created_at
            FROM league_join_requests
            WHERE league_id = $1
            "#,
        )
        .bind(league_id)
        .fetch_all(self.pool())
        .await?;

        let mut requests = decode_rows(rows, JoinRequestRow::into_join_request)?;
        sort_join_requests(&mut requests);
        Ok(requests)
    }

    async fn get_join_request(
        &self,
        id: &str,
    ) -> Result<Option<LeagueJoinRequest>, PersistenceError> {
        let row: Option<JoinRequestRow> = sqlx::query_as(
            r#"
            SELECT id, league_id, user_id, status, decided_by, decided_at, created_at
            FROM league_join_requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.map(JoinRequestRow::into_join_request).transpose()
    }

    async fn update_join_request(&self, request: &LeagueJoinRequest) -> Result<(), PersistenceError> {
        let result = sqlx::query(
            r#"
            UPDATE league_join_requests
            SET league_id = $1, user_id = $2, status = $3, decided_by = $4, decided_at = $5,
                created_at = $6
            WHERE id = $7
            "#,
        )
        .bind(&request.league_id)
        .bind(&request.user_id)
        .bind(request.status.as_str())
        .bind(&request.decided_by)
        .bind(request.decided_at)
        .bind(request.created_at)
        .bind(&request.id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("join request", &request.id));
        }
        Ok(())
    }

    async fn has_pending_join_request(
        &self,
        league_id: &str,
        user_id: &str,
    ) -> Result<bool, PersistenceError> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM league_join_requests
            WHERE league_id = $1 AND user_id = $2 AND status = $3
            "#,
        )
        .bind(league_id)
        .bind(user_id)
        .bind(JoinRequestStatus::Pending.as_str())
        .fetch_one(self.pool())
        .await?;

        Ok(count > 0)
    }
}
