//! SQLite-backed join request repository.

use squash::ordering::sort_join_requests;
use squash::{JoinRequestStatus, LeagueJoinRequest, NewJoinRequest};

use super::SqliteStore;
use crate::persistence::codec::{decode_rows, insert_error, JoinRequestRow};
use crate::persistence::traits::JoinRequestRepository;
use crate::persistence::PersistenceError;

impl JoinRequestRepository for SqliteStore {
    async fn create_join_request(
        &self,
        request: NewJoinRequest,
    ) -> Result<LeagueJoinRequest, PersistenceError> {
        let request = request.into_join_request();

        sqlx::query(
            r#"
            INSERT INTO league_join_requests
                (id, league_id, user_id, status, decided_by, decided_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
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
            WHERE league_id = ?
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
            WHERE id = ?
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
            SET league_id = ?, user_id = ?, status = ?, decided_by = ?, decided_at = ?,
                created_at = ?
            WHERE id = ?
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
            WHERE league_id = ? AND user_id = ? AND status = ?
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
