use squash::{JoinRequestStatus, LeagueJoinRequest, NewJoinRequest, User};

use super::{LeagueService, ServiceError};
use crate::persistence::Store;

/// Result of asking to join a league.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    AlreadyMember,
    /// An earlier request is still waiting; nothing new was stored.
    AlreadyPending,
    Requested(LeagueJoinRequest),
}

impl<S: Store> LeagueService<S> {
    pub async fn request_to_join(
        &self,
        actor: &User,
        league_id: &str,
    ) -> Result<JoinOutcome, ServiceError> {
        let league = self.store.require_league(league_id).await?;
        if league.is_member(&actor.id) {
            return Ok(JoinOutcome::AlreadyMember);
        }
        if self
            .store
            .has_pending_join_request(league_id, &actor.id)
            .await?
        {
            tracing::debug!(league_id, user_id = %actor.id, "Join request already pending");
            return Ok(JoinOutcome::AlreadyPending);
        }
        let request = self
            .store
            .create_join_request(NewJoinRequest::pending(league_id, actor.id.clone()))
            .await?;
        tracing::info!(league_id, user_id = %actor.id, request_id = %request.id, "Join request created");
        Ok(JoinOutcome::Requested(request))
    }

    /// Newest first. Managers only.
    pub async fn list_join_requests(
        &self,
        actor: &User,
        league_id: &str,
    ) -> Result<Vec<LeagueJoinRequest>, ServiceError> {
        self.managed_league(actor, league_id).await?;
        Ok(self.store.list_join_requests(league_id).await?)
    }

    /// Adds the requester to the league unless they already belong to it.
    pub async fn approve_join_request(
        &self,
        actor: &User,
        league_id: &str,
        request_id: &str,
    ) -> Result<LeagueJoinRequest, ServiceError> {
        let league = self.managed_league(actor, league_id).await?;
        let mut request = self.pending_request(league_id, request_id).await?;
        if !league.is_member(&request.user_id) {
            self.store.add_player(league_id, &request.user_id).await?;
        }
        self.decide(actor, &mut request, JoinRequestStatus::Approved)
            .await?;
        Ok(request)
    }

    pub async fn reject_join_request(
        &self,
        actor: &User,
        league_id: &str,
        request_id: &str,
    ) -> Result<LeagueJoinRequest, ServiceError> {
        self.managed_league(actor, league_id).await?;
        let mut request = self.pending_request(league_id, request_id).await?;
        self.decide(actor, &mut request, JoinRequestStatus::Rejected)
            .await?;
        Ok(request)
    }

    async fn pending_request(
        &self,
        league_id: &str,
        request_id: &str,
    ) -> Result<LeagueJoinRequest, ServiceError> {
        let request = self
            .store
            .get_join_request(request_id)
            .await?
            .filter(|r| r.league_id == league_id)
            .ok_or_else(|| ServiceError::not_found("join request", request_id))?;
        if !request.is_pending() {
            return Err(ServiceError::Validation(format!(
                "join request {request_id} is already {}",
                request.status
            )));
        }
        Ok(request)
    }

    async fn decide(
        &self,
        actor: &User,
        request: &mut LeagueJoinRequest,
        status: JoinRequestStatus,
    ) -> Result<(), ServiceError> {
        request.status = status;
        request.decided_by = Some(actor.id.clone());
        request.decided_at = Some(squash::model::now());
        self.store.update_join_request(request).await?;
        tracing::info!(
            league_id = %request.league_id,
            request_id = %request.id,
            user_id = %request.user_id,
            %status,
            by = %actor.id,
            "Join request decided"
        );
        Ok(())
    }
}
