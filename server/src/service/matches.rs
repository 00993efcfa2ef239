use squash::{
    apply_decision, awaits_decision_by, Decision, FriendlyMatch, Match, NewMatch, SetScore, User,
};

use super::{require_sets, LeagueService, ServiceError};
use crate::persistence::Store;

/// Input for [`LeagueService::report_match`].
#[derive(Debug, Clone)]
pub struct ReportMatch {
    pub player_a_id: String,
    pub player_b_id: String,
    pub sets: Vec<SetScore>,
}

/// Results waiting for one user's confirmation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingDecisions {
    pub matches: Vec<Match>,
    pub friendlies: Vec<FriendlyMatch>,
}

impl PendingDecisions {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.friendlies.is_empty()
    }
}

impl<S: Store> LeagueService<S> {
    /// Members report their own matches as player A. Managers may report
    /// any pairing.
    pub async fn report_match(
        &self,
        actor: &User,
        league_id: &str,
        input: ReportMatch,
    ) -> Result<Match, ServiceError> {
        let league = self.store.require_league(league_id).await?;
        let manager = league.can_manage(actor);
        if !manager && !league.is_member(&actor.id) {
            return Err(ServiceError::Forbidden(format!(
                "user {} is not part of league {league_id}",
                actor.id
            )));
        }
        if input.player_a_id == input.player_b_id {
            return Err(ServiceError::Validation(
                "a match needs two different players".into(),
            ));
        }
        require_sets(&input.sets)?;
        if !manager && input.player_a_id != actor.id {
            return Err(ServiceError::Forbidden(
                "members may only report their own matches".into(),
            ));
        }

        let m = self
            .store
            .create_match(NewMatch {
                id: None,
                league_id: league_id.to_string(),
                player_a_id: input.player_a_id,
                player_b_id: input.player_b_id,
                sets: input.sets,
                status: None,
                reported_by: actor.id.clone(),
                confirmed_by: None,
                created_at: None,
            })
            .await?;
        tracing::info!(league_id, match_id = %m.id, reported_by = %actor.id, "Match reported");
        Ok(m)
    }

    pub async fn confirm_match(&self, actor: &User, match_id: &str) -> Result<Match, ServiceError> {
        self.decide_match(actor, match_id, Decision::Confirm).await
    }

    pub async fn reject_match(&self, actor: &User, match_id: &str) -> Result<Match, ServiceError> {
        self.decide_match(actor, match_id, Decision::Reject).await
    }

    async fn decide_match(
        &self,
        actor: &User,
        match_id: &str,
        decision: Decision,
    ) -> Result<Match, ServiceError> {
        let mut m = self
            .store
            .get_match(match_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("match", match_id))?;
        apply_decision(&mut m, &actor.id, decision)?;
        self.store.update_match(&m).await?;
        tracing::info!(match_id, league_id = %m.league_id, status = %m.status, by = %actor.id, "Match decided");
        Ok(m)
    }

    /// League matches and friendlies the actor still has to confirm or reject.
    pub async fn pending_for(&self, actor: &User) -> Result<PendingDecisions, ServiceError> {
        let matches = self
            .store
            .list_all_matches()
            .await?
            .into_iter()
            .filter(|m| awaits_decision_by(m, &actor.id))
            .collect();
        let friendlies = self
            .store
            .list_friendly_matches()
            .await?
            .into_iter()
            .filter(|m| awaits_decision_by(m, &actor.id))
            .collect();
        Ok(PendingDecisions {
            matches,
            friendlies,
        })
    }
}
