use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use squash::{
    build_standings, status_for_dates, League, LeagueAdminRole, NewLeague, StandingEntry, User,
};

use super::{LeagueService, ServiceError};
use crate::persistence::Store;

pub const MIN_SETS_PER_MATCH: u8 = 1;
pub const MAX_SETS_PER_MATCH: u8 = 9;

/// Input for [`LeagueService::create_league`].
#[derive(Debug, Clone)]
pub struct CreateLeague {
    pub name: String,
    pub description: String,
    pub location: String,
    pub sets_per_match: u8,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

impl CreateLeague {
    fn validate(&self) -> Result<(), ServiceError> {
        if self.name.trim().is_empty() {
            return Err(ServiceError::Validation("league name is required".into()));
        }
        if !(MIN_SETS_PER_MATCH..=MAX_SETS_PER_MATCH).contains(&self.sets_per_match) {
            return Err(ServiceError::Validation(format!(
                "sets per match must be between {MIN_SETS_PER_MATCH} and {MAX_SETS_PER_MATCH}"
            )));
        }
        if matches!(self.end_date, Some(end) if end < self.start_date) {
            return Err(ServiceError::Validation(
                "end date is before start date".into(),
            ));
        }
        Ok(())
    }
}

impl<S: Store> LeagueService<S> {
    /// The creator owns the league and plays in it as `admin-player`.
    pub async fn create_league(
        &self,
        actor: &User,
        input: CreateLeague,
    ) -> Result<League, ServiceError> {
        input.validate()?;
        let now = squash::model::now();
        let league = self
            .store
            .create_league(NewLeague {
                id: None,
                name: input.name.trim().to_string(),
                description: input.description,
                location: input.location,
                owner_id: actor.id.clone(),
                admin_roles: BTreeMap::from([(actor.id.clone(), LeagueAdminRole::AdminPlayer)]),
                player_ids: vec![actor.id.clone()],
                sets_per_match: input.sets_per_match,
                status: status_for_dates(input.start_date, input.end_date, now),
                start_date: input.start_date,
                end_date: input.end_date,
                created_at: Some(now),
            })
            .await?;
        tracing::info!(league_id = %league.id, owner_id = %actor.id, status = %league.status, "League created");
        Ok(league)
    }

    pub(super) async fn managed_league(
        &self,
        actor: &User,
        league_id: &str,
    ) -> Result<League, ServiceError> {
        let league = self.store.require_league(league_id).await?;
        if !league.can_manage(actor) {
            return Err(ServiceError::Forbidden(format!(
                "user {} does not manage league {league_id}",
                actor.id
            )));
        }
        Ok(league)
    }

    pub async fn add_player(
        &self,
        actor: &User,
        league_id: &str,
        user_id: &str,
    ) -> Result<League, ServiceError> {
        self.managed_league(actor, league_id).await?;
        self.require_user(user_id).await?;
        let league = self.store.add_player(league_id, user_id).await?;
        tracing::info!(league_id, user_id, by = %actor.id, "Player added");
        Ok(league)
    }

    pub async fn grant_admin(
        &self,
        actor: &User,
        league_id: &str,
        user_id: &str,
        role: LeagueAdminRole,
    ) -> Result<League, ServiceError> {
        let league = self.managed_league(actor, league_id).await?;
        if league.is_owner(user_id) {
            return Err(ServiceError::Validation(
                "the league owner's admin role cannot be changed".into(),
            ));
        }
        self.require_user(user_id).await?;
        let league = self.store.add_admin(league_id, user_id, role).await?;
        tracing::info!(league_id, user_id, %role, by = %actor.id, "Admin role granted");
        Ok(league)
    }

    pub async fn change_admin_role(
        &self,
        actor: &User,
        league_id: &str,
        user_id: &str,
        role: LeagueAdminRole,
    ) -> Result<League, ServiceError> {
        self.managed_league(actor, league_id).await?;
        let league = self.store.update_admin_role(league_id, user_id, role).await?;
        tracing::info!(league_id, user_id, %role, by = %actor.id, "Admin role changed");
        Ok(league)
    }

    pub async fn revoke_admin(
        &self,
        actor: &User,
        league_id: &str,
        user_id: &str,
    ) -> Result<League, ServiceError> {
        self.managed_league(actor, league_id).await?;
        let league = self.store.remove_admin(league_id, user_id).await?;
        tracing::info!(league_id, user_id, by = %actor.id, "Admin role revoked");
        Ok(league)
    }

    /// Ending a finished league returns it unchanged.
    pub async fn end_league(&self, actor: &User, league_id: &str) -> Result<League, ServiceError> {
        let mut league = self.managed_league(actor, league_id).await?;
        if league.end(squash::model::now()) {
            self.store.update_league(&league).await?;
            tracing::info!(league_id, by = %actor.id, "League ended");
        }
        Ok(league)
    }

    pub async fn league_standings(&self, league_id: &str) -> Result<Vec<StandingEntry>, ServiceError> {
        let league = self.store.require_league(league_id).await?;
        let mut players = Vec::with_capacity(league.player_ids.len());
        for id in &league.player_ids {
            match self.store.get_user(id).await? {
                Some(user) => players.push(user),
                None => tracing::warn!(league_id, user_id = %id, "League lists an unknown player"),
            }
        }
        let matches = self.store.list_matches(league_id).await?;
        Ok(build_standings(&players, &matches))
    }
}
