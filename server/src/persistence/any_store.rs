//! Runtime choice between the three backends, dispatched statically.

use squash::{
    FriendlyMatch, League, LeagueAdminRole, LeagueJoinRequest, Match, NewFriendlyMatch,
    NewJoinRequest, NewLeague, NewMatch, NewReport, NewUser, Report, User,
};

use super::traits::{
    FriendlyMatchRepository, JoinRequestRepository, LeagueRepository, MatchRepository,
    ReportRepository, UserRepository,
};
use super::{MemoryStore, PersistenceError, PostgresStore, SqliteStore};

#[derive(Debug)]
pub enum AnyStore {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
    Postgres(PostgresStore),
}

impl AnyStore {
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Sqlite(_) => "sqlite",
            Self::Postgres(_) => "postgres",
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            AnyStore::Memory($store) => $call,
            AnyStore::Sqlite($store) => $call,
            AnyStore::Postgres($store) => $call,
        }
    };
}

impl UserRepository for AnyStore {
    async fn list_users(&self) -> Result<Vec<User>, PersistenceError> {
        dispatch!(self, s => s.list_users().await)
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, PersistenceError> {
        dispatch!(self, s => s.get_user(id).await)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, PersistenceError> {
        dispatch!(self, s => s.get_user_by_email(email).await)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, PersistenceError> {
        dispatch!(self, s => s.create_user(user).await)
    }
}

impl LeagueRepository for AnyStore {
    async fn list_leagues(&self) -> Result<Vec<League>, PersistenceError> {
        dispatch!(self, s => s.list_leagues().await)
    }

    async fn get_league(&self, id: &str) -> Result<Option<League>, PersistenceError> {
        dispatch!(self, s => s.get_league(id).await)
    }

    async fn create_league(&self, league: NewLeague) -> Result<League, PersistenceError> {
        dispatch!(self, s => s.create_league(league).await)
    }

    async fn update_league(&self, league: &League) -> Result<(), PersistenceError> {
        dispatch!(self, s => s.update_league(league).await)
    }

    async fn add_player(&self, league_id: &str, user_id: &str) -> Result<League, PersistenceError> {
        dispatch!(self, s => s.add_player(league_id, user_id).await)
    }

    async fn add_admin(
        &self,
        league_id: &str,
        user_id: &str,
        role: LeagueAdminRole,
    ) -> Result<League, PersistenceError> {
        dispatch!(self, s => s.add_admin(league_id, user_id, role).await)
    }

    async fn update_admin_role(
        &self,
        league_id: &str,
        user_id: &str,
        role: LeagueAdminRole,
    ) -> Result<League, PersistenceError> {
        dispatch!(self, s => s.update_admin_role(league_id, user_id, role).await)
    }

    async fn remove_admin(&self, league_id: &str, user_id: &str) -> Result<League, PersistenceError> {
        dispatch!(self, s => s.remove_admin(league_id, user_id).await)
    }
}

impl JoinRequestRepository for AnyStore {
    async fn create_join_request(
        &self,
        request: NewJoinRequest,
    ) -> Result<LeagueJoinRequest, PersistenceError> {
        dispatch!(self, s => s.create_join_request(request).await)
    }

    async fn list_join_requests(
        &self,
        league_id: &str,
    ) -> Result<Vec<LeagueJoinRequest>, PersistenceError> {
        dispatch!(self, s => s.list_join_requests(league_id).await)
    }

    async fn get_join_request(
        &self,
        id: &str,
    ) -> Result<Option<LeagueJoinRequest>, PersistenceError> {
        dispatch!(self, s => s.get_join_request(id).await)
    }

    async fn update_join_request(&self, request: &LeagueJoinRequest) -> Result<(), PersistenceError> {
        dispatch!(self, s => s.update_join_request(request).await)
    }

    async fn has_pending_join_request(
        &self,
        league_id: &str,
        user_id: &str,
    ) -> Result<bool, PersistenceError> {
        dispatch!(self, s => s.has_pending_join_request(league_id, user_id).await)
    }
}

impl MatchRepository for AnyStore {
    async fn list_matches(&self, league_id: &str) -> Result<Vec<Match>, PersistenceError> {
        dispatch!(self, s => s.list_matches(league_id).await)
    }

    async fn list_all_matches(&self) -> Result<Vec<Match>, PersistenceError> {
        dispatch!(self, s => s.list_all_matches().await)
    }

    async fn get_match(&self, id: &str) -> Result<Option<Match>, PersistenceError> {
        dispatch!(self, s => s.get_match(id).await)
    }

    async fn create_match(&self, m: NewMatch) -> Result<Match, PersistenceError> {
        dispatch!(self, s => s.create_match(m).await)
    }

    async fn update_match(&self, m: &Match) -> Result<(), PersistenceError> {
        dispatch!(self, s => s.update_match(m).await)
    }
}

impl FriendlyMatchRepository for AnyStore {
    async fn list_friendly_matches(&self) -> Result<Vec<FriendlyMatch>, PersistenceError> {
        dispatch!(self, s => s.list_friendly_matches().await)
    }

    async fn get_friendly_match(&self, id: &str) -> Result<Option<FriendlyMatch>, PersistenceError> {
        dispatch!(self, s => s.get_friendly_match(id).await)
    }

    async fn create_friendly_match(
        &self,
        m: NewFriendlyMatch,
    ) -> Result<FriendlyMatch, PersistenceError> {
        dispatch!(self, s => s.create_friendly_match(m).await)
    }

    async fn update_friendly_match(&self, m: &FriendlyMatch) -> Result<(), PersistenceError> {
        dispatch!(self, s => s.update_friendly_match(m).await)
    }
}

impl ReportRepository for AnyStore {
    async fn create_report(&self, report: NewReport) -> Result<Report, PersistenceError> {
        dispatch!(self, s => s.create_report(report).await)
    }

    async fn list_reports(&self) -> Result<Vec<Report>, PersistenceError> {
        dispatch!(self, s => s.list_reports().await)
    }
}
