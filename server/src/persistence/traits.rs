//! Async repository trait definitions for the storage contract.
//!
//! Each trait covers one aggregate. Every backend implements all of them and
//! so satisfies [`Store`]; callers stay generic over `S: Store` and dispatch
//! statically.
//!
//! Methods return `impl Future + Send` rather than using `async fn` so that
//! the futures are guaranteed `Send` and can be driven from `tokio::spawn`.
//!
//! Lists come back already sorted with the orderings in [`squash::ordering`].
//! `create_*` fills missing ids, timestamps and default statuses through the
//! `New*::into_*` functions. `update_*` fails with
//! [`PersistenceError::NotFound`] when the id does not exist.

use std::future::Future;

use squash::{
    FriendlyMatch, League, LeagueAdminRole, LeagueJoinRequest, Match, NewFriendlyMatch,
    NewJoinRequest, NewLeague, NewMatch, NewReport, NewUser, Report, User,
};

use super::PersistenceError;

/// Repository for user accounts.
///
/// Emails are unique by [`squash::email_key`]; `create_user` fails with
/// [`PersistenceError::DuplicateEmail`] on a clash and with
/// [`PersistenceError::DuplicateId`] when the id is taken.
pub trait UserRepository: Send + Sync {
    fn list_users(&self) -> impl Future<Output = Result<Vec<User>, PersistenceError>> + Send;
    fn get_user(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<User>, PersistenceError>> + Send;
    fn get_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, PersistenceError>> + Send;
    fn create_user(
        &self,
        user: NewUser,
    ) -> impl Future<Output = Result<User, PersistenceError>> + Send;
}

/// Repository for leagues.
///
/// The membership operations are read-modify-write on top of `get_league`
/// and `update_league`. Two concurrent writers to the same league can
/// overwrite each other; the last write wins.
pub trait LeagueRepository: Send + Sync {
    fn list_leagues(&self) -> impl Future<Output = Result<Vec<League>, PersistenceError>> + Send;
    fn get_league(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<League>, PersistenceError>> + Send;
    fn create_league(
        &self,
        league: NewLeague,
    ) -> impl Future<Output = Result<League, PersistenceError>> + Send;
    fn update_league(
        &self,
        league: &League,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;

    /// No-op when the user already plays in the league.
    fn add_player(
        &self,
        league_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<League, PersistenceError>> + Send {
        async move {
            let mut league = self.require_league(league_id).await?;
            if league.add_player(user_id) {
                self.update_league(&league).await?;
            }
            Ok(league)
        }
    }

    /// Set or overwrite a role; `admin-player` also adds the user as a player.
    fn add_admin(
        &self,
        league_id: &str,
        user_id: &str,
        role: LeagueAdminRole,
    ) -> impl Future<Output = Result<League, PersistenceError>> + Send {
        async move {
            let mut league = self.require_league(league_id).await?;
            league.grant_admin(user_id, role);
            self.update_league(&league).await?;
            Ok(league)
        }
    }

    /// Fails with `NotFound` when the user holds no admin role.
    fn update_admin_role(
        &self,
        league_id: &str,
        user_id: &str,
        role: LeagueAdminRole,
    ) -> impl Future<Output = Result<League, PersistenceError>> + Send {
        async move {
            let mut league = self.require_league(league_id).await?;
            league.update_admin_role(user_id, role)?;
            self.update_league(&league).await?;
            Ok(league)
        }
    }

    /// Fails with `NotFound` when the user holds no admin role.
    fn remove_admin(
        &self,
        league_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<League, PersistenceError>> + Send {
        async move {
            let mut league = self.require_league(league_id).await?;
            league.remove_admin(user_id)?;
            self.update_league(&league).await?;
            Ok(league)
        }
    }

    /// `get_league`, with a missing league reported as `NotFound`.
    fn require_league(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<League, PersistenceError>> + Send {
        async move {
            self.get_league(id)
                .await?
                .ok_or_else(|| PersistenceError::not_found("league", id))
        }
    }
}

/// Repository for league join requests.
pub trait JoinRequestRepository: Send + Sync {
    fn create_join_request(
        &self,
        request: NewJoinRequest,
    ) -> impl Future<Output = Result<LeagueJoinRequest, PersistenceError>> + Send;
    /// Newest first.
    fn list_join_requests(
        &self,
        league_id: &str,
    ) -> impl Future<Output = Result<Vec<LeagueJoinRequest>, PersistenceError>> + Send;
    fn get_join_request(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<LeagueJoinRequest>, PersistenceError>> + Send;
    fn update_join_request(
        &self,
        request: &LeagueJoinRequest,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
    fn has_pending_join_request(
        &self,
        league_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<bool, PersistenceError>> + Send;
}

/// Repository for league matches.
pub trait MatchRepository: Send + Sync {
    /// Matches of one league, newest first.
    fn list_matches(
        &self,
        league_id: &str,
    ) -> impl Future<Output = Result<Vec<Match>, PersistenceError>> + Send;
    /// Matches of every league, newest first.
    fn list_all_matches(&self) -> impl Future<Output = Result<Vec<Match>, PersistenceError>> + Send;
    fn get_match(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Match>, PersistenceError>> + Send;
    fn create_match(
        &self,
        m: NewMatch,
    ) -> impl Future<Output = Result<Match, PersistenceError>> + Send;
    fn update_match(&self, m: &Match) -> impl Future<Output = Result<(), PersistenceError>> + Send;
}

/// Repository for friendly matches.
pub trait FriendlyMatchRepository: Send + Sync {
    /// Most recently played first.
    fn list_friendly_matches(
        &self,
    ) -> impl Future<Output = Result<Vec<FriendlyMatch>, PersistenceError>> + Send;
    fn get_friendly_match(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<FriendlyMatch>, PersistenceError>> + Send;
    fn create_friendly_match(
        &self,
        m: NewFriendlyMatch,
    ) -> impl Future<Output = Result<FriendlyMatch, PersistenceError>> + Send;
    fn update_friendly_match(
        &self,
        m: &FriendlyMatch,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
}

/// Append-only log of bug and feature reports.
pub trait ReportRepository: Send + Sync {
    fn create_report(
        &self,
        report: NewReport,
    ) -> impl Future<Output = Result<Report, PersistenceError>> + Send;
    /// Newest first.
    fn list_reports(&self) -> impl Future<Output = Result<Vec<Report>, PersistenceError>> + Send;
}

/// The full storage contract.
pub trait Store:
    UserRepository
    + LeagueRepository
    + JoinRequestRepository
    + MatchRepository
    + FriendlyMatchRepository
    + ReportRepository
{
}

impl<T> Store for T where
    T: UserRepository
        + LeagueRepository
        + JoinRequestRepository
        + MatchRepository
        + FriendlyMatchRepository
        + ReportRepository
{
}
