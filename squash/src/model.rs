//! Entity definitions and the default-filling applied when they are created.
//!
//! Every storage backend turns a `New*` value into its entity through the
//! `into_*` functions here, so ids, timestamps and default statuses are filled
//! the same way no matter where the entity ends up.

use std::collections::BTreeMap;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{
    JoinRequestStatus, LeagueAdminRole, LeagueStatus, MatchStatus, ReportKind, ReportStatus,
    SkillLevel, UserRole,
};

/// Errors raised while turning a `New*` value into an entity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NewEntityError {
    #[error("email is required")]
    MissingEmail,
}

/// Truncate to microseconds, the finest precision every backend can hold.
pub fn normalize_timestamp(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(6)
}

/// Current time, already normalized.
pub fn now() -> DateTime<Utc> {
    normalize_timestamp(Utc::now())
}

/// Case-insensitive identity of an email address, used for uniqueness and
/// lookup by every backend.
pub fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

fn id_or_generate(id: Option<String>) -> String {
    match id {
        Some(id) if !id.trim().is_empty() => id,
        _ => generate_id(),
    }
}

fn timestamp_or_now(ts: Option<DateTime<Utc>>) -> DateTime<Utc> {
    ts.map(normalize_timestamp).unwrap_or_else(now)
}

// ── Users ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub skill: SkillLevel,
    pub avatar_url: String,
}

impl User {
    /// First and last name joined by a space, skipping whichever is blank.
    pub fn full_name(&self) -> String {
        let first = self.first_name.trim();
        let last = self.last_name.trim();
        match (first.is_empty(), last.is_empty()) {
            (true, _) => last.to_string(),
            (_, true) => first.to_string(),
            _ => format!("{first} {last}"),
        }
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == UserRole::SuperAdmin
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub password_hash: String,
    /// Defaults to [`UserRole::User`].
    pub role: Option<UserRole>,
    pub skill: SkillLevel,
    pub avatar_url: String,
}

impl NewUser {
    pub fn into_user(self) -> Result<User, NewEntityError> {
        let email = self.email.trim().to_string();
        if email.is_empty() {
            return Err(NewEntityError::MissingEmail);
        }
        Ok(User {
            id: id_or_generate(self.id),
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            email,
            password_hash: self.password_hash,
            role: self.role.unwrap_or_default(),
            skill: self.skill,
            avatar_url: self.avatar_url,
        })
    }
}

// ── Leagues ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub id: String,
    pub name: String,
    pub description: String,
    pub location: String,
    pub owner_id: String,
    /// Granted admin roles keyed by user id. The owner need not appear here
    /// to be a manager.
    pub admin_roles: BTreeMap<String, LeagueAdminRole>,
    /// Member user ids; order carries no meaning.
    pub player_ids: Vec<String>,
    pub sets_per_match: u8,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: LeagueStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLeague {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub location: String,
    pub owner_id: String,
    pub admin_roles: BTreeMap<String, LeagueAdminRole>,
    pub player_ids: Vec<String>,
    pub sets_per_match: u8,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: LeagueStatus,
    pub created_at: Option<DateTime<Utc>>,
}

impl NewLeague {
    pub fn into_league(self) -> League {
        League {
            id: id_or_generate(self.id),
            name: self.name,
            description: self.description,
            location: self.location,
            owner_id: self.owner_id,
            admin_roles: self.admin_roles,
            player_ids: self.player_ids,
            sets_per_match: self.sets_per_match,
            start_date: normalize_timestamp(self.start_date),
            end_date: self.end_date.map(normalize_timestamp),
            status: self.status,
            created_at: timestamp_or_now(self.created_at),
        }
    }
}

// ── Matches ────────────────────────────────────────────────────────────

/// Points scored by each side in one set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SetScore {
    pub a: u32,
    pub b: u32,
}

impl SetScore {
    pub fn new(a: u32, b: u32) -> Self {
        Self { a, b }
    }
}

/// A league-scoped match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub league_id: String,
    pub player_a_id: String,
    pub player_b_id: String,
    pub sets: Vec<SetScore>,
    pub status: MatchStatus,
    pub reported_by: String,
    pub confirmed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMatch {
    pub id: Option<String>,
    pub league_id: String,
    pub player_a_id: String,
    pub player_b_id: String,
    pub sets: Vec<SetScore>,
    /// Defaults to [`MatchStatus::Pending`].
    pub status: Option<MatchStatus>,
    pub reported_by: String,
    pub confirmed_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl NewMatch {
    pub fn into_match(self) -> Match {
        Match {
            id: id_or_generate(self.id),
            league_id: self.league_id,
            player_a_id: self.player_a_id,
            player_b_id: self.player_b_id,
            sets: self.sets,
            status: self.status.unwrap_or(MatchStatus::Pending),
            reported_by: self.reported_by,
            confirmed_by: self.confirmed_by,
            created_at: timestamp_or_now(self.created_at),
        }
    }
}

/// A player-to-player match outside any league.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendlyMatch {
    pub id: String,
    pub player_a_id: String,
    pub player_b_id: String,
    pub sets: Vec<SetScore>,
    pub status: MatchStatus,
    pub reported_by: String,
    pub confirmed_by: Option<String>,
    pub played_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFriendlyMatch {
    pub id: Option<String>,
    pub player_a_id: String,
    pub player_b_id: String,
    pub sets: Vec<SetScore>,
    pub status: Option<MatchStatus>,
    pub reported_by: String,
    pub confirmed_by: Option<String>,
    /// Defaults to the creation time.
    pub played_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl NewFriendlyMatch {
    pub fn into_friendly_match(self) -> FriendlyMatch {
        let created_at = timestamp_or_now(self.created_at);
        FriendlyMatch {
            id: id_or_generate(self.id),
            player_a_id: self.player_a_id,
            player_b_id: self.player_b_id,
            sets: self.sets,
            status: self.status.unwrap_or(MatchStatus::Pending),
            reported_by: self.reported_by,
            confirmed_by: self.confirmed_by,
            played_at: self.played_at.map(normalize_timestamp).unwrap_or(created_at),
            created_at,
        }
    }
}

// ── Join requests ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueJoinRequest {
    pub id: String,
    pub league_id: String,
    pub user_id: String,
    pub status: JoinRequestStatus,
    pub decided_by: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl LeagueJoinRequest {
    pub fn is_pending(&self) -> bool {
        self.status == JoinRequestStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJoinRequest {
    pub id: Option<String>,
    pub league_id: String,
    pub user_id: String,
    pub status: Option<JoinRequestStatus>,
    pub created_at: Option<DateTime<Utc>>,
}

impl NewJoinRequest {
    pub fn pending(league_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            id: None,
            league_id: league_id.into(),
            user_id: user_id.into(),
            status: None,
            created_at: None,
        }
    }

    pub fn into_join_request(self) -> LeagueJoinRequest {
        LeagueJoinRequest {
            id: id_or_generate(self.id),
            league_id: self.league_id,
            user_id: self.user_id,
            status: self.status.unwrap_or(JoinRequestStatus::Pending),
            decided_by: None,
            decided_at: None,
            created_at: timestamp_or_now(self.created_at),
        }
    }
}

// ── Reports ────────────────────────────────────────────────────────────

/// A bug or feature report filed by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub user_id: String,
    pub kind: ReportKind,
    pub title: String,
    pub description: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReport {
    pub id: Option<String>,
    pub user_id: String,
    pub kind: ReportKind,
    pub title: String,
    pub description: String,
    pub status: Option<ReportStatus>,
    pub created_at: Option<DateTime<Utc>>,
}

impl NewReport {
    pub fn into_report(self) -> Report {
        Report {
            id: id_or_generate(self.id),
            user_id: self.user_id,
            kind: self.kind,
            title: self.title,
            description: self.description,
            status: self.status.unwrap_or(ReportStatus::Open),
            created_at: timestamp_or_now(self.created_at),
        }
    }
}
