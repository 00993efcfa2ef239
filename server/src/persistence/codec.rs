//! Column encoding shared by the SQLite and Postgres backends.
//!
//! Composite fields (admin roles, player ids, set scores) are stored as JSON
//! text and enums as their canonical text form. Both backends read rows into
//! the structs below and convert them with the same functions, so a value
//! written by one backend decodes identically in the other.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use squash::{
    FriendlyMatch, League, LeagueAdminRole, LeagueJoinRequest, Match, ParseEnumError, Report,
    SetScore, User,
};

use super::PersistenceError;

// ── Scalars ────────────────────────────────────────────────────────────

pub fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string(value)?)
}

/// Blank text decodes to the empty value.
pub fn decode_json<T: DeserializeOwned + Default>(text: &str) -> Result<T, PersistenceError> {
    if text.trim().is_empty() {
        return Ok(T::default());
    }
    Ok(serde_json::from_str(text)?)
}

pub fn decode_enum<T>(column: &'static str, text: &str) -> Result<T, PersistenceError>
where
    T: FromStr<Err = ParseEnumError>,
{
    text.parse().map_err(|_| PersistenceError::Corrupt {
        column,
        value: text.to_string(),
    })
}

pub fn encode_sets_per_match(sets: u8) -> i64 {
    i64::from(sets)
}

pub fn decode_sets_per_match(value: i64) -> Result<u8, PersistenceError> {
    u8::try_from(value).map_err(|_| PersistenceError::Corrupt {
        column: "sets_per_match",
        value: value.to_string(),
    })
}

pub fn encode_admin_roles(
    roles: &BTreeMap<String, LeagueAdminRole>,
) -> Result<String, PersistenceError> {
    encode_json(roles)
}

pub fn encode_player_ids(ids: &[String]) -> Result<String, PersistenceError> {
    encode_json(ids)
}

pub fn encode_sets(sets: &[SetScore]) -> Result<String, PersistenceError> {
    encode_json(sets)
}

/// A unique violation on insert means the primary key is taken.
pub fn insert_error(err: sqlx::Error, entity: &'static str, id: &str) -> PersistenceError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            PersistenceError::duplicate_id(entity, id)
        }
        _ => PersistenceError::Database(err),
    }
}

/// Postgres names the violated index, SQLite only mentions the column.
pub fn user_insert_error(err: sqlx::Error, user: &User) -> PersistenceError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            let on_email = db.constraint().is_some_and(|c| c.contains("email_key"))
                || db.message().contains("email_key");
            if on_email {
                PersistenceError::DuplicateEmail(user.email.clone())
            } else {
                PersistenceError::duplicate_id("user", &user.id)
            }
        }
        _ => PersistenceError::Database(err),
    }
}

// ── Rows ───────────────────────────────────────────────────────────────

#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub skill: String,
    pub avatar_url: String,
}

impl UserRow {
    pub fn into_user(self) -> Result<User, PersistenceError> {
        Ok(User {
            role: decode_enum("role", &self.role)?,
            skill: decode_enum("skill", &self.skill)?,
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            email: self.email,
            password_hash: self.password_hash,
            avatar_url: self.avatar_url,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct LeagueRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub location: String,
    pub owner_id: String,
    pub admin_roles: String,
    pub player_ids: String,
    pub sets_per_match: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl LeagueRow {
    pub fn into_league(self) -> Result<League, PersistenceError> {
        Ok(League {
            admin_roles: decode_json(&self.admin_roles)?,
            player_ids: decode_json(&self.player_ids)?,
            sets_per_match: decode_sets_per_match(self.sets_per_match)?,
            status: decode_enum("status", &self.status)?,
            id: self.id,
            name: self.name,
            description: self.description,
            location: self.location,
            owner_id: self.owner_id,
            start_date: self.start_date,
            end_date: self.end_date,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct MatchRow {
    pub id: String,
    pub league_id: String,
    pub player_a_id: String,
    pub player_b_id: String,
    pub sets: String,
    pub status: String,
    pub reported_by: String,
    pub confirmed_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MatchRow {
    pub fn into_match(self) -> Result<Match, PersistenceError> {
        Ok(Match {
            sets: decode_json(&self.sets)?,
            status: decode_enum("status", &self.status)?,
            id: self.id,
            league_id: self.league_id,
            player_a_id: self.player_a_id,
            player_b_id: self.player_b_id,
            reported_by: self.reported_by,
            confirmed_by: self.confirmed_by,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct FriendlyMatchRow {
    pub id: String,
    pub player_a_id: String,
    pub player_b_id: String,
    pub sets: String,
    pub status: String,
    pub reported_by: String,
    pub confirmed_by: Option<String>,
    pub played_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl FriendlyMatchRow {
    pub fn into_friendly_match(self) -> Result<FriendlyMatch, PersistenceError> {
        Ok(FriendlyMatch {
            sets: decode_json(&self.sets)?,
            status: decode_enum("status", &self.status)?,
            id: self.id,
            player_a_id: self.player_a_id,
            player_b_id: self.player_b_id,
            reported_by: self.reported_by,
            confirmed_by: self.confirmed_by,
            played_at: self.played_at,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct JoinRequestRow {
    pub id: String,
    pub league_id: String,
    pub user_id: String,
    pub status: String,
    pub decided_by: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl JoinRequestRow {
    pub fn into_join_request(self) -> Result<LeagueJoinRequest, PersistenceError> {
        Ok(LeagueJoinRequest {
            status: decode_enum("status", &self.status)?,
            id: self.id,
            league_id: self.league_id,
            user_id: self.user_id,
            decided_by: self.decided_by,
            decided_at: self.decided_at,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct ReportRow {
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl ReportRow {
    pub fn into_report(self) -> Result<Report, PersistenceError> {
        Ok(Report {
            kind: decode_enum("kind", &self.kind)?,
            status: decode_enum("status", &self.status)?,
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            created_at: self.created_at,
        })
    }
}

/// Convert every row, failing on the first one that does not decode.
pub fn decode_rows<R, T>(
    rows: Vec<R>,
    convert: impl Fn(R) -> Result<T, PersistenceError>,
) -> Result<Vec<T>, PersistenceError> {
    rows.into_iter().map(convert).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use squash::{LeagueStatus, MatchStatus, UserRole};

    #[test]
    fn admin_roles_encode_in_key_order() {
        let mut roles = BTreeMap::new();
        roles.insert("zed".to_string(), LeagueAdminRole::Moderator);
        roles.insert("amy".to_string(), LeagueAdminRole::AdminPlayer);
        assert_eq!(
            encode_admin_roles(&roles).unwrap(),
            r#"{"amy":"admin-player","zed":"moderator"}"#
        );
    }

    #[test]
    fn sets_keep_their_order() {
        let sets = vec![SetScore::new(11, 5), SetScore::new(9, 11)];
        let text = encode_sets(&sets).unwrap();
        assert_eq!(text, r#"[{"a":11,"b":5},{"a":9,"b":11}]"#);
        assert_eq!(decode_json::<Vec<SetScore>>(&text).unwrap(), sets);
    }

    #[test]
    fn blank_json_columns_are_empty() {
        assert!(decode_json::<Vec<String>>("").unwrap().is_empty());
        assert!(decode_json::<BTreeMap<String, LeagueAdminRole>>("  ")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn unknown_admin_role_is_an_error() {
        let err = decode_json::<BTreeMap<String, LeagueAdminRole>>(r#"{"u":"owner"}"#).unwrap_err();
        assert!(matches!(err, PersistenceError::Json(_)));
    }

    #[test]
    fn unknown_enum_text_is_corrupt() {
        let err = decode_enum::<MatchStatus>("status", "done").unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::Corrupt { column: "status", ref value } if value == "done"
        ));
        assert_eq!(decode_enum::<UserRole>("role", "super_admin").unwrap(), UserRole::SuperAdmin);
    }

    #[test]
    fn sets_per_match_out_of_range_is_corrupt() {
        assert_eq!(decode_sets_per_match(5).unwrap(), 5);
        assert!(decode_sets_per_match(-1).is_err());
        assert!(decode_sets_per_match(300).is_err());
        assert_eq!(encode_sets_per_match(9), 9);
    }

    #[test]
    fn league_row_decodes() {
        let now = squash::model::now();
        let row = LeagueRow {
            id: "l1".into(),
            name: "Ladder".into(),
            description: String::new(),
            location: String::new(),
            owner_id: "o".into(),
            admin_roles: r#"{"o":"admin-player"}"#.into(),
            player_ids: r#"["o","p"]"#.into(),
            sets_per_match: 3,
            start_date: now,
            end_date: None,
            status: "active".into(),
            created_at: now,
        };
        let league = row.into_league().unwrap();
        assert_eq!(league.status, LeagueStatus::Active);
        assert_eq!(league.player_ids, vec!["o", "p"]);
        assert_eq!(league.admin_role("o"), Some(LeagueAdminRole::AdminPlayer));
    }
}
