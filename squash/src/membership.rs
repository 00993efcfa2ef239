//! Who belongs to a league and who may run it.

use chrono::{DateTime, Utc};

use crate::model::{normalize_timestamp, League, User};
use crate::types::{LeagueAdminRole, LeagueStatus};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MembershipError {
    #[error("user {0} is not an admin of this league")]
    NotAnAdmin(String),
    #[error("the league owner's admin role cannot be changed")]
    OwnerRole,
}

impl League {
    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admin_roles.contains_key(user_id)
    }

    pub fn is_player(&self, user_id: &str) -> bool {
        self.player_ids.iter().any(|id| id == user_id)
    }

    /// Owner or holder of an admin role.
    pub fn is_manager(&self, user_id: &str) -> bool {
        self.is_owner(user_id) || self.is_admin(user_id)
    }

    /// Player, owner or admin.
    pub fn is_member(&self, user_id: &str) -> bool {
        self.is_player(user_id) || self.is_manager(user_id)
    }

    /// Managers plus site super-admins.
    pub fn can_manage(&self, user: &User) -> bool {
        user.is_super_admin() || self.is_manager(&user.id)
    }

    pub fn admin_role(&self, user_id: &str) -> Option<LeagueAdminRole> {
        self.admin_roles.get(user_id).copied()
    }

    /// Returns false when the user was already a player.
    pub fn add_player(&mut self, user_id: &str) -> bool {
        if self.is_player(user_id) {
            return false;
        }
        self.player_ids.push(user_id.to_string());
        true
    }

    /// Set or overwrite a role. `admin-player` also makes the user a player.
    pub fn grant_admin(&mut self, user_id: &str, role: LeagueAdminRole) {
        self.admin_roles.insert(user_id.to_string(), role);
        if role == LeagueAdminRole::AdminPlayer {
            self.add_player(user_id);
        }
    }

    /// Like [`League::grant_admin`] but only for an existing admin other
    /// than the owner.
    pub fn update_admin_role(
        &mut self,
        user_id: &str,
        role: LeagueAdminRole,
    ) -> Result<(), MembershipError> {
        if self.is_owner(user_id) {
            return Err(MembershipError::OwnerRole);
        }
        if !self.is_admin(user_id) {
            return Err(MembershipError::NotAnAdmin(user_id.to_string()));
        }
        self.grant_admin(user_id, role);
        Ok(())
    }

    /// Drops the role. Player membership is left as it is.
    pub fn remove_admin(&mut self, user_id: &str) -> Result<LeagueAdminRole, MembershipError> {
        if self.is_owner(user_id) {
            return Err(MembershipError::OwnerRole);
        }
        self.admin_roles
            .remove(user_id)
            .ok_or_else(|| MembershipError::NotAnAdmin(user_id.to_string()))
    }

    /// Force the league to finished, stamping `at` as its end date.
    /// Returns false, and changes nothing, if it was already finished.
    pub fn end(&mut self, at: DateTime<Utc>) -> bool {
        if self.status == LeagueStatus::Finished {
            return false;
        }
        self.status = LeagueStatus::Finished;
        self.end_date = Some(normalize_timestamp(at));
        true
    }
}

/// Status implied by a league's dates at time `now`.
pub fn status_for_dates(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> LeagueStatus {
    match end {
        Some(end) if end < now => LeagueStatus::Finished,
        _ if start > now => LeagueStatus::Upcoming,
        _ => LeagueStatus::Active,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewLeague, NewUser};
    use crate::types::UserRole;
    use chrono::{Duration, TimeZone};
    use std::collections::BTreeMap;

    fn league() -> League {
        NewLeague {
            id: Some("l1".into()),
            name: "Tuesday ladder".into(),
            description: String::new(),
            location: "Court 3".into(),
            owner_id: "owner".into(),
            admin_roles: BTreeMap::new(),
            player_ids: vec!["p1".into()],
            sets_per_match: 5,
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_date: None,
            status: LeagueStatus::Active,
            created_at: None,
        }
        .into_league()
    }

    fn user(id: &str, role: UserRole) -> User {
        NewUser {
            id: Some(id.into()),
            email: format!("{id}@example.com"),
            role: Some(role),
            ..Default::default()
        }
        .into_user()
        .unwrap()
    }

    #[test]
    fn add_player_is_idempotent() {
        let mut l = league();
        assert!(l.add_player("p2"));
        assert!(!l.add_player("p2"));
        assert_eq!(l.player_ids, vec!["p1", "p2"]);
    }

    #[test]
    fn admin_player_grant_adds_membership_once() {
        let mut l = league();
        l.grant_admin("p2", LeagueAdminRole::AdminPlayer);
        l.grant_admin("p2", LeagueAdminRole::AdminPlayer);
        assert!(l.is_player("p2"));
        assert_eq!(l.player_ids.iter().filter(|id| *id == "p2").count(), 1);
        assert_eq!(l.admin_role("p2"), Some(LeagueAdminRole::AdminPlayer));
    }

    #[test]
    fn moderator_grant_does_not_add_membership() {
        let mut l = league();
        l.grant_admin("mod", LeagueAdminRole::Moderator);
        assert!(l.is_admin("mod"));
        assert!(!l.is_player("mod"));
        assert!(l.is_manager("mod"));
    }

    #[test]
    fn update_and_remove_require_existing_admin() {
        let mut l = league();
        assert_eq!(
            l.update_admin_role("p1", LeagueAdminRole::Moderator),
            Err(MembershipError::NotAnAdmin("p1".into()))
        );
        assert_eq!(
            l.remove_admin("p1"),
            Err(MembershipError::NotAnAdmin("p1".into()))
        );

        l.grant_admin("mod", LeagueAdminRole::Moderator);
        l.update_admin_role("mod", LeagueAdminRole::AdminPlayer).unwrap();
        assert!(l.is_player("mod"));
        assert_eq!(l.remove_admin("mod"), Ok(LeagueAdminRole::AdminPlayer));
        assert!(!l.is_admin("mod"));
        assert!(l.is_player("mod"));
    }

    #[test]
    fn owner_role_is_fixed() {
        let mut l = league();
        l.grant_admin("owner", LeagueAdminRole::AdminPlayer);
        assert_eq!(
            l.update_admin_role("owner", LeagueAdminRole::Moderator),
            Err(MembershipError::OwnerRole)
        );
        assert_eq!(l.remove_admin("owner"), Err(MembershipError::OwnerRole));
        assert_eq!(l.admin_role("owner"), Some(LeagueAdminRole::AdminPlayer));

        // Owner without a stored role is still refused, not reported missing.
        let mut bare = league();
        assert_eq!(bare.remove_admin("owner"), Err(MembershipError::OwnerRole));
    }

    #[test]
    fn managers() {
        let l = league();
        assert!(l.can_manage(&user("owner", UserRole::User)));
        assert!(l.can_manage(&user("root", UserRole::SuperAdmin)));
        assert!(!l.can_manage(&user("p1", UserRole::User)));
        assert!(!l.can_manage(&user("site-admin", UserRole::Admin)));
    }

    #[test]
    fn end_is_a_noop_once_finished() {
        let mut l = league();
        let first = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert!(l.end(first));
        assert_eq!(l.status, LeagueStatus::Finished);
        assert_eq!(l.end_date, Some(first));
        assert!(!l.end(first + Duration::days(1)));
        assert_eq!(l.end_date, Some(first));
    }

    #[test]
    fn status_follows_dates() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let day = Duration::days(1);
        assert_eq!(status_for_dates(now + day, None, now), LeagueStatus::Upcoming);
        assert_eq!(status_for_dates(now - day, None, now), LeagueStatus::Active);
        assert_eq!(
            status_for_dates(now - day * 10, Some(now - day), now),
            LeagueStatus::Finished
        );
        assert_eq!(
            status_for_dates(now - day, Some(now + day), now),
            LeagueStatus::Active
        );
    }
}
