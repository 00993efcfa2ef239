//! Volatile in-memory backend.
//!
//! All tables sit behind one `RwLock`: readers run concurrently, writers are
//! serialized, and no guard is held across an `.await`.

mod seed;

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use squash::ordering::{
    sort_friendly_matches, sort_join_requests, sort_leagues, sort_matches, sort_reports,
    sort_users,
};
use squash::{
    email_key, FriendlyMatch, League, LeagueJoinRequest, Match, NewFriendlyMatch, NewJoinRequest, NewLeague,
    NewMatch, NewReport, NewUser, Report, User,
};

use super::traits::{
    FriendlyMatchRepository, JoinRequestRepository, LeagueRepository, MatchRepository,
    ReportRepository, UserRepository,
};
use super::PersistenceError;

pub use seed::{hash_password, SEED_PASSWORD, SEED_SUPER_ADMIN_EMAIL};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<String, User>,
    leagues: HashMap<String, League>,
    join_requests: HashMap<String, LeagueJoinRequest>,
    matches: HashMap<String, Match>,
    friendlies: HashMap<String, FriendlyMatch>,
    reports: Vec<Report>,
}

impl Tables {
    fn email_taken(&self, email: &str) -> bool {
        let wanted = email_key(email);
        self.users.values().any(|u| email_key(&u.email) == wanted)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with deterministic demo data.
    pub fn seeded() -> Result<Self, PersistenceError> {
        let store = Self::new();
        seed::populate(&mut store.write())?;
        Ok(store)
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl UserRepository for MemoryStore {
    async fn list_users(&self) -> Result<Vec<User>, PersistenceError> {
        let mut users: Vec<User> = self.read().users.values().cloned().collect();
        sort_users(&mut users);
        Ok(users)
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, PersistenceError> {
        Ok(self.read().users.get(id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, PersistenceError> {
        let wanted = email_key(email);
        let tables = self.read();
        let mut found: Vec<&User> = tables
            .users
            .values()
            .filter(|u| email_key(&u.email) == wanted)
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(found.first().map(|u| (*u).clone()))
    }

    async fn create_user(&self, user: NewUser) -> Result<User, PersistenceError> {
        let user = user.into_user()?;
        let mut tables = self.write();
        if tables.users.contains_key(&user.id) {
            return Err(PersistenceError::duplicate_id("user", user.id));
        }
        if tables.email_taken(&user.email) {
            return Err(PersistenceError::DuplicateEmail(user.email));
        }
        tables.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }
}

impl LeagueRepository for MemoryStore {
    async fn list_leagues(&self) -> Result<Vec<League>, PersistenceError> {
        let mut leagues: Vec<League> = self.read().leagues.values().cloned().collect();
        sort_leagues(&mut leagues);
        Ok(leagues)
    }

    async fn get_league(&self, id: &str) -> Result<Option<League>, PersistenceError> {
        Ok(self.read().leagues.get(id).cloned())
    }

    async fn create_league(&self, league: NewLeague) -> Result<League, PersistenceError> {
        let league = league.into_league();
        let mut tables = self.write();
        if tables.leagues.contains_key(&league.id) {
            return Err(PersistenceError::duplicate_id("league", league.id));
        }
        tables.leagues.insert(league.id.clone(), league.clone());
        Ok(league)
    }

    async fn update_league(&self, league: &League) -> Result<(), PersistenceError> {
        let mut tables = self.write();
        let slot = tables
            .leagues
            .get_mut(&league.id)
            .ok_or_else(|| PersistenceError::not_found("league", &league.id))?;
        *slot = league.clone();
        Ok(())
    }
}

impl JoinRequestRepository for MemoryStore {
    async fn create_join_request(
        &self,
        request: NewJoinRequest,
    ) -> Result<LeagueJoinRequest, PersistenceError> {
        let request = request.into_join_request();
        let mut tables = self.write();
        if tables.join_requests.contains_key(&request.id) {
            return Err(PersistenceError::duplicate_id("join request", request.id));
        }
        tables
            .join_requests
            .insert(request.id.clone(), request.clone());
        Ok(request)
    }

    async fn list_join_requests(
        &self,
        league_id: &str,
    ) -> Result<Vec<LeagueJoinRequest>, PersistenceError> {
        let mut requests: Vec<LeagueJoinRequest> = self
            .read()
            .join_requests
            .values()
            .filter(|r| r.league_id == league_id)
            .cloned()
            .collect();
        sort_join_requests(&mut requests);
        Ok(requests)
    }

    async fn get_join_request(
        &self,
        id: &str,
    ) -> Result<Option<LeagueJoinRequest>, PersistenceError> {
        Ok(self.read().join_requests.get(id).cloned())
    }

    async fn update_join_request(&self, request: &LeagueJoinRequest) -> Result<(), PersistenceError> {
        let mut tables = self.write();
        let slot = tables
            .join_requests
            .get_mut(&request.id)
            .ok_or_else(|| PersistenceError::not_found("join request", &request.id))?;
        *slot = request.clone();
        Ok(())
    }

    async fn has_pending_join_request(
        &self,
        league_id: &str,
        user_id: &str,
    ) -> Result<bool, PersistenceError> {
        Ok(self
            .read()
            .join_requests
            .values()
            .any(|r| r.league_id == league_id && r.user_id == user_id && r.is_pending()))
    }
}

impl MatchRepository for MemoryStore {
    async fn list_matches(&self, league_id: &str) -> Result<Vec<Match>, PersistenceError> {
        let mut matches: Vec<Match> = self
            .read()
            .matches
            .values()
            .filter(|m| m.league_id == league_id)
            .cloned()
            .collect();
        sort_matches(&mut matches);
        Ok(matches)
    }

    async fn list_all_matches(&self) -> Result<Vec<Match>, PersistenceError> {
        let mut matches: Vec<Match> = self.read().matches.values().cloned().collect();
        sort_matches(&mut matches);
        Ok(matches)
    }

    async fn get_match(&self, id: &str) -> Result<Option<Match>, PersistenceError> {
        Ok(self.read().matches.get(id).cloned())
    }

    async fn create_match(&self, m: NewMatch) -> Result<Match, PersistenceError> {
        let m = m.into_match();
        let mut tables = self.write();
        if tables.matches.contains_key(&m.id) {
            return Err(PersistenceError::duplicate_id("match", m.id));
        }
        tables.matches.insert(m.id.clone(), m.clone());
        Ok(m)
    }

    async fn update_match(&self, m: &Match) -> Result<(), PersistenceError> {
        let mut tables = self.write();
        let slot = tables
            .matches
            .get_mut(&m.id)
            .ok_or_else(|| PersistenceError::not_found("match", &m.id))?;
        *slot = m.clone();
        Ok(())
    }
}

impl FriendlyMatchRepository for MemoryStore {
    async fn list_friendly_matches(&self) -> Result<Vec<FriendlyMatch>, PersistenceError> {
        let mut matches: Vec<FriendlyMatch> = self.read().friendlies.values().cloned().collect();
        sort_friendly_matches(&mut matches);
        Ok(matches)
    }

    async fn get_friendly_match(&self, id: &str) -> Result<Option<FriendlyMatch>, PersistenceError> {
        Ok(self.read().friendlies.get(id).cloned())
    }

    async fn create_friendly_match(
        &self,
        m: NewFriendlyMatch,
    ) -> Result<FriendlyMatch, PersistenceError> {
        let m = m.into_friendly_match();
        let mut tables = self.write();
        if tables.friendlies.contains_key(&m.id) {
            return Err(PersistenceError::duplicate_id("friendly match", m.id));
        }
        tables.friendlies.insert(m.id.clone(), m.clone());
        Ok(m)
    }

    async fn update_friendly_match(&self, m: &FriendlyMatch) -> Result<(), PersistenceError> {
        let mut tables = self.write();
        let slot = tables
            .friendlies
            .get_mut(&m.id)
            .ok_or_else(|| PersistenceError::not_found("friendly match", &m.id))?;
        *slot = m.clone();
        Ok(())
    }
}

impl ReportRepository for MemoryStore {
    async fn create_report(&self, report: NewReport) -> Result<Report, PersistenceError> {
        let report = report.into_report();
        let mut tables = self.write();
        if tables.reports.iter().any(|r| r.id == report.id) {
            return Err(PersistenceError::duplicate_id("report", report.id));
        }
        tables.reports.push(report.clone());
        Ok(report)
    }

    async fn list_reports(&self) -> Result<Vec<Report>, PersistenceError> {
        let mut reports = self.read().reports.clone();
        sort_reports(&mut reports);
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squash::{MatchStatus, UserRole};

    #[tokio::test]
    async fn seeded_store_has_demo_data() {
        let store = MemoryStore::seeded().unwrap();
        let users = store.list_users().await.unwrap();
        assert_eq!(users.len(), 20);
        let admins: Vec<&User> = users.iter().filter(|u| u.role == UserRole::SuperAdmin).collect();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].email, SEED_SUPER_ADMIN_EMAIL);

        let leagues = store.list_leagues().await.unwrap();
        assert_eq!(leagues.len(), 4);
        for league in &leagues {
            assert!(league.is_player(&league.owner_id));
            assert!(league.is_admin(&league.owner_id));
        }

        let matches = store.list_all_matches().await.unwrap();
        assert!(matches.iter().any(|m| m.status == MatchStatus::Confirmed));
        assert!(matches.iter().all(|m| m.player_a_id != m.player_b_id));
        assert!(!store.list_friendly_matches().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn poisoned_lock_still_serves_reads() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let clone = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = clone.write();
            panic!("poison the lock");
        })
        .join();
        assert!(store.list_users().await.unwrap().is_empty());
    }
}
