//! Scenarios every backend must pass identically.
//!
//! Each scenario is an async function over any [`Store`]. The
//! `backend_suite!` macro instantiates the full list once per backend that
//! can run in-process. Postgres runs only when `SQUASH_TEST_POSTGRES_DSN`
//! points at a scratch database; its scenarios share one test so that table
//! truncation between them cannot race.

use std::collections::BTreeMap;

use chrono::{Duration, TimeZone, Utc};
use squash::{
    LeagueAdminRole, LeagueStatus, MatchStatus, NewFriendlyMatch, NewJoinRequest, NewLeague,
    NewMatch, NewReport, NewUser, ReportKind, SetScore,
};

use super::{ErrorKind, PersistenceError, Store};

fn new_user(id: &str, first: &str, email: &str) -> NewUser {
    NewUser {
        id: Some(id.into()),
        first_name: first.into(),
        last_name: "Tester".into(),
        email: email.into(),
        ..Default::default()
    }
}

fn new_league(id: &str, owner: &str, created_days_ago: i64) -> NewLeague {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    NewLeague {
        id: Some(id.into()),
        name: format!("League {id}"),
        description: String::new(),
        location: "Club".into(),
        owner_id: owner.into(),
        admin_roles: BTreeMap::from([(owner.to_string(), LeagueAdminRole::AdminPlayer)]),
        player_ids: vec![owner.to_string()],
        sets_per_match: 5,
        start_date: base,
        end_date: None,
        status: LeagueStatus::Active,
        created_at: Some(base - Duration::days(created_days_ago)),
    }
}

fn new_match(id: &str, league: &str, a: &str, b: &str) -> NewMatch {
    NewMatch {
        id: Some(id.into()),
        league_id: league.into(),
        player_a_id: a.into(),
        player_b_id: b.into(),
        sets: vec![SetScore::new(11, 5), SetScore::new(9, 11), SetScore::new(11, 7)],
        status: None,
        reported_by: a.into(),
        confirmed_by: None,
        created_at: None,
    }
}

fn new_friendly(id: &str, a: &str, b: &str) -> NewFriendlyMatch {
    NewFriendlyMatch {
        id: Some(id.into()),
        player_a_id: a.into(),
        player_b_id: b.into(),
        sets: vec![SetScore::new(11, 9)],
        status: None,
        reported_by: a.into(),
        confirmed_by: None,
        played_at: None,
        created_at: None,
    }
}

pub async fn duplicate_email_ignores_case<S: Store>(store: &S) {
    store
        .create_user(new_user("u1", "Ann", "Ann@Example.com"))
        .await
        .unwrap();
    let err = store
        .create_user(new_user("u2", "Other", "ann@example.COM"))
        .await
        .unwrap_err();
    assert!(matches!(err, PersistenceError::DuplicateEmail(_)), "{err:?}");
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(store.list_users().await.unwrap().len(), 1);

    let found = store.get_user_by_email("ANN@example.com").await.unwrap();
    assert_eq!(found.map(|u| u.id), Some("u1".to_string()));
}

pub async fn duplicate_email_folds_non_ascii_case<S: Store>(store: &S) {
    store
        .create_user(new_user("u1", "Eva", "ÉVA@example.com"))
        .await
        .unwrap();
    let err = store
        .create_user(new_user("u2", "Eva", "éva@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, PersistenceError::DuplicateEmail(_)), "{err:?}");

    let found = store.get_user_by_email(" Éva@Example.com ").await.unwrap();
    assert_eq!(found.map(|u| u.id), Some("u1".to_string()));
}

/// A second insert under an existing id fails and leaves the first row alone.
pub async fn duplicate_ids_are_rejected<S: Store>(store: &S) {
    fn assert_duplicate(err: PersistenceError, expected: &str) {
        let PersistenceError::DuplicateId { entity, id } = &err else {
            panic!("expected a duplicate id, got {err:?}");
        };
        assert_eq!((*entity, id.as_str()), (expected, "dup"));
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    store
        .create_user(new_user("dup", "Ann", "ann@example.com"))
        .await
        .unwrap();
    let err = store
        .create_user(new_user("dup", "Bob", "bob@example.com"))
        .await
        .unwrap_err();
    assert_duplicate(err, "user");
    let user = store.get_user("dup").await.unwrap().unwrap();
    assert_eq!(user.first_name, "Ann");

    store.create_league(new_league("dup", "owner", 0)).await.unwrap();
    let err = store
        .create_league(new_league("dup", "usurper", 0))
        .await
        .unwrap_err();
    assert_duplicate(err, "league");
    assert_eq!(store.require_league("dup").await.unwrap().owner_id, "owner");

    store
        .create_match(new_match("dup", "l1", "a", "b"))
        .await
        .unwrap();
    let err = store
        .create_match(new_match("dup", "l2", "c", "d"))
        .await
        .unwrap_err();
    assert_duplicate(err, "match");
    assert_eq!(store.list_all_matches().await.unwrap().len(), 1);

    store
        .create_friendly_match(new_friendly("dup", "a", "b"))
        .await
        .unwrap();
    let err = store
        .create_friendly_match(new_friendly("dup", "c", "d"))
        .await
        .unwrap_err();
    assert_duplicate(err, "friendly match");
    assert_eq!(store.list_friendly_matches().await.unwrap().len(), 1);

    let request = NewJoinRequest {
        id: Some("dup".into()),
        ..NewJoinRequest::pending("l1", "u1")
    };
    store.create_join_request(request.clone()).await.unwrap();
    let err = store.create_join_request(request).await.unwrap_err();
    assert_duplicate(err, "join request");
    assert_eq!(store.list_join_requests("l1").await.unwrap().len(), 1);

    let report = NewReport {
        id: Some("dup".into()),
        user_id: "u1".into(),
        kind: ReportKind::Feature,
        title: "Dark mode".into(),
        description: String::new(),
        status: None,
        created_at: None,
    };
    store.create_report(report.clone()).await.unwrap();
    let err = store.create_report(report).await.unwrap_err();
    assert_duplicate(err, "report");
    assert_eq!(store.list_reports().await.unwrap().len(), 1);
}

pub async fn blank_email_is_rejected<S: Store>(store: &S) {
    let err = store
        .create_user(new_user("u1", "Ann", "   "))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

pub async fn user_round_trip<S: Store>(store: &S) {
    let created = store
        .create_user(NewUser {
            phone: "+44 1234".into(),
            role: Some(squash::UserRole::SuperAdmin),
            skill: squash::SkillLevel::Pro,
            ..new_user("u1", "Ann", "ann@example.com")
        })
        .await
        .unwrap();
    assert_eq!(store.get_user("u1").await.unwrap(), Some(created));
    assert_eq!(store.get_user("nobody").await.unwrap(), None);
}

pub async fn admin_player_grant_adds_membership_once<S: Store>(store: &S) {
    store.create_league(new_league("l1", "owner", 0)).await.unwrap();
    store
        .add_admin("l1", "helper", LeagueAdminRole::AdminPlayer)
        .await
        .unwrap();
    let league = store
        .add_admin("l1", "helper", LeagueAdminRole::AdminPlayer)
        .await
        .unwrap();
    assert_eq!(league.player_ids.iter().filter(|p| *p == "helper").count(), 1);

    let stored = store.require_league("l1").await.unwrap();
    assert_eq!(stored, league);
    assert_eq!(stored.admin_role("helper"), Some(LeagueAdminRole::AdminPlayer));
}

pub async fn add_player_is_idempotent<S: Store>(store: &S) {
    store.create_league(new_league("l1", "owner", 0)).await.unwrap();
    store.add_player("l1", "p1").await.unwrap();
    let league = store.add_player("l1", "p1").await.unwrap();
    assert_eq!(league.player_ids, vec!["owner", "p1"]);
}

pub async fn owner_admin_role_is_fixed<S: Store>(store: &S) {
    store.create_league(new_league("l1", "owner", 0)).await.unwrap();
    let err = store
        .update_admin_role("l1", "owner", LeagueAdminRole::Moderator)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let err = store.remove_admin("l1", "owner").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        store.require_league("l1").await.unwrap().admin_role("owner"),
        Some(LeagueAdminRole::AdminPlayer)
    );
}

pub async fn admin_changes_need_an_admin<S: Store>(store: &S) {
    store.create_league(new_league("l1", "owner", 0)).await.unwrap();
    let err = store
        .update_admin_role("l1", "stranger", LeagueAdminRole::Moderator)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = store.remove_admin("l1", "stranger").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    store
        .add_admin("l1", "mod", LeagueAdminRole::Moderator)
        .await
        .unwrap();
    let league = store
        .update_admin_role("l1", "mod", LeagueAdminRole::AdminPlayer)
        .await
        .unwrap();
    assert!(league.is_player("mod"));
    let league = store.remove_admin("l1", "mod").await.unwrap();
    assert!(!league.is_admin("mod"));
    assert!(league.is_player("mod"));
}

pub async fn unknown_ids_are_not_found<S: Store>(store: &S) {
    let league = new_league("ghost", "owner", 0).into_league();
    let err = store.update_league(&league).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = store.add_player("ghost", "p1").await.unwrap_err();
    assert!(matches!(err, PersistenceError::NotFound { entity: "league", .. }));

    let m = new_match("ghost", "l1", "a", "b").into_match();
    assert_eq!(store.update_match(&m).await.unwrap_err().kind(), ErrorKind::NotFound);

    let f = new_friendly("ghost", "a", "b").into_friendly_match();
    assert_eq!(
        store.update_friendly_match(&f).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );

    let r = NewJoinRequest::pending("l1", "u1").into_join_request();
    assert_eq!(
        store.update_join_request(&r).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

pub async fn lists_use_canonical_order<S: Store>(store: &S) {
    store
        .create_user(new_user("u-b", "Bea", "bea@example.com"))
        .await
        .unwrap();
    store
        .create_user(new_user("u-a", "Abe", "abe@example.com"))
        .await
        .unwrap();
    let names: Vec<String> = store
        .list_users()
        .await
        .unwrap()
        .iter()
        .map(|u| u.full_name())
        .collect();
    assert_eq!(names, vec!["Abe Tester", "Bea Tester"]);

    store.create_league(new_league("old", "o", 10)).await.unwrap();
    store.create_league(new_league("new", "o", 1)).await.unwrap();
    store.create_league(new_league("also-new", "o", 1)).await.unwrap();
    let ids: Vec<String> = store
        .list_leagues()
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(ids, vec!["also-new", "new", "old"]);
}

pub async fn match_round_trip<S: Store>(store: &S) {
    let created = store
        .create_match(new_match("m1", "l1", "a", "b"))
        .await
        .unwrap();
    assert_eq!(created.status, MatchStatus::Pending);
    store
        .create_match(new_match("m2", "l2", "a", "c"))
        .await
        .unwrap();

    let mut confirmed = created.clone();
    confirmed.status = MatchStatus::Confirmed;
    confirmed.confirmed_by = Some("b".into());
    store.update_match(&confirmed).await.unwrap();

    assert_eq!(store.get_match("m1").await.unwrap(), Some(confirmed.clone()));
    assert_eq!(store.list_matches("l1").await.unwrap(), vec![confirmed]);
    assert_eq!(store.list_all_matches().await.unwrap().len(), 2);
}

pub async fn friendly_played_at_defaults_to_creation<S: Store>(store: &S) {
    let f = store
        .create_friendly_match(new_friendly("f1", "a", "b"))
        .await
        .unwrap();
    assert_eq!(f.played_at, f.created_at);

    let played = Utc.with_ymd_and_hms(2023, 7, 14, 18, 30, 0).unwrap();
    store
        .create_friendly_match(NewFriendlyMatch {
            played_at: Some(played),
            ..new_friendly("f2", "b", "a")
        })
        .await
        .unwrap();

    let list = store.list_friendly_matches().await.unwrap();
    let ids: Vec<&str> = list.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["f1", "f2"]);
    assert_eq!(list[1].played_at, played);
    assert_eq!(store.get_friendly_match("f1").await.unwrap(), Some(f));
}

pub async fn pending_join_request_lookup<S: Store>(store: &S) {
    assert!(!store.has_pending_join_request("l1", "u1").await.unwrap());
    let mut request = store
        .create_join_request(NewJoinRequest::pending("l1", "u1"))
        .await
        .unwrap();
    assert!(store.has_pending_join_request("l1", "u1").await.unwrap());
    assert!(!store.has_pending_join_request("l2", "u1").await.unwrap());

    request.status = squash::JoinRequestStatus::Approved;
    request.decided_by = Some("owner".into());
    request.decided_at = Some(squash::model::now());
    store.update_join_request(&request).await.unwrap();

    assert!(!store.has_pending_join_request("l1", "u1").await.unwrap());
    assert_eq!(store.get_join_request(&request.id).await.unwrap(), Some(request.clone()));
    assert_eq!(store.list_join_requests("l1").await.unwrap(), vec![request]);
}

pub async fn reports_are_newest_first<S: Store>(store: &S) {
    let base = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    for (id, days) in [("r-old", 0), ("r-new", 3)] {
        store
            .create_report(NewReport {
                id: Some(id.into()),
                user_id: "u1".into(),
                kind: ReportKind::Bug,
                title: "Scores vanish".into(),
                description: String::new(),
                status: None,
                created_at: Some(base + Duration::days(days)),
            })
            .await
            .unwrap();
    }
    let ids: Vec<String> = store
        .list_reports()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec!["r-new", "r-old"]);
}

pub async fn timestamps_round_trip_at_microseconds<S: Store>(store: &S) {
    let start = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
        + Duration::nanoseconds(123_456_789);
    let league = store
        .create_league(NewLeague {
            start_date: start,
            end_date: Some(start + Duration::days(30)),
            ..new_league("l1", "owner", 0)
        })
        .await
        .unwrap();
    assert_eq!(league.start_date.timestamp_subsec_nanos(), 123_456_000);
    assert_eq!(store.get_league("l1").await.unwrap(), Some(league));
}

/// Membership writes are read-modify-write with no version check. Two
/// writers holding the same snapshot lose one update; this pins down that
/// behavior rather than endorsing it.
pub async fn concurrent_league_writes_last_one_wins<S: Store>(store: &S) {
    store.create_league(new_league("l1", "owner", 0)).await.unwrap();
    let mut first = store.require_league("l1").await.unwrap();
    let mut second = first.clone();

    first.add_player("p1");
    second.add_player("p2");
    store.update_league(&first).await.unwrap();
    store.update_league(&second).await.unwrap();

    let stored = store.require_league("l1").await.unwrap();
    assert!(stored.is_player("p2"));
    assert!(!stored.is_player("p1"));
}

macro_rules! backend_suite {
    ($backend:ident, $open:expr, [$($scenario:ident),+ $(,)?]) => {
        mod $backend {
            use super::*;

            $(
                #[tokio::test]
                async fn $scenario() {
                    let store = $open;
                    super::$scenario(&store).await;
                }
            )+
        }
    };
}

macro_rules! all_scenarios {
    ($m:ident ! ($($args:tt)*)) => {
        $m!($($args)* [
            duplicate_email_ignores_case,
            duplicate_email_folds_non_ascii_case,
            duplicate_ids_are_rejected,
            blank_email_is_rejected,
            user_round_trip,
            admin_player_grant_adds_membership_once,
            add_player_is_idempotent,
            owner_admin_role_is_fixed,
            admin_changes_need_an_admin,
            unknown_ids_are_not_found,
            lists_use_canonical_order,
            match_round_trip,
            friendly_played_at_defaults_to_creation,
            pending_join_request_lookup,
            reports_are_newest_first,
            timestamps_round_trip_at_microseconds,
            concurrent_league_writes_last_one_wins,
        ]);
    };
}

all_scenarios!(backend_suite!(memory, crate::persistence::MemoryStore::new(),));

all_scenarios!(backend_suite!(
    sqlite,
    crate::persistence::SqliteStore::new_in_memory().await.unwrap(),
));

all_scenarios!(backend_suite!(
    any_store_memory,
    crate::persistence::AnyStore::Memory(crate::persistence::MemoryStore::new()),
));

mod postgres {
    use super::*;
    use crate::persistence::PostgresStore;

    const DSN_VAR: &str = "SQUASH_TEST_POSTGRES_DSN";

    async fn fresh(dsn: &str) -> PostgresStore {
        let store = PostgresStore::connect(dsn, &crate::config::default_postgres_migrations_dir())
            .await
            .unwrap();
        sqlx::query(
            "TRUNCATE users, leagues, matches, friendly_matches, league_join_requests, reports",
        )
        .execute(store.pool())
        .await
        .unwrap();
        store
    }

    macro_rules! run_sequentially {
        ($dsn:ident, [$($scenario:ident),+ $(,)?]) => {
            $(
                super::$scenario(&fresh(&$dsn).await).await;
            )+
        };
    }

    #[tokio::test]
    async fn all_scenarios_when_configured() {
        let Ok(dsn) = std::env::var(DSN_VAR) else {
            eprintln!("{DSN_VAR} not set; skipping postgres conformance");
            return;
        };
        all_scenarios!(run_sequentially!(dsn,));
    }
}
