//! Deterministic demo data for the in-memory backend.
//!
//! Everything is drawn from one RNG with a fixed seed, so ids, rosters and
//! scores repeat across runs. Dates are relative to the current time.

use std::collections::BTreeMap;

use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use squash::{
    status_for_dates, League, LeagueAdminRole, MatchStatus, NewFriendlyMatch, NewLeague, NewMatch,
    NewUser, SetScore, SkillLevel, User, UserRole,
};

use super::Tables;
use crate::persistence::PersistenceError;

const RNG_SEED: u64 = 42;
const MATCHES_PER_YEAR: usize = 200;
const FRIENDLIES_PER_YEAR: usize = 200;

/// Password shared by every seeded account.
pub const SEED_PASSWORD: &str = "password123";
pub const SEED_SUPER_ADMIN_EMAIL: &str = "admin@example.com";
/// Account left out of all seeded activity.
const SEED_NEWCOMER_EMAIL: &str = "newcomer@example.com";

const USERS: &[(&str, &str, &str, SkillLevel)] = &[
    ("Alex", "Morgan", SEED_SUPER_ADMIN_EMAIL, SkillLevel::Intermediate),
    ("Noah", "Fields", SEED_NEWCOMER_EMAIL, SkillLevel::Beginner),
    ("Priya", "Shah", "priya.shah@example.com", SkillLevel::Beginner),
    ("Jonas", "Berg", "jonas.berg@example.com", SkillLevel::Beginner),
    ("Tom", "Hughes", "tom.hughes@example.com", SkillLevel::Beginner),
    ("Wade", "Cole", "wade.cole@example.com", SkillLevel::Beginner),
    ("Dana", "Lee", "dana.lee@example.com", SkillLevel::Beginner),
    ("Anna", "Walsh", "anna.walsh@example.com", SkillLevel::Intermediate),
    ("Mark", "King", "mark.king@example.com", SkillLevel::Intermediate),
    ("Kate", "Crane", "kate.crane@example.com", SkillLevel::Beginner),
    ("Olivia", "Hart", "olivia.hart@example.com", SkillLevel::Pro),
    ("Peter", "May", "peter.may@example.com", SkillLevel::Intermediate),
    ("Lena", "Jansen", "lena.jansen@example.com", SkillLevel::Beginner),
    ("Bart", "Novak", "bart.novak@example.com", SkillLevel::Beginner),
    ("Ravi", "Olsen", "ravi.olsen@example.com", SkillLevel::Intermediate),
    ("Eva", "Kane", "eva.kane@example.com", SkillLevel::Intermediate),
    ("Chris", "Malik", "chris.malik@example.com", SkillLevel::Beginner),
    ("Monica", "Wood", "monica.wood@example.com", SkillLevel::Beginner),
    ("Tomas", "Jura", "tomas.jura@example.com", SkillLevel::Intermediate),
    ("Nadia", "Crow", "nadia.crow@example.com", SkillLevel::Pro),
];

const LEAGUES: &[(&str, &str, &str, u8)] = &[
    ("City League", "Open league for players from across the city.", "Central Squash Centre", 5),
    ("Club League", "Fixtures for the club regulars.", "Squash Arena", 5),
    ("Weekend League", "Weekend games among friends.", "City Squash Hub", 3),
    ("Pro League", "Matches for advanced players.", "Pro Squash Hall", 5),
];

/// Hash `password` with argon2 using a salt drawn from `rng`.
pub fn hash_password(password: &str, rng: &mut impl RngCore) -> Result<String, PersistenceError> {
    let mut salt = [0u8; 16];
    rng.fill_bytes(&mut salt);
    let salt =
        SaltString::encode_b64(&salt).map_err(|e| PersistenceError::PasswordHash(e.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PersistenceError::PasswordHash(e.to_string()))
}

fn seeded_id(rng: &mut StdRng) -> String {
    uuid::Builder::from_random_bytes(rng.gen()).into_uuid().to_string()
}

pub(super) fn populate(tables: &mut Tables) -> Result<(), PersistenceError> {
    let mut rng = StdRng::seed_from_u64(RNG_SEED);
    let now = squash::model::now();
    let password_hash = hash_password(SEED_PASSWORD, &mut rng)?;

    let mut users = Vec::with_capacity(USERS.len());
    for (i, &(first, last, email, skill)) in USERS.iter().enumerate() {
        let role = if email == SEED_SUPER_ADMIN_EMAIL {
            UserRole::SuperAdmin
        } else {
            UserRole::User
        };
        let user = NewUser {
            id: Some(seeded_id(&mut rng)),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            password_hash: password_hash.clone(),
            role: Some(role),
            skill,
            avatar_url: format!("https://i.pravatar.cc/100?img={}", 10 + i),
            ..Default::default()
        }
        .into_user()?;
        tables.users.insert(user.id.clone(), user.clone());
        users.push(user);
    }

    let active: Vec<&User> = users
        .iter()
        .filter(|u| u.email != SEED_NEWCOMER_EMAIL)
        .collect();
    let active_ids: Vec<String> = active.iter().map(|u| u.id.clone()).collect();

    let mut leagues = Vec::with_capacity(LEAGUES.len());
    for (i, &(name, description, location, sets)) in LEAGUES.iter().enumerate() {
        let owner = active[i % active.len()];
        let roster_size = 10 + rng.gen_range(0..6);
        let mut player_ids = active_ids.clone();
        player_ids.shuffle(&mut rng);
        player_ids.truncate(roster_size);

        let start_date = now + Duration::days(rng.gen_range(-30..60));
        let end_date = if rng.gen_range(0..4) == 0 {
            Some(start_date + Duration::days(rng.gen_range(30..150)))
        } else {
            None
        };
        let created_at = now - Duration::days(rng.gen_range(0..120));

        let mut league = NewLeague {
            id: Some(seeded_id(&mut rng)),
            name: name.to_string(),
            description: description.to_string(),
            location: location.to_string(),
            owner_id: owner.id.clone(),
            admin_roles: BTreeMap::new(),
            player_ids,
            sets_per_match: sets,
            start_date,
            end_date,
            status: status_for_dates(start_date, end_date, now),
            created_at: Some(created_at),
        }
        .into_league();
        league.grant_admin(&owner.id, LeagueAdminRole::AdminPlayer);
        leagues.push(league);
    }

    if let Some(admin) = users.iter().find(|u| u.is_super_admin()) {
        seed_admin_activity(tables, &mut rng, &mut leagues, &admin.id, now);
    }

    for league in &leagues {
        tables.leagues.insert(league.id.clone(), league.clone());
    }

    let current_year = now.year();
    for year in [current_year, current_year - 1] {
        seed_league_matches(tables, &mut rng, &leagues, year);
        seed_friendlies(tables, &mut rng, &active_ids, year);
    }

    tracing::info!(
        users = tables.users.len(),
        leagues = tables.leagues.len(),
        matches = tables.matches.len(),
        friendlies = tables.friendlies.len(),
        "Seed data generated"
    );
    Ok(())
}

/// A handful of matches in every league for the super-admin, in every
/// status, so there is something awaiting a decision.
fn seed_admin_activity(
    tables: &mut Tables,
    rng: &mut StdRng,
    leagues: &mut [League],
    admin_id: &str,
    now: DateTime<Utc>,
) {
    const STATUSES: [MatchStatus; 3] = [
        MatchStatus::Confirmed,
        MatchStatus::Pending,
        MatchStatus::Rejected,
    ];
    for league in leagues.iter_mut() {
        league.add_player(admin_id);
        let opponents: Vec<String> = league
            .player_ids
            .iter()
            .filter(|id| *id != admin_id)
            .cloned()
            .collect();
        let count = 3 + rng.gen_range(0..4);
        for _ in 0..count {
            let Some(opponent) = opponents.choose(rng).cloned() else {
                continue;
            };
            let status = STATUSES[rng.gen_range(0..STATUSES.len())];
            let played = now - Duration::days(rng.gen_range(0..60));
            let m = NewMatch {
                id: Some(seeded_id(rng)),
                league_id: league.id.clone(),
                player_a_id: admin_id.to_string(),
                player_b_id: opponent.clone(),
                sets: random_sets(rng, league.sets_per_match),
                status: Some(status),
                reported_by: admin_id.to_string(),
                confirmed_by: (status == MatchStatus::Confirmed).then_some(opponent),
                created_at: Some(played),
            }
            .into_match();
            tables.matches.insert(m.id.clone(), m);
        }
    }
}

fn seed_league_matches(tables: &mut Tables, rng: &mut StdRng, leagues: &[League], year: i32) {
    if leagues.is_empty() {
        return;
    }
    for i in 0..MATCHES_PER_YEAR {
        let league = &leagues[rng.gen_range(0..leagues.len())];
        let Some((a, b)) = pick_two(&league.player_ids, rng) else {
            continue;
        };
        let played = random_time_in_month(rng, year, (i % 12) as u32 + 1);
        let m = NewMatch {
            id: Some(seeded_id(rng)),
            league_id: league.id.clone(),
            player_a_id: a.clone(),
            player_b_id: b.clone(),
            sets: random_sets(rng, league.sets_per_match),
            status: Some(MatchStatus::Confirmed),
            reported_by: a,
            confirmed_by: Some(b),
            created_at: played,
        }
        .into_match();
        tables.matches.insert(m.id.clone(), m);
    }
}

fn seed_friendlies(tables: &mut Tables, rng: &mut StdRng, user_ids: &[String], year: i32) {
    for i in 0..FRIENDLIES_PER_YEAR {
        let Some((a, b)) = pick_two(user_ids, rng) else {
            return;
        };
        let played = random_time_in_month(rng, year, (i % 12) as u32 + 1);
        let m = NewFriendlyMatch {
            id: Some(seeded_id(rng)),
            player_a_id: a.clone(),
            player_b_id: b.clone(),
            sets: random_sets(rng, 5),
            status: Some(MatchStatus::Confirmed),
            reported_by: a,
            confirmed_by: Some(b),
            played_at: played,
            created_at: played,
        }
        .into_friendly_match();
        tables.friendlies.insert(m.id.clone(), m);
    }
}

fn pick_two(ids: &[String], rng: &mut StdRng) -> Option<(String, String)> {
    if ids.len() < 2 {
        return None;
    }
    let mut picked = ids.choose_multiple(rng, 2);
    Some((picked.next()?.clone(), picked.next()?.clone()))
}

/// Between three sets and `max_sets`, each side scoring 11 to 16 points.
/// Tied sets are pushed apart by two.
fn random_sets(rng: &mut StdRng, max_sets: u8) -> Vec<SetScore> {
    let max_sets = u32::from(max_sets.max(3));
    let total = 3 + rng.gen_range(0..max_sets - 2);
    (0..total)
        .map(|_| {
            let a = 11 + rng.gen_range(0..6);
            let mut b = 11 + rng.gen_range(0..6);
            if a == b {
                b += 2;
            }
            SetScore::new(a, b)
        })
        .collect()
}

fn random_time_in_month(rng: &mut StdRng, year: i32, month: u32) -> Option<DateTime<Utc>> {
    let day = 1 + rng.gen_range(0..27);
    let hour = rng.gen_range(0..22);
    let minute = rng.gen_range(0..60);
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).single()
}
