//! Canonical list orderings.
//!
//! Backends fetch rows in whatever order they like and then sort with these
//! functions. The entity id is always the last key so that rows with equal
//! timestamps or names still come out in the same order everywhere.

use crate::model::{FriendlyMatch, League, LeagueJoinRequest, Match, Report, User};

/// Full name ascending.
pub fn sort_users(users: &mut [User]) {
    users.sort_by(|a, b| {
        a.full_name()
            .cmp(&b.full_name())
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Newest first.
pub fn sort_leagues(leagues: &mut [League]) {
    leagues.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
}

/// Newest first.
pub fn sort_matches(matches: &mut [Match]) {
    matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
}

/// Most recently played first.
pub fn sort_friendly_matches(matches: &mut [FriendlyMatch]) {
    matches.sort_by(|a, b| b.played_at.cmp(&a.played_at).then_with(|| a.id.cmp(&b.id)));
}

/// Newest first.
pub fn sort_join_requests(requests: &mut [LeagueJoinRequest]) {
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
}

/// Newest first.
pub fn sort_reports(reports: &mut [Report]) {
    reports.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
}
