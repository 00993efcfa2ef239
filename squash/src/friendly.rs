//! Period filtering and head-to-head summaries for friendly matches.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::model::FriendlyMatch;
use crate::standings::SetTally;
use crate::types::MatchStatus;

/// Calendar window over a friendly match's played-at time (UTC).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "period", rename_all = "snake_case")]
pub enum Period {
    #[default]
    CurrentMonth,
    CurrentYear,
    Month {
        year: i32,
        month: u32,
    },
}

impl Period {
    pub fn contains(self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            Self::CurrentMonth => at.year() == now.year() && at.month() == now.month(),
            Self::CurrentYear => at.year() == now.year(),
            Self::Month { year, month } => at.year() == year && at.month() == month,
        }
    }
}

pub fn belongs_to_period(m: &FriendlyMatch, period: Period, now: DateTime<Utc>) -> bool {
    period.contains(m.played_at, now)
}

/// True when the match was played between exactly these two users.
pub fn is_between(m: &FriendlyMatch, user_id: &str, opponent_id: &str) -> bool {
    (m.player_a_id == user_id && m.player_b_id == opponent_id)
        || (m.player_a_id == opponent_id && m.player_b_id == user_id)
}

/// Totals from one player's point of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FriendlySummary {
    pub matches: u32,
    pub wins: u32,
    pub losses: u32,
    pub sets_won: u32,
    pub sets_lost: u32,
    pub points_won: u32,
    pub points_lost: u32,
}

impl FriendlySummary {
    /// Summarise the confirmed matches in `matches` as seen by `user_id`.
    /// A match with equal set counts is neither a win nor a loss.
    pub fn build<'a>(user_id: &str, matches: impl IntoIterator<Item = &'a FriendlyMatch>) -> Self {
        let mut summary = Self::default();
        for m in matches {
            if m.status != MatchStatus::Confirmed {
                continue;
            }
            let tally = SetTally::from_sets(&m.sets);
            let (won, lost, pts_won, pts_lost) = if m.player_a_id == user_id {
                (tally.sets_a, tally.sets_b, tally.points_a, tally.points_b)
            } else {
                (tally.sets_b, tally.sets_a, tally.points_b, tally.points_a)
            };
            summary.matches += 1;
            summary.sets_won += won;
            summary.sets_lost += lost;
            summary.points_won = summary.points_won.saturating_add(pts_won);
            summary.points_lost = summary.points_lost.saturating_add(pts_lost);
            if won > lost {
                summary.wins += 1;
            } else if lost > won {
                summary.losses += 1;
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewFriendlyMatch, SetScore};
    use chrono::TimeZone;

    fn friendly(a: &str, b: &str, sets: &[(u32, u32)], played: DateTime<Utc>) -> FriendlyMatch {
        NewFriendlyMatch {
            id: None,
            player_a_id: a.into(),
            player_b_id: b.into(),
            sets: sets.iter().map(|&(x, y)| SetScore::new(x, y)).collect(),
            status: Some(MatchStatus::Confirmed),
            reported_by: a.into(),
            confirmed_by: Some(b.into()),
            played_at: Some(played),
            created_at: None,
        }
        .into_friendly_match()
    }

    #[test]
    fn periods() {
        let now = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();
        let may = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        let feb = Utc.with_ymd_and_hms(2024, 2, 2, 0, 0, 0).unwrap();
        let last_may = Utc.with_ymd_and_hms(2023, 5, 2, 0, 0, 0).unwrap();

        assert!(Period::CurrentMonth.contains(may, now));
        assert!(!Period::CurrentMonth.contains(feb, now));
        assert!(!Period::CurrentMonth.contains(last_may, now));
        assert!(Period::CurrentYear.contains(feb, now));
        assert!(!Period::CurrentYear.contains(last_may, now));
        let custom = Period::Month { year: 2023, month: 5 };
        assert!(custom.contains(last_may, now));
        assert!(!custom.contains(may, now));
    }

    #[test]
    fn summary_points_saturate() {
        let at = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        let matches = vec![
            friendly("me", "you", &[(u32::MAX, 0), (11, 0)], at),
            friendly("you", "me", &[(0, 11)], at),
        ];
        let summary = FriendlySummary::build("me", matches.iter());
        assert_eq!(summary.points_won, u32::MAX);
        assert_eq!(summary.wins, 2);
    }

    #[test]
    fn summary_takes_the_users_side() {
        let at = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        let matches = vec![
            friendly("me", "you", &[(11, 7), (11, 9), (11, 3)], at),
            friendly("you", "me", &[(11, 7), (11, 9), (5, 11), (11, 3)], at),
            friendly("you", "me", &[(11, 7), (7, 11)], at),
        ];
        let s = FriendlySummary::build("me", &matches);
        assert_eq!(s.matches, 3);
        assert_eq!((s.wins, s.losses), (1, 1));
        assert_eq!((s.sets_won, s.sets_lost), (3 + 1 + 1, 3 + 1));
        assert_eq!(s.points_won, 33 + 7 + 9 + 11 + 3 + 7 + 11);
        assert_eq!(s.points_lost, 19 + 11 + 11 + 5 + 11 + 11 + 7);
    }

    #[test]
    fn summary_skips_unconfirmed() {
        let at = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        let mut pending = friendly("me", "you", &[(11, 0)], at);
        pending.status = MatchStatus::Pending;
        assert_eq!(FriendlySummary::build("me", [&pending]), FriendlySummary::default());
    }

    #[test]
    fn between_is_symmetric() {
        let at = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        let m = friendly("a", "b", &[(11, 0)], at);
        assert!(is_between(&m, "a", "b"));
        assert!(is_between(&m, "b", "a"));
        assert!(!is_between(&m, "a", "c"));
    }
}
