//! League table computed from confirmed matches.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::{Match, SetScore, User};
use crate::types::MatchStatus;

/// League points for the side that won more sets.
pub const WIN_POINTS: u32 = 3;
/// League points for the side that won fewer sets.
pub const LOSS_POINTS: u32 = 1;
/// League points for each side when both won the same number of sets.
pub const DRAW_POINTS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    SideA,
    SideB,
    Draw,
}

/// Sets and points won by each side of one match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetTally {
    pub sets_a: u32,
    pub sets_b: u32,
    pub points_a: u32,
    pub points_b: u32,
}

impl SetTally {
    /// A set goes to the higher score; an equal set goes to nobody. Point
    /// sums saturate rather than wrap.
    pub fn from_sets(sets: &[SetScore]) -> Self {
        let mut tally = Self::default();
        for set in sets {
            tally.points_a = tally.points_a.saturating_add(set.a);
            tally.points_b = tally.points_b.saturating_add(set.b);
            if set.a > set.b {
                tally.sets_a += 1;
            } else if set.b > set.a {
                tally.sets_b += 1;
            }
        }
        tally
    }

    pub fn outcome(&self) -> Outcome {
        match self.sets_a.cmp(&self.sets_b) {
            std::cmp::Ordering::Greater => Outcome::SideA,
            std::cmp::Ordering::Less => Outcome::SideB,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }
}

/// One row of the league table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingEntry {
    pub player: User,
    pub points: u32,
    pub matches: u32,
    pub sets_won: u32,
    pub sets_lost: u32,
    pub points_won: u32,
    pub points_lost: u32,
}

impl StandingEntry {
    fn new(player: User) -> Self {
        Self {
            player,
            points: 0,
            matches: 0,
            sets_won: 0,
            sets_lost: 0,
            points_won: 0,
            points_lost: 0,
        }
    }

    pub fn set_difference(&self) -> i64 {
        i64::from(self.sets_won) - i64::from(self.sets_lost)
    }

    pub fn point_difference(&self) -> i64 {
        i64::from(self.points_won) - i64::from(self.points_lost)
    }

    fn record(&mut self, sets_won: u32, sets_lost: u32, points_won: u32, points_lost: u32, league_points: u32) {
        self.matches += 1;
        self.sets_won += sets_won;
        self.sets_lost += sets_lost;
        self.points_won = self.points_won.saturating_add(points_won);
        self.points_lost = self.points_lost.saturating_add(points_lost);
        self.points += league_points;
    }
}

/// Build the table for `players` from `matches`.
///
/// Every player gets a row, including players with no matches. Only
/// confirmed matches between two listed players count. Rows are ordered by
/// league points, then set difference, then point difference, all
/// descending; rows still equal keep the order of `players`.
pub fn build_standings(players: &[User], matches: &[Match]) -> Vec<StandingEntry> {
    let mut rows: Vec<StandingEntry> = Vec::with_capacity(players.len());
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(players.len());
    for player in players {
        if index.contains_key(player.id.as_str()) {
            continue;
        }
        index.insert(&player.id, rows.len());
        rows.push(StandingEntry::new(player.clone()));
    }

    for m in matches {
        if m.status != MatchStatus::Confirmed || m.player_a_id == m.player_b_id {
            continue;
        }
        let (Some(&a), Some(&b)) = (
            index.get(m.player_a_id.as_str()),
            index.get(m.player_b_id.as_str()),
        ) else {
            continue;
        };

        let tally = SetTally::from_sets(&m.sets);
        let (points_a, points_b) = match tally.outcome() {
            Outcome::SideA => (WIN_POINTS, LOSS_POINTS),
            Outcome::SideB => (LOSS_POINTS, WIN_POINTS),
            Outcome::Draw => (DRAW_POINTS, DRAW_POINTS),
        };
        rows[a].record(tally.sets_a, tally.sets_b, tally.points_a, tally.points_b, points_a);
        rows[b].record(tally.sets_b, tally.sets_a, tally.points_b, tally.points_a, points_b);
    }

    rows.sort_by(|x, y| {
        y.points
            .cmp(&x.points)
            .then_with(|| y.set_difference().cmp(&x.set_difference()))
            .then_with(|| y.point_difference().cmp(&x.point_difference()))
    });
    rows
}
