//! Match reporting state machine.
//!
//! ```text
//! report ──> pending ──confirm──> confirmed
//!                    └──reject───> rejected
//! ```
//!
//! Only a named player who did not report the result may move a match out
//! of `pending`. Both outcomes are terminal.

use crate::model::{FriendlyMatch, Match};
use crate::types::MatchStatus;

/// What the deciding player does with a pending result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirm,
    Reject,
}

impl Decision {
    fn target(self) -> MatchStatus {
        match self {
            Self::Confirm => MatchStatus::Confirmed,
            Self::Reject => MatchStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("a result cannot be decided by the player who reported it")]
    SelfDecision,
    #[error("only the players of a match can decide its result")]
    NotParticipant,
    #[error("match result is already {0}")]
    AlreadyDecided(MatchStatus),
}

/// Common view over league and friendly matches.
pub trait Decidable {
    fn player_ids(&self) -> [&str; 2];
    fn reported_by(&self) -> &str;
    fn status(&self) -> MatchStatus;
    fn record_decision(&mut self, status: MatchStatus, decided_by: Option<String>);

    fn is_player(&self, user_id: &str) -> bool {
        !user_id.is_empty() && self.player_ids().contains(&user_id)
    }
}

impl Decidable for Match {
    fn player_ids(&self) -> [&str; 2] {
        [&self.player_a_id, &self.player_b_id]
    }

    fn reported_by(&self) -> &str {
        &self.reported_by
    }

    fn status(&self) -> MatchStatus {
        self.status
    }

    fn record_decision(&mut self, status: MatchStatus, decided_by: Option<String>) {
        self.status = status;
        self.confirmed_by = decided_by;
    }
}

impl Decidable for FriendlyMatch {
    fn player_ids(&self) -> [&str; 2] {
        [&self.player_a_id, &self.player_b_id]
    }

    fn reported_by(&self) -> &str {
        &self.reported_by
    }

    fn status(&self) -> MatchStatus {
        self.status
    }

    fn record_decision(&mut self, status: MatchStatus, decided_by: Option<String>) {
        self.status = status;
        self.confirmed_by = decided_by;
    }
}

/// Check that `actor_id` may decide the match, without changing it.
///
/// Permission is checked before state: an outsider gets a permission error
/// even for a match that is already decided.
pub fn check_decision<M: Decidable>(record: &M, actor_id: &str) -> Result<(), LifecycleError> {
    if record.reported_by() == actor_id {
        return Err(LifecycleError::SelfDecision);
    }
    if !record.is_player(actor_id) {
        return Err(LifecycleError::NotParticipant);
    }
    match record.status() {
        MatchStatus::Pending => Ok(()),
        other => Err(LifecycleError::AlreadyDecided(other)),
    }
}

/// Apply a decision. A confirmation records the confirming player; a
/// rejection records nobody.
pub fn apply_decision<M: Decidable>(
    record: &mut M,
    actor_id: &str,
    decision: Decision,
) -> Result<(), LifecycleError> {
    check_decision(record, actor_id)?;
    let decided_by = match decision {
        Decision::Confirm => Some(actor_id.to_string()),
        Decision::Reject => None,
    };
    record.record_decision(decision.target(), decided_by);
    Ok(())
}

/// True when the match is waiting for `user_id` to confirm or reject it.
pub fn awaits_decision_by<M: Decidable>(record: &M, user_id: &str) -> bool {
    check_decision(record, user_id).is_ok()
}
