//! League rules applied on top of a [`Store`].
//!
//! Every operation takes the acting [`User`], already resolved by the caller,
//! and checks what that user may do before touching storage. Errors carry the
//! same [`ErrorKind`] taxonomy as the persistence layer.

mod friendlies;
mod join_requests;
mod leagues;
mod matches;
mod reports;

pub use friendlies::ReportFriendly;
pub use join_requests::JoinOutcome;
pub use leagues::CreateLeague;
pub use matches::{PendingDecisions, ReportMatch};

use squash::{LifecycleError, SetScore, User};

use crate::persistence::{ErrorKind, PersistenceError, Store};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("not allowed: {0}")]
    Forbidden(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Persistence(err) => err.kind(),
        }
    }
}

impl From<LifecycleError> for ServiceError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::SelfDecision | LifecycleError::NotParticipant => {
                Self::Forbidden(err.to_string())
            }
            LifecycleError::AlreadyDecided(_) => Self::Conflict(err.to_string()),
        }
    }
}

pub struct LeagueService<S> {
    store: S,
}

impl<S: Store> LeagueService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn require_user(&self, id: &str) -> Result<User, ServiceError> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", id))
    }
}

/// Highest score accepted for one side of a set.
pub const MAX_SET_POINTS: u32 = 999;

fn require_sets(sets: &[SetScore]) -> Result<(), ServiceError> {
    if sets.is_empty() {
        return Err(ServiceError::Validation(
            "a result needs at least one set".into(),
        ));
    }
    if let Some(set) = sets.iter().find(|s| s.a.max(s.b) > MAX_SET_POINTS) {
        return Err(ServiceError::Validation(format!(
            "set score {}-{} exceeds {MAX_SET_POINTS} points",
            set.a, set.b
        )));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use squash::MatchStatus;

    #[test]
    fn lifecycle_errors_map_to_kinds() {
        assert_eq!(
            ServiceError::from(LifecycleError::SelfDecision).kind(),
            ErrorKind::Forbidden
        );
        assert_eq!(
            ServiceError::from(LifecycleError::NotParticipant).kind(),
            ErrorKind::Forbidden
        );
        assert_eq!(
            ServiceError::from(LifecycleError::AlreadyDecided(MatchStatus::Confirmed)).kind(),
            ErrorKind::Conflict
        );
    }

    #[test]
    fn persistence_errors_keep_their_kind() {
        let err: ServiceError = PersistenceError::DuplicateEmail("a@example.com".into()).into();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err: ServiceError = PersistenceError::not_found("league", "l1").into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn empty_sets_are_invalid() {
        assert!(require_sets(&[]).is_err());
        assert!(require_sets(&[SetScore::new(11, 3)]).is_ok());
    }

    #[test]
    fn oversized_set_scores_are_invalid() {
        assert!(require_sets(&[SetScore::new(MAX_SET_POINTS, 997)]).is_ok());
        let err = require_sets(&[SetScore::new(11, 3), SetScore::new(4, 1000)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
