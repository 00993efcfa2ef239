use chrono::{DateTime, Utc};
use squash::friendly::is_between;
use squash::{
    apply_decision, belongs_to_period, Decision, FriendlyMatch, FriendlySummary, NewFriendlyMatch,
    Period, SetScore, User,
};

use super::{require_sets, LeagueService, ServiceError};
use crate::persistence::Store;

/// Input for [`LeagueService::report_friendly`]. The reporter is player A.
#[derive(Debug, Clone)]
pub struct ReportFriendly {
    pub opponent_id: String,
    pub sets: Vec<SetScore>,
    /// Defaults to the time of reporting.
    pub played_at: Option<DateTime<Utc>>,
}

impl<S: Store> LeagueService<S> {
    pub async fn report_friendly(
        &self,
        actor: &User,
        input: ReportFriendly,
    ) -> Result<FriendlyMatch, ServiceError> {
        if input.opponent_id == actor.id {
            return Err(ServiceError::Validation(
                "you cannot play a friendly against yourself".into(),
            ));
        }
        require_sets(&input.sets)?;
        self.require_user(&input.opponent_id).await?;

        let m = self
            .store
            .create_friendly_match(NewFriendlyMatch {
                id: None,
                player_a_id: actor.id.clone(),
                player_b_id: input.opponent_id,
                sets: input.sets,
                status: None,
                reported_by: actor.id.clone(),
                confirmed_by: None,
                played_at: input.played_at,
                created_at: None,
            })
            .await?;
        tracing::info!(friendly_id = %m.id, reported_by = %actor.id, "Friendly reported");
        Ok(m)
    }

    pub async fn confirm_friendly(
        &self,
        actor: &User,
        friendly_id: &str,
    ) -> Result<FriendlyMatch, ServiceError> {
        self.decide_friendly(actor, friendly_id, Decision::Confirm)
            .await
    }

    pub async fn reject_friendly(
        &self,
        actor: &User,
        friendly_id: &str,
    ) -> Result<FriendlyMatch, ServiceError> {
        self.decide_friendly(actor, friendly_id, Decision::Reject)
            .await
    }

    async fn decide_friendly(
        &self,
        actor: &User,
        friendly_id: &str,
        decision: Decision,
    ) -> Result<FriendlyMatch, ServiceError> {
        let mut m = self
            .store
            .get_friendly_match(friendly_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("friendly match", friendly_id))?;
        apply_decision(&mut m, &actor.id, decision)?;
        self.store.update_friendly_match(&m).await?;
        tracing::info!(friendly_id, status = %m.status, by = %actor.id, "Friendly decided");
        Ok(m)
    }

    /// The actor's confirmed friendlies in `period`, optionally against one
    /// opponent only.
    pub async fn friendly_summary(
        &self,
        actor: &User,
        opponent_id: Option<&str>,
        period: Period,
    ) -> Result<FriendlySummary, ServiceError> {
        let now = squash::model::now();
        let matches = self.store.list_friendly_matches().await?;
        let relevant = matches.iter().filter(|m| {
            let involved = match opponent_id {
                Some(opponent) => is_between(m, &actor.id, opponent),
                None => m.player_a_id == actor.id || m.player_b_id == actor.id,
            };
            involved && belongs_to_period(m, period, now)
        });
        Ok(FriendlySummary::build(&actor.id, relevant))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Duration, TimeZone};
    use squash::{MatchStatus, UserRole};

    use super::*;
    use crate::persistence::{ErrorKind, FriendlyMatchRepository, MemoryStore};
    use crate::service::test_support::{service, user};
    use crate::service::MAX_SET_POINTS;

    async fn players() -> (LeagueService<MemoryStore>, User, User, User) {
        let svc = service();
        let ann = user(svc.store(), "ann", UserRole::User).await;
        let bob = user(svc.store(), "bob", UserRole::User).await;
        let cat = user(svc.store(), "cat", UserRole::User).await;
        (svc, ann, bob, cat)
    }

    fn game(opponent: &str, sets: Vec<SetScore>) -> ReportFriendly {
        ReportFriendly {
            opponent_id: opponent.into(),
            sets,
            played_at: None,
        }
    }

    #[tokio::test]
    async fn report_validates_opponent_and_sets() {
        let (svc, ann, _, _) = players().await;
        let err = svc
            .report_friendly(&ann, game("ann", vec![SetScore::new(11, 2)]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = svc
            .report_friendly(&ann, game("bob", Vec::new()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = svc
            .report_friendly(&ann, game("bob", vec![SetScore::new(u32::MAX, 0)]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        svc.report_friendly(&ann, game("bob", vec![SetScore::new(MAX_SET_POINTS, 0)]))
            .await
            .unwrap();
        let err = svc
            .report_friendly(&ann, game("ghost", vec![SetScore::new(11, 2)]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn opponent_decides() {
        let (svc, ann, bob, cat) = players().await;
        let played = Utc.with_ymd_and_hms(2024, 4, 2, 18, 0, 0).unwrap();
        let m = svc
            .report_friendly(
                &ann,
                ReportFriendly {
                    played_at: Some(played),
                    ..game("bob", vec![SetScore::new(11, 2)])
                },
            )
            .await
            .unwrap();
        assert_eq!(m.played_at, played);
        assert_eq!(m.player_a_id, "ann");

        assert_eq!(
            svc.confirm_friendly(&ann, &m.id).await.unwrap_err().kind(),
            ErrorKind::Forbidden
        );
        assert_eq!(
            svc.reject_friendly(&cat, &m.id).await.unwrap_err().kind(),
            ErrorKind::Forbidden
        );
        let rejected = svc.reject_friendly(&bob, &m.id).await.unwrap();
        assert_eq!(rejected.status, MatchStatus::Rejected);
        assert_eq!(
            svc.confirm_friendly(&bob, &m.id).await.unwrap_err().kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            svc.store().get_friendly_match(&m.id).await.unwrap(),
            Some(rejected)
        );
    }

    #[tokio::test]
    async fn summary_covers_confirmed_games_in_period() {
        let (svc, ann, bob, cat) = players().await;

        let win = svc
            .report_friendly(&ann, game("bob", vec![SetScore::new(11, 4), SetScore::new(11, 6)]))
            .await
            .unwrap();
        svc.confirm_friendly(&bob, &win.id).await.unwrap();

        let loss = svc
            .report_friendly(&cat, game("ann", vec![SetScore::new(11, 9)]))
            .await
            .unwrap();
        svc.confirm_friendly(&ann, &loss.id).await.unwrap();

        // Still pending, so ignored.
        svc.report_friendly(&ann, game("bob", vec![SetScore::new(11, 0)]))
            .await
            .unwrap();

        // Confirmed but played long ago.
        let old = svc
            .report_friendly(
                &ann,
                ReportFriendly {
                    played_at: Some(Utc::now() - Duration::days(800)),
                    ..game("bob", vec![SetScore::new(11, 1)])
                },
            )
            .await
            .unwrap();
        svc.confirm_friendly(&bob, &old.id).await.unwrap();

        let all = svc
            .friendly_summary(&ann, None, Period::CurrentYear)
            .await
            .unwrap();
        assert_eq!((all.matches, all.wins, all.losses), (2, 1, 1));
        assert_eq!((all.sets_won, all.sets_lost), (2, 1));
        assert_eq!((all.points_won, all.points_lost), (31, 21));

        let vs_bob = svc
            .friendly_summary(&ann, Some("bob"), Period::CurrentYear)
            .await
            .unwrap();
        assert_eq!((vs_bob.matches, vs_bob.wins), (1, 1));

        let then = old.played_at;
        let past = svc
            .friendly_summary(
                &ann,
                Some("bob"),
                Period::Month {
                    year: then.year(),
                    month: then.month(),
                },
            )
            .await
            .unwrap();
        assert_eq!(past.matches, 1);
    }
}
