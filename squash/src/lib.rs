pub mod friendly;
pub mod lifecycle;
pub mod membership;
pub mod model;
pub mod ordering;
pub mod standings;
pub mod types;

pub use friendly::{belongs_to_period, FriendlySummary, Period};
pub use lifecycle::{apply_decision, awaits_decision_by, check_decision, Decidable, Decision, LifecycleError};
pub use membership::{status_for_dates, MembershipError};
pub use model::{
    email_key, FriendlyMatch, League, LeagueJoinRequest, Match, NewEntityError, NewFriendlyMatch,
    NewJoinRequest, NewLeague, NewMatch, NewReport, NewUser, Report, SetScore, User,
};
pub use standings::{build_standings, StandingEntry};
pub use types::{
    JoinRequestStatus, LeagueAdminRole, LeagueStatus, MatchStatus, ParseEnumError, ReportKind,
    ReportStatus, SkillLevel, UserRole,
};
