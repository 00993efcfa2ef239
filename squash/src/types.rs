//! Canonical enumerations shared by every layer.
//!
//! Each enum has exactly one text form. That form is used for serde, for the
//! `TEXT` columns in both SQL schemas, and for `Display`, so a value written
//! by one backend reads back identically from any other.

use serde::{Deserialize, Serialize};

/// Returned when a stored or submitted string names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(ParseEnumError {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum! {
    /// Site-wide role of a user account.
    #[derive(Default)]
    UserRole {
        #[default]
        User => "user",
        Admin => "admin",
        /// May manage every league regardless of ownership.
        SuperAdmin => "super_admin",
    }
}

text_enum! {
    /// Self-declared playing level.
    #[derive(Default)]
    SkillLevel {
        #[default]
        Beginner => "beginner",
        Intermediate => "intermediate",
        Pro => "pro",
    }
}

text_enum! {
    /// Role tag held by a league admin.
    LeagueAdminRole {
        /// Manages the league and also plays in it.
        AdminPlayer => "admin-player",
        Moderator => "moderator",
    }
}

text_enum! {
    LeagueStatus {
        Upcoming => "upcoming",
        Active => "active",
        Finished => "finished",
    }
}

text_enum! {
    /// Status of a league or friendly match.
    ///
    /// `Scheduled` is reserved; no transition currently produces it.
    MatchStatus {
        Scheduled => "scheduled",
        Pending => "pending",
        Confirmed => "confirmed",
        Rejected => "rejected",
    }
}

text_enum! {
    JoinRequestStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

text_enum! {
    /// Kind of user-submitted feedback report.
    ReportKind {
        Bug => "bug",
        Feature => "feature",
    }
}

text_enum! {
    ReportStatus {
        Open => "open",
        Closed => "closed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_form_matches_serde_form() {
        for role in LeagueAdminRole::ALL {
            let json = serde_json::to_string(role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
        for status in MatchStatus::ALL {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn parse_accepts_every_text_form() {
        for role in UserRole::ALL {
            assert_eq!(role.as_str().parse::<UserRole>(), Ok(*role));
        }
        assert_eq!(
            "admin-player".parse::<LeagueAdminRole>(),
            Ok(LeagueAdminRole::AdminPlayer)
        );
    }

    #[test]
    fn parse_rejects_unknown_text() {
        let err = "Admin".parse::<UserRole>().unwrap_err();
        assert_eq!(err.kind, "UserRole");
        assert_eq!(err.value, "Admin");
    }

    #[test]
    fn defaults() {
        assert_eq!(UserRole::default(), UserRole::User);
        assert_eq!(SkillLevel::default(), SkillLevel::Beginner);
    }
}
