//! Learning Streak
//!
//! Consecutive calendar days (UTC) on which the user signed in.

use chrono::{DateTime, Utc};
use derive_more::Display;

/// What a login did to the streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StreakChange {
    #[display("started")]
    Started,
    #[display("unchanged")]
    Unchanged,
    #[display("extended")]
    Extended,
    #[display("reset")]
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LearningStreak {
    pub count: u32,
    pub last_login: Option<DateTime<Utc>>,
}

impl LearningStreak {
    pub fn new(count: u32, last_login: Option<DateTime<Utc>>) -> Self {
        Self { count, last_login }
    }

    /// Streak after a login at `now`. `last_login` always becomes `now`.
    ///
    /// - no streak or no previous login: 1
    /// - previous login today: unchanged
    /// - previous login yesterday: +1
    /// - anything older: back to 1
    ///
    /// A previous login dated after `now` (clock skew) leaves the count alone.
    pub fn advance(&self, now: DateTime<Utc>) -> (LearningStreak, StreakChange) {
        let (count, change) = match self.last_login {
            Some(last) if self.count > 0 => {
                let days = (now.date_naive() - last.date_naive()).num_days();
                match days {
                    ..=0 => (self.count, StreakChange::Unchanged),
                    1 => (self.count.saturating_add(1), StreakChange::Extended),
                    _ => (1, StreakChange::Reset),
                }
            }
            _ => (1, StreakChange::Started),
        };

        (
            LearningStreak {
                count,
                last_login: Some(now),
            },
            change,
        )
    }
}
