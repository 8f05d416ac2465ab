//! Stored vs. effective bounty status.
//!
//! The document store keeps the last written status, but deadline expiry is
//! decided at read time: past the submission deadline a bounty is treated as
//! COMPLETED no matter what was stored. Cancellation is terminal and is the
//! one stored state expiry never overrides.

use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BountyStatus {
    Open,
    InProgress,
    Review,
    Completed,
    Cancelled,
}

impl BountyStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BountyStatus::Completed | BountyStatus::Cancelled)
    }
}

impl fmt::Display for BountyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BountyStatus::Open => "OPEN",
            BountyStatus::InProgress => "IN_PROGRESS",
            BountyStatus::Review => "REVIEW",
            BountyStatus::Completed => "COMPLETED",
            BountyStatus::Cancelled => "CANCELLED",
        };
        f.write_str(label)
    }
}

/// The status a bounty should be treated as right now.
///
/// CANCELLED is returned as-is; otherwise a past deadline forces COMPLETED
/// and the stored value wins for everything else.
pub fn effective_status(
    stored: BountyStatus,
    deadline: DateTime<Utc>,
    now: DateTime<Utc>,
) -> BountyStatus {
    match stored {
        BountyStatus::Cancelled => BountyStatus::Cancelled,
        BountyStatus::Completed => BountyStatus::Completed,
        _ if now > deadline => BountyStatus::Completed,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn expiry_forces_completed() {
        let yesterday = now() - Duration::days(1);
        assert_eq!(
            effective_status(BountyStatus::Open, yesterday, now()),
            BountyStatus::Completed
        );
        assert_eq!(
            effective_status(BountyStatus::Review, yesterday, now()),
            BountyStatus::Completed
        );
    }

    #[test]
    fn stored_status_wins_before_deadline() {
        let tomorrow = now() + Duration::days(1);
        assert_eq!(
            effective_status(BountyStatus::InProgress, tomorrow, now()),
            BountyStatus::InProgress
        );
    }

    #[test]
    fn cancelled_is_never_overridden_by_expiry() {
        let yesterday = now() - Duration::days(1);
        assert_eq!(
            effective_status(BountyStatus::Cancelled, yesterday, now()),
            BountyStatus::Cancelled
        );
        let tomorrow = now() + Duration::days(1);
        assert_eq!(
            effective_status(BountyStatus::Cancelled, tomorrow, now()),
            BountyStatus::Cancelled
        );
    }

    #[test]
    fn deadline_instant_itself_is_still_open() {
        let instant = now();
        assert_eq!(
            effective_status(BountyStatus::Open, instant, instant),
            BountyStatus::Open
        );
    }

    #[test]
    fn status_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&BountyStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        let parsed: BountyStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(parsed, BountyStatus::Cancelled);
    }
}
