//! Submission documents: work handed in by applicants against a bounty.
//! Advisory state only; the settlement contract pays whichever addresses the
//! owner names, whether or not a matching submission exists.

use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub bounty_id: u64,
    /// Wallet address the applicant wants paid.
    pub applicant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
    pub status: SubmissionStatus,
    /// Rank assigned by the owner ahead of settlement, unique per bounty
    /// among non-null values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking: Option<u32>,
    #[serde(with = "crate::bounty::timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Submission {
    /// True if this submission belongs to the given applicant, matched by
    /// wallet address or, when both sides carry one, by user id.
    pub fn is_by(&self, applicant: &str, user_id: Option<&str>) -> bool {
        if self.applicant == applicant {
            return true;
        }
        matches!((self.user_id.as_deref(), user_id), (Some(a), Some(b)) if a == b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(applicant: &str, user_id: Option<&str>) -> Submission {
        Submission {
            id: "s1".into(),
            bounty_id: 1,
            applicant: applicant.into(),
            user_id: user_id.map(Into::into),
            content: "work".into(),
            links: vec![],
            status: SubmissionStatus::Pending,
            ranking: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn matches_by_address_or_user_id() {
        let s = submission("G_A", Some("u1"));
        assert!(s.is_by("G_A", None));
        assert!(s.is_by("G_OTHER", Some("u1")));
        assert!(!s.is_by("G_OTHER", Some("u2")));
        assert!(!s.is_by("G_OTHER", None));
    }

    #[test]
    fn missing_user_id_never_matches_on_user_id() {
        let s = submission("G_A", None);
        assert!(!s.is_by("G_OTHER", Some("u1")));
    }
}
