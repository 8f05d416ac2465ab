//! The bounty document model mirrored from the document store.
//!
//! The on-chain contract assigns the integer bounty id at creation; the
//! store keys the document by its string form. The document is the source of
//! truth for the distribution table and the stored status; the contract is
//! the source of truth for fund custody.

use crate::distribution::Distribution;
use crate::status::{
    effective_status,
    BountyStatus,
};
use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};

/// Reward pool of a bounty. `amount` is in minor units and travels as a
/// string in JSON, the way the store has always recorded it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    #[serde(with = "amount")]
    pub amount: i128,
    pub asset: String,
}

/// Resolved winner for one distribution position, stored on the bounty
/// document once selection has settled on chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinnerRecord {
    pub position: u32,
    pub percentage: f64,
    pub applicant_address: String,
    #[serde(with = "amount")]
    pub reward_amount: i128,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounty {
    pub id: u64,
    pub owner: String,
    pub title: String,
    pub reward: Reward,
    pub distribution: Vec<Distribution>,
    #[serde(with = "timestamp")]
    pub submission_deadline: DateTime<Utc>,
    pub status: BountyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winners: Option<Vec<WinnerRecord>>,
    /// Bumped on every orchestrator write. Observability only; the store
    /// keeps last-write-wins semantics.
    #[serde(default)]
    pub version: u64,
}

impl Bounty {
    /// Store key for this bounty's document.
    pub fn doc_id(&self) -> String {
        self.id.to_string()
    }

    pub fn effective_status(&self, now: DateTime<Utc>) -> BountyStatus {
        effective_status(self.status, self.submission_deadline, now)
    }

    /// New submissions are accepted only while the bounty is effectively
    /// OPEN.
    pub fn can_submit(&self, now: DateTime<Utc>) -> bool {
        self.effective_status(now) == BountyStatus::Open
    }

    /// The owner may edit title/distribution/deadline only before anyone
    /// has submitted and before expiry.
    pub fn can_edit(&self, has_submissions: bool, now: DateTime<Utc>) -> bool {
        !has_submissions && self.effective_status(now) == BountyStatus::Open
    }
}

/// Serde edge for deadline-style fields. Historically the same logical field
/// was written as epoch milliseconds in some paths and ISO-8601 strings in
/// others; both are accepted on the way in and epoch milliseconds are always
/// written back.
pub mod timestamp {
    use chrono::{
        DateTime,
        Utc,
    };
    use serde::{
        de,
        Deserialize,
        Deserializer,
        Serializer,
    };

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(i64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.timestamp_millis())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Millis(ms) => DateTime::from_timestamp_millis(ms)
                .ok_or_else(|| de::Error::custom("timestamp out of range")),
            Raw::Text(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(de::Error::custom),
        }
    }
}

/// Serde edge for minor-unit amounts recorded as decimal strings.
pub mod amount {
    use serde::{
        de,
        Deserialize,
        Deserializer,
        Serializer,
    };

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &i128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i128, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(n as i128),
            Raw::Text(s) => s.parse::<i128>().map_err(de::Error::custom),
        }
    }
}
