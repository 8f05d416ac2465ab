//! Settlement-contract boundary. The Soroban contract holds the funds and is
//! the authority on whether a bounty has paid out; everything here is an
//! opaque call surface that may park on a wallet signing prompt for as long
//! as the user cares to stare at it.

use async_trait::async_trait;
use chrono::{
    DateTime,
    Utc,
};
use stallion_utils::Distribution;
use thiserror::Error;

/// Closed classification of contract-call failures. Adapters for a concrete
/// RPC client are expected to map their transport errors into these variants
/// instead of letting callers sniff message strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("the user declined to sign the transaction")]
    Declined,
    #[error("insufficient balance to fund the transaction")]
    InsufficientFunds,
    #[error("a trustline for the reward asset is missing")]
    TrustlineMissing,
    #[error("the transaction timed out before confirmation")]
    Timeout,
    #[error("contract reverted with code {0}")]
    ContractReverted(u32),
    #[error("the reward asset is not supported")]
    UnsupportedToken,
    #[error("transaction failed: {0}")]
    Unknown(String),
}

impl ChainError {
    /// Toast-ready text for the UI layer.
    pub fn user_message(&self) -> &'static str {
        match self {
            ChainError::Declined => "Transaction was declined in your wallet",
            ChainError::InsufficientFunds => "Your wallet has insufficient funds",
            ChainError::TrustlineMissing => "Add a trustline for this asset and try again",
            ChainError::Timeout => "The network timed out, please try again",
            ChainError::ContractReverted(_) => "The contract rejected this transaction",
            ChainError::UnsupportedToken => "This asset is not supported",
            ChainError::Unknown(_) => "Transaction failed",
        }
    }

    /// Whether re-invoking the same call can reasonably succeed without any
    /// state changing first.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ChainError::Declined | ChainError::Timeout | ChainError::Unknown(_)
        )
    }
}

#[derive(Clone, Debug)]
pub struct CreateBountyArgs {
    pub owner: String,
    pub title: String,
    pub reward_amount: i128,
    pub reward_asset: String,
    pub distribution: Vec<Distribution>,
    pub submission_deadline: DateTime<Utc>,
}

#[derive(Clone, Debug, Default)]
pub struct UpdateBountyArgs {
    pub title: Option<String>,
    pub distribution: Option<Vec<Distribution>>,
    pub submission_deadline: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait SettlementClient: Send + Sync {
    /// Escrows the reward and returns the contract-assigned bounty id.
    async fn create_bounty(&self, args: CreateBountyArgs) -> Result<u64, ChainError>;

    async fn update_bounty(
        &self,
        id: u64,
        caller: &str,
        args: UpdateBountyArgs,
    ) -> Result<(), ChainError>;

    /// Irreversibly pays the escrowed reward out to `winner_addresses`,
    /// ordered by distribution position. The contract rejects a second
    /// payout for an already-settled bounty.
    async fn select_winners(
        &self,
        id: u64,
        winner_addresses: &[String],
        caller: &str,
    ) -> Result<(), ChainError>;

    /// Cancels the bounty and refunds the escrow to the owner.
    async fn delete_bounty(&self, id: u64, caller: &str) -> Result<(), ChainError>;

    /// Read-only view: the winner addresses if the bounty has settled on
    /// chain, `None` while escrow is still open. Used by the read path to
    /// reconcile a store that missed the post-settlement write.
    async fn winners_of(&self, id: u64) -> Result<Option<Vec<String>>, ChainError>;
}
