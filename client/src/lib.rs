//! Stallion's off-chain orchestration engine.
//!
//! The engine coordinates two injected collaborators: a Firestore-shaped
//! [`store::DocumentStore`] holding the `bounties` and `submissions`
//! mirrors, and a Soroban-shaped [`settlement::SettlementClient`] that holds
//! the escrowed funds and is the sole authority on payouts. The centerpiece
//! is [`bounty::BountyClient::select_winners`], the irreversible settlement
//! flow; around it sit the submission ledger and the bounty lifecycle reads
//! and edits.

pub mod bounty;
pub mod error;
mod lock;
#[cfg(feature = "mock")]
pub mod mock;
pub mod settlement;
pub mod store;
pub mod submissions;

pub use bounty::BountyClient;
pub use error::{
    Error,
    Result,
};
pub use settlement::{
    ChainError,
    CreateBountyArgs,
    SettlementClient,
    UpdateBountyArgs,
};
pub use store::{
    DocumentStore,
    Filter,
    StoreError,
};
pub use submissions::SubmissionLedger;
