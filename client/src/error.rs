use crate::settlement::ChainError;
use crate::store::StoreError;
use stallion_utils::DistributionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Bounty not found")]
    BountyNotFound(u64),
    #[error("Submission not found")]
    SubmissionNotFound(String),
    #[error("Only the bounty owner can select winners")]
    NotOwner,
    #[error("Only the bounty owner can edit this bounty")]
    EditForbidden,
    #[error("Bounty can no longer be edited after receiving submissions")]
    HasSubmissions,
    #[error("Winner addresses and user public key are required")]
    MissingInput,
    #[error("Expected {expected} winner addresses, got {got}")]
    WinnerCountMismatch { expected: usize, got: usize },
    #[error("You have already submitted work for this bounty")]
    AlreadySubmitted,
    #[error("Ranking {ranking} is already assigned to another submission")]
    RankingTaken { ranking: u32 },
    #[error("Bounty is {status} and no longer accepts this action")]
    InvalidState {
        status: stallion_utils::BountyStatus,
    },
    #[error(transparent)]
    Distribution(#[from] DistributionError),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    /// HTTP status the route layer maps this error to.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::BountyNotFound(_) | Error::SubmissionNotFound(_) => 404,
            Error::NotOwner | Error::EditForbidden => 403,
            Error::MissingInput
            | Error::WinnerCountMismatch { .. }
            | Error::AlreadySubmitted
            | Error::HasSubmissions
            | Error::RankingTaken { .. }
            | Error::InvalidState { .. }
            | Error::Distribution(_) => 400,
            Error::Chain(_) => 502,
            Error::Store(_) => 500,
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
