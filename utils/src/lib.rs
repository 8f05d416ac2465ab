//! Pure value objects shared by the Stallion engine: the reward distribution
//! table and payout math, bounty/submission document models, and the
//! stored-vs-effective status rules. No I/O lives here.

pub mod bounty;
pub mod distribution;
pub mod status;
pub mod submission;

pub use bounty::{Bounty, Reward, WinnerRecord};
pub use distribution::{
    calculate_payouts,
    validate,
    Distribution,
    DistributionError,
    PayoutShare,
    PLATFORM_FEE_PCT,
};
pub use status::{effective_status, BountyStatus};
pub use submission::{Submission, SubmissionStatus};
