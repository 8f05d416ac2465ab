//! Reward distribution tables: how a bounty's reward pool is split across
//! ranked winner positions, and the payout math derived from a split.
//!
//! Amounts are integer minor units (stroops for XLM-style assets), so the
//! payout calculator can promise exact reconciliation instead of an epsilon:
//! winner amounts are integer floors topped up by the largest-remainder
//! rule, ties going to the lower position.

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

/// Platform cut, in percent, taken once off the top of the reward pool
/// before winner shares are computed.
pub const PLATFORM_FEE_PCT: i128 = 5;

/// Tolerance on the percentage sum, matching the UI's float arithmetic.
const SUM_TOLERANCE: f64 = 0.01;

/// One row of a bounty's distribution table: a ranked position and the
/// percentage of the (post-fee) reward pool it receives.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub position: u32,
    pub percentage: f64,
}

impl Distribution {
    pub fn new(position: u32, percentage: f64) -> Self {
        Self {
            position,
            percentage,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DistributionError {
    #[error("Distribution cannot be empty")]
    Empty,
    #[error("Distribution positions must be sequential starting from 1")]
    NotSequential,
    #[error("Distribution percentages must sum to 100%")]
    BadSum,
    #[error("Distribution percentages must be positive")]
    NonPositive,
}

/// Checks the structural invariants of a distribution table: non-empty,
/// positions are exactly `1..=N` after sorting, percentages sum to 100
/// within [`SUM_TOLERANCE`] and every percentage is strictly positive.
///
/// Pure predicate, must pass before a table is persisted and again before
/// winner selection starts.
pub fn validate(dist: &[Distribution]) -> Result<(), DistributionError> {
    if dist.is_empty() {
        return Err(DistributionError::Empty);
    }
    let mut positions: Vec<u32> = dist.iter().map(|d| d.position).collect();
    positions.sort_unstable();
    for (i, position) in positions.iter().enumerate() {
        if *position != i as u32 + 1 {
            return Err(DistributionError::NotSequential);
        }
    }
    let sum: f64 = dist.iter().map(|d| d.percentage).sum();
    if (sum - 100.0).abs() > SUM_TOLERANCE {
        return Err(DistributionError::BadSum);
    }
    if dist.iter().any(|d| d.percentage <= 0.0) {
        return Err(DistributionError::NonPositive);
    }
    Ok(())
}

/// Winner-takes-all preset.
pub fn single() -> Vec<Distribution> {
    vec![Distribution::new(1, 100.0)]
}

/// 70/30 split preset.
pub fn dual() -> Vec<Distribution> {
    vec![Distribution::new(1, 70.0), Distribution::new(2, 30.0)]
}

/// 50/30/20 split preset.
pub fn triple() -> Vec<Distribution> {
    vec![
        Distribution::new(1, 50.0),
        Distribution::new(2, 30.0),
        Distribution::new(3, 20.0),
    ]
}

/// Resolved payout for one distribution position.
///
/// `fee_share` is this position's proportional slice of the single platform
/// fee, so fee shares reconcile to the fee exactly. The fee is never taken a
/// second time out of `winner_amount`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PayoutShare {
    pub position: u32,
    pub percentage: f64,
    pub winner_amount: i128,
    pub fee_share: i128,
}

/// Derives per-position payouts from a total reward amount and a
/// distribution table.
///
/// The platform fee is deducted once off the top
/// (`total * PLATFORM_FEE_PCT / 100`); the remainder is split by percentage
/// using the largest-remainder rule. Results are ordered by ascending
/// position and satisfy, exactly:
///
/// * `sum(winner_amount) == total - fee`
/// * `sum(fee_share) == fee`
///
/// `total` must be non-negative; negative inputs are clamped to zero.
pub fn calculate_payouts(
    total: i128,
    dist: &[Distribution],
) -> Result<Vec<PayoutShare>, DistributionError> {
    validate(dist)?;
    let total = total.max(0);
    let mut table = dist.to_vec();
    table.sort_by_key(|d| d.position);

    let fee = total * PLATFORM_FEE_PCT / 100;
    let winner_amounts = largest_remainder(total - fee, &table);
    let fee_shares = largest_remainder(fee, &table);

    Ok(table
        .iter()
        .zip(winner_amounts)
        .zip(fee_shares)
        .map(|((d, winner_amount), fee_share)| PayoutShare {
            position: d.position,
            percentage: d.percentage,
            winner_amount,
            fee_share,
        })
        .collect())
}

/// Splits `pool` across the table's percentages so the parts sum to `pool`
/// exactly: integer floors first, then one unit at a time to the entries
/// with the largest dropped fraction, lower positions first on ties.
///
/// `table` must already be validated and sorted by position.
fn largest_remainder(pool: i128, table: &[Distribution]) -> Vec<i128> {
    let mut shares = Vec::with_capacity(table.len());
    let mut fractions = Vec::with_capacity(table.len());
    for d in table {
        let exact = pool as f64 * d.percentage / 100.0;
        let floor = exact.floor() as i128;
        shares.push(floor);
        fractions.push(exact - floor as f64);
    }

    let mut order: Vec<usize> = (0..table.len()).collect();
    // Descending fraction; index order (= ascending position) breaks ties.
    order.sort_by(|&a, &b| {
        fractions[b]
            .partial_cmp(&fractions[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut leftover = pool - shares.iter().sum::<i128>();
    let mut cursor = 0;
    while leftover > 0 {
        shares[order[cursor % order.len()]] += 1;
        cursor += 1;
        leftover -= 1;
    }
    // A percentage sum slightly above 100 can make the floors overshoot.
    let mut cursor = order.len();
    while leftover < 0 {
        cursor = if cursor == 0 { order.len() - 1 } else { cursor - 1 };
        if shares[order[cursor]] > 0 {
            shares[order[cursor]] -= 1;
            leftover += 1;
        }
    }
    shares
}
