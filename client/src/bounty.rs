//! The winner-selection orchestrator and the bounty lifecycle operations
//! around it.
//!
//! Every mutating operation takes the per-bounty lock, reloads the document
//! from the store, runs all cheap validation locally, and only then makes
//! the wallet-interactive contract call. Off-chain state is written strictly
//! after the chain confirms; a chain failure leaves the store untouched and
//! the operation retryable as-is.

use crate::error::{
    Error,
    Result,
};
use crate::lock::KeyedLock;
use crate::settlement::{
    CreateBountyArgs,
    SettlementClient,
    UpdateBountyArgs,
};
use crate::store::{
    DocumentStore,
    StoreError,
    BOUNTIES,
};
use crate::submissions::SubmissionLedger;
use chrono::Utc;
use log::{
    debug,
    error,
    warn,
};
use serde_json::json;
use stallion_utils::{
    calculate_payouts,
    distribution,
    Bounty,
    BountyStatus,
    Reward,
    WinnerRecord,
};
use std::collections::HashSet;
use std::sync::Arc;

pub struct BountyClient<S, C> {
    store: Arc<S>,
    chain: Arc<C>,
    submissions: SubmissionLedger<S>,
    locks: KeyedLock,
}

impl<S: DocumentStore, C: SettlementClient> BountyClient<S, C> {
    pub fn new(store: Arc<S>, chain: Arc<C>) -> Self {
        Self {
            submissions: SubmissionLedger::new(store.clone()),
            store,
            chain,
            locks: KeyedLock::default(),
        }
    }

    pub fn submissions(&self) -> &SubmissionLedger<S> {
        &self.submissions
    }

    /// Loads a bounty and reconciles it with reality before returning it.
    ///
    /// Two derived facts are folded in: a settled contract the store missed
    /// (the dangerous post-settlement write failure) and deadline expiry.
    /// Both write-backs are best effort; a concurrent writer doing the same
    /// is harmless.
    pub async fn bounty(&self, id: u64) -> Result<Bounty> {
        let mut bounty = self.load(id).await?;
        if bounty.status.is_terminal() {
            return Ok(bounty);
        }

        match self.chain.winners_of(id).await {
            Ok(Some(addresses)) => {
                let records =
                    winner_records(&bounty.reward, &bounty.distribution, &addresses)
                        .unwrap_or_default();
                bounty.status = BountyStatus::Completed;
                let patch = json!({
                    "status": BountyStatus::Completed,
                    "winners": &records,
                    "version": bounty.version + 1,
                });
                bounty.winners = Some(records);
                match self.store.update(BOUNTIES, &bounty.doc_id(), patch).await {
                    Ok(()) => bounty.version += 1,
                    Err(err) => {
                        warn!("bounty {id}: settled on chain but status write-back failed: {err}")
                    }
                }
                return Ok(bounty);
            }
            Ok(None) => {}
            // Read paths degrade instead of failing the whole fetch.
            Err(err) => debug!("bounty {id}: reconciliation view unavailable: {err}"),
        }

        if bounty.effective_status(Utc::now()) == BountyStatus::Completed {
            let patch = json!({
                "status": BountyStatus::Completed,
                "version": bounty.version + 1,
            });
            match self.store.update(BOUNTIES, &bounty.doc_id(), patch).await {
                Ok(()) => bounty.version += 1,
                Err(err) => debug!("bounty {id}: expiry write-back lost a race: {err}"),
            }
            bounty.status = BountyStatus::Completed;
        }
        Ok(bounty)
    }

    /// Escrows the reward on chain (the contract assigns the id) and mirrors
    /// the document into the store.
    pub async fn create_bounty(&self, args: CreateBountyArgs) -> Result<Bounty> {
        distribution::validate(&args.distribution)?;
        if args.owner.is_empty() {
            return Err(Error::MissingInput);
        }
        let id = self.chain.create_bounty(args.clone()).await?;
        let bounty = Bounty {
            id,
            owner: args.owner,
            title: args.title,
            reward: Reward {
                amount: args.reward_amount,
                asset: args.reward_asset,
            },
            distribution: args.distribution,
            submission_deadline: args.submission_deadline,
            status: BountyStatus::Open,
            winners: None,
            version: 0,
        };
        let doc = serde_json::to_value(&bounty).map_err(StoreError::from)?;
        if let Err(err) = self.store.set(BOUNTIES, &bounty.doc_id(), doc).await {
            // Funds are escrowed under `id` but the mirror is missing; the
            // caller must retry the mirror, so this one is surfaced.
            error!("bounty {id}: escrow created on chain but store mirror failed: {err}");
            return Err(err.into());
        }
        Ok(bounty)
    }

    /// Owner-only edit, permitted only while the bounty is OPEN, unexpired
    /// and has no submissions. Chain first, then store.
    pub async fn update_bounty(
        &self,
        id: u64,
        caller: &str,
        args: UpdateBountyArgs,
    ) -> Result<Bounty> {
        let _guard = self.locks.acquire(id).await;
        let bounty = self.bounty(id).await?;
        if bounty.owner != caller {
            return Err(Error::EditForbidden);
        }
        self.ensure_editable(&bounty).await?;
        if let Some(dist) = &args.distribution {
            distribution::validate(dist)?;
        }

        self.chain.update_bounty(id, caller, args.clone()).await?;

        let mut updated = bounty.clone();
        let mut patch = serde_json::Map::new();
        if let Some(title) = args.title {
            patch.insert("title".into(), json!(title));
            updated.title = title;
        }
        if let Some(dist) = args.distribution {
            patch.insert("distribution".into(), json!(dist));
            updated.distribution = dist;
        }
        if let Some(deadline) = args.submission_deadline {
            patch.insert("submissionDeadline".into(), json!(deadline.timestamp_millis()));
            updated.submission_deadline = deadline;
        }
        updated.version = bounty.version + 1;
        patch.insert("version".into(), json!(updated.version));
        self.store
            .update(BOUNTIES, &bounty.doc_id(), patch.into())
            .await?;
        Ok(updated)
    }

    /// Owner-only cancellation with escrow refund. The store keeps a
    /// CANCELLED tombstone rather than deleting the document.
    pub async fn delete_bounty(&self, id: u64, caller: &str) -> Result<()> {
        let _guard = self.locks.acquire(id).await;
        let bounty = self.bounty(id).await?;
        if bounty.owner != caller {
            return Err(Error::EditForbidden);
        }
        self.ensure_editable(&bounty).await?;

        self.chain.delete_bounty(id, caller).await?;

        let patch = json!({
            "status": BountyStatus::Cancelled,
            "version": bounty.version + 1,
        });
        self.store.update(BOUNTIES, &bounty.doc_id(), patch).await?;
        Ok(())
    }

    /// Settles the bounty: pays the escrowed reward out to
    /// `winner_addresses` (one per distribution position, ascending) and
    /// completes the off-chain record.
    ///
    /// All validation runs against a fresh reload under the bounty's lock
    /// before anything reaches the contract, so a declined or failed chain
    /// call leaves the store untouched and the call retryable verbatim. A
    /// second call after a confirmed settlement fails the status check and
    /// never reaches the contract again.
    pub async fn select_winners(
        &self,
        bounty_id: u64,
        caller: &str,
        winner_addresses: &[String],
    ) -> Result<Vec<WinnerRecord>> {
        if caller.is_empty() || winner_addresses.is_empty() {
            return Err(Error::MissingInput);
        }
        let _guard = self.locks.acquire(bounty_id).await;

        // Fresh read, including reconciliation with the contract, so an
        // already-settled bounty is rejected here and not by the chain.
        let bounty = self.bounty(bounty_id).await?;
        if bounty.owner != caller {
            return Err(Error::NotOwner);
        }
        let status = bounty.effective_status(Utc::now());
        if status.is_terminal() {
            return Err(Error::InvalidState { status });
        }
        if winner_addresses.len() != bounty.distribution.len() {
            return Err(Error::WinnerCountMismatch {
                expected: bounty.distribution.len(),
                got: winner_addresses.len(),
            });
        }
        let records = winner_records(&bounty.reward, &bounty.distribution, winner_addresses)?;

        self.chain
            .select_winners(bounty_id, winner_addresses, caller)
            .await?;

        // Funds have moved. Everything below is cache maintenance: log and
        // carry on, the read path self-heals what a failure leaves behind.
        let patch = json!({
            "status": BountyStatus::Completed,
            "winners": &records,
            "version": bounty.version + 1,
        });
        if let Err(err) = self.store.update(BOUNTIES, &bounty.doc_id(), patch).await {
            error!("bounty {bounty_id}: winners paid on chain but status write failed: {err}");
            return Ok(records);
        }
        self.mark_winning_submissions(bounty_id, winner_addresses)
            .await;
        Ok(records)
    }

    async fn mark_winning_submissions(&self, bounty_id: u64, winners: &[String]) {
        let winner_set: HashSet<&str> = winners.iter().map(String::as_str).collect();
        match self.submissions.list(bounty_id).await {
            Ok(submissions) => {
                for submission in submissions
                    .iter()
                    .filter(|s| winner_set.contains(s.applicant.as_str()))
                {
                    if let Err(err) = self.submissions.mark_accepted(&submission.id).await {
                        warn!(
                            "bounty {bounty_id}: could not mark submission {} accepted: {err}",
                            submission.id
                        );
                    }
                }
            }
            Err(err) => warn!("bounty {bounty_id}: winner submissions not updated: {err}"),
        }
    }

    async fn ensure_editable(&self, bounty: &Bounty) -> Result<()> {
        let status = bounty.effective_status(Utc::now());
        if status != BountyStatus::Open {
            return Err(Error::InvalidState { status });
        }
        if self.submissions.count(bounty.id).await? > 0 {
            return Err(Error::HasSubmissions);
        }
        Ok(())
    }

    async fn load(&self, id: u64) -> Result<Bounty> {
        let doc = self.store.get(BOUNTIES, &id.to_string()).await?;
        let doc = doc.ok_or(Error::BountyNotFound(id))?;
        Ok(serde_json::from_value(doc).map_err(StoreError::from)?)
    }
}

/// Zips a distribution table (ascending by position) with the caller's
/// winner addresses (same order) and prices each position via the payout
/// calculator.
fn winner_records(
    reward: &Reward,
    dist: &[stallion_utils::Distribution],
    addresses: &[String],
) -> Result<Vec<WinnerRecord>> {
    let payouts = calculate_payouts(reward.amount, dist)?;
    Ok(payouts
        .iter()
        .zip(addresses)
        .map(|(payout, address)| WinnerRecord {
            position: payout.position,
            percentage: payout.percentage,
            applicant_address: address.clone(),
            reward_amount: payout.winner_amount,
        })
        .collect())
}
