//! Narrow queries over the `submissions` collection, always scoped to one
//! bounty. This adapter owns the two invariants the store itself cannot
//! express: one submission per applicant per bounty, and at most one
//! submission per non-null rank.

use crate::error::{
    Error,
    Result,
};
use crate::store::{
    DocumentStore,
    Filter,
    StoreError,
    SUBMISSIONS,
};
use serde_json::{
    json,
    Value,
};
use stallion_utils::{
    Submission,
    SubmissionStatus,
};
use std::sync::Arc;

pub struct SubmissionLedger<S> {
    store: Arc<S>,
}

impl<S: DocumentStore> SubmissionLedger<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn bounty_filter(bounty_id: u64) -> [Filter; 1] {
        [Filter::eq("bountyId", bounty_id)]
    }

    pub async fn list(&self, bounty_id: u64) -> Result<Vec<Submission>> {
        let docs = self
            .store
            .query(SUBMISSIONS, &Self::bounty_filter(bounty_id))
            .await?;
        let mut submissions = Vec::with_capacity(docs.len());
        for doc in docs {
            submissions.push(serde_json::from_value(doc).map_err(StoreError::from)?);
        }
        Ok(submissions)
    }

    /// Submission count without decoding the documents. No auth gate
    /// downstream; listing pages call this freely.
    pub async fn count(&self, bounty_id: u64) -> Result<usize> {
        Ok(self
            .store
            .query(SUBMISSIONS, &Self::bounty_filter(bounty_id))
            .await?
            .len())
    }

    pub async fn has_applicant_submitted(
        &self,
        bounty_id: u64,
        applicant: &str,
        user_id: Option<&str>,
    ) -> Result<bool> {
        let submissions = self.list(bounty_id).await?;
        Ok(submissions.iter().any(|s| s.is_by(applicant, user_id)))
    }

    /// Stores a new submission, rejecting a second attempt by the same
    /// applicant (matched by wallet address or user id).
    pub async fn record(&self, submission: Submission) -> Result<()> {
        if self
            .has_applicant_submitted(
                submission.bounty_id,
                &submission.applicant,
                submission.user_id.as_deref(),
            )
            .await?
        {
            return Err(Error::AlreadySubmitted);
        }
        let doc = serde_json::to_value(&submission).map_err(StoreError::from)?;
        self.store.set(SUBMISSIONS, &submission.id, doc).await?;
        Ok(())
    }

    /// Sets or clears a submission's rank. A non-null rank already held by a
    /// different submission of the same bounty is rejected, closing the race
    /// the UI-side check could not.
    pub async fn apply_ranking(&self, submission_id: &str, ranking: Option<u32>) -> Result<()> {
        let submission = self.fetch(submission_id).await?;
        if let Some(rank) = ranking {
            let peers = self.list(submission.bounty_id).await?;
            let taken = peers
                .iter()
                .any(|s| s.id != submission.id && s.ranking == Some(rank));
            if taken {
                return Err(Error::RankingTaken { ranking: rank });
            }
        }
        self.store
            .update(SUBMISSIONS, submission_id, json!({ "ranking": ranking }))
            .await?;
        Ok(())
    }

    /// Marks a submission ACCEPTED. Only meaningful before settlement; after
    /// it this is the best-effort bookkeeping the orchestrator performs.
    pub async fn mark_accepted(&self, submission_id: &str) -> Result<()> {
        // Fetch first so a missing id surfaces as NotFound, not a store error.
        self.fetch(submission_id).await?;
        self.store
            .update(
                SUBMISSIONS,
                submission_id,
                json!({ "status": SubmissionStatus::Accepted }),
            )
            .await?;
        Ok(())
    }

    async fn fetch(&self, submission_id: &str) -> Result<Submission> {
        let doc: Option<Value> = self.store.get(SUBMISSIONS, submission_id).await?;
        let doc = doc.ok_or_else(|| Error::SubmissionNotFound(submission_id.to_string()))?;
        Ok(serde_json::from_value(doc).map_err(StoreError::from)?)
    }
}
