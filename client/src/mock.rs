//! In-memory doubles for the two injected boundaries, compiled behind the
//! `mock` feature. The settlement double records every payout call so tests
//! can assert the contract was (or was not) reached.

use crate::settlement::{
    ChainError,
    CreateBountyArgs,
    SettlementClient,
    UpdateBountyArgs,
};
use crate::store::{
    DocumentStore,
    Filter,
    StoreError,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{
    AtomicBool,
    AtomicU64,
    AtomicUsize,
    Ordering,
};
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<(String, String), Value>>,
    fail_next_update: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `update` fail, simulating a store outage between the
    /// chain call and the status write.
    pub fn fail_next_update(&self) {
        self.fail_next_update.store(true, Ordering::SeqCst);
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, HashMap<(String, String), Value>> {
        self.docs.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .guard()
            .get(&(collection.to_string(), id.to_string()))
            .cloned())
    }

    async fn query(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Value>, StoreError> {
        Ok(self
            .guard()
            .iter()
            .filter(|((c, _), doc)| c == collection && filters.iter().all(|f| f.matches(doc)))
            .map(|(_, doc)| doc.clone())
            .collect())
    }

    async fn set(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError> {
        self.guard()
            .insert((collection.to_string(), id.to_string()), doc);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError> {
        if self.fail_next_update.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected update failure".into()));
        }
        let mut docs = self.guard();
        let doc = docs
            .get_mut(&(collection.to_string(), id.to_string()))
            .ok_or_else(|| StoreError::Unavailable(format!("no document {collection}/{id}")))?;
        if let (Value::Object(target), Value::Object(fields)) = (doc, patch) {
            for (k, v) in fields {
                target.insert(k, v);
            }
        }
        Ok(())
    }
}

/// Settlement double: assigns ids, remembers settled payouts, and can be
/// primed to fail the next payout call.
#[derive(Default)]
pub struct MockSettlement {
    next_id: AtomicU64,
    select_calls: AtomicUsize,
    settled: Mutex<HashMap<u64, Vec<String>>>,
    fail_select_with: Mutex<Option<ChainError>>,
}

impl MockSettlement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_select_with(&self, err: ChainError) {
        *self
            .fail_select_with
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(err);
    }

    /// Marks a bounty as already paid out on chain without going through
    /// the client, for reconciliation tests.
    pub fn settle_directly(&self, id: u64, winners: Vec<String>) {
        self.settled
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, winners);
    }

    pub fn select_calls(&self) -> usize {
        self.select_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SettlementClient for MockSettlement {
    async fn create_bounty(&self, _args: CreateBountyArgs) -> Result<u64, ChainError> {
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn update_bounty(
        &self,
        _id: u64,
        _caller: &str,
        _args: UpdateBountyArgs,
    ) -> Result<(), ChainError> {
        Ok(())
    }

    async fn select_winners(
        &self,
        id: u64,
        winner_addresses: &[String],
        _caller: &str,
    ) -> Result<(), ChainError> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self
            .fail_select_with
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            return Err(err);
        }
        let mut settled = self.settled.lock().unwrap_or_else(|e| e.into_inner());
        if settled.contains_key(&id) {
            // Matches a correctly written contract: no double payout.
            return Err(ChainError::ContractReverted(1));
        }
        settled.insert(id, winner_addresses.to_vec());
        Ok(())
    }

    async fn delete_bounty(&self, id: u64, _caller: &str) -> Result<(), ChainError> {
        if self
            .settled
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&id)
        {
            return Err(ChainError::ContractReverted(1));
        }
        Ok(())
    }

    async fn winners_of(&self, id: u64) -> Result<Option<Vec<String>>, ChainError> {
        Ok(self
            .settled
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .cloned())
    }
}
