//! Per-bounty mutual exclusion. Selection, edit and delete serialize on the
//! bounty id inside this process; the settlement contract stays the final
//! backstop against a double payout from elsewhere.

use std::collections::HashMap;
use std::sync::{
    Arc,
    Mutex,
};
use tokio::sync::{
    Mutex as AsyncMutex,
    OwnedMutexGuard,
};

#[derive(Default)]
pub(crate) struct KeyedLock {
    // Handles are never evicted; the key space is bounded by the bounties
    // this process has touched.
    inner: Mutex<HashMap<u64, Arc<AsyncMutex<()>>>>,
}

impl KeyedLock {
    pub(crate) async fn acquire(&self, key: u64) -> OwnedMutexGuard<()> {
        let handle = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            map.entry(key).or_default().clone()
        };
        handle.lock_owned().await
    }
}
