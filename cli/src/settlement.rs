//! A devnet stand-in for the Soroban escrow contract: ids and settlements
//! are kept in a sidecar JSON file so the lifecycle survives restarts. No
//! funds move and nothing prompts for a signature.

use async_trait::async_trait;
use serde::{
    Deserialize,
    Serialize,
};
use stallion_client::settlement::{
    ChainError,
    CreateBountyArgs,
    SettlementClient,
    UpdateBountyArgs,
};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

#[derive(Default, Serialize, Deserialize)]
struct Ledger {
    last_id: u64,
    settled: HashMap<u64, Vec<String>>,
    cancelled: Vec<u64>,
}

pub struct LocalSettlement {
    path: PathBuf,
    ledger: Mutex<Ledger>,
}

impl LocalSettlement {
    pub fn open(path: PathBuf) -> Result<Self, ChainError> {
        let ledger = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| ChainError::Unknown(e.to_string()))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ledger::default(),
            Err(err) => return Err(ChainError::Unknown(err.to_string())),
        };
        Ok(Self {
            path,
            ledger: Mutex::new(ledger),
        })
    }

    fn flush(&self, ledger: &Ledger) -> Result<(), ChainError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ChainError::Unknown(e.to_string()))?;
        }
        let bytes =
            serde_json::to_vec_pretty(ledger).map_err(|e| ChainError::Unknown(e.to_string()))?;
        std::fs::write(&self.path, bytes).map_err(|e| ChainError::Unknown(e.to_string()))
    }
}

#[async_trait]
impl SettlementClient for LocalSettlement {
    async fn create_bounty(&self, _args: CreateBountyArgs) -> Result<u64, ChainError> {
        let mut ledger = self.ledger.lock().await;
        ledger.last_id += 1;
        let id = ledger.last_id;
        self.flush(&ledger)?;
        Ok(id)
    }

    async fn update_bounty(
        &self,
        id: u64,
        _caller: &str,
        _args: UpdateBountyArgs,
    ) -> Result<(), ChainError> {
        let ledger = self.ledger.lock().await;
        if ledger.settled.contains_key(&id) || ledger.cancelled.contains(&id) {
            return Err(ChainError::ContractReverted(1));
        }
        Ok(())
    }

    async fn select_winners(
        &self,
        id: u64,
        winner_addresses: &[String],
        _caller: &str,
    ) -> Result<(), ChainError> {
        let mut ledger = self.ledger.lock().await;
        if ledger.settled.contains_key(&id) || ledger.cancelled.contains(&id) {
            return Err(ChainError::ContractReverted(1));
        }
        ledger.settled.insert(id, winner_addresses.to_vec());
        self.flush(&ledger)
    }

    async fn delete_bounty(&self, id: u64, _caller: &str) -> Result<(), ChainError> {
        let mut ledger = self.ledger.lock().await;
        if ledger.settled.contains_key(&id) {
            return Err(ChainError::ContractReverted(1));
        }
        if !ledger.cancelled.contains(&id) {
            ledger.cancelled.push(id);
        }
        self.flush(&ledger)
    }

    async fn winners_of(&self, id: u64) -> Result<Option<Vec<String>>, ChainError> {
        let ledger = self.ledger.lock().await;
        Ok(ledger.settled.get(&id).cloned())
    }
}
