use chrono::{
    DateTime,
    Duration,
    Utc,
};
use serde_json::Value;
use stallion_client::mock::{
    MemoryStore,
    MockSettlement,
};
use stallion_client::store::{
    DocumentStore,
    BOUNTIES,
};
use stallion_client::BountyClient;
use stallion_utils::{
    Bounty,
    BountyStatus,
    Distribution,
    Reward,
    Submission,
    SubmissionStatus,
};
use std::sync::Arc;

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub chain: Arc<MockSettlement>,
    pub client: BountyClient<MemoryStore, MockSettlement>,
}

pub fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let chain = Arc::new(MockSettlement::new());
    let client = BountyClient::new(store.clone(), chain.clone());
    Harness {
        store,
        chain,
        client,
    }
}

pub fn future_deadline() -> DateTime<Utc> {
    Utc::now() + Duration::days(7)
}

pub fn past_deadline() -> DateTime<Utc> {
    Utc::now() - Duration::days(1)
}

pub fn sixty_thirty_ten() -> Vec<Distribution> {
    vec![
        Distribution::new(1, 60.0),
        Distribution::new(2, 30.0),
        Distribution::new(3, 10.0),
    ]
}

pub fn bounty(id: u64, distribution: Vec<Distribution>, deadline: DateTime<Utc>) -> Bounty {
    Bounty {
        id,
        owner: "G_OWNER".into(),
        title: "implement the widget".into(),
        reward: Reward {
            amount: 1000,
            asset: "USDC".into(),
        },
        distribution,
        submission_deadline: deadline,
        status: BountyStatus::Open,
        winners: None,
        version: 0,
    }
}

pub async fn seed_bounty(store: &MemoryStore, bounty: &Bounty) {
    let doc = serde_json::to_value(bounty).unwrap();
    store.set(BOUNTIES, &bounty.doc_id(), doc).await.unwrap();
}

pub async fn stored_bounty(store: &MemoryStore, id: u64) -> Value {
    store
        .get(BOUNTIES, &id.to_string())
        .await
        .unwrap()
        .expect("bounty document missing")
}

pub fn submission(id: &str, bounty_id: u64, applicant: &str) -> Submission {
    Submission {
        id: id.into(),
        bounty_id,
        applicant: applicant.into(),
        user_id: None,
        content: "here is my work".into(),
        links: vec![],
        status: SubmissionStatus::Pending,
        ranking: None,
        created_at: Utc::now(),
    }
}

pub fn addresses(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
