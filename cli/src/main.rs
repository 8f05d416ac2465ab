mod command;
mod error;
mod settlement;
mod store;

use crate::command::{
    Command,
    Opts,
};
use crate::error::{
    Error,
    Result,
};
use crate::settlement::LocalSettlement;
use crate::store::JsonStore;
use clap::Parser;
use stallion_client::BountyClient;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let opts = Opts::parse();
    let root = match opts.path {
        Some(path) => path,
        None => dirs::data_dir().ok_or(Error::NoDataDir)?.join("stallion"),
    };
    let store = Arc::new(JsonStore::open(root.join("store.json"))?);
    let chain = Arc::new(
        LocalSettlement::open(root.join("chain.json")).map_err(stallion_client::Error::from)?,
    );
    let client = BountyClient::new(store, chain);

    match opts.cmd {
        Command::Bounty(cmd) => cmd.exec(&client).await,
        Command::Submission(cmd) => cmd.exec(&client).await,
        Command::Distribution(cmd) => cmd.exec(),
    }
}
