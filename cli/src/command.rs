use crate::error::{
    Error,
    Result,
};
use crate::settlement::LocalSettlement;
use crate::store::JsonStore;
use chrono::{
    DateTime,
    Utc,
};
use clap::{
    Parser,
    Subcommand,
};
use stallion_client::{
    BountyClient,
    CreateBountyArgs,
    UpdateBountyArgs,
};
use stallion_utils::{
    calculate_payouts,
    distribution,
    Distribution,
    Submission,
    SubmissionStatus,
};
use std::path::PathBuf;
use std::str::FromStr;

type Client = BountyClient<JsonStore, LocalSettlement>;

#[derive(Parser)]
#[command(name = "stallion", about = "Bounty settlement engine, local runner")]
pub struct Opts {
    /// Data directory for the JSON store and the simulated chain ledger.
    #[arg(long, global = true)]
    pub path: Option<PathBuf>,
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(subcommand)]
    Bounty(BountyCommand),
    #[command(subcommand)]
    Submission(SubmissionCommand),
    #[command(subcommand)]
    Distribution(DistributionCommand),
}

/// Distribution table argument: `single`, `dual`, `triple`, or
/// `position:percentage` pairs such as `1:60,2:30,3:10`.
#[derive(Clone, Debug)]
pub struct TableArg(pub Vec<Distribution>);

impl FromStr for TableArg {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "single" => return Ok(TableArg(distribution::single())),
            "dual" => return Ok(TableArg(distribution::dual())),
            "triple" => return Ok(TableArg(distribution::triple())),
            _ => {}
        }
        let mut table = Vec::new();
        for pair in s.split(',') {
            let (position, percentage) = pair
                .split_once(':')
                .ok_or(Error::ParseDistributionError)?;
            let position = position
                .trim()
                .parse::<u32>()
                .map_err(|_| Error::ParseDistributionError)?;
            let percentage = percentage
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::ParseDistributionError)?;
            table.push(Distribution::new(position, percentage));
        }
        Ok(TableArg(table))
    }
}

fn parse_deadline(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Error::ParseDeadlineError)
}

#[derive(Subcommand)]
pub enum BountyCommand {
    /// Escrow a new bounty on the simulated chain and mirror it locally.
    Create {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        title: String,
        /// Reward amount in minor units.
        #[arg(long)]
        amount: i128,
        #[arg(long, default_value = "USDC")]
        asset: String,
        /// RFC 3339 submission deadline.
        #[arg(long)]
        deadline: String,
        #[arg(long, default_value = "single")]
        table: TableArg,
    },
    /// Show a bounty with its effective status.
    Show {
        #[arg(long)]
        id: u64,
    },
    /// Edit title, table or deadline while the bounty is still editable.
    Update {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        caller: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        table: Option<TableArg>,
        #[arg(long)]
        deadline: Option<String>,
    },
    /// Cancel the bounty and refund the escrow.
    Cancel {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        caller: String,
    },
    /// Pay the reward out to one address per distribution position.
    SelectWinners {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        caller: String,
        /// Comma-separated winner addresses, ascending by position.
        #[arg(long, value_delimiter = ',')]
        winners: Vec<String>,
    },
}

impl BountyCommand {
    pub async fn exec(self, client: &Client) -> Result<()> {
        match self {
            BountyCommand::Create {
                owner,
                title,
                amount,
                asset,
                deadline,
                table,
            } => {
                let bounty = client
                    .create_bounty(CreateBountyArgs {
                        owner,
                        title,
                        reward_amount: amount,
                        reward_asset: asset,
                        distribution: table.0,
                        submission_deadline: parse_deadline(&deadline)?,
                    })
                    .await?;
                println!("Created bounty {} ({})", bounty.id, bounty.title);
            }
            BountyCommand::Show { id } => {
                let bounty = client.bounty(id).await?;
                println!(
                    "Bounty {}: \"{}\" owner {} reward {} {} status {}",
                    bounty.id,
                    bounty.title,
                    bounty.owner,
                    bounty.reward.amount,
                    bounty.reward.asset,
                    bounty.effective_status(Utc::now()),
                );
                for d in &bounty.distribution {
                    println!("  position {} -> {}%", d.position, d.percentage);
                }
                if let Some(winners) = &bounty.winners {
                    for w in winners {
                        println!(
                            "  winner #{} {} paid {}",
                            w.position, w.applicant_address, w.reward_amount
                        );
                    }
                }
            }
            BountyCommand::Update {
                id,
                caller,
                title,
                table,
                deadline,
            } => {
                let deadline = deadline.as_deref().map(parse_deadline).transpose()?;
                let bounty = client
                    .update_bounty(
                        id,
                        &caller,
                        UpdateBountyArgs {
                            title,
                            distribution: table.map(|t| t.0),
                            submission_deadline: deadline,
                        },
                    )
                    .await?;
                println!("Updated bounty {} (version {})", bounty.id, bounty.version);
            }
            BountyCommand::Cancel { id, caller } => {
                client.delete_bounty(id, &caller).await?;
                println!("Cancelled bounty {id}");
            }
            BountyCommand::SelectWinners {
                id,
                caller,
                winners,
            } => {
                let records = client.select_winners(id, &caller, &winners).await?;
                for r in &records {
                    println!(
                        "position {} ({}%): {} receives {}",
                        r.position, r.percentage, r.applicant_address, r.reward_amount
                    );
                }
                println!("Bounty {id} settled");
            }
        }
        Ok(())
    }
}

#[derive(Subcommand)]
pub enum SubmissionCommand {
    /// Record a submission against an open bounty.
    Add {
        #[arg(long)]
        bounty_id: u64,
        #[arg(long)]
        applicant: String,
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long)]
        content: String,
        #[arg(long)]
        link: Vec<String>,
    },
    List {
        #[arg(long)]
        bounty_id: u64,
    },
    /// Assign a rank, or clear it with --clear.
    Rank {
        #[arg(long)]
        id: String,
        #[arg(long, required_unless_present = "clear", conflicts_with = "clear")]
        rank: Option<u32>,
        #[arg(long)]
        clear: bool,
    },
    Accept {
        #[arg(long)]
        id: String,
    },
}

impl SubmissionCommand {
    pub async fn exec(self, client: &Client) -> Result<()> {
        match self {
            SubmissionCommand::Add {
                bounty_id,
                applicant,
                user_id,
                content,
                link,
            } => {
                let bounty = client.bounty(bounty_id).await?;
                let now = Utc::now();
                if !bounty.can_submit(now) {
                    return Err(stallion_client::Error::InvalidState {
                        status: bounty.effective_status(now),
                    }
                    .into());
                }
                let submission = Submission {
                    id: format!("sub-{}", now.timestamp_millis()),
                    bounty_id,
                    applicant,
                    user_id,
                    content,
                    links: link,
                    status: SubmissionStatus::Pending,
                    ranking: None,
                    created_at: now,
                };
                let id = submission.id.clone();
                client.submissions().record(submission).await?;
                println!("Recorded submission {id}");
            }
            SubmissionCommand::List { bounty_id } => {
                let submissions = client.submissions().list(bounty_id).await?;
                println!(
                    "{} submission(s) for bounty {bounty_id}",
                    submissions.len()
                );
                for s in submissions {
                    let rank = s
                        .ranking
                        .map(|r| format!("#{r}"))
                        .unwrap_or_else(|| "-".into());
                    println!("  {} {} rank {} ({:?})", s.id, s.applicant, rank, s.status);
                }
            }
            SubmissionCommand::Rank { id, rank, clear } => {
                let ranking = if clear { None } else { rank };
                client.submissions().apply_ranking(&id, ranking).await?;
                println!("Submission {id} ranking set to {ranking:?}");
            }
            SubmissionCommand::Accept { id } => {
                client.submissions().mark_accepted(&id).await?;
                println!("Submission {id} accepted");
            }
        }
        Ok(())
    }
}

#[derive(Subcommand)]
pub enum DistributionCommand {
    /// Check a table against the split invariants.
    Validate {
        #[arg(long)]
        table: TableArg,
    },
    /// Preview payouts for a total, fee off the top.
    Payouts {
        #[arg(long)]
        total: i128,
        #[arg(long)]
        table: TableArg,
    },
}

impl DistributionCommand {
    pub fn exec(self) -> Result<()> {
        match self {
            DistributionCommand::Validate { table } => {
                distribution::validate(&table.0).map_err(stallion_client::Error::from)?;
                println!("Distribution is valid");
            }
            DistributionCommand::Payouts { total, table } => {
                let payouts =
                    calculate_payouts(total, &table.0).map_err(stallion_client::Error::from)?;
                let fee: i128 = payouts.iter().map(|p| p.fee_share).sum();
                println!("total {total}, platform fee {fee}");
                for p in &payouts {
                    println!(
                        "  position {} ({}%): {}",
                        p.position, p.percentage, p.winner_amount
                    );
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_presets_and_pairs() {
        assert_eq!(TableArg::from_str("triple").unwrap().0.len(), 3);
        let parsed = TableArg::from_str("1:60, 2:30, 3:10").unwrap().0;
        assert_eq!(parsed[1], Distribution::new(2, 30.0));
        assert!(TableArg::from_str("1-60").is_err());
    }
}
