//! Command-line front end over the `Handle` facade.
//!
//! Environment variables (§6):
//!   TEMPORAL_ORG_DB_HOST, TEMPORAL_ORG_DB_PORT, TEMPORAL_ORG_DB_NAME,
//!   TEMPORAL_ORG_DB_USER, TEMPORAL_ORG_DB_PASSWORD
//!
//! Usage:
//!   temporal-org-cli colleagues "Jane Tan" --date 2019-06-01
//!   temporal-org-cli career "Jane Tan" --fuzzy
//!   temporal-org-cli base-organizations

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use temporal_org_graph::cancellation::CancellationToken;
use temporal_org_graph::config::Config;
use temporal_org_graph::facade::Handle;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "temporal-org-cli", about = "Query the temporal organization graph")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find colleagues of a person, optionally as of a date.
    Colleagues {
        name: String,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        fuzzy: bool,
    },
    /// Print the career progression for a person.
    Career {
        name: String,
        #[arg(long)]
        fuzzy: bool,
        #[arg(long)]
        cluster: bool,
    },
    /// List base (top-level) organizations.
    BaseOrganizations,
    /// Print the shortest path between two people.
    Path {
        source: i64,
        target: i64,
        #[arg(long)]
        temporal: bool,
        #[arg(long)]
        ids_only: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(true).init();

    let cli = Cli::parse();
    let config = Config::from_env();

    // Ctrl-C fires the token shared by every operation below (§5): an
    // in-flight request is dropped, frees its pooled connection, and
    // surfaces `Cancelled` rather than completing or partially committing.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    info!(database = %config.store.database, "connecting");
    let handle = match Handle::init(config).await {
        Ok(h) => h,
        Err(err) => {
            error!(error = %err, "failed to initialize");
            return Err(err.into());
        }
    };

    match cli.command {
        Command::Colleagues { name, date, fuzzy } => {
            let colleagues = handle.find_colleagues(&name, date, fuzzy, &cancel).await?;
            for c in colleagues {
                println!("{}\t{}\t{}", c.colleague_name, c.org_name, c.colleague_rank.unwrap_or_default());
            }
        }
        Command::Career { name, fuzzy, cluster } => {
            for (person, career) in handle.career_progression_by_name(&name, fuzzy, cluster, &cancel).await? {
                println!("# {}", person.name);
                for entry in career {
                    println!(
                        "{} -> {} [{}..{}] ({} days)",
                        entry.ancestor_chain.join(" > "),
                        entry.rank.unwrap_or_default(),
                        entry.start_date,
                        entry.end_date,
                        entry.tenure_days
                    );
                }
            }
        }
        Command::BaseOrganizations => {
            for org in handle.get_base_organizations(&cancel).await? {
                println!("{}\t{}", org.id, org.name);
            }
        }
        Command::Path { source, target, temporal, ids_only } => {
            let query = temporal_org_graph::PathQuery {
                sources: vec![source],
                targets: vec![target],
                people_only: false,
                ids_only,
            };
            match handle.shortest_path(query, temporal, true, &cancel).await? {
                Some(nodes) => {
                    for node in nodes {
                        match node {
                            temporal_org_graph::services::EnrichedPathNode::Person { id, name, .. } => {
                                println!("person {id} {}", name.unwrap_or_default())
                            }
                            temporal_org_graph::services::EnrichedPathNode::Org { id, name } => {
                                println!("org {id} {}", name.unwrap_or_default())
                            }
                        }
                    }
                }
                None => println!("no path found"),
            }
        }
    }

    handle.close().await;
    Ok(())
}
