use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use finops_approval::approval::activity::ActivityLog;
use finops_approval::approval::config::AppConfig;
use finops_approval::approval::records::RecordStore;
use finops_approval::approval::workflow::graph::depends_on;
use finops_approval::approval::workflow::{ApprovalRequest, Orchestrator, StepId};

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(author, version, about = "Purchase-order approval workflow", long_about = None)]
struct Args {
    /// Path to the config file (defaults to finops.yaml or $FINOPS_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Dataset file, overriding the config
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the approval workflow for one project
    Run {
        /// Project to approve
        #[arg(short, long)]
        project_id: String,

        /// Print only the JSON result
        #[arg(long)]
        json: bool,
    },
    /// List project ids in the dataset
    List,
    /// Show the workflow steps and who performs them
    Steps,
}

fn load_config(args: &Args) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::resolve(args.config.as_deref())?;
    if let Some(data) = &args.data {
        config.data = Some(data.clone());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match &args.command {
        Commands::Run { project_id, json } => {
            let config = load_config(&args)?;
            let policy = config.compliance_policy()?;
            let store = Arc::new(config.record_store()?);
            log::info!(
                "Using {} disallowed supplier(s), fan-out {:?}",
                policy.len(),
                config.fan_out
            );

            let orchestrator = Orchestrator::new(store, policy).with_fan_out(config.fan_out);

            let (tx, mut rx) = mpsc::channel(32);
            let quiet = *json;
            let printer = tokio::spawn(async move {
                let mut activity = ActivityLog::new();
                while let Some(event) = rx.recv().await {
                    let seen = activity.entries().len();
                    activity.record(&event);
                    if !quiet {
                        for entry in &activity.entries()[seen..] {
                            println!("{}", entry);
                        }
                    }
                }
                activity
            });

            let result = orchestrator
                .run_stream(ApprovalRequest::new(project_id.clone()), Some(tx))
                .await;
            let activity = printer.await?;

            let response =
                result.with_context(|| format!("Workflow failed for project {}", project_id))?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!();
                match &response.reason {
                    None => println!("Purchase Order Approved"),
                    Some(reason) => println!("Purchase Order Rejected: {}", reason),
                }
                log::debug!("Run reached stage {}", activity.stage());
            }
        }
        Commands::List => {
            let config = load_config(&args)?;
            let store = config.record_store()?;
            for id in store.project_ids().await {
                println!("{}", id);
            }
        }
        Commands::Steps => {
            for step in StepId::ALL {
                let persona = step.persona();
                let after: Vec<&str> = depends_on(step).iter().map(|s| s.as_str()).collect();
                println!(
                    "[{}] {:<18} {:<13} {:<19} {}{}",
                    persona.stage,
                    step.as_str(),
                    persona.name,
                    persona.role,
                    persona.description,
                    if after.is_empty() {
                        String::new()
                    } else {
                        format!(" (after {})", after.join(", "))
                    }
                );
            }
        }
    }

    Ok(())
}
