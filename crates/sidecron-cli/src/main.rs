use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use sidecron_core::config::SidecronConfig;
use sidecron_crontab::codec;
use sidecron_crontab::store::CrontabStore;
use sidecron_sharepoint::GraphClient;
use sidecron_workflow::admin::AdminClient;
use sidecron_workflow::publish_later::{target_path, PublishLaterWorkflow, WorkflowOutcome};
use sidecron_workflow::status::{format_schedule, StatusAnnotator};

mod prompt;

/// Publish-later tooling for a document-authored site: schedule, inspect and
/// remove delayed publish jobs stored in the crontab workbook.
#[derive(Parser)]
#[command(name = "sidecron", version, about)]
struct Cli {
    /// Path to sidecron.toml (defaults to $SIDECRON_CONFIG, then
    /// ~/.sidecron/sidecron.toml).
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open the publish-later form for a page: create, move or delete its
    /// scheduled publish.
    Schedule {
        /// Page URL or absolute path.
        url: String,
    },
    /// Show when a page is scheduled to publish ("Never" if it is not).
    Status {
        /// Page URL or absolute path.
        url: String,
    },
    /// List every job in the crontab table.
    Jobs,
    /// Publish a page to live immediately via the admin API.
    Publish {
        /// Page URL or absolute path.
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sidecron=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = SidecronConfig::load(cli.config.as_deref())
        .context("could not load configuration")?;

    match cli.command {
        Command::Schedule { url } => schedule(&config, &url).await,
        Command::Status { url } => status(&config, &url).await,
        Command::Jobs => jobs(&config).await,
        Command::Publish { url } => publish(&config, &url).await,
    }
}

fn crontab_store(config: &SidecronConfig) -> CrontabStore {
    let client = Arc::new(GraphClient::new(&config.sharepoint));
    CrontabStore::new(
        client,
        config.crontab.workbook_path.clone(),
        config.crontab.table.clone(),
    )
}

async fn schedule(config: &SidecronConfig, url: &str) -> anyhow::Result<()> {
    let workflow = PublishLaterWorkflow::new(
        crontab_store(config),
        Arc::new(AdminClient::new(&config.project)),
        Arc::new(prompt::TerminalUi::new()),
        config.crontab.timezone,
    )
    .with_lead_time(chrono::Duration::minutes(config.crontab.lead_time_minutes));

    match workflow.run(url).await {
        WorkflowOutcome::Completed => Ok(()),
        WorkflowOutcome::Cancelled => {
            info!("schedule unchanged");
            Ok(())
        }
        WorkflowOutcome::Failed => anyhow::bail!("scheduling failed"),
    }
}

async fn status(config: &SidecronConfig, url: &str) -> anyhow::Result<()> {
    let annotator = StatusAnnotator::new(crontab_store(config), config.crontab.timezone);
    match annotator.scheduled_label(url).await {
        Some(label) => {
            println!("Scheduled: {label} ({})", annotator.timezone());
            Ok(())
        }
        None => anyhow::bail!("could not determine the publishing schedule"),
    }
}

async fn jobs(config: &SidecronConfig) -> anyhow::Result<()> {
    let store = crontab_store(config);
    store.sign_in().await?;
    let table = store.load().await?;

    let mut count = 0;
    for (position, row) in table.jobs() {
        match codec::decode(&row) {
            Ok(entry) => println!(
                "{position:>3}  {}  {}",
                format_schedule(entry.datetime),
                entry.path
            ),
            Err(err) => println!("{position:>3}  <unreadable: {err}>  {}", row.path()),
        }
        count += 1;
    }
    if count == 0 {
        println!("No publish jobs scheduled.");
    }
    Ok(())
}

async fn publish(config: &SidecronConfig, url: &str) -> anyhow::Result<()> {
    let path = target_path(url).context("invalid page URL")?;
    AdminClient::new(&config.project).publish(&path).await?;
    println!("Published {path}");
    Ok(())
}
