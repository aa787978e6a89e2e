// incident-sync-rs/src/main.rs
// Command line front end for the incident sync engine

use std::process;
use std::str::FromStr;

use anyhow::{anyhow, Context};
use clap::{ArgGroup, Args, Parser, Subcommand};

use incident_sync::{Incident, IncidentPatch, IncidentStore, Severity, Status, SyncConfig};

/// Inspect and edit incidents held by the incident service
#[derive(Parser, Debug)]
#[command(name = "incident-sync", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List incidents, newest first
    List,

    /// Show one incident
    Show {
        /// Incident id
        id: String,
    },

    /// Update an incident
    Update(UpdateArgs),

    /// Print the UI content strings
    Content,
}

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("changes")
        .required(true)
        .multiple(true)
        .args(["title", "description", "severity", "status", "assign", "unassign"])
))]
struct UpdateArgs {
    /// Incident id
    id: String,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// Low, Medium, High or Critical
    #[arg(long, value_parser = Severity::from_str)]
    severity: Option<Severity>,

    /// Open, InProgress, Acknowledged or Resolved
    #[arg(long, value_parser = Status::from_str)]
    status: Option<Status>,

    /// Assign to a person
    #[arg(long, num_args = 2, value_names = ["ID", "NAME"])]
    assign: Option<Vec<String>>,

    /// Clear the assignment
    #[arg(long, conflicts_with = "assign")]
    unassign: bool,
}

impl UpdateArgs {
    fn patch(&self) -> IncidentPatch {
        let mut patch = IncidentPatch::new();

        if let Some(title) = &self.title {
            patch = patch.title(title.clone());
        }
        if let Some(description) = &self.description {
            patch = patch.description(description.clone());
        }
        if let Some(severity) = self.severity {
            patch = patch.severity(severity);
        }
        if let Some(status) = self.status {
            patch = patch.status(status);
        }
        if let Some([assignee_id, assignee_name]) = self.assign.as_deref() {
            patch = patch.assign(assignee_id.clone(), assignee_name.clone());
        }
        if self.unassign {
            patch = patch.unassign();
        }

        patch
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(err) = run(cli.command).await {
        log::error!("{:#}", err);
        eprintln!("error: {:#}", err);
        process::exit(1);
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    let config = SyncConfig::from_env().context("Failed to load configuration")?;
    log::info!("Using incident service at {}", config.base_url);

    match command {
        Command::List => {
            let store = incident_sync::incident_store(&config)?;
            store.fetch_incidents().await?;
            print_list(&store);
        }
        Command::Show { id } => {
            let store = incident_sync::incident_store(&config)?;
            store.fetch_incidents().await?;
            let incident = store
                .incident(&id)
                .ok_or_else(|| anyhow!("Incident {} not found", id))?;
            print_incident(&incident);
        }
        Command::Update(args) => {
            let store = incident_sync::incident_store(&config)?;
            store.fetch_incidents().await?;
            store
                .update_incident(&args.id, args.patch())
                .await
                .with_context(|| format!("Failed to update incident {}", args.id))?;
            if let Some(incident) = store.incident(&args.id) {
                print_incident(&incident);
            }
        }
        Command::Content => {
            let content = incident_sync::content_store(&config);
            content.fetch_content().await?;
            let mut entries: Vec<(String, String)> = content.content().into_iter().collect();
            entries.sort();
            for (key, value) in entries {
                println!("{} = {}", key, value);
            }
        }
    }

    Ok(())
}

fn print_list(store: &IncidentStore) {
    let incidents = store.sorted_incidents();
    println!(
        "{} incidents, {} critical",
        incidents.len(),
        store.critical_count()
    );
    for incident in incidents {
        println!(
            "{:<12} {:<9} {:<13} {}",
            incident.id,
            incident.severity.as_str(),
            incident.status.as_str(),
            incident.title
        );
    }
}

fn print_incident(incident: &Incident) {
    println!("{} {}", incident.id, incident.title);
    println!("  severity:    {}", incident.severity);
    println!("  status:      {}", incident.status);
    println!("  service:     {} ({})", incident.service_name, incident.service_id);
    println!(
        "  assignee:    {}",
        incident.assignee_name().unwrap_or("unassigned")
    );
    println!("  created:     {}", incident.created_at.to_rfc3339());
    println!("  updated:     {}", incident.updated_at.to_rfc3339());
    if !incident.description.is_empty() {
        println!();
        println!("{}", incident.description);
    }
}
