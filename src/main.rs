// src/main.rs
// =============================================================================
// Entry point of the ohdear-panel CLI.
//
// What happens here:
// 1. Parse command-line arguments (and OHDEAR_* environment variables)
// 2. Set up logging on stderr
// 3. Turn the token / site id into Settings and validate them
// 4. Build a MonitoringGateway and run the requested command
// 5. Exit with 0 = success, 1 = report has findings or settings invalid,
//    2 = error
// =============================================================================

mod cli;
mod content;
mod error;
mod gateway;
mod ohdear;
mod output;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{CheckCommand, Cli, Commands, MaintenanceCommand};
use content::ContentIndex;
use gateway::MonitoringGateway;
use settings::Settings;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Runs one command and returns the process exit code:
//   Ok(0) = done
//   Ok(1) = report has findings, or settings are invalid
//   Err   = the command could not run (bad settings, API error, bad index)
async fn run() -> Result<i32> {
    // Flags first, then OHDEAR_* variables; clap handles --help and --version
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Trimmed here, so "  " from the environment counts as not set
    let settings = Settings::new(cli.api_token.as_deref(), cli.site_id.as_deref());
    let json = cli.json;

    // Only the commands that talk to Oh Dear need a gateway, so `validate`
    // works with an incomplete configuration
    let gateway = || {
        build_gateway(
            &settings,
            cli.api_url.as_deref(),
            cli.content_index.as_deref(),
        )
    };

    match cli.command {
        // validate never touches the network
        Commands::Validate => return handle_validate(&settings, json),
        Commands::Sites => output::print_sites(&gateway()?.list_sites().await?, json)?,
        Commands::Site => output::print_site(&gateway()?.get_site().await?, json)?,
        Commands::Uptime {
            started_at,
            ended_at,
            split,
        } => {
            let uptime = gateway()?
                .get_uptime(&started_at, &ended_at, split)
                .await?;
            output::print_uptime(&uptime, json)?;
        }
        Commands::Downtime {
            started_at,
            ended_at,
        } => {
            let downtime = gateway()?.get_downtime(&started_at, &ended_at).await?;
            output::print_downtime(&downtime, json)?;
        }
        // The two reports decide the exit code themselves, like a failing check in CI
        Commands::BrokenLinks => {
            let rows = gateway()?.get_broken_links().await?;
            return report_exit_code(&rows, json);
        }
        Commands::MixedContent => {
            let rows = gateway()?.get_mixed_content().await?;
            return report_exit_code(&rows, json);
        }
        Commands::Certificate => {
            output::print_certificate(&gateway()?.get_certificate_health().await?, json)?
        }
        // Nested subcommands get their own handlers
        Commands::Maintenance { action } => handle_maintenance(&gateway()?, action, json).await?,
        Commands::Check { action } => handle_check(&gateway()?, action, json).await?,
    }

    Ok(0)
}

// Verbosity flags win over RUST_LOG; without either only warnings show
fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// Exit code 1 when the settings are broken or incomplete
fn handle_validate(settings: &Settings, json: bool) -> Result<i32> {
    let errors = settings.validate_for_use().err();
    output::print_validation(errors.as_ref(), json)?;

    if errors.is_some() {
        return Ok(1);
    }

    if !settings.is_valid() {
        if !json {
            println!("⚠️  Both an API token and a site id are needed to use the other commands");
        }
        return Ok(1);
    }

    Ok(0)
}

fn build_gateway(
    settings: &Settings,
    api_url: Option<&str>,
    content_index: Option<&Path>,
) -> Result<MonitoringGateway> {
    let index = match content_index {
        Some(path) => ContentIndex::load(path)?,
        None => {
            debug!("no content index given, report rows will not be linked to content");
            ContentIndex::new()
        }
    };

    let gateway = MonitoringGateway::from_settings(settings, api_url, Arc::new(index))
        .context("could not set up the Oh Dear gateway (run `ohdear-panel validate` to check the settings)")?;

    info!(site_id = gateway.site_id(), "gateway ready");
    Ok(gateway)
}

// Prints a report; exit code 1 when it has any rows, like a failing check
fn report_exit_code(rows: &[gateway::ReportRow], json: bool) -> Result<i32> {
    output::print_report(rows, json)?;
    Ok(if rows.is_empty() { 0 } else { 1 })
}

async fn handle_maintenance(
    gateway: &MonitoringGateway,
    action: MaintenanceCommand,
    json: bool,
) -> Result<()> {
    match action {
        MaintenanceCommand::List => {
            output::print_maintenance_periods(&gateway.list_maintenance_periods().await?, json)?
        }
        MaintenanceCommand::Create { starts_at, ends_at } => {
            let period = gateway
                .create_maintenance_period(&starts_at, &ends_at)
                .await?;
            output::print_maintenance_periods(std::slice::from_ref(&period), json)?;
        }
        MaintenanceCommand::Delete { id } => {
            gateway.delete_maintenance_period(id).await?;
            if !json {
                println!("🗑️  Deleted maintenance window #{}", id);
            }
        }
        MaintenanceCommand::Start { seconds } => {
            let period = gateway.start_maintenance_period(seconds).await?;
            output::print_maintenance_periods(std::slice::from_ref(&period), json)?;
        }
        MaintenanceCommand::Stop => {
            gateway.stop_maintenance_period().await?;
            if !json {
                println!("✅ Maintenance stopped");
            }
        }
    }
    Ok(())
}

async fn handle_check(gateway: &MonitoringGateway, action: CheckCommand, json: bool) -> Result<()> {
    let check = match action {
        CheckCommand::Enable { check_id } => gateway.enable_check(check_id).await?,
        CheckCommand::Disable { check_id } => gateway.disable_check(check_id).await?,
        CheckCommand::Run { check_id } => gateway.request_run(check_id).await?,
    };
    output::print_check(&check, json)
}
