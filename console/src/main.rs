//! Stagehand - Entry Point
//!
//! Resolves event target filters and edits deployment pipelines from the
//! command line.

use std::collections::HashMap;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use colored::Colorize;
use tracing::{debug, error, info};

use stagehand::filter::navigator::FilterNavigator;
use stagehand::filter::resolver::FilterContext;
use stagehand::filter::state::HierarchicalFilterState;
use stagehand::http::client::HttpClient;
use stagehand::logs::{init_logging, LogLevel, LogOptions};
use stagehand::pipeline::editor::{PipelineChange, PipelineEditor};
use stagehand::pipeline::reorder::{locate_service, DraggableLocation};
use stagehand::storage::layout::StorageLayout;
use stagehand::storage::settings::Settings;
use stagehand::utils::{event_window, version_info};

const USAGE: &str = "\
Usage:
  stagehand --version
  stagehand --next-level [--target-type=<type>] [--project=<id>] [--environment=<id>] [--target=<id>]
  stagehand --next-level --resume
  stagehand --stages --environment=<id>
  stagehand --move-service --environment=<id> --service=<id> --stage=<id>

Options:
  --organization=<id>  organization to resolve filters for (overrides settings)
  --log-level=<level>  trace, debug, info, warn or error
  --json-logs          log as JSON lines";

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    if cli_args.contains_key("version") {
        return match serde_json::to_string_pretty(&version_info()) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => fail(&e.into()),
        };
    }

    let layout = StorageLayout::default();
    let settings = match load_settings(&layout).await {
        Ok(settings) => settings,
        Err(e) => return fail(&e),
    };

    let log_level = match cli_args.get("log-level").map(|l| l.parse::<LogLevel>()) {
        Some(Ok(level)) => level,
        Some(Err(e)) => return fail(&e.into()),
        None => settings.log_level,
    };

    // Initialize logging; the guard flushes the file writer on exit
    let log_options = LogOptions {
        log_level,
        log_dir: settings.log_to_file.then(|| layout.logs_dir()),
        json_format: cli_args.contains_key("json-logs"),
        ..Default::default()
    };
    let _guard = match init_logging(log_options) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            None
        }
    };

    let result = match command(&cli_args) {
        Some("next-level") => next_level(&cli_args, &layout, settings).await,
        Some("stages") => list_stages(&cli_args, settings).await,
        Some("move-service") => move_service(&cli_args, settings).await,
        _ => {
            println!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

fn command(cli_args: &HashMap<String, String>) -> Option<&'static str> {
    ["next-level", "stages", "move-service"]
        .into_iter()
        .find(|c| cli_args.contains_key(*c))
}

fn fail(e: &anyhow::Error) -> ExitCode {
    error!("{:#}", e);
    eprintln!("{} {:#}", "error:".red().bold(), e);
    ExitCode::FAILURE
}

/// Read the settings file, falling back to defaults when there is none
async fn load_settings(layout: &StorageLayout) -> Result<Settings> {
    let file = layout.settings_file();
    let settings = file
        .load_or_default()
        .await
        .with_context(|| format!("Failed to read settings from {}", file.path().display()))?;
    settings.validate().context("Invalid settings")?;
    Ok(settings)
}

fn required<'a>(cli_args: &'a HashMap<String, String>, key: &str) -> Result<&'a str> {
    cli_args
        .get(key)
        .map(String::as_str)
        .filter(|v| !v.is_empty() && *v != "true")
        .ok_or_else(|| anyhow!("--{}=<value> is required", key))
}

fn http_client(settings: Settings) -> Result<HttpClient> {
    let client = match settings.api_token {
        Some(token) => HttpClient::with_api_token(&settings.backend.base_url, token)?,
        None => HttpClient::new(&settings.backend.base_url)?,
    };
    debug!("Using backend {}", client.base_url());
    Ok(client)
}

async fn next_level(
    cli_args: &HashMap<String, String>,
    layout: &StorageLayout,
    settings: Settings,
) -> Result<()> {
    let organization_id = cli_args
        .get("organization")
        .cloned()
        .or_else(|| settings.organization_id.clone())
        .context("organization_id is not set; pass --organization=<id>")?;

    // CLI flags map onto the query parameters the filter is persisted as
    let params: HashMap<String, String> = [
        ("target-type", "targetType"),
        ("project", "projectId"),
        ("environment", "environmentId"),
        ("target", "targetId"),
    ]
    .into_iter()
    .filter_map(|(flag, param)| cli_args.get(flag).map(|v| (param.to_string(), v.clone())))
    .collect();
    let filter_file = layout.filter_file();
    let saved = if cli_args.contains_key("resume") {
        filter_file
            .load_or_default()
            .await
            .context("Failed to resume the saved filter")?
    } else {
        HierarchicalFilterState::from_query_params(&params)?
    };

    let window = event_window(Utc::now(), settings.event_window_days)?;
    let mut context = FilterContext::new(organization_id);
    context.from_timestamp = Some(window.from_timestamp);
    context.to_timestamp = Some(window.to_timestamp);

    let client = Arc::new(http_client(settings)?);
    let mut navigator = FilterNavigator::new(client, context);
    navigator
        .restore(&saved)
        .await
        .context("Failed to resolve the filter levels")?;
    filter_file
        .save(navigator.state())
        .await
        .context("Failed to save the filter")?;

    let breadcrumb = navigator.breadcrumb();
    if !breadcrumb.is_empty() {
        println!("{}", breadcrumb.join(" > ").bold());
    }

    if navigator.state().is_final_selection() {
        println!("{}", "Selection complete".green());
        println!(
            "{}",
            serde_json::to_string_pretty(&navigator.state().to_query_params())?
        );
        return Ok(());
    }

    println!(
        "{}",
        serde_json::to_string_pretty(navigator.current_level())?
    );
    Ok(())
}

async fn list_stages(
    cli_args: &HashMap<String, String>,
    settings: Settings,
) -> Result<()> {
    let environment_id = required(cli_args, "environment")?;
    let client = http_client(settings)?;

    let stages = client
        .list_environment_deployment_stages(environment_id)
        .await
        .with_context(|| format!("Failed to list stages of environment {}", environment_id))?;
    for stage in &stages {
        println!(
            "{} {} ({} services)",
            format!("#{}", stage.deployment_order).cyan(),
            stage.name.bold(),
            stage.services.len()
        );
        for service in &stage.services {
            println!("    {}", service.service_id);
        }
    }
    Ok(())
}

async fn move_service(
    cli_args: &HashMap<String, String>,
    settings: Settings,
) -> Result<()> {
    let environment_id = required(cli_args, "environment")?;
    let service_id = required(cli_args, "service")?;
    let stage_id = required(cli_args, "stage")?;

    let client = Arc::new(http_client(settings)?);
    let mut editor = PipelineEditor::load(client, environment_id)
        .await
        .with_context(|| format!("Failed to load stages of environment {}", environment_id))?;

    let source = locate_service(editor.stages(), service_id).with_context(|| {
        format!(
            "service {} is not in any stage of environment {}",
            service_id, environment_id
        )
    })?;
    let (stage_index, stage) = editor
        .stages()
        .iter()
        .enumerate()
        .find(|(_, s)| s.id == stage_id)
        .with_context(|| {
            format!(
                "stage {} does not belong to environment {}",
                stage_id, environment_id
            )
        })?;
    let destination = DraggableLocation::new(stage_index, stage.services.len());

    if source.droppable_id == destination.droppable_id {
        println!("Service {} is already in stage {}", service_id, stage_id);
        return Ok(());
    }

    let change = PipelineChange::MoveService {
        source,
        destination,
    };
    editor
        .apply(&change)
        .await
        .with_context(|| format!("Failed to move service {} to stage {}", service_id, stage_id))?;
    info!("Moved service {} to stage {}", service_id, stage_id);
    println!("{} service {} moved to stage {}", "ok".green(), service_id, stage_id);
    Ok(())
}
