use std::{sync::Arc, time::Duration};

use anyhow::{bail, Context};
use clap::Parser;
use indicatif::ProgressBar;
use tracing_subscriber::EnvFilter;

mod analysis;
mod cli;
mod config;
mod errors;
mod history;
mod lock;
mod metadata;
mod relay;
mod render;
mod storage;
#[cfg(test)]
mod tests;
mod thumbnail;
mod video_id;
mod workflow;

use cli::Command;
use config::Config;
use errors::AppError;
use history::HistoryStore;
use render::{HistoryList, Report};
use video_id::VideoId;
use workflow::{Workflow, WorkflowState};

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config() -> anyhow::Result<Config> {
    let base_path = config::base_path().map_err(|e| AppError::configuration(format!("{e:#}")))?;
    let config =
        Config::load_with(&base_path).map_err(|e| AppError::configuration(format!("{e:#}")))?;
    log::debug!("using data directory {}", base_path.display());
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::VideoId { url } => {
            let id = video_id::extract_video_id(&url).ok_or(AppError::InvalidUrl)?;
            println!("{id}");
            Ok(())
        }

        Command::Analyze { url, json } => {
            // missing credential is fatal before anything else runs
            let api_key =
                config::api_key_from_env().map_err(|e| AppError::configuration(e.to_string()))?;
            let config = load_config()?;
            let storage = Arc::new(storage::BackendLocal::new(config.base_path())?);
            let workflow = Workflow::from_config(&config, api_key, storage)?;

            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to start runtime")?
                .block_on(analyze(&workflow, &url, json))
        }

        Command::History {
            video,
            select,
            json,
        } => {
            let config = load_config()?;
            let id = VideoId::from_url_or_id(&video).ok_or(AppError::InvalidUrl)?;
            let store = HistoryStore::new(Arc::new(storage::BackendLocal::new(config.base_path())?));
            show_history(&store, &id, select.as_deref(), json)
        }
    }
}

async fn analyze(workflow: &Workflow, url: &str, json: bool) -> anyhow::Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(120));

    let mut state = WorkflowState::default();
    let succeeded = state
        .trigger(workflow, url, |stage| spinner.set_message(format!("{stage}...")))
        .await;
    spinner.finish_and_clear();

    if !succeeded {
        bail!(state.error.unwrap_or_else(|| "analysis failed".to_string()));
    }

    let Some(selected) = state.selected.as_ref() else {
        bail!("analysis finished but nothing was selected");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(selected)?);
    } else {
        print!(
            "{}",
            Report {
                video: state.video.as_ref(),
                history: &state.history,
                selected,
            }
        );
    }
    Ok(())
}

fn show_history(
    store: &HistoryStore,
    id: &VideoId,
    select: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let history = store.get(id);
    let mut state = WorkflowState {
        selected: history.first().cloned(),
        history,
        ..Default::default()
    };

    let Some(key) = select else {
        if json {
            println!("{}", serde_json::to_string_pretty(&state.history)?);
        } else {
            print!(
                "{}",
                HistoryList {
                    history: &state.history,
                    selected: state.selected.as_ref().map(|e| e.timestamp.as_str()),
                }
            );
        }
        return Ok(());
    };

    let timestamp = match key.parse::<usize>() {
        Ok(idx) => state.history.get(idx).map(|e| e.timestamp.clone()),
        Err(_) => Some(key.to_string()),
    };
    let found = timestamp.is_some_and(|ts| state.select(&ts));
    let Some(entry) = state.selected.as_ref().filter(|_| found) else {
        bail!("no stored analysis {key} for video {id}");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(entry)?);
    } else {
        println!("Video {id}\n");
        print!(
            "{}",
            Report {
                video: None,
                history: &state.history,
                selected: entry,
            }
        );
    }
    Ok(())
}
