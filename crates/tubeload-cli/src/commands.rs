//! Command handlers: build clients from configuration and hand them to the
//! pipeline.

use std::path::Path;

use anyhow::Context;
use tubeload_classify::TeiClassifier;
use tubeload_core::{load_channels, AppConfig, ChannelsFile};
use tubeload_warehouse::{BigQuerySink, DryRunSink, ServiceAccountAuth, ServiceAccountKey, BIGQUERY_SCOPE};
use tubeload_youtube::YoutubeClient;

use crate::pipeline::run_pipeline;

fn load_channels_file(config: &AppConfig, path_override: Option<&Path>) -> anyhow::Result<ChannelsFile> {
    let path = path_override.unwrap_or(config.channels_path.as_path());
    load_channels(path).with_context(|| format!("loading channels from {}", path.display()))
}

/// `tubeload run`: one full extract, classify and load pass.
///
/// # Errors
///
/// Any configuration, API, classification or load failure. Tables loaded
/// before the failure stay loaded.
pub(crate) async fn run(
    config: &AppConfig,
    path_override: Option<&Path>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let channels = load_channels_file(config, path_override)?;
    let target = channels.warehouse_target(config)?;
    let timeout = config.request_timeout_secs;

    let youtube = YoutubeClient::new(
        &config.youtube_api_key,
        &channels.api_service_name,
        &channels.api_version,
        timeout,
    )?;
    let sentiment = TeiClassifier::new("sentiment", &config.sentiment_url, timeout)?;
    let question = TeiClassifier::new("question", &config.question_url, timeout)?;

    tracing::info!(
        channels = channels.channels.len(),
        project = %target.project_id,
        dataset = %target.dataset,
        dry_run,
        "starting run"
    );

    let summary = if dry_run {
        println!(
            "dry-run: tables will be validated but not written to {}.{}",
            target.project_id, target.dataset
        );
        run_pipeline(&youtube, &channels, &sentiment, &question, &DryRunSink).await?
    } else {
        let credentials = config.credentials_path.as_deref().ok_or_else(|| {
            anyhow::anyhow!("GOOGLE_APPLICATION_CREDENTIALS must be set unless --dry-run is given")
        })?;
        let key = ServiceAccountKey::from_file(credentials)?;
        let auth = ServiceAccountAuth::new(key, BIGQUERY_SCOPE, timeout)?;
        tracing::debug!(account = auth.client_email(), "using service account");
        let sink = BigQuerySink::new(auth, &target, timeout)?;
        run_pipeline(&youtube, &channels, &sentiment, &question, &sink).await?
    };

    println!(
        "run complete: {} channels, {} videos, {} latest videos, {} comments",
        summary.channels, summary.videos, summary.latest_videos, summary.comments
    );
    Ok(())
}

/// `tubeload check-config`: validate configuration without touching any
/// remote service.
///
/// # Errors
///
/// Returns an error if the channels file is missing or invalid, or no
/// warehouse project/dataset is configured.
pub(crate) fn check_config(config: &AppConfig, path_override: Option<&Path>) -> anyhow::Result<()> {
    let channels = load_channels_file(config, path_override)?;
    let target = channels.warehouse_target(config)?;

    println!(
        "api: {} {}",
        channels.api_service_name, channels.api_version
    );
    println!("warehouse: {}.{}", target.project_id, target.dataset);
    match &config.credentials_path {
        Some(path) => println!("credentials: {}", path.display()),
        None => println!("credentials: not set (only --dry-run will work)"),
    }
    println!("tracking {} channels:", channels.channels.len());
    for channel in &channels.channels {
        println!("  {}  {}", channel.id, channel.label());
    }
    Ok(())
}
