//! The single linear pass: extract, transform, classify, load.

use anyhow::Context;
use tubeload_classify::{classify_comments, TextClassifier};
use tubeload_core::transform::{assign_recency_rank, latest_video_ids, unescape_comment_text};
use tubeload_core::{ChannelsFile, Comment, PlaylistItem};
use tubeload_warehouse::{
    load_table, WarehouseSink, WriteMode, CHANNEL_INFO, COMMENT_DETAILS, LATEST_VIDEO_DETAILS,
    VIDEO_DETAILS,
};
use tubeload_youtube::YoutubeClient;

/// Row counts of the four loaded tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub channels: usize,
    pub videos: usize,
    pub latest_videos: usize,
    pub comments: usize,
}

fn report_videos_per_channel(channels: &[tubeload_core::Channel], items: &[PlaylistItem]) {
    for channel in channels {
        let count = items
            .iter()
            .filter(|item| item.channel_id == channel.channel_id)
            .count();
        println!("  {}: {count} videos", channel.channel_name);
    }
}

fn report_comments_per_video(video_ids: &[String], comments: &[Comment]) {
    for video_id in video_ids {
        let count = comments.iter().filter(|c| &c.video_id == video_id).count();
        println!("  {video_id}: {count} comments");
    }
}

/// Run every stage in order against the given clients and sink.
///
/// `channel_info` is appended; the three video and comment tables are
/// replaced. Any error aborts the remaining stages, and tables already
/// loaded are not rolled back.
///
/// # Errors
///
/// Any extraction, transformation, classification or load failure, with
/// the failing stage attached as context.
pub(crate) async fn run_pipeline<S, Q, W>(
    youtube: &YoutubeClient,
    channels_file: &ChannelsFile,
    sentiment: &S,
    question: &Q,
    sink: &W,
) -> anyhow::Result<RunSummary>
where
    S: TextClassifier,
    Q: TextClassifier,
    W: WarehouseSink,
{
    let channels = youtube
        .fetch_channels(&channels_file.channel_ids())
        .await
        .context("fetching channel info")?;
    println!("fetched {} channels", channels.len());

    let playlist_ids: Vec<String> = channels.iter().map(|c| c.playlist_id.clone()).collect();
    let mut items = youtube
        .fetch_playlist_items(&playlist_ids)
        .await
        .context("fetching playlist items")?;
    assign_recency_rank(&mut items);
    println!("fetched {} playlist items", items.len());
    report_videos_per_channel(&channels, &items);

    let video_ids: Vec<String> = items.iter().map(|i| i.video_id.clone()).collect();
    let videos = youtube
        .fetch_video_details(&video_ids)
        .await
        .context("fetching video details")?;
    println!("fetched details for {} videos", videos.len());

    let latest_ids = latest_video_ids(&items);
    let latest_videos = youtube
        .fetch_video_details(&latest_ids)
        .await
        .context("fetching latest video details")?;
    println!("fetched details for {} latest videos", latest_videos.len());

    let mut comments = youtube
        .fetch_comments(&latest_ids)
        .await
        .context("fetching comments")?;
    unescape_comment_text(&mut comments);
    println!("fetched {} comments", comments.len());
    report_comments_per_video(&latest_ids, &comments);

    classify_comments(&mut comments, sentiment, question)
        .await
        .context("classifying comments")?;
    println!("classified {} comments", comments.len());

    let summary = RunSummary {
        channels: load_table(sink, &CHANNEL_INFO, &channels, WriteMode::Append)
            .await
            .context("loading channel_info")?,
        videos: load_table(sink, &VIDEO_DETAILS, &videos, WriteMode::Replace)
            .await
            .context("loading video_details")?,
        latest_videos: load_table(sink, &LATEST_VIDEO_DETAILS, &latest_videos, WriteMode::Replace)
            .await
            .context("loading latest_video_details")?,
        comments: load_table(sink, &COMMENT_DETAILS, &comments, WriteMode::Replace)
            .await
            .context("loading comment_details")?,
    };
    println!("loaded 4 tables");

    Ok(summary)
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
