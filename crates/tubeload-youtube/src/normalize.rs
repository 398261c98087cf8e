//! Conversion from raw API resources to [`tubeload_core::records`] rows.
//!
//! Type coercion happens here: timestamps, durations and counts are parsed
//! with the strict helpers from [`tubeload_core::transform`], and any failure
//! names the resource it came from.

use tubeload_core::records::{Channel, Comment, PlaylistItem, VideoDetail};
use tubeload_core::transform::{parse_count, parse_duration_secs, parse_timestamp};
use tubeload_core::TransformError;

use crate::error::YoutubeError;
use crate::types::{ChannelResource, CommentThreadResource, PlaylistItemResource, VideoResource};

fn context<T>(
    result: Result<T, TransformError>,
    resource: &str,
    id: &str,
) -> Result<T, YoutubeError> {
    result.map_err(|source| YoutubeError::Transform {
        context: format!("{resource} {id}"),
        source,
    })
}

/// # Errors
///
/// Returns [`YoutubeError::Transform`] if a statistics counter is not an integer.
pub fn normalize_channel(raw: ChannelResource) -> Result<Channel, YoutubeError> {
    let id = raw.id;
    let stats = raw.statistics;
    Ok(Channel {
        view_count: context(parse_count("view_count", &stats.view_count), "channel", &id)?,
        subscriber_count: context(
            parse_count("subscriber_count", &stats.subscriber_count),
            "channel",
            &id,
        )?,
        video_count: context(parse_count("video_count", &stats.video_count), "channel", &id)?,
        channel_name: raw.snippet.title,
        playlist_id: raw.content_details.related_playlists.uploads,
        channel_id: id,
    })
}

/// Rank is left at zero; ranking needs the whole table.
///
/// # Errors
///
/// Returns [`YoutubeError::Transform`] if `publishedAt` is not a strict UTC timestamp.
pub fn normalize_playlist_item(raw: PlaylistItemResource) -> Result<PlaylistItem, YoutubeError> {
    let snippet = raw.snippet;
    let video_id = snippet.resource_id.video_id;
    let published_at = context(
        parse_timestamp(&snippet.published_at),
        "playlist item",
        &video_id,
    )?;
    Ok(PlaylistItem {
        video_id,
        title: snippet.title,
        published_at,
        channel_id: snippet.channel_id,
        channel_name: snippet.video_owner_channel_title,
        recency_rank: 0,
    })
}

/// # Errors
///
/// Returns [`YoutubeError::Transform`] for a bad timestamp, duration, or counter.
pub fn normalize_video(raw: VideoResource) -> Result<VideoDetail, YoutubeError> {
    let id = raw.id;
    let stats = raw.statistics;
    Ok(VideoDetail {
        published_at: context(parse_timestamp(&raw.snippet.published_at), "video", &id)?,
        duration_sec: context(
            parse_duration_secs(&raw.content_details.duration),
            "video",
            &id,
        )?,
        view_count: context(parse_count("view_count", &stats.view_count), "video", &id)?,
        like_count: context(parse_count("like_count", &stats.like_count), "video", &id)?,
        comment_count: context(
            parse_count("comment_count", &stats.comment_count),
            "video",
            &id,
        )?,
        title: raw.snippet.title,
        video_id: id,
    })
}

/// `text_display` is kept exactly as the API sent it; entity decoding is a
/// separate transformation step.
///
/// # Errors
///
/// Returns [`YoutubeError::Transform`] for a bad timestamp or a negative like count.
pub fn normalize_comment(raw: CommentThreadResource) -> Result<Comment, YoutubeError> {
    let id = raw.id;
    let thread = raw.snippet;
    let top = thread.top_level_comment.snippet;
    if top.like_count < 0 {
        return Err(YoutubeError::Transform {
            context: format!("comment {id}"),
            source: TransformError::Count {
                field: "like_count".to_string(),
                value: top.like_count.to_string(),
            },
        });
    }
    Ok(Comment {
        published_at: context(parse_timestamp(&top.published_at), "comment", &id)?,
        comment_id: id,
        video_id: thread.video_id,
        channel_id: thread.channel_id,
        text_display: top.text_display,
        author_name: top.author_display_name,
        like_count: top.like_count,
        labels: None,
    })
}
