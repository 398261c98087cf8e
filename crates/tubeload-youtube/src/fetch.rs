//! The four list operations a run performs.

use tubeload_core::records::{Channel, Comment, PlaylistItem, VideoDetail};

use crate::client::YoutubeClient;
use crate::error::YoutubeError;
use crate::normalize::{normalize_channel, normalize_comment, normalize_playlist_item, normalize_video};
use crate::types::{
    ChannelResource, CommentThreadResource, ListResponse, PlaylistItemResource, VideoResource,
};

/// Most channel IDs one `channels.list` call accepts.
pub const CHANNEL_BATCH_SIZE: usize = 50;
/// `maxResults` for `playlistItems.list` (the API maximum).
pub const PLAYLIST_PAGE_SIZE: usize = 50;
/// Video IDs per `videos.list` call.
pub const VIDEO_BATCH_SIZE: usize = 10;
/// `maxResults` for `commentThreads.list`; only this first page is read.
pub const COMMENT_PAGE_SIZE: usize = 100;
/// Default pages to follow per playlist before assuming the token is
/// cycling. See [`YoutubeClient::with_max_pages`].
pub const MAX_PLAYLIST_PAGES: usize = 1_000;

impl YoutubeClient {
    /// Fetches metadata and counters for every channel in `ids`.
    ///
    /// IDs are comma-joined into as few requests as the API's per-call limit
    /// ([`CHANNEL_BATCH_SIZE`]) allows. An empty slice makes no request.
    ///
    /// # Errors
    ///
    /// Any request, deserialization, or coercion failure, or
    /// [`YoutubeError::MissingChannels`] if any requested channel is absent
    /// from the responses.
    pub async fn fetch_channels(&self, ids: &[String]) -> Result<Vec<Channel>, YoutubeError> {
        let mut channels = Vec::with_capacity(ids.len());

        for chunk in ids.chunks(CHANNEL_BATCH_SIZE) {
            let joined = chunk.join(",");
            let url = self.build_url(
                "channels",
                &[("part", "snippet,contentDetails,statistics"), ("id", &joined)],
            )?;
            let response: ListResponse<ChannelResource> = self
                .get_json(url, &format!("channels.list(ids={})", chunk.len()))
                .await?;

            for raw in response.items {
                ensure_requested(chunk, &raw.id, "channel")?;
                channels.push(normalize_channel(raw)?);
            }
        }

        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !channels.iter().any(|c| &c.channel_id == *id))
            .cloned()
            .collect();
        if !missing.is_empty() {
            tracing::error!(
                requested = ids.len(),
                returned = channels.len(),
                missing = ?missing,
                "tracked channels were not returned by the API"
            );
            return Err(YoutubeError::MissingChannels { missing });
        }

        Ok(channels)
    }

    /// Lists every item of every playlist, following `nextPageToken` until
    /// the API stops returning one.
    ///
    /// Rows come back in playlist order, then page order. `recency_rank` is
    /// left at zero for the caller to assign across the whole table.
    ///
    /// # Errors
    ///
    /// Any request, deserialization, or coercion failure, or
    /// [`YoutubeError::PaginationLimit`] once a playlist needs more pages
    /// than the client allows ([`MAX_PLAYLIST_PAGES`] unless overridden).
    pub async fn fetch_playlist_items(
        &self,
        playlist_ids: &[String],
    ) -> Result<Vec<PlaylistItem>, YoutubeError> {
        let mut items = Vec::new();
        let page_size = PLAYLIST_PAGE_SIZE.to_string();

        for playlist_id in playlist_ids {
            let mut page_token: Option<String> = None;
            let mut page_count = 0usize;
            let before = items.len();

            loop {
                page_count += 1;
                if page_count > self.max_playlist_pages {
                    return Err(YoutubeError::PaginationLimit {
                        playlist_id: playlist_id.clone(),
                        max_pages: self.max_playlist_pages,
                    });
                }

                let mut params = vec![
                    ("part", "snippet,contentDetails"),
                    ("maxResults", page_size.as_str()),
                    ("playlistId", playlist_id.as_str()),
                ];
                if let Some(token) = page_token.as_deref() {
                    params.push(("pageToken", token));
                }
                let url = self.build_url("playlistItems", &params)?;

                let response: ListResponse<PlaylistItemResource> = self
                    .get_json(
                        url,
                        &format!("playlistItems.list(playlist={playlist_id}, page={page_count})"),
                    )
                    .await?;

                for raw in response.items {
                    items.push(normalize_playlist_item(raw)?);
                }

                page_token = response.next_page_token.filter(|t| !t.is_empty());
                if page_token.is_none() {
                    break;
                }
            }

            let fetched = items.len() - before;
            if fetched == 0 {
                tracing::warn!(playlist = %playlist_id, "playlist has no items");
            } else {
                tracing::debug!(playlist = %playlist_id, pages = page_count, items = fetched, "playlist fetched");
            }
        }

        Ok(items)
    }

    /// Fetches details for `video_ids` in consecutive chunks of
    /// [`VIDEO_BATCH_SIZE`], one request per chunk, rows in chunk order.
    ///
    /// # Errors
    ///
    /// Any request, deserialization, or coercion failure, or
    /// [`YoutubeError::UnexpectedItem`] if the API returns a video that was
    /// not in the chunk.
    pub async fn fetch_video_details(
        &self,
        video_ids: &[String],
    ) -> Result<Vec<VideoDetail>, YoutubeError> {
        let mut videos = Vec::with_capacity(video_ids.len());

        for (chunk_idx, chunk) in video_ids.chunks(VIDEO_BATCH_SIZE).enumerate() {
            let joined = chunk.join(",");
            let url = self.build_url(
                "videos",
                &[("part", "contentDetails,snippet,statistics"), ("id", &joined)],
            )?;
            let response: ListResponse<VideoResource> = self
                .get_json(url, &format!("videos.list(chunk={chunk_idx})"))
                .await?;

            for raw in response.items {
                ensure_requested(chunk, &raw.id, "video")?;
                videos.push(normalize_video(raw)?);
            }
        }

        if videos.len() < video_ids.len() {
            tracing::warn!(
                requested = video_ids.len(),
                returned = videos.len(),
                "some videos were not returned by the API (deleted or private)"
            );
        }

        Ok(videos)
    }

    /// Fetches the first page (up to [`COMMENT_PAGE_SIZE`]) of top-level
    /// comment threads for each video. Replies are not requested.
    ///
    /// # Errors
    ///
    /// Any request, deserialization, or coercion failure. A video with
    /// comments disabled surfaces as [`YoutubeError::Api`].
    pub async fn fetch_comments(&self, video_ids: &[String]) -> Result<Vec<Comment>, YoutubeError> {
        let mut comments = Vec::new();
        let page_size = COMMENT_PAGE_SIZE.to_string();

        for video_id in video_ids {
            let url = self.build_url(
                "commentThreads",
                &[
                    ("part", "snippet"),
                    ("maxResults", page_size.as_str()),
                    ("videoId", video_id.as_str()),
                ],
            )?;
            let response: ListResponse<CommentThreadResource> = self
                .get_json(url, &format!("commentThreads.list(video={video_id})"))
                .await?;

            let count = response.items.len();
            for raw in response.items {
                comments.push(normalize_comment(raw)?);
            }
            tracing::debug!(video = %video_id, comments = count, "comment threads fetched");
        }

        Ok(comments)
    }
}

fn ensure_requested(requested: &[String], id: &str, resource: &'static str) -> Result<(), YoutubeError> {
    if requested.iter().any(|r| r == id) {
        Ok(())
    } else {
        Err(YoutubeError::UnexpectedItem {
            resource,
            id: id.to_string(),
        })
    }
}
