//! YouTube Data API extraction for tubeload.
//!
//! [`YoutubeClient`] issues the four list calls a run needs (channels,
//! playlist items, videos, comment threads) and normalizes each raw item
//! into the typed records from [`tubeload_core::records`].

pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

mod fetch;

pub use client::YoutubeClient;
pub use error::YoutubeError;
pub use fetch::{CHANNEL_BATCH_SIZE, COMMENT_PAGE_SIZE, MAX_PLAYLIST_PAGES, PLAYLIST_PAGE_SIZE, VIDEO_BATCH_SIZE};
