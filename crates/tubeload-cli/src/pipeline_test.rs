use std::cell::RefCell;

use serde_json::{json, Value};
use tubeload_classify::{Classification, ClassifyError};
use tubeload_core::ChannelConfig;
use tubeload_warehouse::{Row, TableSchema, WarehouseError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use super::*;

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

struct RuleClassifier {
    name: &'static str,
    rule: fn(&str) -> &'static str,
    calls: RefCell<usize>,
    fail: bool,
}

impl RuleClassifier {
    fn sentiment() -> Self {
        Self {
            name: "sentiment",
            rule: |t| if t.contains("love") { "positive" } else { "neutral" },
            calls: RefCell::new(0),
            fail: false,
        }
    }

    fn question() -> Self {
        Self {
            name: "question",
            rule: |t| if t.trim_end().ends_with('?') { "LABEL_1" } else { "LABEL_0" },
            calls: RefCell::new(0),
            fail: false,
        }
    }
}

impl TextClassifier for RuleClassifier {
    fn name(&self) -> &str {
        self.name
    }

    async fn classify(&self, texts: &[String]) -> Result<Vec<Classification>, ClassifyError> {
        *self.calls.borrow_mut() += 1;
        if self.fail {
            return Err(ClassifyError::Server {
                url: "http://classifier.test/predict".to_string(),
                status: 503,
                body: "model loading".to_string(),
            });
        }
        Ok(texts
            .iter()
            .map(|t| Classification {
                label: (self.rule)(t).to_string(),
                score: 0.75,
            })
            .collect())
    }
}

#[derive(Default)]
struct RecordingSink {
    writes: RefCell<Vec<(&'static str, Vec<Row>, WriteMode)>>,
    fail_on: Option<&'static str>,
}

impl WarehouseSink for RecordingSink {
    async fn write_table(
        &self,
        schema: &TableSchema,
        rows: &[Row],
        mode: WriteMode,
    ) -> Result<(), WarehouseError> {
        if self.fail_on == Some(schema.table) {
            return Err(WarehouseError::Api {
                status: 403,
                message: "Access Denied".to_string(),
            });
        }
        self.writes
            .borrow_mut()
            .push((schema.table, rows.to_vec(), mode));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Mock YouTube API
// ---------------------------------------------------------------------------

fn channels_file() -> ChannelsFile {
    ChannelsFile {
        api_service_name: "youtube".to_string(),
        api_version: "v3".to_string(),
        gcp_project_id: Some("demo".to_string()),
        bq_dataset: Some("youtube".to_string()),
        channels: vec![
            ChannelConfig {
                id: "UC_a".to_string(),
                name: None,
            },
            ChannelConfig {
                id: "UC_b".to_string(),
                name: Some("Beta".to_string()),
            },
        ],
    }
}

fn channel_json(id: &str, title: &str, uploads: &str) -> Value {
    json!({
        "id": id,
        "snippet": { "title": title },
        "contentDetails": { "relatedPlaylists": { "uploads": uploads } },
        "statistics": { "viewCount": "1000", "subscriberCount": "10", "videoCount": "3" }
    })
}

fn playlist_item_json(channel_id: &str, channel: &str, video_id: &str, published_at: &str) -> Value {
    json!({
        "snippet": {
            "publishedAt": published_at,
            "channelId": channel_id,
            "title": format!("Video {video_id}"),
            "videoOwnerChannelTitle": channel,
            "resourceId": { "videoId": video_id }
        }
    })
}

/// Answers `videos.list` with one item per requested ID.
fn videos_responder(request: &Request) -> ResponseTemplate {
    let ids = request
        .url
        .query_pairs()
        .find(|(k, _)| k == "id")
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default();
    let items: Vec<Value> = ids
        .split(',')
        .filter(|id| !id.is_empty())
        .map(|id| {
            json!({
                "id": id,
                "snippet": { "title": format!("Video {id}"), "publishedAt": "2024-01-01T00:00:00Z" },
                "contentDetails": { "duration": "PT4M10S" },
                "statistics": { "viewCount": "500", "likeCount": "20", "commentCount": "2" }
            })
        })
        .collect();
    ResponseTemplate::new(200).set_body_json(json!({ "items": items }))
}

fn comment_json(id: &str, video_id: &str, channel_id: &str, text: &str) -> Value {
    json!({
        "id": id,
        "snippet": {
            "videoId": video_id,
            "channelId": channel_id,
            "topLevelComment": {
                "snippet": {
                    "publishedAt": "2024-06-01T08:00:00Z",
                    "textDisplay": text,
                    "authorDisplayName": "@viewer",
                    "likeCount": 1
                }
            }
        }
    })
}

async fn mock_youtube() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/channels"))
        .and(query_param("id", "UC_a,UC_b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                channel_json("UC_a", "Alpha", "UU_a"),
                channel_json("UC_b", "Beta", "UU_b"),
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("playlistId", "UU_a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                playlist_item_json("UC_a", "Alpha", "a1", "2024-01-01T00:00:00Z"),
                playlist_item_json("UC_a", "Alpha", "a2", "2024-03-01T00:00:00Z"),
                playlist_item_json("UC_a", "Alpha", "a3", "2024-02-01T00:00:00Z"),
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("playlistId", "UU_b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                playlist_item_json("UC_b", "Beta", "b1", "2024-05-01T00:00:00Z"),
                playlist_item_json("UC_b", "Beta", "b2", "2023-12-01T00:00:00Z"),
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(videos_responder)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("videoId", "a2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                comment_json("c1", "a2", "UC_a", "I love this &amp; that"),
                comment_json("c2", "a2", "UC_a", "when is part two?"),
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("videoId", "b1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [comment_json("c3", "b1", "UC_b", "it&#39;s fine")]
        })))
        .mount(&server)
        .await;

    server
}

fn youtube_client(server: &MockServer) -> YoutubeClient {
    YoutubeClient::with_base_url("test-key", 5, &server.uri()).expect("client should build")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_run_loads_four_tables_in_order() {
    let server = mock_youtube().await;
    let youtube = youtube_client(&server);
    let sink = RecordingSink::default();

    let summary = run_pipeline(
        &youtube,
        &channels_file(),
        &RuleClassifier::sentiment(),
        &RuleClassifier::question(),
        &sink,
    )
    .await
    .expect("run should succeed");

    assert_eq!(
        summary,
        RunSummary {
            channels: 2,
            videos: 5,
            latest_videos: 2,
            comments: 3,
        }
    );

    let writes = sink.writes.borrow();
    let order: Vec<(&str, WriteMode)> = writes.iter().map(|(t, _, m)| (*t, *m)).collect();
    assert_eq!(
        order,
        vec![
            ("channel_info", WriteMode::Append),
            ("video_details", WriteMode::Replace),
            ("latest_video_details", WriteMode::Replace),
            ("comment_details", WriteMode::Replace),
        ]
    );

    for (table, rows, _) in writes.iter() {
        let first = rows.first().map(|r| r["load_timestamp"].clone());
        assert!(
            rows.iter().all(|r| Some(r["load_timestamp"].clone()) == first),
            "{table} rows share one load_timestamp"
        );
    }
}

#[tokio::test]
async fn latest_videos_are_the_newest_per_channel() {
    let server = mock_youtube().await;
    let youtube = youtube_client(&server);
    let sink = RecordingSink::default();

    run_pipeline(
        &youtube,
        &channels_file(),
        &RuleClassifier::sentiment(),
        &RuleClassifier::question(),
        &sink,
    )
    .await
    .unwrap();

    let writes = sink.writes.borrow();
    let latest: Vec<&str> = writes[2]
        .1
        .iter()
        .map(|r| r["video_id"].as_str().unwrap())
        .collect();
    assert_eq!(latest, vec!["a2", "b1"]);
    assert!(writes[2].1.iter().all(|r| r["duration_sec"] == json!(250.0)));
}

#[tokio::test]
async fn comments_are_unescaped_and_labelled() {
    let server = mock_youtube().await;
    let youtube = youtube_client(&server);
    let sink = RecordingSink::default();

    run_pipeline(
        &youtube,
        &channels_file(),
        &RuleClassifier::sentiment(),
        &RuleClassifier::question(),
        &sink,
    )
    .await
    .unwrap();

    let writes = sink.writes.borrow();
    let comments = &writes[3].1;
    let summary: Vec<(&str, &str, &str, &str)> = comments
        .iter()
        .map(|r| {
            (
                r["comment_id"].as_str().unwrap(),
                r["text_display"].as_str().unwrap(),
                r["sentiment"].as_str().unwrap(),
                r["question_category"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("c1", "I love this & that", "positive", "statement"),
            ("c2", "when is part two?", "neutral", "question"),
            ("c3", "it's fine", "neutral", "statement"),
        ]
    );
}

#[tokio::test]
async fn classifier_failure_aborts_before_any_load() {
    let server = mock_youtube().await;
    let youtube = youtube_client(&server);
    let sink = RecordingSink::default();
    let mut question = RuleClassifier::question();
    question.fail = true;

    let err = run_pipeline(
        &youtube,
        &channels_file(),
        &RuleClassifier::sentiment(),
        &question,
        &sink,
    )
    .await
    .unwrap_err();

    assert!(format!("{err:#}").contains("classifying comments"));
    assert!(sink.writes.borrow().is_empty());
}

#[tokio::test]
async fn load_failure_keeps_earlier_tables() {
    let server = mock_youtube().await;
    let youtube = youtube_client(&server);
    let sink = RecordingSink {
        fail_on: Some("video_details"),
        ..RecordingSink::default()
    };

    let err = run_pipeline(
        &youtube,
        &channels_file(),
        &RuleClassifier::sentiment(),
        &RuleClassifier::question(),
        &sink,
    )
    .await
    .unwrap_err();

    assert!(format!("{err:#}").contains("loading video_details"));
    let written: Vec<&str> = sink.writes.borrow().iter().map(|(t, _, _)| *t).collect();
    assert_eq!(written, vec!["channel_info"]);
}

#[tokio::test]
async fn missing_channel_aborts_before_any_load() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [channel_json("UC_a", "Alpha", "UU_a")]
        })))
        .mount(&server)
        .await;

    let youtube = youtube_client(&server);
    let sink = RecordingSink::default();
    let sentiment = RuleClassifier::sentiment();

    let err = run_pipeline(
        &youtube,
        &channels_file(),
        &sentiment,
        &RuleClassifier::question(),
        &sink,
    )
    .await
    .unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains("fetching channel info"), "got: {message}");
    assert!(message.contains("UC_b"), "got: {message}");
    assert!(!message.contains("UC_a"), "got: {message}");
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(*sentiment.calls.borrow(), 0);
    assert!(sink.writes.borrow().is_empty());
}
