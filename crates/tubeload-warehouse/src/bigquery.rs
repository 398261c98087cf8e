//! BigQuery sink backed by load jobs.
//!
//! Each table write uploads the rows as newline-delimited JSON in one
//! multipart `jobs.insert` request, then polls `jobs.get` until the job is
//! done. `WRITE_TRUNCATE` swaps the table contents only when the job
//! succeeds.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tubeload_core::WarehouseTarget;
use uuid::Uuid;

use crate::credentials::ServiceAccountAuth;
use crate::error::WarehouseError;
use crate::load::{Row, WarehouseSink, WriteMode};
use crate::schema::TableSchema;

const DEFAULT_API_ROOT: &str = "https://bigquery.googleapis.com/";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
const DEFAULT_MAX_POLLS: u32 = 300;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Job {
    job_reference: JobReference,
    #[serde(default)]
    status: JobStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
    job_id: String,
    #[serde(default)]
    location: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobStatus {
    #[serde(default)]
    state: String,
    #[serde(default)]
    error_result: Option<ErrorProto>,
}

#[derive(Debug, Deserialize)]
struct ErrorProto {
    #[serde(default)]
    reason: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// Writes tables into one BigQuery dataset.
pub struct BigQuerySink {
    client: Client,
    auth: ServiceAccountAuth,
    base_url: Url,
    project_id: String,
    dataset: String,
    poll_interval: Duration,
    max_polls: u32,
}

impl BigQuerySink {
    /// # Errors
    ///
    /// Returns [`WarehouseError::Http`] if the `reqwest::Client` cannot be
    /// built.
    pub fn new(
        auth: ServiceAccountAuth,
        target: &WarehouseTarget,
        timeout_secs: u64,
    ) -> Result<Self, WarehouseError> {
        Self::with_base_url(auth, target, timeout_secs, DEFAULT_API_ROOT)
    }

    /// Creates a sink with a custom API root (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`WarehouseError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn with_base_url(
        auth: ServiceAccountAuth,
        target: &WarehouseTarget,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, WarehouseError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("tubeload/0.1 (channel-analytics)")
            .build()?;

        let parsed = Url::parse(base_url).map_err(|e| WarehouseError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(WarehouseError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "not a hierarchical URL".to_string(),
            });
        }

        Ok(Self {
            client,
            auth,
            base_url: parsed,
            project_id: target.project_id.clone(),
            dataset: target.dataset.clone(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
        })
    }

    /// Override how often and how long job status is polled.
    #[must_use]
    pub fn with_polling(mut self, interval: Duration, max_polls: u32) -> Self {
        self.poll_interval = interval;
        self.max_polls = max_polls;
        self
    }

    /// `<base>/<segments..>`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn load_config(&self, schema: &TableSchema, mode: WriteMode, job_id: &str) -> Value {
        json!({
            "jobReference": {
                "projectId": self.project_id,
                "jobId": job_id,
            },
            "configuration": {
                "load": {
                    "destinationTable": {
                        "projectId": self.project_id,
                        "datasetId": self.dataset,
                        "tableId": schema.table,
                    },
                    "schema": schema.to_bigquery_json(),
                    "sourceFormat": "NEWLINE_DELIMITED_JSON",
                    "createDisposition": "CREATE_IF_NEEDED",
                    "writeDisposition": mode.write_disposition(),
                }
            }
        })
    }

    async fn check_api_response(
        response: reqwest::Response,
        context: &str,
    ) -> Result<Job, WarehouseError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(api_error(status, &body));
        }
        serde_json::from_str(&body).map_err(|source| WarehouseError::Deserialize {
            context: context.to_string(),
            source,
        })
    }

    async fn insert_job(
        &self,
        schema: &TableSchema,
        rows: &[Row],
        mode: WriteMode,
    ) -> Result<Job, WarehouseError> {
        let job_id = format!("tubeload_{}_{}", schema.table, Uuid::new_v4().simple());
        let config = serde_json::to_string(&self.load_config(schema, mode, &job_id))?;
        let data = ndjson(rows)?;

        let boundary = format!("tubeload-{}", Uuid::new_v4().simple());
        let body = multipart_related(&boundary, &config, &data);

        let mut url = self.endpoint(&[
            "upload",
            "bigquery",
            "v2",
            "projects",
            self.project_id.as_str(),
            "jobs",
        ]);
        url.query_pairs_mut().append_pair("uploadType", "multipart");

        let token = self.auth.access_token().await?;
        tracing::debug!(table = schema.table, job_id = %job_id, bytes = body.len(), "submitting load job");

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await?;

        Self::check_api_response(response, &format!("jobs.insert({})", schema.table)).await
    }

    async fn get_job(&self, job_id: &str, location: Option<&str>) -> Result<Job, WarehouseError> {
        let mut url = self.endpoint(&[
            "bigquery",
            "v2",
            "projects",
            self.project_id.as_str(),
            "jobs",
            job_id,
        ]);
        if let Some(location) = location {
            url.query_pairs_mut().append_pair("location", location);
        }

        let token = self.auth.access_token().await?;
        let response = self.client.get(url).bearer_auth(token).send().await?;
        Self::check_api_response(response, &format!("jobs.get({job_id})")).await
    }

    async fn wait_for_job(&self, table: &str, mut job: Job) -> Result<(), WarehouseError> {
        let mut polls = 0u32;
        while job.status.state != "DONE" {
            if polls >= self.max_polls {
                return Err(WarehouseError::JobTimeout {
                    table: table.to_string(),
                    job_id: job.job_reference.job_id,
                    polls,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
            polls += 1;

            let reference = job.job_reference;
            job = self
                .get_job(&reference.job_id, reference.location.as_deref())
                .await?;
            tracing::debug!(table, job_id = %job.job_reference.job_id, state = %job.status.state, "polled load job");
        }

        if let Some(error) = job.status.error_result {
            return Err(WarehouseError::Job {
                table: table.to_string(),
                job_id: job.job_reference.job_id,
                reason: error.reason,
                message: error.message,
            });
        }
        Ok(())
    }
}

impl WarehouseSink for BigQuerySink {
    async fn write_table(
        &self,
        schema: &TableSchema,
        rows: &[Row],
        mode: WriteMode,
    ) -> Result<(), WarehouseError> {
        let job = self.insert_job(schema, rows, mode).await?;
        let job_id = job.job_reference.job_id.clone();
        self.wait_for_job(schema.table, job).await?;

        tracing::info!(
            table = schema.table,
            dataset = %self.dataset,
            job_id = %job_id,
            rows = rows.len(),
            %mode,
            "load job done"
        );
        Ok(())
    }
}

fn ndjson(rows: &[Row]) -> Result<String, WarehouseError> {
    let mut out = String::new();
    for row in rows {
        out.push_str(&serde_json::to_string(row)?);
        out.push('\n');
    }
    Ok(out)
}

fn multipart_related(boundary: &str, config: &str, data: &str) -> String {
    format!(
        "--{boundary}\r\n\
         Content-Type: application/json; charset=UTF-8\r\n\r\n\
         {config}\r\n\
         --{boundary}\r\n\
         Content-Type: application/octet-stream\r\n\r\n\
         {data}\r\n\
         --{boundary}--\r\n"
    )
}

fn api_error(status: StatusCode, body: &str) -> WarehouseError {
    let message = serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.chars().take(200).collect());
    WarehouseError::Api {
        status: status.as_u16(),
        message,
    }
}
