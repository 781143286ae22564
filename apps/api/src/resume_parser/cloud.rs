/// Cloud resume extraction (LlamaCloud LlamaExtract REST API).
///
/// The extraction agent is bound to the resume schema. It is recreated once
/// per process on first use: an agent already holding the name is deleted,
/// then a fresh one is created. Each extraction uploads the file, starts a
/// job, polls it at a fixed interval and fetches the result.
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{multipart, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::resume_parser::schema::resume_json_schema;

const AGENTS_PATH: &str = "/api/v1/extraction/extraction-agents";
const FILES_PATH: &str = "/api/v1/files";
const JOBS_PATH: &str = "/api/v1/extraction/jobs";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("error connecting to the extraction service: {0}")]
    Http(#[from] reqwest::Error),

    #[error("extraction service returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("extraction job {job_id} ended with status {status}: {message}")]
    JobFailed {
        job_id: String,
        status: String,
        message: String,
    },

    #[error("extraction job {job_id} still running after {polls} polls")]
    PollLimit { job_id: String, polls: u32 },

    #[error("unexpected response from the extraction service: {0}")]
    UnexpectedShape(String),
}

/// The extraction seam. Returns the extracted data object.
#[async_trait]
pub trait ExtractionService: Send + Sync {
    async fn extract(&self, file_name: String, bytes: Bytes) -> Result<Value, ExtractionError>;
}

#[derive(Debug, Clone)]
pub struct ExtractorSettings {
    pub base_url: String,
    pub api_key: String,
    pub agent_name: String,
    pub poll_interval: Duration,
    pub max_polls: u32,
}

impl ExtractorSettings {
    /// `None` when no API key is configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        let api_key = config.llama_cloud_api_key.clone()?;
        Some(Self {
            base_url: config.llama_cloud_base_url.trim_end_matches('/').to_string(),
            api_key,
            agent_name: config.extraction_agent_name.clone(),
            poll_interval: Duration::from_millis(config.extraction_poll_interval_ms),
            max_polls: config.extraction_max_polls.max(1),
        })
    }
}

#[derive(Debug, Deserialize)]
struct Created {
    id: String,
}

#[derive(Debug, Serialize)]
struct CreateAgent<'a> {
    name: &'a str,
    data_schema: Value,
    config: Value,
}

#[derive(Debug, Serialize)]
struct CreateJob<'a> {
    extraction_agent_id: &'a str,
    file_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct JobStatus {
    status: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JobResult {
    #[serde(default)]
    data: Option<Value>,
}

enum JobState {
    Running,
    Done,
    Failed,
}

fn job_state(status: &str) -> JobState {
    match status.to_ascii_uppercase().as_str() {
        "SUCCESS" | "PARTIAL_SUCCESS" => JobState::Done,
        "ERROR" | "CANCELLED" | "FAILED" => JobState::Failed,
        _ => JobState::Running,
    }
}

pub struct LlamaCloudExtractor {
    client: Client,
    settings: ExtractorSettings,
    agent_id: OnceCell<String>,
}

impl LlamaCloudExtractor {
    pub fn new(settings: ExtractorSettings) -> Result<Self, ExtractionError> {
        Ok(Self {
            client: Client::builder().build()?,
            settings,
            agent_id: OnceCell::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.settings.base_url)
    }

    async fn agent_id(&self) -> Result<&str, ExtractionError> {
        self.agent_id
            .get_or_try_init(|| self.recreate_agent())
            .await
            .map(String::as_str)
    }

    async fn recreate_agent(&self) -> Result<String, ExtractionError> {
        let name = &self.settings.agent_name;

        let existing = self
            .client
            .get(self.url(&format!("{AGENTS_PATH}/by-name/{name}")))
            .bearer_auth(&self.settings.api_key)
            .send()
            .await?;
        if existing.status() == StatusCode::NOT_FOUND {
            debug!("No existing extraction agent named {name}");
        } else {
            let agent: Created = read_json(existing).await?;
            let deleted = self
                .client
                .delete(self.url(&format!("{AGENTS_PATH}/{}", agent.id)))
                .bearer_auth(&self.settings.api_key)
                .send()
                .await?;
            if deleted.status() != StatusCode::NOT_FOUND {
                expect_success(deleted).await?;
            }
            info!("Deleted extraction agent {} ({name})", agent.id);
        }

        let response = self
            .client
            .post(self.url(AGENTS_PATH))
            .bearer_auth(&self.settings.api_key)
            .json(&CreateAgent {
                name,
                data_schema: resume_json_schema(),
                config: json!({}),
            })
            .send()
            .await?;
        let agent: Created = read_json(response).await?;
        info!("Created extraction agent {} ({name})", agent.id);
        Ok(agent.id)
    }

    async fn upload(&self, file_name: String, bytes: Bytes) -> Result<String, ExtractionError> {
        let part = multipart::Part::bytes(bytes.to_vec())
            .file_name(file_name)
            .mime_str("application/pdf")?;
        let form = multipart::Form::new().part("upload_file", part);

        let response = self
            .client
            .post(self.url(FILES_PATH))
            .bearer_auth(&self.settings.api_key)
            .multipart(form)
            .send()
            .await?;
        let file: Created = read_json(response).await?;
        Ok(file.id)
    }

    async fn wait_for(&self, job_id: &str) -> Result<(), ExtractionError> {
        for poll in 1..=self.settings.max_polls {
            let response = self
                .client
                .get(self.url(&format!("{JOBS_PATH}/{job_id}")))
                .bearer_auth(&self.settings.api_key)
                .send()
                .await?;
            let job: JobStatus = read_json(response).await?;

            match job_state(&job.status) {
                JobState::Done => {
                    debug!("Extraction job {job_id} finished after {poll} polls");
                    return Ok(());
                }
                JobState::Failed => {
                    return Err(ExtractionError::JobFailed {
                        job_id: job_id.to_string(),
                        status: job.status,
                        message: job.error.unwrap_or_default(),
                    });
                }
                JobState::Running => tokio::time::sleep(self.settings.poll_interval).await,
            }
        }

        warn!("Extraction job {job_id} did not finish");
        Err(ExtractionError::PollLimit {
            job_id: job_id.to_string(),
            polls: self.settings.max_polls,
        })
    }
}

#[async_trait]
impl ExtractionService for LlamaCloudExtractor {
    async fn extract(&self, file_name: String, bytes: Bytes) -> Result<Value, ExtractionError> {
        let agent_id = self.agent_id().await?;
        let file_id = self.upload(file_name, bytes).await?;

        let response = self
            .client
            .post(self.url(JOBS_PATH))
            .bearer_auth(&self.settings.api_key)
            .json(&CreateJob {
                extraction_agent_id: agent_id,
                file_id: &file_id,
            })
            .send()
            .await?;
        let job: Created = read_json(response).await?;
        info!("Started extraction job {} for file {file_id}", job.id);

        self.wait_for(&job.id).await?;

        let response = self
            .client
            .get(self.url(&format!("{JOBS_PATH}/{}/result", job.id)))
            .bearer_auth(&self.settings.api_key)
            .send()
            .await?;
        let result: JobResult = read_json(response).await?;
        result
            .data
            .ok_or_else(|| ExtractionError::UnexpectedShape("job result has no data".to_string()))
    }
}

async fn expect_success(response: Response) -> Result<String, ExtractionError> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        warn!("Extraction service returned {status}: {text}");
        return Err(ExtractionError::Api {
            status: status.as_u16(),
            message: text,
        });
    }
    Ok(text)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ExtractionError> {
    let text = expect_success(response).await?;
    serde_json::from_str(&text).map_err(|e| ExtractionError::UnexpectedShape(e.to_string()))
}
