//! Analysis service HTTP client
//!
//! Thin wrapper over the service's three endpoints: job submission,
//! the progress feed, and the result fetch. Each endpoint maps its
//! failures onto the matching crate error variant; nothing here retries.

use sga_common::api::{AnalysisOptions, AnalysisResponse, ApiError, SubmitResponse};
use sga_common::{Error, Result};
use std::fmt;
use std::time::Duration;

const USER_AGENT: &str = concat!("sga-ui/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Opaque identifier correlating a submission with its progress stream and
/// result fetch. A new submission always mints a new handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for JobHandle {
    fn from(raw: String) -> Self {
        JobHandle(raw)
    }
}

impl From<&str> for JobHandle {
    fn from(raw: &str) -> Self {
        JobHandle(raw.to_string())
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Analysis service API client
pub struct AnalysisClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl AnalysisClient {
    /// Build a client for the given service base URL.
    ///
    /// The progress feed stays open for the whole job, so only the connect
    /// phase carries a client-wide timeout; bounded requests set their own
    /// total timeout per call.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(AnalysisClient {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a score for analysis and return the job handle.
    pub async fn submit(
        &self,
        file_name: &str,
        score_file: Vec<u8>,
        options: &AnalysisOptions,
    ) -> Result<JobHandle> {
        let mut form = reqwest::multipart::Form::new().part(
            "score_file",
            reqwest::multipart::Part::bytes(score_file).file_name(file_name.to_string()),
        );
        for (field, value) in options.form_fields() {
            form = form.text(field, value);
        }

        tracing::debug!(file_name = file_name, "Submitting analysis request");

        let response = self
            .http_client
            .post(format!("{}/api/analyze", self.base_url))
            .timeout(REQUEST_TIMEOUT)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Submission(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiError>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| format!("analysis request rejected ({})", status));
            return Err(Error::Submission(message));
        }

        let submit: SubmitResponse = response
            .json()
            .await
            .map_err(|e| Error::Submission(e.to_string()))?;

        match submit.job_id {
            Some(job_id) if !job_id.is_empty() => {
                tracing::info!(job_id = %job_id, "Analysis job accepted");
                Ok(JobHandle(job_id))
            }
            _ => Err(Error::Submission("no job id returned".to_string())),
        }
    }

    /// Open the progress feed for a job.
    pub async fn open_progress(&self, handle: &JobHandle) -> Result<reqwest::Response> {
        let response = self
            .http_client
            .get(format!("{}/api/progress/{}", self.base_url, handle))
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| Error::Stream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Stream(format!("progress stream refused ({})", status)));
        }
        Ok(response)
    }

    /// Fetch the result payload for a completed job.
    ///
    /// Must not be called before the feed delivered `Done`; the service
    /// leaves earlier fetches undefined.
    pub async fn fetch_result(&self, handle: &JobHandle) -> Result<AnalysisResponse> {
        let response = self
            .http_client
            .get(format!("{}/api/result/{}", self.base_url, handle))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::ResultFetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ResultFetch(format!(
                "result request failed ({})",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::ResultFetch(e.to_string()))
    }
}
