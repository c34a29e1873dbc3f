//! Results API client.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use rc_core::RcError;
use rc_core::completion::{ResultSubmission, ResultSubmitter, SubmissionResponse};
use rc_core::error::Result;

const SUBMIT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct HttpResultSubmitter {
    client: Client,
    submit_url: String,
}

impl HttpResultSubmitter {
    pub fn new(submit_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            submit_url: submit_url.into(),
        }
    }
}

#[async_trait]
impl ResultSubmitter for HttpResultSubmitter {
    /// Posts the submission. Rejections (`success: false`) come back as
    /// `Ok` so the caller can show the server's error text.
    async fn submit(&self, submission: &ResultSubmission) -> Result<SubmissionResponse> {
        submission.validate()?;

        let response = self
            .client
            .post(&self.submit_url)
            .json(submission)
            .timeout(SUBMIT_TIMEOUT)
            .send()
            .await
            .map_err(|e| RcError::http(format!("Result submission failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RcError::http(format!("Failed to read submission response: {}", e)))?;

        match serde_json::from_str::<SubmissionResponse>(&text) {
            Ok(reply) => Ok(reply),
            Err(_) if !status.is_success() => Err(RcError::http(format!(
                "Results API error ({}): {}",
                status, text
            ))),
            Err(e) => Err(RcError::http(format!("Unexpected submission response: {}", e))),
        }
    }
}
