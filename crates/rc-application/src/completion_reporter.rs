//! Submits challenge completions for the signed-in user.

use anyhow::{Result, anyhow};
use std::sync::Arc;

use rc_core::auth::UserInfo;
use rc_core::completion::{CompletionRecord, ResultSubmission, ResultSubmitter};

pub struct CompletionReporter {
    submitter: Arc<dyn ResultSubmitter>,
}

impl CompletionReporter {
    pub fn new(submitter: Arc<dyn ResultSubmitter>) -> Self {
        Self { submitter }
    }

    /// Sends `record` on behalf of `user`. Returns the server's message.
    pub async fn report(&self, user: &UserInfo, record: &CompletionRecord) -> Result<String> {
        let submission = ResultSubmission::from_completion(user.id.clone(), record);
        submission.validate().map_err(|e| anyhow!(e.message()))?;

        let reply = self
            .submitter
            .submit(&submission)
            .await
            .map_err(|e| anyhow!(e.message()))?;

        if reply.success {
            let message = reply
                .message
                .unwrap_or_else(|| "Result submitted successfully".to_string());
            tracing::info!(
                "[Results] Submitted {} / {} for {}",
                record.game,
                record.challenge_name,
                record.username
            );
            Ok(message)
        } else {
            let error = reply.error.unwrap_or_else(|| "unknown error".to_string());
            tracing::warn!("[Results] Submission rejected: {}", error);
            Err(anyhow!("Result rejected: {}", error))
        }
    }
}
