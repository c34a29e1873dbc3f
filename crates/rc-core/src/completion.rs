//! Challenge completions written by the Lua scripts and their submission.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RcError, Result};

/// A completed challenge as read from `challenge_data.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub username: String,
    pub game: String,
    pub challenge_name: String,
    /// ISO-8601 completion time
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCompletion {
    username: Option<String>,
    game: Option<String>,
    challenge_name: Option<String>,
    date: Option<String>,
    score: Option<Value>,
    time: Option<Value>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl CompletionRecord {
    /// Parses the completion file contents.
    ///
    /// Returns `Ok(None)` when the document is valid JSON but lacks a
    /// username, game or challenge name (e.g. the initial `{}`).
    pub fn from_json(contents: &str, now: DateTime<Utc>) -> Result<Option<Self>> {
        let raw: RawCompletion = serde_json::from_str(contents)?;

        let (Some(username), Some(game), Some(challenge_name)) = (
            present(raw.username),
            present(raw.game),
            present(raw.challenge_name),
        ) else {
            return Ok(None);
        };

        Ok(Some(Self {
            username,
            game,
            challenge_name,
            date: present(raw.date).unwrap_or_else(|| now.to_rfc3339()),
            score: raw.score.filter(|v| !v.is_null()),
            time: raw.time.filter(|v| !v.is_null()),
        }))
    }

    /// Short human-readable result, e.g. `score 5200` or `time 01:23`.
    pub fn summary(&self) -> String {
        let render = |v: &Value| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        match (&self.score, &self.time) {
            (Some(score), Some(time)) => format!("score {}, time {}", render(score), render(time)),
            (Some(score), None) => format!("score {}", render(score)),
            (None, Some(time)) => format!("time {}", render(time)),
            (None, None) => "no result".to_string(),
        }
    }
}

/// Body posted to the results API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSubmission {
    pub oauth_id: String,
    pub rc_username: String,
    pub game: String,
    #[serde(rename = "challengeName")]
    pub challenge_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Value>,
}

impl ResultSubmission {
    pub fn from_completion(oauth_id: impl Into<String>, record: &CompletionRecord) -> Self {
        Self {
            oauth_id: oauth_id.into(),
            rc_username: record.username.clone(),
            game: record.game.clone(),
            challenge_name: record.challenge_name.clone(),
            score: record.score.clone(),
            time: record.time.clone(),
        }
    }

    /// Same checks the server applies before touching the database.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("oauth_id", &self.oauth_id),
            ("rc_username", &self.rc_username),
            ("game", &self.game),
            ("challengeName", &self.challenge_name),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(RcError::validation(format!(
                "Missing or empty field: {name}"
            )));
        }
        if self.score.is_none() && self.time.is_none() {
            return Err(RcError::validation(
                "Either score or time must be provided",
            ));
        }
        Ok(())
    }
}

/// Results API reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Delivers validated submissions to the results API.
#[async_trait]
pub trait ResultSubmitter: Send + Sync {
    async fn submit(&self, submission: &ResultSubmission) -> Result<SubmissionResponse>;
}
