use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Methods that never change server state; these are not queued.
pub const READ_ONLY_METHODS: [&str; 3] = ["GET", "HEAD", "OPTIONS"];

/// An outbound API call as issued by the app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRequest {
    pub url: String,
    pub method: String,
    /// Parsed JSON payload; `None` when absent or unparsable.
    pub body: Option<Value>,
}

impl NewRequest {
    pub fn new(url: impl Into<String>, method: impl AsRef<str>, body: Option<Value>) -> Self {
        Self {
            url: url.into(),
            method: method.as_ref().trim().to_ascii_uppercase(),
            body: body.filter(|v| !v.is_null()),
        }
    }

    /// Build from a raw request body, keeping it only if it parses as JSON.
    pub fn from_raw_body(url: impl Into<String>, method: impl AsRef<str>, raw: &[u8]) -> Self {
        let body = serde_json::from_slice::<Value>(raw).ok();
        Self::new(url, method, body)
    }

    pub fn is_mutating(&self) -> bool {
        !READ_ONLY_METHODS.contains(&self.method.as_str())
    }
}

/// A persisted queue row.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedRequest {
    /// Auto-assigned, increasing in enqueue order.
    pub key: i64,
    pub url: String,
    pub method: String,
    pub body: Option<Value>,
    /// Retryable responses seen so far.
    pub attempts: u32,
    pub enqueued_at: DateTime<Utc>,
}

impl QueuedRequest {
    pub fn to_request(&self) -> NewRequest {
        NewRequest {
            url: self.url.clone(),
            method: self.method.clone(),
            body: self.body.clone(),
        }
    }
}

/// What happened to a submitted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The server answered (any status).
    Sent { status: u16 },
    /// No connectivity; persisted for background replay.
    Queued { key: i64 },
}

impl Submission {
    /// JSON body handed back to the caller in place of a server response.
    pub fn queued_response_body(&self) -> Option<Value> {
        match self {
            Submission::Queued { .. } => Some(serde_json::json!({ "queued": true })),
            Submission::Sent { .. } => None,
        }
    }
}

/// Outcome of one replay pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Keys answered with 2xx and removed.
    pub delivered: Vec<i64>,
    /// Keys the server refused outright, with the status; removed.
    pub rejected: Vec<(i64, u16)>,
    /// Keys dropped after exhausting retries or being unsendable.
    pub abandoned: Vec<i64>,
    /// Rows still queued when the pass stopped.
    pub retained: usize,
}

impl ReplayReport {
    pub fn is_empty(&self) -> bool {
        self.delivered.is_empty()
            && self.rejected.is_empty()
            && self.abandoned.is_empty()
            && self.retained == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn method_is_normalised_and_classified() {
        let post = NewRequest::new("https://api.test/chat", "post", None);
        assert_eq!(post.method, "POST");
        assert!(post.is_mutating());
        assert!(!NewRequest::new("https://api.test/", " get ", None).is_mutating());
        assert!(!NewRequest::new("https://api.test/", "HEAD", None).is_mutating());
        assert!(NewRequest::new("https://api.test/", "DELETE", None).is_mutating());
    }

    #[test]
    fn unparsable_or_null_body_becomes_none() {
        let r = NewRequest::from_raw_body("u", "POST", b"not json");
        assert_eq!(r.body, None);
        let r = NewRequest::from_raw_body("u", "POST", b"");
        assert_eq!(r.body, None);
        let r = NewRequest::from_raw_body("u", "POST", b"null");
        assert_eq!(r.body, None);
        let r = NewRequest::from_raw_body("u", "POST", br#"{"a":1}"#);
        assert_eq!(r.body, Some(json!({"a": 1})));
    }

    #[test]
    fn queued_submission_reports_queued_body() {
        let queued = Submission::Queued { key: 1 };
        assert_eq!(queued.queued_response_body(), Some(json!({"queued": true})));
        assert_eq!(Submission::Sent { status: 200 }.queued_response_body(), None);
    }
}
