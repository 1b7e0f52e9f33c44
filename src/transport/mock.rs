use super::{Transport, TransportRequest, TransportResponse};
use crate::{Error, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A request as seen by [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub url: String,
    pub api_key: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// Decodes a JSON body; panics on multipart bodies.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("recorded body is not JSON")
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

enum Scripted {
    Reply(TransportResponse),
    Failure(String),
}

/// Scripted in-memory transport. Clones share state so a test can keep a
/// handle after moving one into the dispatcher.
#[derive(Clone)]
pub struct MockTransport {
    replies: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_response(self, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.push(Scripted::Reply(TransportResponse {
            status,
            body: body.into(),
        }));
        self
    }

    pub fn with_json(self, body: serde_json::Value) -> Self {
        self.with_response(200, body.to_string())
    }

    pub fn with_failure(self, message: &str) -> Self {
        self.push(Scripted::Failure(message.to_string()));
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    fn push(&self, scripted: Scripted) {
        self.replies.lock().unwrap().push_back(scripted);
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    fn post(&self, request: TransportRequest<'_>) -> Result<TransportResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: request.url,
            api_key: request.api_key.to_string(),
            content_type: request.content_type,
            body: request.body,
        });

        match self.replies.lock().unwrap().pop_front() {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::Failure(message)) => Err(Error::Transport(message)),
            None => Err(Error::Transport("no scripted reply left".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str) -> TransportRequest<'static> {
        TransportRequest {
            url: url.to_string(),
            api_key: "sk-test",
            content_type: "application/json".to_string(),
            body: b"{}".to_vec(),
        }
    }

    #[test]
    fn test_mock_replays_in_order() {
        let mock = MockTransport::new()
            .with_response(200, "first")
            .with_failure("connection reset");

        let reply = mock.post(request("http://x/a")).unwrap();
        assert_eq!(reply.body, b"first");
        assert!(reply.is_success());

        let err = mock.post(request("http://x/b")).unwrap_err();
        assert!(matches!(err, Error::Transport(_)));

        assert!(mock.post(request("http://x/c")).is_err());
    }

    #[test]
    fn test_mock_records_requests_across_clones() {
        let mock = MockTransport::new().with_json(serde_json::json!({"ok": true}));
        let handle = mock.clone();

        assert_eq!(handle.call_count(), 0);
        mock.post(request("http://x/embeddings")).unwrap();

        assert_eq!(handle.call_count(), 1);
        let recorded = handle.last_request().unwrap();
        assert_eq!(recorded.url, "http://x/embeddings");
        assert_eq!(recorded.api_key, "sk-test");
        assert_eq!(recorded.json(), serde_json::json!({}));
    }
}
