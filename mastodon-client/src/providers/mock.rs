//! Mock poster for testing
//!
//! Records every request and can be told to fail on a given post, which is
//! enough to exercise reply chaining and stop-on-failure behavior.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{MastodonError, Result};
use crate::poster::{PostedStatus, StatusRequest, ThreadPoster};

pub struct MockPoster {
    /// 0-based call that fails (None = never fail)
    fail_at: Option<usize>,
    /// Current call count
    call_count: AtomicUsize,
    /// Every request received, in order
    requests: Mutex<Vec<StatusRequest>>,
}

impl MockPoster {
    /// Create a poster that accepts everything
    pub fn always_succeeds() -> Self {
        Self {
            fail_at: None,
            call_count: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a poster whose `n`th call (0-based) fails
    pub fn fails_at(n: usize) -> Self {
        Self {
            fail_at: Some(n),
            ..Self::always_succeeds()
        }
    }

    /// Get the number of times post_status() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Requests seen so far
    pub fn requests(&self) -> Vec<StatusRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ThreadPoster for MockPoster {
    async fn post_status(&self, request: StatusRequest) -> Result<PostedStatus> {
        let call_num = self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        if self.fail_at == Some(call_num) {
            return Err(MastodonError::ApiError {
                message: "Validation failed: Text character limit exceeded".to_string(),
                status_code: Some(422),
            });
        }

        Ok(PostedStatus {
            id: format!("status-{}", call_num + 1),
            url: None,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
