//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::client::ApiClient;
use crate::http::{HttpRequest, HttpResponse};
use crate::session::Session;
use crate::transport::{Transport, TransportFailure};

/// Replays queued outcomes in order and records every request it sees.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<HttpResponse, TransportFailure>>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, status: u16, body: Value) {
        self.reply_raw(status, body.to_string());
    }

    pub fn reply_raw(&self, status: u16, body: impl Into<String>) {
        let body = body.into();
        let outcome = if (200..300).contains(&status) {
            Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body,
            })
        } else {
            Err(TransportFailure::Http { status, body })
        };
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn fail_network(&self) {
        self.outcomes.lock().unwrap().push_back(Err(TransportFailure::Network {
            message: "connection refused".to_string(),
        }));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.seen.lock().unwrap().last().cloned().expect("no request was sent")
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        self.seen.lock().unwrap().push(request);
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted transport ran out of responses")
    }
}

/// A client over a fresh ephemeral session and a scripted transport.
pub fn scripted_client() -> (ApiClient, Arc<ScriptedTransport>) {
    let transport = Arc::new(ScriptedTransport::new());
    let client = ApiClient::new(
        "http://localhost:3000/api",
        Arc::new(Session::ephemeral()),
        transport.clone(),
    );
    (client, transport)
}
