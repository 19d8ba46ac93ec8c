// Deterministic transport
//
// Canned answers per path, consumed in order; the last answer for a path repeats.
// Every request is recorded so callers can assert how often (and whether) the network was hit.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;

use super::transport::{HttpRequest, HttpResponse, Transport};
use crate::error::TransportError;

#[derive(Debug, Clone)]
enum Scripted {
    Respond(HttpResponse),
    Fail(TransportError),
}

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    inner: Mutex<ScriptedInner>,
}

#[derive(Debug, Default)]
struct ScriptedInner {
    answers: HashMap<String, VecDeque<Scripted>>,
    recorded: Vec<HttpRequest>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn respond(&self, path: &str, status: u16, body: &str) {
        self.push(path, Scripted::Respond(HttpResponse::new(status, body)))
            .await;
    }

    pub async fn fail(&self, path: &str, error: TransportError) {
        self.push(path, Scripted::Fail(error)).await;
    }

    async fn push(&self, path: &str, answer: Scripted) {
        let mut inner = self.inner.lock().await;
        inner
            .answers
            .entry(path.to_string())
            .or_default()
            .push_back(answer);
    }

    pub async fn requests(&self) -> Vec<HttpRequest> {
        self.inner.lock().await.recorded.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.inner.lock().await.recorded.len()
    }

    pub async fn calls_to(&self, path: &str) -> usize {
        self.inner
            .lock()
            .await
            .recorded
            .iter()
            .filter(|r| r.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut inner = self.inner.lock().await;
        let path = request.path.clone();
        let method = request.method;
        inner.recorded.push(request);

        let answer = match inner.answers.get_mut(&path) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        match answer {
            Some(Scripted::Respond(resp)) => Ok(resp),
            Some(Scripted::Fail(err)) => Err(err),
            None => Err(TransportError::Unscripted {
                method: method.as_str().to_string(),
                path,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn answers_are_consumed_in_order_and_last_repeats() {
        let t = ScriptedTransport::new();
        t.respond("/x", 500, "").await;
        t.respond("/x", 200, "ok").await;

        assert_eq!(t.send(HttpRequest::get("/x")).await.unwrap().status, 500);
        assert_eq!(t.send(HttpRequest::get("/x")).await.unwrap().status, 200);
        assert_eq!(t.send(HttpRequest::get("/x")).await.unwrap().status, 200);
        assert_eq!(t.calls_to("/x").await, 3);
    }

    #[tokio::test]
    async fn unscripted_path_is_a_transport_error() {
        let t = ScriptedTransport::new();
        let err = t.send(HttpRequest::get("/nope")).await.unwrap_err();
        assert!(matches!(err, TransportError::Unscripted { .. }));
        assert_eq!(t.request_count().await, 1);
    }

    #[tokio::test]
    async fn scripted_failures_surface_as_errors() {
        let t = ScriptedTransport::new();
        t.fail("/y", TransportError::Timeout).await;
        assert_eq!(
            t.send(HttpRequest::get("/y")).await.unwrap_err(),
            TransportError::Timeout
        );
    }
}
