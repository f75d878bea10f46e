//! A fake transport that answers from a script.
//!
//! Each `(method, path)` route holds a queue of canned outcomes. A request
//! pops the front of its route's queue; the last outcome is sticky, so a
//! route scripted once answers the same way forever. Unscripted routes get
//! a 404. Every request is recorded, in order, for later assertions.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::{ApiRequest, ApiResponse, HttpTransport, Method, TransportError};

#[derive(Debug, Clone)]
enum Outcome {
    Respond(ApiResponse),
    Fail(TransportError),
}

#[derive(Debug, Default)]
struct Route {
    outcomes: VecDeque<Outcome>,
    delay: Option<Duration>,
}

/// In-memory [`HttpTransport`] driven by canned responses.
///
/// Scripting methods return `&Self` so several answers can be chained:
/// `transport.respond(..).respond(..)`.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<(Method, String), Route>>,
    sent: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response with a JSON body.
    pub fn respond(
        &self,
        method: Method,
        path: &str,
        status: u16,
        body: serde_json::Value,
    ) -> &Self {
        let bytes = body.to_string().into_bytes();
        self.push(method, path, Outcome::Respond(ApiResponse::new(status, bytes)))
    }

    /// Queues a response with a raw body.
    pub fn respond_raw(
        &self,
        method: Method,
        path: &str,
        status: u16,
        body: impl Into<Vec<u8>>,
    ) -> &Self {
        self.push(method, path, Outcome::Respond(ApiResponse::new(status, body)))
    }

    /// Queues a transport failure.
    pub fn fail(&self, method: Method, path: &str, error: TransportError) -> &Self {
        self.push(method, path, Outcome::Fail(error))
    }

    /// Makes every answer on a route wait `delay` first.
    pub fn delay(&self, method: Method, path: &str, delay: Duration) -> &Self {
        self.with_route(method, path, |route| route.delay = Some(delay));
        self
    }

    /// Every request sent so far, oldest first.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests sent to one route, oldest first.
    pub fn requests_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    /// How many requests hit one route.
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests_to(method, path).len()
    }

    fn push(&self, method: Method, path: &str, outcome: Outcome) -> &Self {
        self.with_route(method, path, |route| route.outcomes.push_back(outcome));
        self
    }

    fn with_route<R>(
        &self,
        method: Method,
        path: &str,
        f: impl FnOnce(&mut Route) -> R,
    ) -> R {
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        f(routes.entry((method, path.to_string())).or_default())
    }

    /// Pops the next outcome for a request, keeping the last one sticky.
    fn next(&self, request: &ApiRequest) -> (Option<Outcome>, Option<Duration>) {
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        match routes.get_mut(&(request.method, request.path.clone())) {
            Some(route) => {
                let outcome = if route.outcomes.len() > 1 {
                    route.outcomes.pop_front()
                } else {
                    route.outcomes.front().cloned()
                };
                (outcome, route.delay)
            }
            None => (None, None),
        }
    }
}

impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let (outcome, delay) = self.next(request);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match outcome {
            Some(Outcome::Respond(response)) => Ok(response),
            Some(Outcome::Fail(error)) => Err(error),
            None => Ok(ApiResponse::new(
                404,
                format!(r#"{{"message":"no route for {} {}"}}"#, request.method, request.path),
            )),
        }
    }
}
