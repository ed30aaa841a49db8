//! Sends built requests through an `HttpExecutor` and normalizes the result.
//!
//! # Design
//! Both modes share one path: descriptor → `HttpRequest` → executor →
//! `normalize`. They differ only in whether the caller waits. Threads and
//! retries belong to the executor. A descriptor is moved in, so it cannot be
//! sent twice.

use crate::client::RequestDescriptor;
use crate::endpoint::Operation;
use crate::error::{ApiError, TransportError};
use crate::http::{HttpExecutor, HttpResponse};

/// Result of one API call: the raw response body, or why there is none.
pub type Outcome = Result<String, ApiError>;

/// Map an executor result onto an `Outcome`.
///
/// Transport failures become `Network`, non-2xx statuses become
/// `HttpStatus` with the body kept verbatim, 2xx bodies pass through
/// untouched.
pub fn normalize(result: Result<HttpResponse, TransportError>) -> Outcome {
    match result {
        Ok(response) if response.is_success() => Ok(response.body),
        Ok(response) => Err(ApiError::HttpStatus {
            status: response.status,
            body: response.body,
        }),
        Err(err) => Err(ApiError::Network(err)),
    }
}

/// Executes `RequestDescriptor`s in blocking or non-blocking mode.
#[derive(Debug, Clone)]
pub struct Dispatcher<E> {
    executor: E,
}

impl<E: HttpExecutor> Dispatcher<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Submit `request` and return immediately. `listener` runs exactly once,
    /// on the executor's thread, with the normalized outcome.
    #[tracing::instrument(skip_all, fields(operation = %request.operation()))]
    pub fn send_async<F>(&self, request: RequestDescriptor, listener: F)
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        let operation = request.operation();
        let http = request.into_http_request();
        tracing::debug!(method = http.method.as_str(), "dispatching async request");
        self.executor.execute(
            http,
            Box::new(move |result| listener(finish(operation, result))),
        );
    }

    /// Submit `request` and block the calling thread until it resolves.
    ///
    /// Must not be called from a context that cannot block, such as an async
    /// runtime worker.
    #[tracing::instrument(skip_all, fields(operation = %request.operation()))]
    pub fn send_sync(&self, request: RequestDescriptor) -> Outcome {
        let operation = request.operation();
        let http = request.into_http_request();
        tracing::debug!(method = http.method.as_str(), "dispatching sync request");
        finish(operation, self.executor.execute_blocking(http))
    }
}

fn finish(operation: Operation, result: Result<HttpResponse, TransportError>) -> Outcome {
    let outcome = normalize(result);
    match &outcome {
        Ok(body) => tracing::debug!(%operation, bytes = body.len(), "request succeeded"),
        Err(err) => tracing::warn!(%operation, error = %err, "request failed"),
    }
    outcome
}
