//! Request dispatch.
//!
//! Every panel action ends up here: one outbound GET or POST, one [`DispatchOutcome`].
//!
//! ## Contract
//!
//! - POST bodies are the command's flat JSON object with `csrftoken` at the top level.
//! - GET requests have no body; the token travels in the [`CSRF_HEADER`] header.
//! - [`OutcomeHandler::on_result`] fires exactly once per [`RequestDispatcher::dispatch`].
//! - Nothing is retried and nothing is queued. Each call is independent, so any number
//!   may be in flight at once.
//!
//! [`CSRF_HEADER`]: crate::transport::CSRF_HEADER

use std::sync::Arc;

use fleetdeck_core::{Command, CsrfToken};

use crate::config::ClientConfig;
use crate::notification::Notification;
use crate::outcome::DispatchOutcome;
use crate::transport::{HttpTransport, Method, OutboundRequest, Transport, TransportFailure};

/// One request to dispatch.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    method: Method,
    endpoint: String,
    token: CsrfToken,
    command: Option<Command>,
    redirect: Option<String>,
    notify: bool,
}

impl DispatchRequest {
    /// POST `command` to `endpoint`. The token is taken from the command.
    pub fn post(endpoint: impl Into<String>, command: Command) -> Self {
        Self {
            method: Method::Post,
            endpoint: endpoint.into(),
            token: command.token().clone(),
            command: Some(command),
            redirect: None,
            notify: false,
        }
    }

    /// GET `endpoint` (no body).
    pub fn get(endpoint: impl Into<String>, token: CsrfToken) -> Self {
        Self {
            method: Method::Get,
            endpoint: endpoint.into(),
            token,
            command: None,
            redirect: None,
            notify: false,
        }
    }

    /// Where the caller should navigate after a success. Blank means stay.
    pub fn redirect_to(mut self, target: impl Into<String>) -> Self {
        let target = target.into();
        self.redirect = (!target.trim().is_empty()).then_some(target);
        self
    }

    /// Surface the server's success message to the operator.
    pub fn notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Receiver of dispatch results.
///
/// `on_notify` and `on_redirect` are optional hooks; `on_result` is called exactly once,
/// last.
pub trait OutcomeHandler {
    /// Operator-facing message: every error, and successes when requested.
    fn on_notify(&mut self, _notification: &Notification) {}

    /// Navigation intent after a success.
    fn on_redirect(&mut self, _target: &str) {}

    fn on_result(&mut self, outcome: &DispatchOutcome);
}

impl<F> OutcomeHandler for F
where
    F: FnMut(&DispatchOutcome),
{
    fn on_result(&mut self, outcome: &DispatchOutcome) {
        self(outcome)
    }
}

/// Stateless dispatcher over a [`Transport`].
#[derive(Clone)]
pub struct RequestDispatcher {
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl core::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl RequestDispatcher {
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
        }
    }

    /// Dispatcher over `reqwest`, honoring the configured timeout.
    pub fn http(config: &ClientConfig) -> Result<Self, TransportFailure> {
        let transport = match config.timeout {
            Some(timeout) => HttpTransport::with_timeout(timeout)?,
            None => HttpTransport::new(),
        };
        Ok(Self::new(config.base_url.clone(), Arc::new(transport)))
    }

    /// Absolute URL for `endpoint`. Absolute endpoints are used as-is.
    pub fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Send one request and classify the response.
    pub async fn send(&self, request: &DispatchRequest) -> DispatchOutcome {
        let url = self.url_for(&request.endpoint);
        let outbound = OutboundRequest {
            method: request.method,
            url: url.clone(),
            token: request.token.clone(),
            body: match request.method {
                Method::Post => request.command.as_ref().map(Command::to_body),
                Method::Get => None,
            },
        };

        tracing::debug!(method = request.method.as_str(), %url, "dispatching request");

        let outcome = match self.transport.execute(outbound).await {
            Ok(response) => DispatchOutcome::from_response(response),
            Err(failure) => DispatchOutcome::from_failure(&failure),
        };

        match &outcome {
            DispatchOutcome::Success { status, .. } => {
                tracing::info!(method = request.method.as_str(), %url, status, "request succeeded");
            }
            DispatchOutcome::ApplicationError { status, message, .. } => {
                tracing::warn!(
                    method = request.method.as_str(),
                    %url,
                    status,
                    %message,
                    "server rejected request"
                );
            }
            DispatchOutcome::TransportError { detail } => {
                tracing::warn!(method = request.method.as_str(), %url, %detail, "request failed");
            }
        }

        outcome
    }

    /// Send one request and report through `handler`.
    ///
    /// Order: notification (if any), redirect (successes only), then the result.
    pub async fn dispatch<H>(&self, request: DispatchRequest, handler: &mut H) -> DispatchOutcome
    where
        H: OutcomeHandler + ?Sized,
    {
        let outcome = self.send(&request).await;

        if !outcome.is_success() || request.notify {
            handler.on_notify(&Notification::from_outcome(&outcome));
        }
        if outcome.is_success() {
            if let Some(target) = &request.redirect {
                handler.on_redirect(target);
            }
        }
        handler.on_result(&outcome);

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use fleetdeck_core::{Payload, Targeting};
    use serde_json::{Value, json};

    use crate::transport::RawResponse;

    /// Transport that answers every request with the same canned result and records
    /// what it was asked to send.
    struct CannedTransport {
        status: Option<u16>,
        body: &'static str,
        seen: Mutex<Vec<OutboundRequest>>,
    }

    impl CannedTransport {
        fn responding(status: u16, body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                status: Some(status),
                body,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn unreachable() -> Arc<Self> {
            Arc::new(Self {
                status: None,
                body: "",
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn execute(&self, request: OutboundRequest) -> Result<RawResponse, TransportFailure> {
            self.seen.lock().unwrap().push(request);
            match self.status {
                Some(status) => Ok(RawResponse::new(status, self.body)),
                None => Err(TransportFailure::Network("connection refused".into())),
            }
        }
    }

    #[derive(Default)]
    struct Recorder {
        notes: Vec<Notification>,
        redirects: Vec<String>,
        results: Vec<DispatchOutcome>,
    }

    impl OutcomeHandler for Recorder {
        fn on_notify(&mut self, notification: &Notification) {
            self.notes.push(notification.clone());
        }

        fn on_redirect(&mut self, target: &str) {
            self.redirects.push(target.to_string());
        }

        fn on_result(&mut self, outcome: &DispatchOutcome) {
            self.results.push(outcome.clone());
        }
    }

    fn query_command() -> Command {
        let uuid = "aaaaaaaa-0000-0000-0000-000000000001".parse().unwrap();
        Command::builder(
            CsrfToken::new("tok"),
            Targeting::preselected([uuid]),
            Payload::query("SELECT 1"),
        )
        .build()
        .unwrap()
    }

    #[tokio::test]
    async fn success_fires_result_once_and_redirects() {
        let transport = CannedTransport::responding(200, r#"{"message":"ok"}"#);
        let dispatcher = RequestDispatcher::new("http://admin.local/", transport.clone());
        let mut rec = Recorder::default();

        let request =
            DispatchRequest::post("/query/run", query_command()).redirect_to("/query/list");
        let outcome = dispatcher.dispatch(request, &mut rec).await;

        assert!(outcome.is_success());
        assert_eq!(rec.results.len(), 1);
        assert_eq!(rec.redirects, vec!["/query/list"]);
        assert!(rec.notes.is_empty());

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].url, "http://admin.local/query/run");
        let body = seen[0].body.as_ref().unwrap();
        assert_eq!(body["csrftoken"], json!("tok"));
        assert_eq!(body["query"], json!("SELECT 1;"));
    }

    #[tokio::test]
    async fn success_notification_is_opt_in() {
        let transport = CannedTransport::responding(200, r#"{"message":"saved"}"#);
        let dispatcher = RequestDispatcher::new("http://admin.local", transport);
        let mut rec = Recorder::default();

        let request = DispatchRequest::post("/settings", query_command()).notify(true);
        dispatcher.dispatch(request, &mut rec).await;

        assert_eq!(rec.notes.len(), 1);
        assert_eq!(rec.notes[0].to_string(), "saved");
    }

    #[tokio::test]
    async fn application_error_never_redirects() {
        let transport = CannedTransport::responding(500, r#"{"message":"bad"}"#);
        let dispatcher = RequestDispatcher::new("http://admin.local", transport);
        let mut rec = Recorder::default();

        let request =
            DispatchRequest::post("/query/run", query_command()).redirect_to("/query/list");
        let outcome = dispatcher.dispatch(request, &mut rec).await;

        assert!(matches!(
            outcome,
            DispatchOutcome::ApplicationError { ref message, .. } if message == "bad"
        ));
        assert_eq!(rec.results, vec![outcome]);
        assert!(rec.redirects.is_empty());
        assert_eq!(rec.notes.len(), 1);
        assert!(rec.notes[0].is_error());
    }

    #[tokio::test]
    async fn network_failure_is_one_transport_error() {
        let dispatcher =
            RequestDispatcher::new("http://admin.local", CannedTransport::unreachable());
        let mut results = Vec::new();
        let mut handler = |o: &DispatchOutcome| results.push(o.clone());

        dispatcher
            .dispatch(DispatchRequest::post("/carves/run", query_command()), &mut handler)
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0],
            DispatchOutcome::TransportError {
                detail: "network error: connection refused".into()
            }
        );
    }

    #[tokio::test]
    async fn get_requests_carry_no_body() {
        let transport = CannedTransport::responding(200, r#"{"query":true}"#);
        let dispatcher = RequestDispatcher::new("http://admin.local", transport.clone());

        let outcome = dispatcher
            .send(&DispatchRequest::get("users/permissions/alice", CsrfToken::new("tok")))
            .await;

        assert_eq!(outcome.body().and_then(|b| b.get("query")), Some(&Value::Bool(true)));
        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::Get);
        assert!(seen[0].body.is_none());
        assert_eq!(seen[0].token, CsrfToken::new("tok"));
        assert_eq!(seen[0].url, "http://admin.local/users/permissions/alice");
    }

    #[test]
    fn blank_redirect_means_stay() {
        let request = DispatchRequest::get("/x", CsrfToken::new("t")).redirect_to("  ");
        assert!(request.redirect.is_none());
    }

    #[test]
    fn absolute_endpoints_pass_through() {
        let dispatcher =
            RequestDispatcher::new("http://admin.local", CannedTransport::unreachable());
        assert_eq!(dispatcher.url_for("https://other/x"), "https://other/x");
        assert_eq!(
            dispatcher.url_for("tokens/bob/refresh"),
            "http://admin.local/tokens/bob/refresh"
        );
    }
}
