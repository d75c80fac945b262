//! Tagged result of one dispatched request.

use serde::Deserialize;
use serde_json::Value;

use crate::transport::{RawResponse, TransportFailure};

/// Longest slice of a non-JSON body quoted back in diagnostics.
const SNIPPET_CHARS: usize = 200;

/// Outcome of a dispatched request; exactly one is produced per request.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// 2xx with a JSON or empty body. `message` is the body's `message` field, empty if
    /// absent; `body` is `Null` when the server sent no content.
    Success {
        status: u16,
        message: String,
        body: Value,
    },
    /// The server answered with an error status and a JSON body.
    ApplicationError {
        status: u16,
        reason: String,
        message: String,
    },
    /// Network failure, or a response that could not be interpreted at all.
    TransportError { detail: String },
}

impl DispatchOutcome {
    /// Interpret a raw response. HTTP status decides success vs error; `message` carries
    /// the text either way.
    pub fn from_response(response: RawResponse) -> Self {
        if response.is_success() && response.body.trim().is_empty() {
            return DispatchOutcome::Success {
                status: response.status,
                message: String::new(),
                body: Value::Null,
            };
        }

        let parsed = serde_json::from_str::<Value>(&response.body);

        if response.is_success() {
            return match parsed {
                Ok(body) => DispatchOutcome::Success {
                    status: response.status,
                    message: message_field(&body).unwrap_or_default(),
                    body,
                },
                Err(e) => DispatchOutcome::TransportError {
                    detail: format!("HTTP {}: malformed response body: {}", response.status, e),
                },
            };
        }

        match parsed {
            Ok(body) => DispatchOutcome::ApplicationError {
                status: response.status,
                message: message_field(&body).unwrap_or_else(|| {
                    format!("malformed response from server (HTTP {})", response.status)
                }),
                reason: response.reason,
            },
            Err(_) => {
                let mut detail = format!("HTTP {}", response.status);
                if !response.reason.is_empty() {
                    detail = format!("{} {}", detail, response.reason);
                }
                let body = snippet(&response.body);
                if !body.is_empty() {
                    detail = format!("{}: {}", detail, body);
                }
                DispatchOutcome::TransportError { detail }
            }
        }
    }

    pub fn from_failure(failure: &TransportFailure) -> Self {
        DispatchOutcome::TransportError {
            detail: failure.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Success { .. })
    }

    /// Human-readable text: server message or transport diagnostic.
    pub fn message(&self) -> &str {
        match self {
            DispatchOutcome::Success { message, .. } => message,
            DispatchOutcome::ApplicationError { message, .. } => message,
            DispatchOutcome::TransportError { detail } => detail,
        }
    }

    /// JSON body of a successful response.
    pub fn body(&self) -> Option<&Value> {
        match self {
            DispatchOutcome::Success { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// API token returned by `/tokens/{user}/refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenGrant {
    pub token: String,
    pub expiration: String,
    #[serde(rename = "exp_ts", default)]
    pub expiration_ts: String,
}

impl TokenGrant {
    /// Parse a grant out of a successful outcome.
    pub fn from_outcome(outcome: &DispatchOutcome) -> Option<Self> {
        outcome
            .body()
            .and_then(|body| serde_json::from_value(body.clone()).ok())
    }
}

fn message_field(body: &Value) -> Option<String> {
    body.get("message").and_then(Value::as_str).map(str::to_string)
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() > SNIPPET_CHARS {
        let head: String = trimmed.chars().take(SNIPPET_CHARS).collect();
        format!("{}...", head)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_with_message_is_success() {
        let outcome = DispatchOutcome::from_response(RawResponse::new(200, r#"{"message":"ok"}"#));
        assert!(outcome.is_success());
        assert_eq!(outcome.message(), "ok");
        assert_eq!(outcome.body(), Some(&json!({"message": "ok"})));
    }

    #[test]
    fn ok_without_message_is_still_success() {
        let outcome = DispatchOutcome::from_response(RawResponse::new(200, r#"{"token":"t"}"#));
        assert!(outcome.is_success());
        assert_eq!(outcome.message(), "");
    }

    #[test]
    fn error_status_with_message_is_application_error() {
        let outcome = DispatchOutcome::from_response(RawResponse::new(400, r#"{"message":"bad"}"#));
        assert_eq!(
            outcome,
            DispatchOutcome::ApplicationError {
                status: 400,
                reason: "Bad Request".into(),
                message: "bad".into(),
            }
        );
    }

    #[test]
    fn error_status_without_message_gets_fallback() {
        let outcome = DispatchOutcome::from_response(RawResponse::new(500, r#"{"error":1}"#));
        assert_eq!(outcome.message(), "malformed response from server (HTTP 500)");

        let outcome = DispatchOutcome::from_response(RawResponse::new(403, r#"{"message":7}"#));
        assert_eq!(outcome.message(), "malformed response from server (HTTP 403)");
    }

    #[test]
    fn error_status_without_json_is_transport_error() {
        let outcome =
            DispatchOutcome::from_response(RawResponse::new(502, "<html>bad gateway</html>"));
        assert_eq!(
            outcome,
            DispatchOutcome::TransportError {
                detail: "HTTP 502 Bad Gateway: <html>bad gateway</html>".into()
            }
        );

        let outcome = DispatchOutcome::from_response(RawResponse::new(504, ""));
        assert_eq!(outcome.message(), "HTTP 504 Gateway Timeout");
    }

    #[test]
    fn ok_with_garbage_body_is_transport_error() {
        let outcome = DispatchOutcome::from_response(RawResponse::new(200, "not json"));
        assert!(matches!(
            outcome,
            DispatchOutcome::TransportError { detail } if detail.starts_with("HTTP 200: malformed")
        ));
    }

    #[test]
    fn no_content_is_success() {
        let outcome = DispatchOutcome::from_response(RawResponse::new(204, ""));
        assert_eq!(
            outcome,
            DispatchOutcome::Success {
                status: 204,
                message: String::new(),
                body: Value::Null,
            }
        );

        let outcome = DispatchOutcome::from_response(RawResponse::new(200, "  \n"));
        assert!(outcome.is_success());
    }

    #[test]
    fn token_grant_from_success_body() {
        let outcome = DispatchOutcome::from_response(RawResponse::new(
            200,
            r#"{"token":"abc","expiration":"2026-11-01 10:00:00","exp_ts":"1793527200"}"#,
        ));
        let grant = TokenGrant::from_outcome(&outcome).unwrap();
        assert_eq!(grant.token, "abc");
        assert_eq!(grant.expiration_ts, "1793527200");

        let failed = DispatchOutcome::TransportError { detail: "x".into() };
        assert!(TokenGrant::from_outcome(&failed).is_none());
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        let outcome = DispatchOutcome::from_response(RawResponse::new(500, body));
        assert!(outcome.message().ends_with("..."));
        assert!(outcome.message().len() < 260);
    }
}
