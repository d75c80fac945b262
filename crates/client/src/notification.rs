//! Operator-facing notification text for dispatch outcomes.
//!
//! Errors are split into a client line (what the transport saw) and a server line (what
//! the backend said), the way the admin panel's error dialog shows them.

use crate::outcome::DispatchOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub client: Option<String>,
    pub server: Option<String>,
}

impl Notification {
    pub fn from_outcome(outcome: &DispatchOutcome) -> Self {
        match outcome {
            DispatchOutcome::Success { message, .. } => Self {
                level: Level::Success,
                client: None,
                server: Some(message.clone()),
            },
            DispatchOutcome::ApplicationError {
                status,
                reason,
                message,
            } => {
                let client = if reason.is_empty() {
                    format!("Client: HTTP {}", status)
                } else {
                    format!("Client: {}", reason)
                };
                Self {
                    level: Level::Error,
                    client: Some(client),
                    server: Some(format!("Server: {}", message)),
                }
            }
            DispatchOutcome::TransportError { detail } => Self {
                level: Level::Error,
                client: Some(format!("Client: {}", detail)),
                server: None,
            },
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }

    /// Non-empty lines, client first.
    pub fn lines(&self) -> Vec<&str> {
        [self.client.as_deref(), self.server.as_deref()]
            .into_iter()
            .flatten()
            .filter(|l| !l.is_empty())
            .collect()
    }
}

impl core::fmt::Display for Notification {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn application_error_has_both_lines() {
        let n = Notification::from_outcome(&DispatchOutcome::ApplicationError {
            status: 403,
            reason: "Forbidden".into(),
            message: "insufficient permissions".into(),
        });
        assert!(n.is_error());
        assert_eq!(n.to_string(), "Client: Forbidden\nServer: insufficient permissions");
    }

    #[test]
    fn transport_error_has_client_line_only() {
        let n = Notification::from_outcome(&DispatchOutcome::TransportError {
            detail: "network error: connection refused".into(),
        });
        assert_eq!(n.lines(), vec!["Client: network error: connection refused"]);
    }

    #[test]
    fn success_shows_server_message() {
        let n = Notification::from_outcome(&DispatchOutcome::Success {
            status: 200,
            message: "query created".into(),
            body: Value::Null,
        });
        assert_eq!(n.level, Level::Success);
        assert_eq!(n.to_string(), "query created");
    }
}
