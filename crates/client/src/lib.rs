//! `fleetdeck-client`
//!
//! **Responsibility:** send validated commands to the fleet admin API and report back.
//!
//! This crate provides:
//! - A stateless [`RequestDispatcher`] over a pluggable [`Transport`]
//! - The tagged [`DispatchOutcome`] every request ends in
//! - Operator-facing [`Notification`] text for outcomes
//!
//! The client is a **thin shell** around the admin API: it never retries, queues or
//! caches, and it never navigates on its own. Redirects are reported as intent.

pub mod config;
pub mod dispatcher;
pub mod notification;
pub mod outcome;
pub mod transport;

pub use config::{ClientConfig, ConfigError};
pub use dispatcher::{DispatchRequest, OutcomeHandler, RequestDispatcher};
pub use notification::{Level, Notification};
pub use outcome::{DispatchOutcome, TokenGrant};
pub use transport::{HttpTransport, Method, RawResponse, Transport, TransportFailure};
