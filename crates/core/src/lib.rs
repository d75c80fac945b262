//! `fleetdeck-core` — target resolution and command model for the fleet admin API.
//!
//! This crate is **pure**: no IO, no ambient state. Callers pass raw widget values in and
//! get validated, transport-ready [`Command`]s out.

pub mod command;
pub mod confirm;
pub mod error;
pub mod id;
pub mod target;

pub use command::{
    Command, CommandBuilder, EnvironmentActionKind, ExpirationAction, LinkKind, Payload,
    PermissionGrant, QueryActionKind, SettingValue, TagActionKind, TagFields, TargetShape,
    UserActionKind, UserFields,
};
pub use confirm::{Confirmation, Confirmed, build_confirmation_summary};
pub use error::{ValidationError, ValidationResult};
pub use id::{AgentUuid, CsrfToken, EnvironmentId, Hostname, PlatformId};
pub use target::{
    ALL_ENVIRONMENTS, ALL_PLATFORMS, Pick, RawSelection, TargetResolver, TargetSpec, Targeting,
    is_blank, terminate_statement,
};
