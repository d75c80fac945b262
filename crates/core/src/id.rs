//! Strongly-typed identifiers for fleet targets.

use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::ValidationError;

/// Identifier of an environment (a named grouping of agents).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvironmentId(String);

/// Identifier of a platform (`darwin`, `linux`, `windows`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformId(String);

/// Hostname of an enrolled agent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hostname(String);

/// Anti-forgery token proving the request came from an authenticated session form.
///
/// Opaque; the only thing done with it is echoing it back to the server.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CsrfToken(String);

macro_rules! impl_name_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Build from raw input, trimming surrounding whitespace.
            ///
            /// Blank input is rejected.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, ValidationError> {
                let trimmed = raw.as_ref().trim();
                if trimmed.is_empty() {
                    return Err(ValidationError::invalid_id(format!("{}: blank", $name)));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

impl_name_newtype!(EnvironmentId, "EnvironmentId");
impl_name_newtype!(PlatformId, "PlatformId");
impl_name_newtype!(Hostname, "Hostname");

impl CsrfToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("CsrfToken(***)")
    }
}

/// Agent (node) identifier.
///
/// Parsed case-insensitively; rendered upper-case hyphenated, which is how osquery
/// reports host UUIDs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AgentUuid(Uuid);

impl AgentUuid {
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl core::fmt::Display for AgentUuid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut buf = Uuid::encode_buffer();
        f.write_str(self.0.hyphenated().encode_upper(&mut buf))
    }
}

impl From<Uuid> for AgentUuid {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for AgentUuid {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::from_str(s.trim())
            .map_err(|e| ValidationError::invalid_id(format!("AgentUuid: {}", e)))?;
        Ok(Self(uuid))
    }
}

impl Serialize for AgentUuid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AgentUuid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_uuid_renders_upper_case() {
        let uuid: AgentUuid = "4c4c4544-0047-3410-8051-b7c04f4e3732".parse().unwrap();
        assert_eq!(uuid.to_string(), "4C4C4544-0047-3410-8051-B7C04F4E3732");
        assert_eq!(
            serde_json::to_value(uuid).unwrap(),
            serde_json::json!("4C4C4544-0047-3410-8051-B7C04F4E3732")
        );
    }

    #[test]
    fn agent_uuid_rejects_garbage() {
        let err = "not-a-uuid".parse::<AgentUuid>().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidId(msg) if msg.starts_with("AgentUuid")));
    }

    #[test]
    fn names_are_trimmed_and_blank_is_rejected() {
        assert_eq!(EnvironmentId::new("  prod ").unwrap().as_str(), "prod");
        assert!(Hostname::new("   ").is_err());
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = CsrfToken::new("secret");
        assert_eq!(format!("{:?}", token), "CsrfToken(***)");
    }
}
