//! Target-set resolution.
//!
//! Raw selections come straight from multi-select widgets: environment and platform
//! picks (possibly including the "select everything" choice), plus free lists of agent
//! UUIDs and hostnames. [`TargetResolver::resolve`] turns them into a canonical
//! [`TargetSpec`], expanding "all" choices against the currently listed options.

use std::collections::BTreeSet;
use std::str::FromStr;

use crate::error::{ValidationError, ValidationResult};
use crate::id::{AgentUuid, EnvironmentId, Hostname, PlatformId};

/// Widget value the legacy panel used for "all environments".
pub const ALL_ENVIRONMENTS: &str = "all_environments_99";

/// Widget value the legacy panel used for "all platforms".
pub const ALL_PLATFORMS: &str = "all_platforms_99";

/// One entry of a multi-select: either a literal value or the "everything" choice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pick<T> {
    All,
    Value(T),
}

impl<T> Pick<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Pick::All)
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Pick::All => None,
            Pick::Value(v) => Some(v),
        }
    }
}

impl Pick<String> {
    pub fn value(v: impl Into<String>) -> Self {
        Pick::Value(v.into())
    }

    /// Interpret a raw widget value, mapping `sentinel` onto [`Pick::All`].
    ///
    /// The empty option yields `None`.
    pub fn from_widget(raw: &str, sentinel: &str) -> Option<Self> {
        if raw.is_empty() {
            None
        } else if raw == sentinel {
            Some(Pick::All)
        } else {
            Some(Pick::Value(raw.to_string()))
        }
    }

    /// Interpret a whole list of raw widget values (selected or rendered options).
    pub fn from_widget_values<I, S>(raw: I, sentinel: &str) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raw.into_iter()
            .filter_map(|v| Pick::from_widget(v.as_ref(), sentinel))
            .collect()
    }
}

/// Selection values exactly as collected from the input widgets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSelection {
    pub environments: Vec<Pick<String>>,
    pub platforms: Vec<Pick<String>>,
    pub uuids: Vec<String>,
    pub hostnames: Vec<String>,
}

impl RawSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn environments<I, S>(mut self, picks: I) -> Self
    where
        I: IntoIterator<Item = Pick<S>>,
        S: Into<String>,
    {
        self.environments = picks.into_iter().map(lift).collect();
        self
    }

    pub fn platforms<I, S>(mut self, picks: I) -> Self
    where
        I: IntoIterator<Item = Pick<S>>,
        S: Into<String>,
    {
        self.platforms = picks.into_iter().map(lift).collect();
        self
    }

    pub fn uuids<I, S>(mut self, uuids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.uuids = uuids.into_iter().map(Into::into).collect();
        self
    }

    pub fn hostnames<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hostnames = hosts.into_iter().map(Into::into).collect();
        self
    }
}

fn lift<S: Into<String>>(pick: Pick<S>) -> Pick<String> {
    match pick {
        Pick::All => Pick::All,
        Pick::Value(v) => Pick::Value(v.into()),
    }
}

/// Canonical, validated target set for one command.
///
/// At least one of the four parts is non-empty. Environment and platform order carries
/// no meaning; uuid and hostname order is kept as entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    environments: BTreeSet<EnvironmentId>,
    platforms: BTreeSet<PlatformId>,
    uuids: Vec<AgentUuid>,
    hostnames: Vec<Hostname>,
}

impl TargetSpec {
    pub fn environments(&self) -> &BTreeSet<EnvironmentId> {
        &self.environments
    }

    pub fn platforms(&self) -> &BTreeSet<PlatformId> {
        &self.platforms
    }

    pub fn uuids(&self) -> &[AgentUuid] {
        &self.uuids
    }

    pub fn hostnames(&self) -> &[Hostname] {
        &self.hostnames
    }
}

/// How a command is addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Targeting {
    /// Went through [`TargetResolver::resolve`].
    Resolved(TargetSpec),
    /// Fixed agent set chosen directly by the caller (e.g. selected table rows).
    ///
    /// Never checked for emptiness; the caller owns that decision.
    Preselected(Vec<AgentUuid>),
    /// Administrative action with no agent scope.
    Untargeted,
}

impl Targeting {
    pub fn preselected(uuids: impl IntoIterator<Item = AgentUuid>) -> Self {
        Targeting::Preselected(uuids.into_iter().collect())
    }

    /// Agent UUIDs named directly, in order.
    pub fn uuids(&self) -> &[AgentUuid] {
        match self {
            Targeting::Resolved(spec) => spec.uuids(),
            Targeting::Preselected(uuids) => uuids,
            Targeting::Untargeted => &[],
        }
    }
}

/// True when `text` is empty or whitespace-only.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Make sure a query statement ends with `;`.
///
/// Trailing whitespace is dropped first so `"SELECT 1 "` becomes `"SELECT 1;"`.
/// Already-terminated statements come back unchanged.
pub fn terminate_statement(text: &str) -> String {
    let trimmed = text.trim_end();
    if trimmed.ends_with(';') {
        trimmed.to_string()
    } else {
        format!("{};", trimmed)
    }
}

/// Stateless resolver of raw selections into [`TargetSpec`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct TargetResolver;

impl TargetResolver {
    /// Resolve a raw selection.
    ///
    /// `enumerate_envs` / `enumerate_platforms` list the options currently offered to the
    /// user; they are only called when the matching selection contains [`Pick::All`],
    /// in which case the whole enumeration replaces the selection.
    pub fn resolve<FE, IE, FP, IP>(
        raw: RawSelection,
        enumerate_envs: FE,
        enumerate_platforms: FP,
    ) -> ValidationResult<TargetSpec>
    where
        FE: FnOnce() -> IE,
        IE: IntoIterator<Item = Pick<String>>,
        FP: FnOnce() -> IP,
        IP: IntoIterator<Item = Pick<String>>,
    {
        let environments = expand(raw.environments, enumerate_envs)?;
        let platforms = expand(raw.platforms, enumerate_platforms)?;
        let uuids = parse_all::<AgentUuid>(raw.uuids)?;
        let hostnames = parse_all::<Hostname>(raw.hostnames)?;

        if environments.is_empty()
            && platforms.is_empty()
            && uuids.is_empty()
            && hostnames.is_empty()
        {
            return Err(ValidationError::NoTargets);
        }

        Ok(TargetSpec {
            environments,
            platforms,
            uuids,
            hostnames,
        })
    }
}

fn expand<T, F, I>(picks: Vec<Pick<String>>, enumerate: F) -> ValidationResult<BTreeSet<T>>
where
    T: FromStr<Err = ValidationError> + Ord,
    F: FnOnce() -> I,
    I: IntoIterator<Item = Pick<String>>,
{
    let values: Vec<String> = if picks.iter().any(Pick::is_all) {
        enumerate().into_iter().filter_map(Pick::into_value).collect()
    } else {
        picks.into_iter().filter_map(Pick::into_value).collect()
    };

    values
        .into_iter()
        .filter(|v| !is_blank(v))
        .map(|v| v.parse())
        .collect()
}

fn parse_all<T>(raw: Vec<String>) -> ValidationResult<Vec<T>>
where
    T: FromStr<Err = ValidationError>,
{
    raw.into_iter()
        .filter(|v| !is_blank(v))
        .map(|v| v.parse())
        .collect()
}
