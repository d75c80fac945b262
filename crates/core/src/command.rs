//! Transport-ready commands.
//!
//! A [`Command`] pairs an anti-forgery token, a [`Targeting`] and a [`Payload`]. It is
//! built once per user action through [`CommandBuilder::build`], which runs the payload
//! checks, and is never mutated afterwards. [`Command::to_body`] renders the flat JSON
//! object the backend expects.

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use crate::confirm::Confirmed;
use crate::error::{ValidationError, ValidationResult};
use crate::id::CsrfToken;
use crate::target::{Targeting, is_blank, terminate_statement};

/// Which field names carry environment/platform targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetShape {
    /// `environment_list` / `platform_list` arrays.
    #[default]
    List,
    /// `environment` / `platform` strings (comma-joined), accepted by older endpoints.
    Legacy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryActionKind {
    Delete,
    Complete,
    Activate,
}

impl QueryActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryActionKind::Delete => "delete",
            QueryActionKind::Complete => "complete",
            QueryActionKind::Activate => "activate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserActionKind {
    Add,
    Remove,
    Admin,
    ChangePassword,
    Edit,
}

impl UserActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserActionKind::Add => "add",
            UserActionKind::Remove => "remove",
            UserActionKind::Admin => "admin",
            UserActionKind::ChangePassword => "change_password",
            UserActionKind::Edit => "edit",
        }
    }
}

/// Fields sent along with a user action. Unset fields are omitted from the body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFields {
    pub username: String,
    pub email: Option<String>,
    pub fullname: Option<String>,
    pub password: Option<String>,
    pub old_password: Option<String>,
    pub new_password: Option<String>,
    pub admin: Option<bool>,
    pub token: Option<bool>,
}

impl UserFields {
    pub fn username(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    fn write(&self, body: &mut Map<String, Value>) {
        body.insert("username".into(), json!(self.username));
        insert_some(body, "email", &self.email);
        insert_some(body, "fullname", &self.fullname);
        insert_some(body, "password", &self.password);
        insert_some(body, "old_password", &self.old_password);
        insert_some(body, "new_password", &self.new_password);
        insert_some(body, "admin", &self.admin);
        insert_some(body, "token", &self.token);
    }
}

/// Typed setting value; rendered as `type` + string `value` (+ `boolean`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Boolean(bool),
    Integer(i64),
    String(String),
}

impl SettingValue {
    fn type_name(&self) -> &'static str {
        match self {
            SettingValue::Boolean(_) => "boolean",
            SettingValue::Integer(_) => "integer",
            SettingValue::String(_) => "string",
        }
    }

    fn render(&self) -> String {
        match self {
            SettingValue::Boolean(b) => b.to_string(),
            SettingValue::Integer(i) => i.to_string(),
            SettingValue::String(s) => s.clone(),
        }
    }
}

/// Per-user access grant, sent to `/users/permissions/{user}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionGrant {
    pub environments: BTreeMap<String, bool>,
    pub query: bool,
    pub carve: bool,
}

impl PermissionGrant {
    fn write(&self, body: &mut Map<String, Value>) {
        body.insert("environments".into(), json!(self.environments));
        body.insert("query".into(), json!(self.query));
        body.insert("carve".into(), json!(self.carve));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentActionKind {
    Create {
        kind: String,
        hostname: String,
        icon: String,
    },
    Delete,
    Debug(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagActionKind {
    Add,
    Edit,
    Remove,
}

impl TagActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagActionKind::Add => "add",
            TagActionKind::Edit => "edit",
            TagActionKind::Remove => "remove",
        }
    }
}

/// Tag definition fields. Unset fields are omitted from the body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFields {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub environment: Option<String>,
}

impl TagFields {
    fn write(&self, body: &mut Map<String, Value>) {
        body.insert("name".into(), json!(self.name));
        insert_some(body, "description", &self.description);
        insert_some(body, "color", &self.color);
        insert_some(body, "icon", &self.icon);
        insert_some(body, "environment", &self.environment);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Enroll,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationAction {
    Extend,
    Expire,
}

/// What a command asks the backend to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Distributed query; terminated with `;` on build.
    Query(String),
    /// File carve of a path on the targets.
    CarvePath(String),
    /// Add/remove tags on the targeted agents.
    Tags {
        add: Vec<String>,
        remove: Vec<String>,
    },
    /// Delete the targeted agents.
    RemoveNodes,
    /// Act on saved distributed queries by name.
    QueryAction {
        action: QueryActionKind,
        names: Vec<String>,
    },
    /// Delete carves by id.
    DeleteCarves { ids: Vec<String> },
    UserAction {
        kind: UserActionKind,
        fields: UserFields,
    },
    SettingChange {
        name: String,
        value: SettingValue,
    },
    Permissions(PermissionGrant),
    TokenRefresh { username: String },
    EnvironmentAction {
        name: String,
        kind: EnvironmentActionKind,
    },
    TagAction {
        kind: TagActionKind,
        fields: TagFields,
    },
    Expiration {
        link: LinkKind,
        action: ExpirationAction,
    },
}

impl Payload {
    pub fn query(text: impl Into<String>) -> Self {
        Payload::Query(text.into())
    }

    pub fn carve(path: impl Into<String>) -> Self {
        Payload::CarvePath(path.into())
    }

    /// True for actions that cannot be undone.
    pub fn is_destructive(&self) -> bool {
        match self {
            Payload::RemoveNodes | Payload::DeleteCarves { .. } => true,
            Payload::QueryAction { action, .. } => *action == QueryActionKind::Delete,
            Payload::UserAction { kind, .. } => *kind == UserActionKind::Remove,
            Payload::EnvironmentAction { kind, .. } => *kind == EnvironmentActionKind::Delete,
            Payload::TagAction { kind, .. } => *kind == TagActionKind::Remove,
            _ => false,
        }
    }

    /// Whether the payload acts on agents and therefore needs a target.
    fn needs_targets(&self) -> bool {
        matches!(
            self,
            Payload::Query(_) | Payload::CarvePath(_) | Payload::Tags { .. } | Payload::RemoveNodes
        )
    }

    /// Payloads whose body only has a `uuids` field; environments, platforms and
    /// hostnames cannot address them.
    fn addressed_by_uuid(&self) -> bool {
        matches!(self, Payload::Tags { .. } | Payload::RemoveNodes)
    }

    fn check(&self) -> ValidationResult<()> {
        let blank_name = match self {
            Payload::Query(text) if is_blank(text) => {
                return Err(ValidationError::empty_payload("query"));
            }
            Payload::CarvePath(path) if is_blank(path) => {
                return Err(ValidationError::empty_payload("carve path"));
            }
            Payload::Tags { add, remove } if add.is_empty() && remove.is_empty() => {
                return Err(ValidationError::empty_payload("tag list"));
            }
            Payload::QueryAction { names, .. } => {
                names.is_empty() || names.iter().any(|n| is_blank(n))
            }
            Payload::DeleteCarves { ids } => ids.is_empty() || ids.iter().any(|i| is_blank(i)),
            Payload::UserAction { fields, .. } => is_blank(&fields.username),
            Payload::SettingChange { name, .. } => is_blank(name),
            Payload::TokenRefresh { username } => is_blank(username),
            Payload::EnvironmentAction { name, .. } => is_blank(name),
            Payload::TagAction { fields, .. } => is_blank(&fields.name),
            _ => false,
        };

        if blank_name {
            Err(ValidationError::EmptyName)
        } else {
            Ok(())
        }
    }

    fn normalize(self) -> Self {
        match self {
            Payload::Query(text) => Payload::Query(terminate_statement(&text)),
            other => other,
        }
    }
}

/// A validated, transport-ready request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    token: CsrfToken,
    targeting: Targeting,
    payload: Payload,
    repeat: bool,
    shape: TargetShape,
}

impl Command {
    pub fn builder(token: CsrfToken, targeting: Targeting, payload: Payload) -> CommandBuilder {
        CommandBuilder {
            token,
            targeting,
            payload,
            repeat: false,
            shape: TargetShape::default(),
            confirmed: None,
        }
    }

    pub fn token(&self) -> &CsrfToken {
        &self.token
    }

    pub fn targeting(&self) -> &Targeting {
        &self.targeting
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    /// Render the flat JSON body, `csrftoken` included at the top level.
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("csrftoken".into(), json!(self.token.as_str()));

        match &self.payload {
            Payload::Query(text) => {
                self.insert_targets(&mut body);
                body.insert("query".into(), json!(text));
                body.insert("repeat".into(), json!(u8::from(self.repeat)));
            }
            Payload::CarvePath(path) => {
                self.insert_targets(&mut body);
                body.insert("path".into(), json!(path));
                body.insert("repeat".into(), json!(u8::from(self.repeat)));
            }
            Payload::Tags { add, remove } => {
                body.insert("uuids".into(), json!(self.targeting.uuids()));
                body.insert("tagsadd".into(), json!(add));
                body.insert("tagsremove".into(), json!(remove));
            }
            Payload::RemoveNodes => {
                body.insert("uuids".into(), json!(self.targeting.uuids()));
                body.insert("action".into(), json!("delete"));
            }
            Payload::QueryAction { action, names } => {
                body.insert("names".into(), json!(names));
                body.insert("action".into(), json!(action.as_str()));
            }
            Payload::DeleteCarves { ids } => {
                body.insert("ids".into(), json!(ids));
                body.insert("action".into(), json!("delete"));
            }
            Payload::UserAction { kind, fields } => {
                body.insert("action".into(), json!(kind.as_str()));
                fields.write(&mut body);
            }
            Payload::SettingChange { name, value } => {
                body.insert("action".into(), json!("add"));
                body.insert("name".into(), json!(name));
                body.insert("type".into(), json!(value.type_name()));
                body.insert("value".into(), json!(value.render()));
                if let SettingValue::Boolean(b) = value {
                    body.insert("boolean".into(), json!(b));
                }
            }
            Payload::Permissions(grant) => grant.write(&mut body),
            Payload::TokenRefresh { username } => {
                body.insert("username".into(), json!(username));
            }
            Payload::EnvironmentAction { name, kind } => {
                body.insert("name".into(), json!(name));
                match kind {
                    EnvironmentActionKind::Create {
                        kind,
                        hostname,
                        icon,
                    } => {
                        body.insert("action".into(), json!("create"));
                        body.insert("type".into(), json!(kind));
                        body.insert("hostname".into(), json!(hostname));
                        body.insert("icon".into(), json!(icon));
                    }
                    EnvironmentActionKind::Delete => {
                        body.insert("action".into(), json!("delete"));
                    }
                    EnvironmentActionKind::Debug(enabled) => {
                        body.insert("action".into(), json!("debug"));
                        body.insert("debughttp".into(), json!(enabled));
                    }
                }
            }
            Payload::TagAction { kind, fields } => {
                body.insert("action".into(), json!(kind.as_str()));
                fields.write(&mut body);
            }
            Payload::Expiration { link, action } => {
                let link = match link {
                    LinkKind::Enroll => "enroll",
                    LinkKind::Remove => "remove",
                };
                let action = match action {
                    ExpirationAction::Extend => "extend",
                    ExpirationAction::Expire => "expire",
                };
                body.insert("type".into(), json!(link));
                body.insert("action".into(), json!(action));
            }
        }

        Value::Object(body)
    }

    fn insert_targets(&self, body: &mut Map<String, Value>) {
        let (environments, platforms, hostnames): (Vec<&str>, Vec<&str>, Vec<&str>) =
            match &self.targeting {
                Targeting::Resolved(spec) => (
                    spec.environments().iter().map(|e| e.as_str()).collect(),
                    spec.platforms().iter().map(|p| p.as_str()).collect(),
                    spec.hostnames().iter().map(|h| h.as_str()).collect(),
                ),
                Targeting::Preselected(_) | Targeting::Untargeted => {
                    (Vec::new(), Vec::new(), Vec::new())
                }
            };

        match self.shape {
            TargetShape::List => {
                body.insert("environment_list".into(), json!(environments));
                body.insert("platform_list".into(), json!(platforms));
            }
            TargetShape::Legacy => {
                body.insert("environment".into(), json!(environments.join(",")));
                body.insert("platform".into(), json!(platforms.join(",")));
            }
        }
        body.insert("uuid_list".into(), json!(self.targeting.uuids()));
        body.insert("host_list".into(), json!(hostnames));
    }
}

fn insert_some<T>(body: &mut Map<String, Value>, key: &str, value: &Option<T>)
where
    T: Clone + Into<Value>,
{
    if let Some(value) = value {
        body.insert(key.into(), value.clone().into());
    }
}

/// Builder for [`Command`]; [`CommandBuilder::build`] runs the payload checks.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    token: CsrfToken,
    targeting: Targeting,
    payload: Payload,
    repeat: bool,
    shape: TargetShape,
    confirmed: Option<Confirmed>,
}

impl CommandBuilder {
    /// Keep the query/carve active for agents that check in later.
    pub fn repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn shape(mut self, shape: TargetShape) -> Self {
        self.shape = shape;
        self
    }

    /// Attach the operator's affirmation; required for destructive payloads.
    pub fn confirmed(mut self, confirmed: Confirmed) -> Self {
        self.confirmed = Some(confirmed);
        self
    }

    /// Validate and freeze the command.
    ///
    /// Check order: targets, then payload content, then confirmation. Tag and node
    /// removal payloads resolved from a selection must name at least one agent UUID.
    pub fn build(self) -> ValidationResult<Command> {
        let unaddressed = match &self.targeting {
            Targeting::Untargeted => self.payload.needs_targets(),
            Targeting::Resolved(spec) => {
                self.payload.addressed_by_uuid() && spec.uuids().is_empty()
            }
            Targeting::Preselected(_) => false,
        };
        if unaddressed {
            return Err(ValidationError::NoTargets);
        }
        self.payload.check()?;
        if self.payload.is_destructive() && self.confirmed.is_none() {
            return Err(ValidationError::Unconfirmed);
        }

        Ok(Command {
            token: self.token,
            targeting: self.targeting,
            payload: self.payload.normalize(),
            repeat: self.repeat,
            shape: self.shape,
        })
    }
}
