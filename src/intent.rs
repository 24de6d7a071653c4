use core::fmt;
use std::{convert::Infallible, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error::Error, manifest::Str, object::EnvVar, quantity::Quantity};

/// Which components of the registry are centrally managed and how the operator wants them
/// overridden. Read-only for the duration of a call.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentIntent {
    #[serde(default, skip_serializing_if = "<[_]>::is_empty")]
    pub components: Box<[Component]>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    #[serde(with = "crate::serde_ex::string")]
    pub kind: ComponentKind,
    pub managed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<Overrides>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_size: Option<Quantity>,
    #[serde(default, skip_serializing_if = "<[_]>::is_empty")]
    pub env: Box<[EnvVar]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Quay,
    Postgres,
    Clair,
    ClairPostgres,
    Redis,
    Hpa,
    ObjectStorage,
    Route,
    Mirror,
    Monitoring,
    Tls,
    /// A kind this build does not know about, kept verbatim.
    Other(Str),
}

impl ComponentKind {
    pub fn as_str(&self) -> &str {
        match self {
            ComponentKind::Quay => "quay",
            ComponentKind::Postgres => "postgres",
            ComponentKind::Clair => "clair",
            ComponentKind::ClairPostgres => "clairpostgres",
            ComponentKind::Redis => "redis",
            ComponentKind::Hpa => "horizontalpodautoscaler",
            ComponentKind::ObjectStorage => "objectstorage",
            ComponentKind::Route => "route",
            ComponentKind::Mirror => "mirror",
            ComponentKind::Monitoring => "monitoring",
            ComponentKind::Tls => "tls",
            ComponentKind::Other(kind) => kind,
        }
    }
}

impl From<&str> for ComponentKind {
    fn from(s: &str) -> Self {
        match s {
            "quay" => ComponentKind::Quay,
            "postgres" => ComponentKind::Postgres,
            "clair" => ComponentKind::Clair,
            "clairpostgres" => ComponentKind::ClairPostgres,
            "redis" => ComponentKind::Redis,
            "horizontalpodautoscaler" => ComponentKind::Hpa,
            "objectstorage" => ComponentKind::ObjectStorage,
            "route" => ComponentKind::Route,
            "mirror" => ComponentKind::Mirror,
            "monitoring" => ComponentKind::Monitoring,
            "tls" => ComponentKind::Tls,
            other => ComponentKind::Other(other.into()),
        }
    }
}

impl FromStr for ComponentKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DeploymentIntent {
    fn component(&self, kind: &ComponentKind) -> Option<&Component> {
        self.components.iter().find(|component| component.kind == *kind)
    }

    fn overrides(&self, kind: &ComponentKind) -> Option<&Overrides> {
        self.component(kind)?.overrides.as_ref()
    }

    /// Unlisted kinds are unmanaged.
    pub fn is_managed(&self, kind: &ComponentKind) -> bool {
        self.component(kind).is_some_and(|component| component.managed)
    }

    pub fn env_overrides(&self, kind: &ComponentKind) -> &[EnvVar] {
        self.overrides(kind)
            .map(|overrides| &*overrides.env)
            .unwrap_or_default()
    }

    pub fn replicas_override(&self, kind: &ComponentKind) -> Option<i32> {
        self.overrides(kind)?.replicas
    }

    pub fn volume_size_override(&self, kind: &ComponentKind) -> Option<&Quantity> {
        self.overrides(kind)?.volume_size.as_ref()
    }

    /// Names of the configuration field groups owned by the managed components, in component
    /// order. The config editor uses these to know which fields it must not touch.
    pub fn managed_field_groups(
        &self,
        field_groups: &[(ComponentKind, Option<&'static str>)],
    ) -> Result<Vec<&'static str>, Error> {
        let mut names = Vec::new();
        for component in self.components.iter().filter(|c| c.managed) {
            let (_, group) = field_groups
                .iter()
                .find(|(kind, _)| *kind == component.kind)
                .ok_or_else(|| Error::Derivation {
                    kind: component.kind.clone(),
                })?;
            names.extend(*group);
        }
        Ok(names)
    }
}
