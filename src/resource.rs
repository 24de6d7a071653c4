use std::{fmt, ops::Deref};

use anyhow::Context as _;
use compact_str::format_compact;
use serde::{Deserialize, Serialize};

use crate::manifest::Str;

pub type Object = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gvk {
    pub group: Str,
    pub version: Str,
    pub kind: Str,
}

impl Gvk {
    pub fn from_api_version(api_version: &str, kind: impl Into<Str>) -> Self {
        let (group, version) = api_version
            .split_once('/')
            .map_or(("", api_version), |(g, v)| (g, v));
        Gvk {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    pub fn api_version(&self) -> Str {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format_compact!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for Gvk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}.{}", self.kind, self.version)
        } else {
            write!(f, "{}.{}.{}", self.kind, self.version, self.group)
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ResId {
    pub gvk: Gvk,
    pub name: Str,
    pub namespace: Option<Str>,
}

impl Deref for ResId {
    type Target = Gvk;

    fn deref(&self) -> &Self::Target {
        &self.gvk
    }
}

impl fmt::Debug for ResId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for ResId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(namespace) = &self.namespace {
            write!(f, "{}/{}.{namespace}", self.gvk, self.name)?;
        } else {
            write!(f, "{}/{}", self.gvk, self.name)?;
        }
        Ok(())
    }
}

/// A manifest of a kind the middleware has no typed model for. Carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    id: ResId,
    root: Object,
}

impl Resource {
    pub fn id(&self) -> &ResId {
        &self.id
    }

    pub fn gvk(&self) -> &Gvk {
        &self.id.gvk
    }

    pub fn from_parts(api_version: &str, kind: &str, root: Object) -> anyhow::Result<Self> {
        let metadata = root
            .get("metadata")
            .and_then(|v| v.as_object())
            .with_context(|| format!("`{kind}` is missing `metadata`"))?;
        let name = metadata
            .get("name")
            .and_then(|v| v.as_str())
            .with_context(|| format!("`{kind}` is missing `metadata.name`"))?;
        let namespace = metadata
            .get("namespace")
            .and_then(|v| v.as_str())
            .map(Str::from);

        let id = ResId {
            gvk: Gvk::from_api_version(api_version, kind),
            name: name.into(),
            namespace,
        };

        Ok(Resource { id, root })
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Res {
    api_version: Str,
    kind: Str,
    #[serde(flatten)]
    root: Object,
}

impl Serialize for Resource {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        Res {
            api_version: self.id.gvk.api_version(),
            kind: self.id.kind.clone(),
            root: self.root.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Resource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        let res = Res::deserialize(deserializer)
            .map_err(|err| serde::de::Error::custom(format!("parsing resource: {err}")))?;

        Resource::from_parts(&res.api_version, &res.kind, res.root)
            .map_err(serde::de::Error::custom)
    }
}
