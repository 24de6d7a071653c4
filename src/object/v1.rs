use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    manifest::{Str, TypeMeta, apiversion, kind},
    quantity::Quantity,
    resource::Object,
};

use super::ObjectMeta;

pub const STORAGE: &str = "storage";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Secret {
    #[serde(flatten)]
    pub type_meta: TypeMeta<apiversion::CoreV1, kind::Secret>,
    pub metadata: ObjectMeta,
    #[serde(
        default,
        with = "crate::serde_ex::base64_data",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub data: IndexMap<Str, Vec<u8>>,
    #[serde(flatten)]
    pub rest: Object,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentVolumeClaim {
    #[serde(flatten)]
    pub type_meta: TypeMeta<apiversion::CoreV1, kind::PersistentVolumeClaim>,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: PersistentVolumeClaimSpec,
    #[serde(flatten)]
    pub rest: Object,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentVolumeClaimSpec {
    #[serde(default, skip_serializing_if = "ResourceRequirements::is_empty")]
    pub resources: ResourceRequirements,
    #[serde(flatten)]
    pub rest: Object,
}

impl PersistentVolumeClaim {
    /// The requested storage, if the claim asks for any.
    pub fn storage(&self) -> Option<&Quantity> {
        self.spec.resources.requests.get(STORAGE)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodTemplateSpec {
    #[serde(default, skip_serializing_if = "ObjectMeta::is_empty")]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "PodSpec::is_empty")]
    pub spec: PodSpec,
}

impl PodTemplateSpec {
    pub fn containers_mut(&mut self) -> impl Iterator<Item = &mut Container> {
        self.spec.containers.iter_mut()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub containers: Vec<Container>,
    #[serde(flatten)]
    pub rest: Object,
}

impl PodSpec {
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty() && self.rest.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub name: Str,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,
    #[serde(default, skip_serializing_if = "ResourceRequirements::is_empty")]
    pub resources: ResourceRequirements,
    #[serde(flatten)]
    pub rest: Object,
}

impl Container {
    /// Replaces the variable with the same name in place, or appends it if there is none.
    pub fn upsert_env(&mut self, var: EnvVar) {
        match self.env.iter_mut().find(|existing| existing.name == var.name) {
            Some(existing) => *existing = var,
            None => self.env.push(var),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVar {
    pub name: Str,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Str>,
    /// `valueFrom` and anything newer.
    #[serde(flatten)]
    pub rest: Object,
}

impl EnvVar {
    pub fn new(name: impl Into<Str>, value: impl Into<Str>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            rest: Object::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequirements {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub limits: IndexMap<Str, Quantity>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub requests: IndexMap<Str, Quantity>,
    #[serde(flatten)]
    pub rest: Object,
}

impl ResourceRequirements {
    pub fn is_empty(&self) -> bool {
        self.limits.is_empty() && self.requests.is_empty() && self.rest.is_empty()
    }
}
