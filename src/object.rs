mod apps;
mod batch;
mod route;
mod v1;

pub use self::apps::{Deployment, DeploymentSpec};
pub use self::batch::{Job, JobSpec};
pub use self::v1::{
    Container, EnvVar, PersistentVolumeClaim, PersistentVolumeClaimSpec, PodSpec,
    PodTemplateSpec, ResourceRequirements, STORAGE, Secret,
};
pub use self::route::{
    InsecureEdgeTerminationPolicy, IntOrString, Route, RoutePort, RouteSpec, TlsConfig,
    TlsTermination,
};

use anyhow::Context as _;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    manifest::{Str, Symbol, TypeMeta, apiversion, kind},
    resource::{Gvk, Object, ResId, Resource},
};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "Str::is_empty")]
    pub name: Str,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<Str>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub labels: IndexMap<Str, Str>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub annotations: IndexMap<Str, Str>,
    #[serde(flatten)]
    pub rest: Object,
}

impl ObjectMeta {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.namespace.is_none()
            && self.labels.is_empty()
            && self.annotations.is_empty()
            && self.rest.is_empty()
    }
}

/// One generated manifest, narrowed to the kinds the middleware has rules for.
///
/// Processing never changes the variant of an object, it only rewrites fields within it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ManagedObject {
    Secret(Secret),
    Deployment(Deployment),
    PersistentVolumeClaim(PersistentVolumeClaim),
    Job(Job),
    Route(Route),
    Other(Resource),
}

impl ManagedObject {
    pub fn id(&self) -> ResId {
        match self {
            ManagedObject::Secret(secret) => res_id(&secret.type_meta, &secret.metadata),
            ManagedObject::Deployment(dep) => res_id(&dep.type_meta, &dep.metadata),
            ManagedObject::PersistentVolumeClaim(pvc) => res_id(&pvc.type_meta, &pvc.metadata),
            ManagedObject::Job(job) => res_id(&job.type_meta, &job.metadata),
            ManagedObject::Route(route) => res_id(&route.type_meta, &route.metadata),
            ManagedObject::Other(resource) => resource.id().clone(),
        }
    }

    pub fn from_resource(resource: Resource) -> anyhow::Result<Self> {
        let api_version = resource.gvk().api_version();
        let kind = resource.gvk().kind.clone();

        let object = if TypeMeta::<apiversion::CoreV1, kind::Secret>::matches(&api_version, &kind)
        {
            ManagedObject::Secret(typed(resource)?)
        } else if TypeMeta::<apiversion::AppsV1, kind::Deployment>::matches(&api_version, &kind) {
            ManagedObject::Deployment(typed(resource)?)
        } else if TypeMeta::<apiversion::CoreV1, kind::PersistentVolumeClaim>::matches(
            &api_version,
            &kind,
        ) {
            ManagedObject::PersistentVolumeClaim(typed(resource)?)
        } else if TypeMeta::<apiversion::BatchV1, kind::Job>::matches(&api_version, &kind) {
            ManagedObject::Job(typed(resource)?)
        } else if TypeMeta::<apiversion::RouteV1, kind::Route>::matches(&api_version, &kind) {
            ManagedObject::Route(typed(resource)?)
        } else {
            ManagedObject::Other(resource)
        };

        Ok(object)
    }
}

impl<'de> Deserialize<'de> for ManagedObject {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let resource = Resource::deserialize(deserializer)?;
        // `{:#}` keeps the context chain on one line.
        ManagedObject::from_resource(resource)
            .map_err(|err| serde::de::Error::custom(format!("{err:#}")))
    }
}

fn typed<T: DeserializeOwned>(resource: Resource) -> anyhow::Result<T> {
    let id = resource.id().clone();
    let value = serde_json::to_value(&resource)?;
    serde_json::from_value(value).with_context(|| format!("decoding `{id}`"))
}

fn res_id<V: Symbol, K: Symbol>(_: &TypeMeta<V, K>, metadata: &ObjectMeta) -> ResId {
    ResId {
        gvk: Gvk::from_api_version(V::VALUE, K::VALUE),
        name: metadata.name.clone(),
        namespace: metadata.namespace.clone(),
    }
}
