use serde::{Deserialize, Serialize};

use crate::{
    manifest::{TypeMeta, apiversion, kind},
    resource::Object,
};

use super::{ObjectMeta, PodTemplateSpec};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    #[serde(flatten)]
    pub type_meta: TypeMeta<apiversion::AppsV1, kind::Deployment>,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: DeploymentSpec,
    #[serde(flatten)]
    pub rest: Object,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSpec {
    /// `None` means the rendered manifest left the count to the middleware.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(default)]
    pub template: PodTemplateSpec,
    #[serde(flatten)]
    pub rest: Object,
}
