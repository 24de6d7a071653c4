use serde::{Deserialize, Serialize};

use crate::{
    manifest::{TypeMeta, apiversion, kind},
    resource::Object,
};

use super::{ObjectMeta, PodTemplateSpec};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(flatten)]
    pub type_meta: TypeMeta<apiversion::BatchV1, kind::Job>,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: JobSpec,
    #[serde(flatten)]
    pub rest: Object,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    #[serde(default)]
    pub template: PodTemplateSpec,
    #[serde(flatten)]
    pub rest: Object,
}
