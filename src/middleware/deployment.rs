use crate::{
    error::Error,
    intent::{ComponentKind, DeploymentIntent},
    object::Deployment,
};

use super::{DeploymentRole, DeploymentTraits, Rules, trim_resources};

/// Annotation the config editor reads to learn which field groups it must leave alone.
pub const MANAGED_FIELD_GROUPS_ANNOTATION: &str = "quay-managed-fieldgroups";

/// Pod template annotations the database must not carry, changing them would redeploy it.
const DATABASE_VOLATILE_ANNOTATIONS: &[&str] = &[
    "quay-registry-hostname",
    "quay-buildmanager-hostname",
    "quay-operator-service-endpoint",
];

pub struct DeploymentPatcher<'a> {
    rules: &'a Rules,
    intent: &'a DeploymentIntent,
    traits: &'a DeploymentTraits,
    skip_resources: bool,
}

impl<'a> DeploymentPatcher<'a> {
    pub fn new(
        rules: &'a Rules,
        intent: &'a DeploymentIntent,
        traits: &'a DeploymentTraits,
        skip_resources: bool,
    ) -> Self {
        Self {
            rules,
            intent,
            traits,
            skip_resources,
        }
    }

    #[tracing::instrument(skip_all, fields(deployment = %dep.metadata.name, component = %self.traits.component))]
    pub fn patch(&self, dep: &mut Deployment) -> Result<(), Error> {
        self.override_env(dep);
        self.default_replicas(dep);

        if self.skip_resources {
            trim_resources(&mut dep.spec.template);
            tracing::debug!("trimmed container resources");
        }

        match self.traits.role {
            DeploymentRole::Database => {
                let annotations = &mut dep.spec.template.metadata.annotations;
                for key in DATABASE_VOLATILE_ANNOTATIONS {
                    if annotations.shift_remove(*key).is_some() {
                        tracing::debug!(annotation = *key, "removed database annotation");
                    }
                }
            }
            DeploymentRole::ConfigEditor => {
                let groups = self.intent.managed_field_groups(self.rules.field_groups)?;
                let value = groups.join(",");
                tracing::debug!(field_groups = %value, "annotating config editor");
                dep.spec
                    .template
                    .metadata
                    .annotations
                    .insert(MANAGED_FIELD_GROUPS_ANNOTATION.into(), value.into());
            }
            DeploymentRole::Other => {}
        }

        Ok(())
    }

    /// Upserts the component's env overrides into every container, init containers excluded.
    fn override_env(&self, dep: &mut Deployment) {
        let component = &self.traits.component;
        if !self.intent.is_managed(component) {
            return;
        }

        for var in self.intent.env_overrides(component) {
            tracing::debug!(env = %var.name, "overriding environment variable");
            for container in dep.spec.template.containers_mut() {
                container.upsert_env(var.clone());
            }
        }
    }

    /// Sets the replica count only when the rendered manifest left it unset. An explicit count,
    /// including zero during upgrades, is kept. Nothing is touched while an autoscaler owns the
    /// replica count.
    fn default_replicas(&self, dep: &mut Deployment) {
        if self.intent.is_managed(&ComponentKind::Hpa) {
            return;
        }

        let Some(kind) = &self.traits.replicas_of else {
            return;
        };

        if dep.spec.replicas.is_some() {
            return;
        }

        let replicas = self
            .intent
            .replicas_override(kind)
            .unwrap_or(self.rules.default_replicas);
        tracing::debug!(replicas, "defaulting replicas");
        dep.spec.replicas = Some(replicas);
    }
}
