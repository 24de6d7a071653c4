mod deployment;
mod job;
mod route;
mod secret;
mod volume;

pub use self::deployment::DeploymentPatcher;
pub use self::job::JobPatcher;
pub use self::route::RoutePatcher;
pub use self::secret::flatten_config_bundle;
pub use self::volume::VolumeClaimGuard;

use crate::{
    error::Error,
    intent::{ComponentKind, DeploymentIntent},
    object::{ManagedObject, ObjectMeta, PodTemplateSpec, ResourceRequirements},
};

/// Label (and on deployments, annotation) naming the registry component an object belongs to.
pub const COMPONENT_LABEL: &str = "quay-component";

/// The fixed lookup tables the middleware decides with.
#[derive(Debug)]
pub struct Rules {
    /// Secrets whose name contains this are config bundles.
    pub config_bundle_prefix: &'static str,
    /// Deployments whose name ends with the suffix get replicas defaulted from the component.
    pub replica_suffixes: &'static [(ComponentKind, &'static str)],
    pub default_replicas: i32,
    pub field_groups: &'static [(ComponentKind, Option<&'static str>)],
    pub database_deployment: &'static str,
    pub config_editor_deployment: &'static str,
    pub database_claims: &'static [(&'static str, ComponentKind)],
    pub app_route: &'static str,
    pub builder_route: &'static str,
}

static BUILTIN: Rules = Rules {
    config_bundle_prefix: "quay-config-secret-",
    replica_suffixes: &[
        (ComponentKind::Clair, "clair-app"),
        (ComponentKind::Mirror, "quay-mirror"),
        (ComponentKind::Quay, "quay-app"),
    ],
    default_replicas: 2,
    field_groups: &[
        (ComponentKind::Quay, None),
        (ComponentKind::Postgres, Some("Database")),
        (ComponentKind::Clair, Some("SecurityScanner")),
        (ComponentKind::ClairPostgres, None),
        (ComponentKind::Redis, Some("Redis")),
        (ComponentKind::Hpa, None),
        (ComponentKind::ObjectStorage, Some("DistributedStorage")),
        (ComponentKind::Route, Some("HostSettings")),
        (ComponentKind::Mirror, Some("RepoMirror")),
        (ComponentKind::Monitoring, None),
        (ComponentKind::Tls, None),
    ],
    database_deployment: "quay-database",
    config_editor_deployment: "quay-config-editor",
    // The clair database volume is sized through the clair component.
    database_claims: &[
        ("postgres", ComponentKind::Postgres),
        ("clair-postgres", ComponentKind::Clair),
    ],
    app_route: "quay-app-route",
    builder_route: "quay-builder-route",
};

impl Rules {
    pub fn builtin() -> &'static Rules {
        &BUILTIN
    }
}

/// What the middleware will do to an object, decided from its kind and name/label metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    FlattenConfigBundle,
    PatchDeployment(DeploymentTraits),
    GuardVolumeClaim(ComponentKind),
    TrimJob,
    PatchRoute(RouteRole),
    Identity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTraits {
    /// Component named by the deployment's annotation, `Other("")` when there is none.
    pub component: ComponentKind,
    /// Component whose replica count this deployment carries.
    pub replicas_of: Option<ComponentKind>,
    pub role: DeploymentRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentRole {
    Database,
    ConfigEditor,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRole {
    App,
    Builder,
}

pub struct Middleware<'a> {
    rules: &'a Rules,
}

impl Default for Middleware<'static> {
    fn default() -> Self {
        Self::new(Rules::builtin())
    }
}

impl<'a> Middleware<'a> {
    pub fn new(rules: &'a Rules) -> Self {
        Self { rules }
    }

    pub fn classify(&self, object: &ManagedObject) -> Rule {
        let rules = self.rules;
        match object {
            ManagedObject::Secret(secret) => {
                if secret.metadata.name.contains(rules.config_bundle_prefix) {
                    Rule::FlattenConfigBundle
                } else {
                    Rule::Identity
                }
            }
            ManagedObject::Deployment(dep) => {
                let name = dep.metadata.name.as_str();
                let component = dep
                    .metadata
                    .annotations
                    .get(COMPONENT_LABEL)
                    .map_or(ComponentKind::Other("".into()), |c| ComponentKind::from(c.as_str()));
                let replicas_of = rules
                    .replica_suffixes
                    .iter()
                    .find(|(_, suffix)| name.ends_with(suffix))
                    .map(|(kind, _)| kind.clone());
                let role = if name.contains(rules.database_deployment) {
                    DeploymentRole::Database
                } else if name.contains(rules.config_editor_deployment) {
                    DeploymentRole::ConfigEditor
                } else {
                    DeploymentRole::Other
                };

                Rule::PatchDeployment(DeploymentTraits {
                    component,
                    replicas_of,
                    role,
                })
            }
            ManagedObject::PersistentVolumeClaim(pvc) => {
                let label = component_label(&pvc.metadata);
                rules
                    .database_claims
                    .iter()
                    .find(|(value, _)| Some(*value) == label)
                    .map_or(Rule::Identity, |(_, kind)| {
                        Rule::GuardVolumeClaim(kind.clone())
                    })
            }
            ManagedObject::Job(_) => Rule::TrimJob,
            ManagedObject::Route(route) => match component_label(&route.metadata) {
                Some(label) if label == rules.app_route => Rule::PatchRoute(RouteRole::App),
                Some(label) if label == rules.builder_route => {
                    Rule::PatchRoute(RouteRole::Builder)
                }
                _ => Rule::Identity,
            },
            ManagedObject::Other(_) => Rule::Identity,
        }
    }

    /// Applies the operator policy the templates cannot express to one generated object.
    ///
    /// Objects no rule applies to come back untouched. With `skip_resources` set, resource
    /// requests and limits are cleared from deployments and jobs.
    #[tracing::instrument(skip_all, fields(object = %object.id()))]
    pub fn process(
        &self,
        intent: &DeploymentIntent,
        object: ManagedObject,
        skip_resources: bool,
    ) -> Result<ManagedObject, Error> {
        let rule = self.classify(&object);
        tracing::debug!(?rule, "classified object");

        match (rule, object) {
            (Rule::FlattenConfigBundle, ManagedObject::Secret(secret)) => {
                flatten_config_bundle(secret).map(ManagedObject::Secret)
            }
            (Rule::PatchDeployment(traits), ManagedObject::Deployment(mut dep)) => {
                DeploymentPatcher::new(self.rules, intent, &traits, skip_resources)
                    .patch(&mut dep)?;
                Ok(ManagedObject::Deployment(dep))
            }
            (Rule::GuardVolumeClaim(kind), ManagedObject::PersistentVolumeClaim(mut pvc)) => {
                VolumeClaimGuard::new(intent.volume_size_override(&kind)).guard(&mut pvc)?;
                Ok(ManagedObject::PersistentVolumeClaim(pvc))
            }
            (Rule::TrimJob, ManagedObject::Job(mut job)) => {
                JobPatcher::new(skip_resources).patch(&mut job);
                Ok(ManagedObject::Job(job))
            }
            (Rule::PatchRoute(role), ManagedObject::Route(mut route)) => {
                RoutePatcher::new(role, intent.is_managed(&ComponentKind::Tls)).patch(&mut route);
                Ok(ManagedObject::Route(route))
            }
            (_, object) => {
                tracing::trace!("no rule applies");
                Ok(object)
            }
        }
    }
}

/// Processes `object` with the builtin rules.
pub fn process(
    intent: &DeploymentIntent,
    object: ManagedObject,
    skip_resources: bool,
) -> Result<ManagedObject, Error> {
    Middleware::default().process(intent, object, skip_resources)
}

fn component_label(metadata: &ObjectMeta) -> Option<&str> {
    metadata.labels.get(COMPONENT_LABEL).map(|label| label.as_str())
}

fn trim_resources(template: &mut PodTemplateSpec) {
    for container in template.containers_mut() {
        container.resources = ResourceRequirements::default();
    }
}

#[cfg(test)]
mod tests;
