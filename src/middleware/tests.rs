use crate::{
    intent::{ComponentKind, DeploymentIntent},
    manifest::Str,
    object::{
        Deployment, EnvVar, InsecureEdgeTerminationPolicy, IntOrString, ManagedObject, Route,
        TlsTermination,
    },
    quantity::Quantity,
};

use super::*;

fn intent(yaml: &str) -> DeploymentIntent {
    serde_yaml::from_str(yaml).unwrap()
}

fn object(yaml: &str) -> ManagedObject {
    serde_yaml::from_str(yaml).unwrap()
}

fn deployment(object: ManagedObject) -> Deployment {
    match object {
        ManagedObject::Deployment(dep) => dep,
        object => panic!("expected a deployment, got {object:?}"),
    }
}

fn route(object: ManagedObject) -> Route {
    match object {
        ManagedObject::Route(route) => route,
        object => panic!("expected a route, got {object:?}"),
    }
}

const QUAY_APP: &str = r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: registry-quay-app
  annotations:
    quay-component: quay
spec:
  template:
    metadata:
      annotations:
        quay-registry-hostname: registry.example.com
    spec:
      initContainers:
        - name: init
          env:
            - name: DEBUGLOG
              value: "false"
      containers:
        - name: quay-app
          env:
            - name: DEBUGLOG
              value: "false"
            - name: WORKERS
              value: "4"
          resources:
            requests:
              cpu: 2000m
              memory: 8Gi
"#;

fn deployment_named(name: &str, annotations: &str, replicas: Option<i32>) -> ManagedObject {
    let replicas = replicas.map_or(String::new(), |n| format!("  replicas: {n}\n"));
    let annotations = if annotations.is_empty() {
        "      annotations: {}".to_string()
    } else {
        format!("      annotations:\n{annotations}")
    };
    object(&format!(
        r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: {name}
spec:
{replicas}  template:
    metadata:
{annotations}
    spec:
      containers:
        - name: main
          resources:
            limits:
              memory: 1Gi
"#
    ))
}

#[test]
fn classifies_by_kind_and_metadata() {
    let middleware = Middleware::default();
    let cases = [
        (
            object("apiVersion: v1\nkind: Secret\nmetadata:\n  name: registry-quay-config-secret-x\n"),
            Rule::FlattenConfigBundle,
        ),
        (
            object("apiVersion: v1\nkind: Secret\nmetadata:\n  name: registry-redis-password\n"),
            Rule::Identity,
        ),
        (
            object(
                "apiVersion: v1\nkind: PersistentVolumeClaim\nmetadata:\n  name: db\n  labels:\n    quay-component: clair-postgres\n",
            ),
            Rule::GuardVolumeClaim(ComponentKind::Clair),
        ),
        (
            object(
                "apiVersion: v1\nkind: PersistentVolumeClaim\nmetadata:\n  name: db\n  labels:\n    quay-component: postgres\n",
            ),
            Rule::GuardVolumeClaim(ComponentKind::Postgres),
        ),
        (
            object("apiVersion: v1\nkind: PersistentVolumeClaim\nmetadata:\n  name: other\n"),
            Rule::Identity,
        ),
        (
            object("apiVersion: batch/v1\nkind: Job\nmetadata:\n  name: upgrade\n"),
            Rule::TrimJob,
        ),
        (
            object(
                "apiVersion: route.openshift.io/v1\nkind: Route\nmetadata:\n  name: r\n  labels:\n    quay-component: quay-builder-route\n",
            ),
            Rule::PatchRoute(RouteRole::Builder),
        ),
        (
            object("apiVersion: route.openshift.io/v1\nkind: Route\nmetadata:\n  name: r\n"),
            Rule::Identity,
        ),
        (
            object("apiVersion: v1\nkind: Service\nmetadata:\n  name: quay-app\n"),
            Rule::Identity,
        ),
    ];

    for (object, expected) in cases {
        assert_eq!(middleware.classify(&object), expected, "{}", object.id());
    }
}

#[test]
fn classifies_deployments() {
    let middleware = Middleware::default();

    let rule = middleware.classify(&object(QUAY_APP));
    assert_eq!(
        rule,
        Rule::PatchDeployment(DeploymentTraits {
            component: ComponentKind::Quay,
            replicas_of: Some(ComponentKind::Quay),
            role: DeploymentRole::Other,
        })
    );

    let rule = middleware.classify(&deployment_named("registry-clair-app", "", None));
    assert_eq!(
        rule,
        Rule::PatchDeployment(DeploymentTraits {
            component: ComponentKind::Other("".into()),
            replicas_of: Some(ComponentKind::Clair),
            role: DeploymentRole::Other,
        })
    );

    let rule = middleware.classify(&deployment_named("registry-quay-database", "", None));
    assert!(matches!(
        rule,
        Rule::PatchDeployment(DeploymentTraits {
            replicas_of: None,
            role: DeploymentRole::Database,
            ..
        })
    ));
}

#[test]
fn unrelated_objects_pass_through_untouched() {
    let intent = intent("components: [{kind: quay, managed: true}]");
    let objects = [
        object(
            r#"
apiVersion: v1
kind: ConfigMap
metadata:
  name: cluster-service-ca
  annotations:
    service.beta.openshift.io/inject-cabundle: "true"
data:
  ca.crt: ""
"#,
        ),
        object(
            "apiVersion: v1\nkind: Secret\nmetadata:\n  name: registry-quay-postgres-secret\ndata:\n  password: aHVudGVyMg==\n",
        ),
    ];

    for object in objects {
        let processed = process(&intent, object.clone(), true).unwrap();
        assert_eq!(processed, object);
    }
}

#[test]
fn env_overrides_managed_component() {
    let intent = intent(
        r#"
components:
  - kind: quay
    managed: true
    overrides:
      env:
        - { name: DEBUGLOG, value: "true" }
        - { name: NEW_VAR, value: x }
"#,
    );

    let dep = deployment(process(&intent, object(QUAY_APP), false).unwrap());
    let env = &dep.spec.template.spec.containers[0].env;
    assert_eq!(
        env.as_slice(),
        [
            EnvVar::new("DEBUGLOG", "true"),
            EnvVar::new("WORKERS", "4"),
            EnvVar::new("NEW_VAR", "x"),
        ]
    );

    // Init containers live in the untyped part of the pod spec and keep their env.
    let init = &dep.spec.template.spec.rest["initContainers"][0]["env"][0]["value"];
    assert_eq!(init, "false");
}

#[test]
fn env_overrides_are_idempotent() {
    let intent = intent(
        r#"
components:
  - kind: quay
    managed: true
    overrides:
      env: [{ name: DEBUGLOG, value: "true" }]
"#,
    );

    let once = process(&intent, object(QUAY_APP), false).unwrap();
    let twice = process(&intent, once.clone(), false).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn env_overrides_of_unmanaged_component_are_ignored() {
    let intent = intent(
        r#"
components:
  - kind: quay
    managed: false
    overrides:
      env: [{ name: DEBUGLOG, value: "true" }]
"#,
    );

    let dep = deployment(process(&intent, object(QUAY_APP), false).unwrap());
    assert_eq!(
        dep.spec.template.spec.containers[0].env[0],
        EnvVar::new("DEBUGLOG", "false")
    );
}

#[test]
fn replicas_default_when_unset() {
    let intent = intent("components: [{kind: quay, managed: true}]");
    let dep = deployment(process(&intent, object(QUAY_APP), false).unwrap());
    assert_eq!(dep.spec.replicas, Some(2));
}

#[test]
fn replicas_follow_component_override() {
    let intent = intent(
        r#"
components:
  - kind: clair
    managed: true
    overrides: { replicas: 5 }
"#,
    );

    let dep = deployment(
        process(&intent, deployment_named("registry-clair-app", "", None), false).unwrap(),
    );
    assert_eq!(dep.spec.replicas, Some(5));
}

#[test]
fn explicit_replicas_are_kept() {
    let intent = intent(
        r#"
components:
  - kind: mirror
    managed: true
    overrides: { replicas: 5 }
"#,
    );

    let dep = deployment(
        process(&intent, deployment_named("registry-quay-mirror", "", Some(0)), false).unwrap(),
    );
    assert_eq!(dep.spec.replicas, Some(0));
}

#[test]
fn managed_autoscaler_owns_replicas() {
    let intent = intent(
        r#"
components:
  - { kind: quay, managed: true, overrides: { replicas: 5 } }
  - { kind: horizontalpodautoscaler, managed: true }
"#,
    );

    let dep = deployment(process(&intent, object(QUAY_APP), false).unwrap());
    assert_eq!(dep.spec.replicas, None);
}

#[test]
fn unrelated_deployment_keeps_replicas_unset() {
    let intent = intent("components: []");
    let dep = deployment(
        process(&intent, deployment_named("registry-quay-redis", "", None), false).unwrap(),
    );
    assert_eq!(dep.spec.replicas, None);
}

#[test]
fn skip_resources_trims_every_container() {
    let intent = intent("components: []");

    let dep = deployment(process(&intent, object(QUAY_APP), true).unwrap());
    assert!(
        dep.spec
            .template
            .spec
            .containers
            .iter()
            .all(|container| container.resources.is_empty())
    );

    let kept = deployment(process(&intent, object(QUAY_APP), false).unwrap());
    assert_eq!(
        kept.spec.template.spec.containers[0].resources.requests["memory"],
        "8Gi".parse::<Quantity>().unwrap()
    );
}

#[test]
fn skip_resources_trims_jobs() {
    let intent = intent("components: []");
    let job = r#"
apiVersion: batch/v1
kind: Job
metadata:
  name: registry-quay-app-upgrade
spec:
  template:
    spec:
      restartPolicy: Never
      containers:
        - name: upgrade
          resources:
            limits: { cpu: "1" }
"#;

    let ManagedObject::Job(trimmed) = process(&intent, object(job), true).unwrap() else {
        panic!("expected a job");
    };
    assert!(trimmed.spec.template.spec.containers[0].resources.is_empty());
    assert_eq!(trimmed.spec.template.spec.rest["restartPolicy"], "Never");

    assert_eq!(process(&intent, object(job), false).unwrap(), object(job));
}

#[test]
fn database_drops_volatile_annotations() {
    let intent = intent("components: [{kind: postgres, managed: true}]");
    let dep = deployment(
        process(
            &intent,
            deployment_named(
                "registry-quay-database",
                "        quay-registry-hostname: a\n        quay-buildmanager-hostname: b\n        quay-operator-service-endpoint: c\n        keep-me: d",
                Some(1),
            ),
            false,
        )
        .unwrap(),
    );

    let annotations = &dep.spec.template.metadata.annotations;
    assert_eq!(
        annotations.keys().map(Str::as_str).collect::<Vec<_>>(),
        ["keep-me"]
    );
}

#[test]
fn config_editor_lists_managed_field_groups() {
    let intent = intent(
        r#"
components:
  - { kind: quay, managed: true }
  - { kind: postgres, managed: true }
  - { kind: clair, managed: false }
  - { kind: redis, managed: true }
  - { kind: objectstorage, managed: true }
  - { kind: route, managed: true }
"#,
    );

    let dep = deployment(
        process(
            &intent,
            deployment_named("registry-quay-config-editor", "        other: x", None),
            false,
        )
        .unwrap(),
    );

    assert_eq!(
        dep.spec.template.metadata.annotations["quay-managed-fieldgroups"],
        "Database,Redis,DistributedStorage,HostSettings"
    );
    assert_eq!(dep.spec.template.metadata.annotations["other"], "x");
}

#[test]
fn config_editor_with_unknown_managed_component_fails() {
    let intent = intent("components: [{kind: mystery, managed: true}]");
    let err = process(
        &intent,
        deployment_named("registry-quay-config-editor", "        other: x", None),
        false,
    )
    .unwrap_err();

    assert!(matches!(err, Error::Derivation { ref kind } if kind.as_str() == "mystery"));
}

#[test]
fn unmanaged_tls_switches_app_route_to_passthrough() {
    let intent = intent("components: [{kind: tls, managed: false}]");
    let app = object(
        r#"
apiVersion: route.openshift.io/v1
kind: Route
metadata:
  name: registry-quay
  labels:
    quay-component: quay-app-route
spec:
  host: registry.example.com
  to:
    kind: Service
    name: registry-quay-app
  port:
    targetPort: http
  tls:
    termination: edge
"#,
    );

    let route = route(process(&intent, app, false).unwrap());
    let tls = route.spec.tls.as_ref().unwrap();
    assert_eq!(tls.termination, TlsTermination::Passthrough);
    assert_eq!(
        tls.insecure_edge_termination_policy,
        Some(InsecureEdgeTerminationPolicy::Redirect)
    );
    assert_eq!(
        route.spec.port.as_ref().unwrap().target_port,
        IntOrString::String("https".into())
    );
    assert_eq!(route.spec.rest["host"], "registry.example.com");
}

#[test]
fn builder_route_keeps_its_port() {
    let intent = intent("components: []");
    let builder = object(
        r#"
apiVersion: route.openshift.io/v1
kind: Route
metadata:
  name: registry-quay-builder
  labels:
    quay-component: quay-builder-route
spec:
  port:
    targetPort: grpc
"#,
    );

    let route = route(process(&intent, builder, false).unwrap());
    assert_eq!(
        route.spec.tls.as_ref().map(|tls| tls.termination),
        Some(TlsTermination::Passthrough)
    );
    assert_eq!(
        route.spec.port.as_ref().unwrap().target_port,
        IntOrString::String("grpc".into())
    );
}

#[test]
fn managed_tls_leaves_routes_alone() {
    let intent = intent("components: [{kind: tls, managed: true}]");
    let app = object(
        r#"
apiVersion: route.openshift.io/v1
kind: Route
metadata:
  name: registry-quay
  labels:
    quay-component: quay-app-route
spec:
  tls:
    termination: edge
"#,
    );

    assert_eq!(process(&intent, app.clone(), false).unwrap(), app);
}

#[test]
fn database_claim_follows_volume_override() {
    let intent = intent(
        r#"
components:
  - kind: clair
    managed: true
    overrides: { volumeSize: 70Gi }
"#,
    );
    let claim = object(
        r#"
apiVersion: v1
kind: PersistentVolumeClaim
metadata:
  name: registry-clair-postgres-13
  labels:
    quay-component: clair-postgres
spec:
  resources:
    requests:
      storage: 50Gi
"#,
    );

    let ManagedObject::PersistentVolumeClaim(pvc) = process(&intent, claim, false).unwrap() else {
        panic!("expected a claim");
    };
    assert_eq!(pvc.storage().map(Quantity::as_str), Some("70Gi"));
}

#[test]
fn database_claim_refuses_to_shrink() {
    let intent = intent(
        r#"
components:
  - kind: postgres
    managed: true
    overrides: { volumeSize: 10Gi }
"#,
    );
    let claim = object(
        r#"
apiVersion: v1
kind: PersistentVolumeClaim
metadata:
  name: registry-quay-postgres-13
  labels:
    quay-component: postgres
spec:
  resources:
    requests:
      storage: 50Gi
"#,
    );

    let err = process(&intent, claim, false).unwrap_err();
    assert_eq!(
        err.to_string(),
        "cannot shrink volume override size from 50Gi to 10Gi"
    );
}
