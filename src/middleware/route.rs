use crate::object::{
    InsecureEdgeTerminationPolicy, IntOrString, Route, RoutePort, TlsConfig, TlsTermination,
};

use super::RouteRole;

/// Named port of the registry service that serves TLS itself.
const HTTPS_PORT: &str = "https";

/// Hands TLS termination to the pods when the user brings their own certificate.
pub struct RoutePatcher {
    role: RouteRole,
    tls_managed: bool,
}

impl RoutePatcher {
    pub fn new(role: RouteRole, tls_managed: bool) -> Self {
        Self { role, tls_managed }
    }

    #[tracing::instrument(skip_all, fields(route = %route.metadata.name, role = ?self.role))]
    pub fn patch(&self, route: &mut Route) {
        // Managed TLS is already wired up by the rendered route.
        if self.tls_managed {
            return;
        }

        route.spec.tls = Some(TlsConfig {
            termination: TlsTermination::Passthrough,
            insecure_edge_termination_policy: Some(InsecureEdgeTerminationPolicy::Redirect),
            rest: Default::default(),
        });

        // The builder route speaks gRPC and keeps its port.
        if self.role == RouteRole::App {
            route.spec.port = Some(RoutePort {
                target_port: IntOrString::String(HTTPS_PORT.into()),
            });
        }

        tracing::debug!("switched route to passthrough");
    }
}
