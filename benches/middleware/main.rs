use quay_middleware::DeploymentIntent;

fn main() {
    divan::main();
}

fn case(name: &str) -> (DeploymentIntent, String) {
    let dir = format!("tests/middleware/testdata/{name}");
    let intent = quay_middleware::load_intent(format!("{dir}/intent.yaml")).unwrap();
    let input = std::fs::read_to_string(format!("{dir}/input.yaml")).unwrap();
    (intent, input)
}

fn run(bencher: divan::Bencher, name: &str, skip_resources: bool) {
    let (intent, input) = case(name);
    bencher.bench_local(|| {
        let mut out = Vec::new();
        quay_middleware::process_manifests(&intent, &input, skip_resources, &mut out).unwrap();
        out
    });
}

#[divan::bench]
fn process_deployments(bencher: divan::Bencher) {
    run(bencher, "quay-app", false);
}

#[divan::bench]
fn process_config_bundle(bencher: divan::Bencher) {
    run(bencher, "config-bundle", false);
}

#[divan::bench]
fn process_routes(bencher: divan::Bencher) {
    run(bencher, "route-passthrough", false);
}

#[divan::bench]
fn process_trimmed_workloads(bencher: divan::Bencher) {
    run(bencher, "skip-resources", true);
}
