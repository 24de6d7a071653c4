use std::{io::Write, path::Path};

use anyhow::Context as _;
use serde::Deserialize as _;

pub mod error;
pub mod intent;
pub mod manifest;
pub mod middleware;
pub mod object;
pub mod quantity;
pub mod resmap;
pub mod resource;
mod serde_ex;

pub use self::error::Error;
pub use self::intent::{Component, ComponentKind, DeploymentIntent, Overrides};
pub use self::manifest::Str;
pub use self::middleware::{Middleware, Rule, Rules, process};
pub use self::object::ManagedObject;
pub use self::resmap::ResourceMap;

pub fn load_intent(path: impl AsRef<Path>) -> anyhow::Result<DeploymentIntent> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening intent `{}`", path.display()))?;
    serde_yaml::from_reader(file).with_context(|| format!("parsing intent `{}`", path.display()))
}

/// Processes every document of a multi-document manifest stream and writes the results to
/// `out` in input order. Empty documents are dropped.
pub fn process_manifests(
    intent: &DeploymentIntent,
    input: &str,
    skip_resources: bool,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let middleware = Middleware::default();
    let mut objects = ResourceMap::default();

    for (i, document) in serde_yaml::Deserializer::from_str(input).enumerate() {
        let value = serde_yaml::Value::deserialize(document)
            .with_context(|| format!("parsing document {i}"))?;
        if value.is_null() {
            continue;
        }

        let object = serde_yaml::from_value::<ManagedObject>(value)
            .with_context(|| format!("decoding document {i}"))?;
        let id = object.id();
        let object = middleware
            .process(intent, object, skip_resources)
            .with_context(|| format!("processing `{id}`"))?;
        objects.insert(object)?;
    }

    tracing::debug!(objects = objects.len(), "processed manifest stream");
    objects.write_yaml(out)
}
