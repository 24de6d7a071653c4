use crate::{error::Error, manifest::Str, object::Secret};

const CONFIG_KEY: &str = "config.yaml";
const FRAGMENT_MARKER: &str = ".config.yaml";
const EXTRA_CA_CERT_PREFIX: &str = "extra_ca_cert_";

/// User supplied TLS material that must not be mounted with the generated config.
const TLS_KEYS: &[&str] = &["ssl.cert", "ssl.key", "clair-ssl.key", "clair-ssl.crt"];

/// Merges every `<component>.config.yaml` fragment of a config bundle into its `config.yaml`.
///
/// Fragments are merged in lexicographic key order, so on a collision the fragment whose key
/// sorts last wins. TLS material and extra CA certificates are dropped from the bundle, they
/// are mounted separately.
#[tracing::instrument(skip_all, fields(secret = %secret.metadata.name))]
pub fn flatten_config_bundle(mut secret: Secret) -> Result<Secret, Error> {
    let mut config = parse_config(CONFIG_KEY, secret.data.get(CONFIG_KEY).map(Vec::as_slice))?;

    let mut fragments = secret
        .data
        .keys()
        .filter(|key| key.contains(FRAGMENT_MARKER))
        .cloned()
        .collect::<Vec<Str>>();
    fragments.sort();

    for key in fragments {
        let Some(bytes) = secret.data.shift_remove(&key) else {
            continue;
        };
        let fragment = parse_config(&key, Some(&bytes))?;
        tracing::debug!(fragment = %key, fields = fragment.len(), "merging config fragment");
        for (field, value) in fragment {
            config.insert(field, value);
        }
    }

    let encoded = serde_yaml::to_string(&config).map_err(|source| Error::Encode { source })?;
    secret.data.insert(CONFIG_KEY.into(), encoded.into_bytes());

    secret.data.retain(|key, _| {
        let strip = TLS_KEYS.contains(&key.as_str()) || key.starts_with(EXTRA_CA_CERT_PREFIX);
        if strip {
            tracing::debug!(%key, "removing key from config bundle");
        }
        !strip
    });

    Ok(secret)
}

fn parse_config(key: &str, bytes: Option<&[u8]>) -> Result<serde_yaml::Mapping, Error> {
    let bytes = bytes.unwrap_or_default();
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_yaml::Mapping::new());
    }

    let parse_error = |source| Error::Parse {
        key: key.into(),
        source,
    };
    match serde_yaml::from_slice(bytes).map_err(parse_error)? {
        serde_yaml::Value::Null => Ok(serde_yaml::Mapping::new()),
        value => serde_yaml::from_value(value).map_err(parse_error),
    }
}
