use core::fmt;

use crate::{intent::ComponentKind, manifest::Str, quantity::Quantity};

/// Why a single object could not be processed. None of these are transient, retrying the same
/// call with the same inputs fails the same way.
#[derive(Debug)]
pub enum Error {
    /// A config payload in a config bundle secret is not a yaml mapping.
    Parse {
        key: Str,
        source: serde_yaml::Error,
    },
    /// The flattened config payload could not be written back.
    Encode { source: serde_yaml::Error },
    /// A volume size override is smaller than the claim's current request.
    Capacity {
        current: Quantity,
        requested: Quantity,
    },
    /// A managed component has no known configuration field group.
    Derivation { kind: ComponentKind },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse { key, .. } => write!(f, "parsing config payload `{key}`"),
            Error::Encode { .. } => write!(f, "encoding flattened config payload"),
            Error::Capacity { current, requested } => write!(
                f,
                "cannot shrink volume override size from {current} to {requested}"
            ),
            Error::Derivation { kind } => {
                write!(f, "unknown field group for managed component `{kind}`")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse { source, .. } | Error::Encode { source } => Some(source),
            Error::Capacity { .. } | Error::Derivation { .. } => None,
        }
    }
}
