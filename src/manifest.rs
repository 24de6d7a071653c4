use core::fmt;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

pub type Str = CompactString;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta<V, K> {
    pub api_version: V,
    pub kind: K,
}

impl<V, K> Default for TypeMeta<V, K>
where
    V: Default,
    K: Default,
{
    fn default() -> Self {
        Self {
            api_version: V::default(),
            kind: K::default(),
        }
    }
}

impl<V: Symbol, K: Symbol> TypeMeta<V, K> {
    /// Returns true if the given `apiVersion` and `kind` pair is the one this type describes.
    pub fn matches(api_version: &str, kind: &str) -> bool {
        api_version == V::VALUE && kind == K::VALUE
    }
}

pub mod kind {
    use super::define_symbol;

    define_symbol!(Secret = "Secret");
    define_symbol!(PersistentVolumeClaim = "PersistentVolumeClaim");
    define_symbol!(Deployment = "Deployment");
    define_symbol!(Job = "Job");
    define_symbol!(Route = "Route");
}

pub mod apiversion {
    use super::define_symbol;

    define_symbol!(CoreV1 = "v1");
    define_symbol!(AppsV1 = "apps/v1");
    define_symbol!(BatchV1 = "batch/v1");
    define_symbol!(RouteV1 = "route.openshift.io/v1");
}

macro_rules! define_symbol {
    ($name:ident = $value:literal) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        #[allow(non_camel_case_types)]
        pub struct $name;

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", $value)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", $value)
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str($value)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let value: $crate::manifest::Str = ::serde::Deserialize::deserialize(deserializer)?;
                if value == $value {
                    Ok($name)
                } else {
                    Err(serde::de::Error::custom(format!(
                        "expected `{}`, found `{value}`",
                        $value
                    )))
                }
            }
        }

        impl $crate::manifest::Symbol for $name {
            const VALUE: &'static str = $value;
        }
    };
}

use define_symbol;

pub trait Symbol: fmt::Debug + Send + Sync {
    const VALUE: &'static str;
}
