pub mod base64_data {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use indexmap::IndexMap;
    use serde::{Deserialize, Deserializer, Serializer, de, ser::SerializeMap};

    use crate::manifest::Str;

    pub fn serialize<S>(data: &IndexMap<Str, Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(data.len()))?;
        for (key, bytes) in data {
            map.serialize_entry(key, &STANDARD.encode(bytes))?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<IndexMap<Str, Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        // `data: null` is how some renderers spell an empty secret.
        let encoded = Option::<IndexMap<Str, Str>>::deserialize(deserializer)?.unwrap_or_default();
        encoded
            .into_iter()
            .map(|(key, value)| {
                let bytes = STANDARD
                    .decode(value.as_bytes())
                    .map_err(|err| de::Error::custom(format!("decoding data key `{key}`: {err}")))?;
                Ok((key, bytes))
            })
            .collect()
    }
}

pub mod string {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}
