use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;

/// API key for the monitoring endpoint, wrapped so it never appears in
/// `Debug` output or serialized logs by accident.
///
/// Implements [`Serialize`] and [`Deserialize`] so it can live inside
/// configuration structs loaded from files.
#[derive(Clone)]
pub struct ApiKey(Secret<String>);

impl ApiKey {
    /// Returns the raw key for use in request headers.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Deref for ApiKey {
    type Target = Secret<String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<String> for ApiKey {
    fn from(value: String) -> Self {
        Self(Secret::new(value))
    }
}

impl From<&str> for ApiKey {
    fn from(value: &str) -> Self {
        Self(Secret::new(value.to_owned()))
    }
}

impl From<Secret<String>> for ApiKey {
    fn from(value: Secret<String>) -> Self {
        Self(value)
    }
}

impl From<ApiKey> for Secret<String> {
    fn from(value: ApiKey) -> Self {
        value.0
    }
}

impl Serialize for ApiKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.expose_secret())
    }
}

impl<'de> Deserialize<'de> for ApiKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let string = String::deserialize(deserializer)?;
        let secret = Secret::new(string);

        Ok(Self(secret))
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let key = ApiKey::from("super-secret");
        let rendered = format!("{key:?}");
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn expose_returns_the_raw_key() {
        let key = ApiKey::from("super-secret");
        assert_eq!(key.expose(), "super-secret");
    }
}
