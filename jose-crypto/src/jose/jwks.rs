use serde::{Deserialize, Deserializer, Serialize, Serializer, ser::SerializeMap};
use serde_json::{Map, Value};

use crate::jose::{CertificateBundleFetcher, JWK, JoseError, JoseErrorKind, X509Policy};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// [`JWKS`] or JSON Web Key Set as defined in [`rfc7517`]
///
/// An ordered list of validated [`JWK`]s. Keys are looked up by predicate,
/// typically on `kid` and `alg`.
///
/// [`rfc7517`]: https://datatracker.ietf.org/doc/html/rfc7517#section-5
pub struct JWKS {
    keys: Vec<JWK>,
}

impl JWKS {
    /// Create an empty [`JWKS`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a [`JWKS`] from already validated keys.
    #[must_use]
    pub fn from_keys(keys: Vec<JWK>) -> Self {
        Self { keys }
    }

    /// Create a [`JWKS`] from a `{"keys": [...]}` object, validating certificates
    /// with the given policy.
    ///
    /// Every entry is validated as a [`JWK`], the first invalid entry aborts.
    pub fn try_from_parameters_with_policy(
        parameters: &Map<String, Value>,
        policy: &X509Policy,
    ) -> Result<Self, JoseError> {
        let entries = key_entries(parameters)?;
        let keys = entries
            .iter()
            .map(|entry| match entry {
                Value::Object(parameters) => {
                    JWK::try_from_parameters_with_policy(parameters.clone(), policy)
                }
                _ => Err(JoseError::new(JoseErrorKind::InvalidJsonWebKey)),
            })
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|error| tracing::debug!("json web key set rejected: {error}"))?;

        tracing::debug!(keys = keys.len(), "json web key set accepted");
        Ok(Self { keys })
    }

    /// Create a [`JWKS`] whose keys may reference their certificate chain through `x5u`.
    ///
    /// Entries are loaded one after the other, see [`JWK::load`]. Like it,
    /// this must run within a Tokio runtime with the time driver enabled.
    pub async fn load<F>(
        parameters: &Map<String, Value>,
        policy: &X509Policy,
        fetcher: &F,
    ) -> Result<Self, JoseError>
    where
        F: CertificateBundleFetcher,
    {
        let entries = key_entries(parameters)?;
        let mut keys = Vec::with_capacity(entries.len());
        for entry in entries {
            let Value::Object(parameters) = entry else {
                return Err(JoseError::new(JoseErrorKind::InvalidJsonWebKey));
            };
            let key = JWK::load(parameters.clone(), policy, fetcher)
                .await
                .inspect_err(|error| tracing::debug!("json web key set rejected: {error}"))?;
            keys.push(key);
        }

        tracing::debug!(keys = keys.len(), "json web key set accepted");
        Ok(Self { keys })
    }

    /// Cheap check whether `data` looks like a [`JWKS`]: an object with a `keys`
    /// array whose entries all pass [`JWK::is_jwk`].
    #[must_use]
    pub fn is_jwks(data: &Value) -> bool {
        data.get("keys")
            .and_then(Value::as_array)
            .is_some_and(|keys| keys.iter().all(JWK::is_jwk))
    }

    /// First key satisfying `predicate`, if any.
    pub fn find<P>(&self, mut predicate: P) -> Option<&JWK>
    where
        P: FnMut(&JWK) -> bool,
    {
        self.keys.iter().find(|key| predicate(key))
    }

    /// First key satisfying `predicate`.
    ///
    /// Fails with [`JoseErrorKind::JsonWebKeyNotFound`] when no key matches.
    pub fn get<P>(&self, predicate: P) -> Result<&JWK, JoseError>
    where
        P: FnMut(&JWK) -> bool,
    {
        self.find(predicate)
            .ok_or_else(|| JoseError::new(JoseErrorKind::JsonWebKeyNotFound))
    }

    /// The keys, in set order.
    #[must_use]
    pub fn keys(&self) -> &[JWK] {
        &self.keys
    }

    /// Iterate over the keys in set order.
    pub fn iter(&self) -> std::slice::Iter<'_, JWK> {
        self.keys.iter()
    }

    /// Number of keys in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the set holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The set as a `{"keys": [...]}` object, see [`JWK::to_json`].
    #[must_use]
    pub fn to_json(&self, include_private: bool) -> Map<String, Value> {
        let keys = self
            .keys
            .iter()
            .map(|key| Value::Object(key.to_json(include_private)))
            .collect();

        let mut map = Map::new();
        map.insert("keys".to_owned(), Value::Array(keys));
        map
    }
}

fn key_entries(parameters: &Map<String, Value>) -> Result<&Vec<Value>, JoseError> {
    parameters
        .get("keys")
        .and_then(Value::as_array)
        .ok_or_else(|| JoseError::invalid_jwks("Invalid json web key set parameter \"keys\"."))
}

impl From<Vec<JWK>> for JWKS {
    fn from(keys: Vec<JWK>) -> Self {
        Self::from_keys(keys)
    }
}

impl TryFrom<&Map<String, Value>> for JWKS {
    type Error = JoseError;

    fn try_from(parameters: &Map<String, Value>) -> Result<Self, Self::Error> {
        Self::try_from_parameters_with_policy(parameters, &X509Policy::default())
    }
}

impl TryFrom<Value> for JWKS {
    type Error = JoseError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(parameters) => Self::try_from(&parameters),
            _ => Err(JoseError::new(JoseErrorKind::InvalidJsonWebKeySet)),
        }
    }
}

impl IntoIterator for JWKS {
    type Item = JWK;
    type IntoIter = std::vec::IntoIter<JWK>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter()
    }
}

impl<'a> IntoIterator for &'a JWKS {
    type Item = &'a JWK;
    type IntoIter = std::slice::Iter<'a, JWK>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

impl Serialize for JWKS {
    /// Serializes the public members of every key.
    ///
    /// Fails when the set holds an `oct` key, see [`JWK`]'s `Serialize`.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("keys", &self.keys)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for JWKS {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let parameters = Map::<String, Value>::deserialize(deserializer)?;
        Self::try_from(&parameters).map_err(serde::de::Error::custom)
    }
}
