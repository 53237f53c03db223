use std::{collections::HashSet, fmt, str::FromStr};

use aws_lc_rs::digest::{self, Digest, SHA1_FOR_LEGACY_USE_ONLY, SHA256, SHA384, SHA512};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::jose::{
    CertificateBundleFetcher, JWA, JWEAlgorithm, JWEContentEncryption, JWKType, JoseError,
    JoseErrorKind, X509Policy,
    error::ErrorContext as _,
    jwk_utils::encode_base64url,
    x509::{CertificateChain, CertificateSource},
};

#[derive(Clone, PartialEq, Eq)]
/// [`JWK`] or JSON Web Key as defined in [`rfc7517`]
///
/// A [`JWK`] can only be created through one of its validating constructors,
/// which check the generic members, any bound X.509 certificate chain and
/// the members specific to its [`JWKType`]. Members with a `null` value are
/// dropped. Once created a [`JWK`] is immutable.
///
/// [`rfc7517`]: https://datatracker.ietf.org/doc/html/rfc7517
pub struct JWK {
    key_type: JWKType,
    parameters: Map<String, Value>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
/// [`JWKUse`] identifies the intended use of the public key
pub enum JWKUse {
    #[serde(rename = "sig")]
    /// Signature
    Signature,
    #[serde(rename = "enc")]
    /// Encryption
    Encryption,
}

impl JWKUse {
    /// Registered name of this use.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Signature => "sig",
            Self::Encryption => "enc",
        }
    }

    /// Whether the given operation is compatible with this use.
    #[must_use]
    pub const fn allows(self, op: JWKKeyOp) -> bool {
        match self {
            Self::Signature => matches!(op, JWKKeyOp::Sign | JWKKeyOp::Verify),
            Self::Encryption => matches!(
                op,
                JWKKeyOp::Encrypt | JWKKeyOp::Decrypt | JWKKeyOp::WrapKey | JWKKeyOp::UnwrapKey
            ),
        }
    }
}

impl FromStr for JWKUse {
    type Err = JoseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sig" => Ok(Self::Signature),
            "enc" => Ok(Self::Encryption),
            _ => Err(JoseError::invalid_jwk_parameter("use")),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
/// [`JWKKeyOp`] identifies an operation for which the key is intended to be used
pub enum JWKKeyOp {
    /// Decrypt content and validate decryption, if applicable
    Decrypt,
    /// Derive bits not to be used as a key
    DeriveBits,
    /// Derive key
    DeriveKey,
    /// Encrypt content
    Encrypt,
    /// Compute digital signature or MAC
    Sign,
    /// Decrypt key and validate decryption, if applicable
    UnwrapKey,
    /// Verify digital signature or MAC
    Verify,
    /// Encrypt key
    WrapKey,
}

impl JWKKeyOp {
    /// All key operations registered by [`rfc7517`].
    ///
    /// [`rfc7517`]: https://datatracker.ietf.org/doc/html/rfc7517#section-4.3
    pub const ALL: [Self; 8] = [
        Self::Decrypt,
        Self::DeriveBits,
        Self::DeriveKey,
        Self::Encrypt,
        Self::Sign,
        Self::UnwrapKey,
        Self::Verify,
        Self::WrapKey,
    ];

    /// Registered name of this operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Decrypt => "decrypt",
            Self::DeriveBits => "deriveBits",
            Self::DeriveKey => "deriveKey",
            Self::Encrypt => "encrypt",
            Self::Sign => "sign",
            Self::UnwrapKey => "unwrapKey",
            Self::Verify => "verify",
            Self::WrapKey => "wrapKey",
        }
    }
}

impl fmt::Display for JWKKeyOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JWKKeyOp {
    type Err = JoseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| JoseError::invalid_jwk_parameter("key_ops"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Hash function used to compute a [`JWK`] thumbprint
pub enum ThumbprintHash {
    /// SHA-1, only for interoperability with legacy key identifiers
    Sha1,
    /// SHA-256, the hash function used by [`rfc7638`]
    ///
    /// [`rfc7638`]: https://datatracker.ietf.org/doc/html/rfc7638
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl ThumbprintHash {
    fn algorithm(self) -> &'static digest::Algorithm {
        match self {
            Self::Sha1 => &SHA1_FOR_LEGACY_USE_ONLY,
            Self::Sha256 => &SHA256,
            Self::Sha384 => &SHA384,
            Self::Sha512 => &SHA512,
        }
    }
}

impl JWK {
    /// Create a [`JWK`] from its members, validating certificates against the current time.
    ///
    /// A key referencing its certificate chain through `x5u` cannot be
    /// created synchronously, use [`JWK::load`] instead.
    pub fn try_from_parameters(parameters: Map<String, Value>) -> Result<Self, JoseError> {
        Self::try_from_parameters_with_policy(parameters, &X509Policy::default())
    }

    /// Create a [`JWK`] from its members, validating certificates with the given policy.
    pub fn try_from_parameters_with_policy(
        parameters: Map<String, Value>,
        policy: &X509Policy,
    ) -> Result<Self, JoseError> {
        let parameters = strip_nullish(parameters);
        let key_type = validate_generic_parameters(&parameters)
            .inspect_err(|error| reject(&parameters, error))?;

        match CertificateSource::from_parameters(&parameters)
            .inspect_err(|error| reject(&parameters, error))?
        {
            None => (),
            Some(CertificateSource::Chain) => {
                CertificateChain::from_x5c(&parameters)
                    .and_then(|chain| chain.validate(&parameters, policy))
                    .inspect_err(|error| reject(&parameters, error))?;
            }
            Some(CertificateSource::Url(_)) => {
                let error = JoseError::invalid_jwk(
                    "The parameter \"x5u\" requires a certificate bundle fetcher.",
                );
                reject(&parameters, &error);
                return Err(error);
            }
        }

        Self::finish(key_type, parameters)
    }

    /// Create a [`JWK`] from its members, resolving an `x5u` certificate chain with `fetcher`.
    ///
    /// The fetch is bounded by [`X509Policy::fetch_timeout`]; the chain is
    /// only validated once it has been fetched and parsed completely.
    ///
    /// Must be polled within a Tokio runtime with the time driver enabled,
    /// the timeout panics otherwise.
    pub async fn load<F>(
        parameters: Map<String, Value>,
        policy: &X509Policy,
        fetcher: &F,
    ) -> Result<Self, JoseError>
    where
        F: CertificateBundleFetcher,
    {
        let parameters = strip_nullish(parameters);
        let key_type = validate_generic_parameters(&parameters)
            .inspect_err(|error| reject(&parameters, error))?;

        let chain = match CertificateSource::from_parameters(&parameters)
            .inspect_err(|error| reject(&parameters, error))?
        {
            None => None,
            Some(CertificateSource::Chain) => Some(CertificateChain::from_x5c(&parameters)),
            Some(CertificateSource::Url(url)) => {
                Some(CertificateChain::fetch(url, policy, fetcher).await)
            }
        };
        if let Some(chain) = chain {
            chain
                .and_then(|chain| chain.validate(&parameters, policy))
                .inspect_err(|error| reject(&parameters, error))?;
        }

        Self::finish(key_type, parameters)
    }

    fn finish(key_type: JWKType, parameters: Map<String, Value>) -> Result<Self, JoseError> {
        key_type
            .validate(&parameters)
            .inspect_err(|error| reject(&parameters, error))?;

        tracing::debug!(
            kty = %key_type,
            kid = parameters.get("kid").and_then(serde_json::Value::as_str),
            "json web key accepted"
        );
        Ok(Self {
            key_type,
            parameters,
        })
    }

    /// Cheap check whether `data` looks like a [`JWK`]: an object whose `kty` is a known key type.
    ///
    /// This does not validate the key, use one of the constructors for that.
    #[must_use]
    pub fn is_jwk(data: &Value) -> bool {
        data.get("kty")
            .and_then(Value::as_str)
            .is_some_and(|kty| kty.parse::<JWKType>().is_ok())
    }

    /// Key type of this key.
    #[must_use]
    pub fn key_type(&self) -> JWKType {
        self.key_type
    }

    /// All members of this key, including private ones.
    #[must_use]
    pub fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }

    /// Member `name` of this key.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    /// Algorithm this key is intended to be used with.
    #[must_use]
    pub fn alg(&self) -> Option<&str> {
        self.get("alg").and_then(Value::as_str)
    }

    /// Identifier of this key.
    #[must_use]
    pub fn kid(&self) -> Option<&str> {
        self.get("kid").and_then(Value::as_str)
    }

    /// Intended use of this key.
    #[must_use]
    pub fn key_use(&self) -> Option<JWKUse> {
        self.get("use")
            .and_then(Value::as_str)
            .and_then(|value| value.parse().ok())
    }

    /// Operations this key is intended to be used for.
    #[must_use]
    pub fn key_ops(&self) -> Option<Vec<JWKKeyOp>> {
        let ops = self.get("key_ops")?.as_array()?;
        ops.iter()
            .map(|op| op.as_str().and_then(|op| op.parse().ok()))
            .collect()
    }

    /// Whether this key contains private or secret members.
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.key_type
            .private_parameters()
            .iter()
            .any(|name| self.parameters.contains_key(*name))
    }

    /// Thumbprint of this key as defined in [`rfc7638`], a stable identifier for a [`JWK`]
    ///
    /// The hash is computed over the required public members of the key,
    /// serialized without whitespace in lexicographic order.
    ///
    /// [`rfc7638`]: https://datatracker.ietf.org/doc/html/rfc7638
    pub fn thumbprint(&self, hash: ThumbprintHash) -> Result<Digest, JoseError> {
        let projection = self.key_type.thumbprint_parameters(&self.parameters)?;
        let input = serde_json::to_vec(&projection).jose_context(
            JoseErrorKind::InvalidJsonWebKey,
            "failed to serialise json web key thumbprint members",
        )?;
        Ok(digest::digest(hash.algorithm(), &input))
    }

    /// Base64url encoded SHA-256 thumbprint, a common choice for `kid`.
    pub fn thumbprint_sha256_base64url(&self) -> Result<String, JoseError> {
        self.thumbprint(ThumbprintHash::Sha256)
            .map(encode_base64url)
    }

    /// Members of this key as a JSON object.
    ///
    /// Unless `include_private` is set the private members of the
    /// key type are left out. An `oct` key has no public form: without
    /// `include_private` its object lacks `k` and is not a valid [`JWK`].
    #[must_use]
    pub fn to_json(&self, include_private: bool) -> Map<String, Value> {
        let private_parameters = self.key_type.private_parameters();
        self.parameters
            .iter()
            .filter(|(name, _)| include_private || !private_parameters.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

impl fmt::Debug for JWK {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JWK")
            .field("key_type", &self.key_type)
            .field("parameters", &self.to_json(false))
            .finish_non_exhaustive()
    }
}

impl TryFrom<Map<String, Value>> for JWK {
    type Error = JoseError;

    fn try_from(parameters: Map<String, Value>) -> Result<Self, Self::Error> {
        Self::try_from_parameters(parameters)
    }
}

impl TryFrom<Value> for JWK {
    type Error = JoseError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(parameters) => Self::try_from_parameters(parameters),
            _ => Err(JoseError::new(JoseErrorKind::InvalidJsonWebKey)),
        }
    }
}

impl Serialize for JWK {
    /// Serializes the public members only, see [`JWK::to_json`].
    ///
    /// Fails for `oct` keys, use `to_json(true)` to export a secret key.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.key_type == JWKType::OCT {
            return Err(serde::ser::Error::custom(
                "symmetric json web key has no public members to serialize",
            ));
        }
        self.to_json(false).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for JWK {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let parameters = Map::<String, Value>::deserialize(deserializer)?;
        Self::try_from_parameters(parameters).map_err(serde::de::Error::custom)
    }
}

fn strip_nullish(mut parameters: Map<String, Value>) -> Map<String, Value> {
    parameters.retain(|_, value| !value.is_null());
    parameters
}

fn reject(parameters: &Map<String, Value>, error: &JoseError) {
    tracing::debug!(
        kty = parameters.get("kty").and_then(serde_json::Value::as_str),
        kid = parameters.get("kid").and_then(serde_json::Value::as_str),
        "json web key rejected: {error}"
    );
}

/// Names accepted by the `alg` member: JWS algorithms, JWE key
/// management algorithms and JWE content encryption algorithms.
fn is_registered_algorithm(name: &str) -> bool {
    name.parse::<JWA>().is_ok()
        || name.parse::<JWEAlgorithm>().is_ok()
        || name.parse::<JWEContentEncryption>().is_ok()
}

fn validate_generic_parameters(parameters: &Map<String, Value>) -> Result<JWKType, JoseError> {
    let key_type = parameters
        .get("kty")
        .and_then(Value::as_str)
        .ok_or_else(|| JoseError::invalid_jwk_parameter("kty"))?
        .parse::<JWKType>()?;

    let key_use = parameters
        .get("use")
        .map(|value| {
            value
                .as_str()
                .ok_or_else(|| JoseError::invalid_jwk_parameter("use"))?
                .parse::<JWKUse>()
        })
        .transpose()?;

    let key_ops = parameters
        .get("key_ops")
        .map(parse_key_ops)
        .transpose()?;

    if let Some(alg) = parameters.get("alg")
        && !alg.as_str().is_some_and(is_registered_algorithm)
    {
        return Err(JoseError::invalid_jwk_parameter("alg"));
    }

    for name in ["kid", "x5u"] {
        if parameters.get(name).is_some_and(|value| !value.is_string()) {
            return Err(JoseError::invalid_jwk_parameter(name));
        }
    }

    if let Some(x5c) = parameters.get("x5c")
        && !is_non_empty_string_list(x5c)
    {
        return Err(JoseError::invalid_jwk_parameter("x5c"));
    }

    for name in ["x5t", "x5t#S256"] {
        if parameters.get(name).is_some_and(|value| !value.is_string()) {
            return Err(JoseError::invalid_jwk_parameter(name));
        }
    }

    if let (Some(key_use), Some(key_ops)) = (key_use, key_ops)
        && !key_ops.iter().all(|op| key_use.allows(*op))
    {
        return Err(JoseError::invalid_jwk(
            "Invalid combination of json web key parameters \"use\" and \"key_ops\".",
        ));
    }

    Ok(key_type)
}

fn parse_key_ops(value: &Value) -> Result<Vec<JWKKeyOp>, JoseError> {
    let invalid = || JoseError::invalid_jwk_parameter("key_ops");

    let values = value.as_array().filter(|ops| !ops.is_empty()).ok_or_else(invalid)?;
    let ops = values
        .iter()
        .map(|op| op.as_str().ok_or_else(invalid)?.parse::<JWKKeyOp>())
        .collect::<Result<Vec<_>, _>>()?;

    let unique: HashSet<_> = ops.iter().collect();
    if unique.len() != ops.len() {
        return Err(invalid());
    }
    Ok(ops)
}

pub(crate) fn is_non_empty_string_list(value: &Value) -> bool {
    value
        .as_array()
        .is_some_and(|list| !list.is_empty() && list.iter().all(Value::is_string))
}
