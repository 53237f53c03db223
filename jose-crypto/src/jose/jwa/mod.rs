use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::jose::{JWK, JWKKeyOp, JWKType, JWKUse, JoseError};

mod ecdsa;
mod eddsa;
mod hmac;
mod jwe;
mod rsassa;

pub use jwe::{JWEAlgorithm, JWECompression, JWEContentEncryption};

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
/// [`JWA`] or JSON Web Algorithms as defined in [`rfc7518`] and [`rfc8037`]
///
/// Every algorithm carries its fixed configuration (hash function, curve or
/// padding, minimum key size) and signs or verifies through the routine of
/// its family. The set of algorithms is closed: anything else is rejected
/// wherever an `alg` is validated.
///
/// [`rfc7518`]: https://datatracker.ietf.org/doc/html/rfc7518
/// [`rfc8037`]: https://datatracker.ietf.org/doc/html/rfc8037
pub enum JWA {
    /// HMAC using SHA-256 (Required)
    HS256,
    /// HMAC using SHA-384 (Optional)
    HS384,
    /// HMAC using SHA-512 (Optional)
    HS512,
    /// RSASSA-PKCS1-v1_5 using SHA-256 (Recommended)
    RS256,
    /// RSASSA-PKCS1-v1_5 using SHA-384 (Optional)
    RS384,
    /// RSASSA-PKCS1-v1_5 using SHA-512 (Optional)
    RS512,
    /// ECDSA using P-256 and SHA-256 (Recommended+)
    ES256,
    /// ECDSA using P-384 and SHA-384 (Optional)
    ES384,
    /// ECDSA using P-521 and SHA-512 (Optional)
    ES512,
    /// RSASSA-PSS using SHA-256 and MGF1 with SHA-256 (Optional)
    PS256,
    /// RSASSA-PSS using SHA-384 and MGF1 with SHA-384 (Optional)
    PS384,
    /// RSASSA-PSS using SHA-512 and MGF1 with SHA-512 (Optional)
    PS512,
    /// Edwards-curve Digital Signature Algorithm using Ed25519 or Ed448
    EdDSA,
    /// No digital signature or MAC performed (Optional)
    #[serde(rename = "none")]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Operation a [`JWK`] is used for by a [`JWA`]
pub enum JWSOperation {
    /// Compute a signature or MAC
    Sign,
    /// Verify a signature or MAC
    Verify,
}

impl JWSOperation {
    /// Key operation a key must list in its `key_ops` to be used for this operation.
    #[must_use]
    pub const fn key_op(self) -> JWKKeyOp {
        match self {
            Self::Sign => JWKKeyOp::Sign,
            Self::Verify => JWKKeyOp::Verify,
        }
    }
}

impl JWA {
    /// All supported signature algorithms.
    pub const ALL: [Self; 14] = [
        Self::HS256,
        Self::HS384,
        Self::HS512,
        Self::RS256,
        Self::RS384,
        Self::RS512,
        Self::ES256,
        Self::ES384,
        Self::ES512,
        Self::PS256,
        Self::PS384,
        Self::PS512,
        Self::EdDSA,
        Self::None,
    ];

    /// Registered name of this algorithm.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HS256 => "HS256",
            Self::HS384 => "HS384",
            Self::HS512 => "HS512",
            Self::RS256 => "RS256",
            Self::RS384 => "RS384",
            Self::RS512 => "RS512",
            Self::ES256 => "ES256",
            Self::ES384 => "ES384",
            Self::ES512 => "ES512",
            Self::PS256 => "PS256",
            Self::PS384 => "PS384",
            Self::PS512 => "PS512",
            Self::EdDSA => "EdDSA",
            Self::None => "none",
        }
    }

    /// Key type this algorithm works with, `None` for the unsecured `none` algorithm.
    #[must_use]
    pub const fn required_key_type(self) -> Option<JWKType> {
        match self {
            Self::HS256 | Self::HS384 | Self::HS512 => Some(JWKType::OCT),
            Self::RS256
            | Self::RS384
            | Self::RS512
            | Self::PS256
            | Self::PS384
            | Self::PS512 => Some(JWKType::RSA),
            Self::ES256 | Self::ES384 | Self::ES512 => Some(JWKType::EC),
            Self::EdDSA => Some(JWKType::OKP),
            Self::None => None,
        }
    }

    /// Check that `jwk` can be used by this algorithm for `operation`.
    ///
    /// The key must be of the key type of this algorithm and satisfy the
    /// size or curve requirements of its family. A key declaring `alg` must
    /// declare this algorithm, a key declaring `use` must declare `sig` and
    /// a key declaring `key_ops` must list the requested operation.
    pub fn validate_jwk(self, jwk: &JWK, operation: JWSOperation) -> Result<(), JoseError> {
        let Some(key_type) = self.required_key_type() else {
            return Ok(());
        };

        if jwk.key_type() != key_type {
            return Err(JoseError::invalid_jwk(format!(
                "The json web signature algorithm \"{self}\" only accepts \"{key_type}\" json web keys."
            )));
        }

        match self {
            Self::HS256 | Self::HS384 | Self::HS512 => hmac::validate_key(self, jwk)?,
            Self::ES256 | Self::ES384 | Self::ES512 => ecdsa::validate_curve(self, jwk)?,
            Self::EdDSA => eddsa::validate_curve(jwk)?,
            Self::RS256
            | Self::RS384
            | Self::RS512
            | Self::PS256
            | Self::PS384
            | Self::PS512
            | Self::None => (),
        }

        if let Some(alg) = jwk.alg()
            && alg != self.as_str()
        {
            return Err(JoseError::invalid_jwk(format!(
                "This json web key is intended to be used by the json web signature algorithm \"{alg}\"."
            )));
        }

        let wrong_use = jwk.get("use").is_some() && jwk.key_use() != Some(JWKUse::Signature);
        let missing_op = jwk
            .get("key_ops")
            .and_then(Value::as_array)
            .is_some_and(|ops| {
                !ops.iter()
                    .any(|op| op.as_str() == Some(operation.key_op().as_str()))
            });
        if wrong_use || missing_op {
            return Err(JoseError::invalid_jwk(
                "The provided json web key cannot be used by json web signatures.",
            ));
        }

        Ok(())
    }

    /// Sign `message` with `jwk`, returning the raw signature bytes.
    ///
    /// The `none` algorithm ignores the key and returns an empty signature.
    pub fn sign(self, message: &[u8], jwk: Option<&JWK>) -> Result<Vec<u8>, JoseError> {
        let Some(jwk) = self.key_for(jwk)? else {
            return Ok(Vec::new());
        };
        self.validate_jwk(jwk, JWSOperation::Sign)?;

        if !matches!(self, Self::HS256 | Self::HS384 | Self::HS512)
            && !jwk.parameters().contains_key("d")
        {
            return Err(JoseError::invalid_jwk(
                "Cannot use a public json web key for signing a message.",
            ));
        }

        let signature = match self {
            Self::HS256 | Self::HS384 | Self::HS512 => hmac::sign(self, message, jwk),
            Self::ES256 | Self::ES384 | Self::ES512 => ecdsa::sign(self, message, jwk),
            Self::EdDSA => eddsa::sign(message, jwk),
            Self::RS256
            | Self::RS384
            | Self::RS512
            | Self::PS256
            | Self::PS384
            | Self::PS512 => rsassa::sign(self, message, jwk),
            Self::None => Ok(Vec::new()),
        }?;

        tracing::trace!(alg = %self, kid = jwk.kid(), "message signed");
        Ok(signature)
    }

    /// Verify `signature` over `message` with `jwk`.
    ///
    /// A signature that does not match, including one of the wrong length,
    /// yields `Ok(false)`. Errors are reserved for keys that cannot be used
    /// by this algorithm. The `none` algorithm accepts every signature.
    pub fn verify(
        self,
        signature: &[u8],
        message: &[u8],
        jwk: Option<&JWK>,
    ) -> Result<bool, JoseError> {
        let Some(jwk) = self.key_for(jwk)? else {
            return Ok(true);
        };
        self.validate_jwk(jwk, JWSOperation::Verify)?;

        let verified = match self {
            Self::HS256 | Self::HS384 | Self::HS512 => hmac::verify(self, signature, message, jwk),
            Self::ES256 | Self::ES384 | Self::ES512 => {
                ecdsa::verify(self, signature, message, jwk)
            }
            Self::EdDSA => eddsa::verify(signature, message, jwk),
            Self::RS256
            | Self::RS384
            | Self::RS512
            | Self::PS256
            | Self::PS384
            | Self::PS512 => rsassa::verify(self, signature, message, jwk),
            Self::None => Ok(true),
        }?;

        tracing::trace!(alg = %self, kid = jwk.kid(), verified, "signature checked");
        Ok(verified)
    }

    fn key_for(self, jwk: Option<&JWK>) -> Result<Option<&JWK>, JoseError> {
        match (self, jwk) {
            (Self::None, _) => Ok(None),
            (_, Some(jwk)) => Ok(Some(jwk)),
            (_, None) => Err(JoseError::invalid_jwk(format!(
                "The json web signature algorithm \"{self}\" requires a json web key."
            ))),
        }
    }
}

impl fmt::Display for JWA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JWA {
    type Err = JoseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.as_str() == s)
            .ok_or_else(|| JoseError::invalid_header_parameter("alg"))
    }
}
