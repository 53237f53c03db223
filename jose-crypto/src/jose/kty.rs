use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct};
use serde_json::{Map, Value};

use crate::jose::{
    JoseError,
    constants::{
        CURVE_PRIVATE_PARAMETERS, OCT_PRIVATE_PARAMETERS, RSA_PRIVATE_PARAMETERS,
    },
    jwk_utils::decode_parameter,
};

/// Smallest accepted RSA modulus, in bytes (2048 bits).
const RSA_MIN_MODULUS_BYTES: usize = 256;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
/// The "kty" (key type) parameter identifies the cryptographic algorithm
/// family used with the key, such as "RSA", "EC", "OKP" or "oct".
///
/// Each key type validates its own members, projects the members
/// used by [`rfc7638`] thumbprints and knows which members are private.
///
/// [`rfc7638`]: https://datatracker.ietf.org/doc/html/rfc7638
pub enum JWKType {
    /// Elliptic curve
    EC,
    /// Octet key pair, used by Edwards and Montgomery curves
    OKP,
    /// RSA
    RSA,
    /// an octet sequence key, which represents a symmetric key
    #[serde(rename = "oct")]
    OCT,
}

impl JWKType {
    /// All key types, in registry order.
    pub const ALL: [Self; 4] = [Self::EC, Self::OKP, Self::RSA, Self::OCT];

    /// Registered name of this key type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EC => "EC",
            Self::OKP => "OKP",
            Self::RSA => "RSA",
            Self::OCT => "oct",
        }
    }

    /// Names of the members that must be left out of a public export.
    #[must_use]
    pub const fn private_parameters(self) -> &'static [&'static str] {
        match self {
            Self::EC | Self::OKP => &CURVE_PRIVATE_PARAMETERS,
            Self::RSA => &RSA_PRIVATE_PARAMETERS,
            Self::OCT => &OCT_PRIVATE_PARAMETERS,
        }
    }

    /// Validate the members specific to this key type.
    ///
    /// Members are checked in a fixed order and the first
    /// failing member is named by the returned error.
    pub(crate) fn validate(self, parameters: &Map<String, Value>) -> Result<(), JoseError> {
        if parameters.get("kty").and_then(Value::as_str) != Some(self.as_str()) {
            return Err(JoseError::invalid_jwk_parameter("kty"));
        }

        match self {
            Self::EC => {
                require_curve::<JWKEllipticCurves>(parameters)?;
                require_string(parameters, "x")?;
                require_string(parameters, "y")?;
                optional_string(parameters, "d")
            }
            Self::OKP => {
                require_curve::<JWKOctetKeyPairCurves>(parameters)?;
                require_string(parameters, "x")?;
                optional_string(parameters, "d")
            }
            Self::RSA => {
                let n = decode_parameter(parameters, "n")?;
                if n.len() < RSA_MIN_MODULUS_BYTES {
                    return Err(JoseError::invalid_jwk_parameter("n"));
                }
                require_string(parameters, "e")?;

                let has_private = RSA_PRIVATE_PARAMETERS
                    .iter()
                    .any(|name| parameters.contains_key(*name));
                if has_private {
                    for name in RSA_PRIVATE_PARAMETERS {
                        require_string(parameters, name)?;
                    }
                }
                Ok(())
            }
            Self::OCT => match parameters.get("k").and_then(Value::as_str) {
                Some(k) if !k.is_empty() => Ok(()),
                _ => Err(JoseError::invalid_jwk_parameter("k")),
            },
        }
    }

    /// Required public members of a validated key, ready to be serialized
    /// in lexicographic order.
    pub(crate) fn thumbprint_parameters(
        self,
        parameters: &Map<String, Value>,
    ) -> Result<ThumbprintParameters<'_>, JoseError> {
        let member = |name: &str| {
            parameters
                .get(name)
                .and_then(Value::as_str)
                .ok_or_else(|| JoseError::invalid_jwk_parameter(name))
        };

        Ok(match self {
            Self::EC => ThumbprintParameters::EC {
                crv: member("crv")?,
                x: member("x")?,
                y: member("y")?,
            },
            Self::OKP => ThumbprintParameters::OKP {
                crv: member("crv")?,
                x: member("x")?,
            },
            Self::RSA => ThumbprintParameters::RSA {
                e: member("e")?,
                n: member("n")?,
            },
            Self::OCT => ThumbprintParameters::OCT { k: member("k")? },
        })
    }
}

impl fmt::Display for JWKType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JWKType {
    type Err = JoseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kty| kty.as_str() == s)
            .ok_or_else(|| JoseError::invalid_jwk_parameter("kty"))
    }
}

/// Public members of a key that take part in its thumbprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ThumbprintParameters<'a> {
    EC {
        crv: &'a str,
        x: &'a str,
        y: &'a str,
    },
    OKP {
        crv: &'a str,
        x: &'a str,
    },
    RSA {
        e: &'a str,
        n: &'a str,
    },
    OCT {
        k: &'a str,
    },
}

impl Serialize for ThumbprintParameters<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Order here is important as this output will be used to generate jwk thumb
        match self {
            Self::EC { crv, x, y } => {
                let mut state = serializer.serialize_struct("ThumbprintParameters", 4)?;
                state.serialize_field("crv", crv)?;
                state.serialize_field("kty", "EC")?;
                state.serialize_field("x", x)?;
                state.serialize_field("y", y)?;
                state.end()
            }
            Self::OKP { crv, x } => {
                let mut state = serializer.serialize_struct("ThumbprintParameters", 3)?;
                state.serialize_field("crv", crv)?;
                state.serialize_field("kty", "OKP")?;
                state.serialize_field("x", x)?;
                state.end()
            }
            Self::RSA { e, n } => {
                let mut state = serializer.serialize_struct("ThumbprintParameters", 3)?;
                state.serialize_field("e", e)?;
                state.serialize_field("kty", "RSA")?;
                state.serialize_field("n", n)?;
                state.end()
            }
            Self::OCT { k } => {
                let mut state = serializer.serialize_struct("ThumbprintParameters", 2)?;
                state.serialize_field("k", k)?;
                state.serialize_field("kty", "oct")?;
                state.end()
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
/// Curves of an "EC" key
pub enum JWKEllipticCurves {
    /// NIST P-256, also known as secp256r1
    #[serde(rename = "P-256")]
    P256,
    /// NIST P-384, also known as secp384r1
    #[serde(rename = "P-384")]
    P384,
    /// NIST P-521, also known as secp521r1
    #[serde(rename = "P-521")]
    P521,
}

impl JWKEllipticCurves {
    /// Registered name of this curve.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
        }
    }
}

impl FromStr for JWKEllipticCurves {
    type Err = JoseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P-256" => Ok(Self::P256),
            "P-384" => Ok(Self::P384),
            "P-521" => Ok(Self::P521),
            _ => Err(JoseError::invalid_jwk_parameter("crv")),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
/// Curves of an "OKP" key, as registered by [`rfc8037`]
///
/// [`rfc8037`]: https://datatracker.ietf.org/doc/html/rfc8037
pub enum JWKOctetKeyPairCurves {
    /// Edwards curve used by EdDSA signatures
    Ed25519,
    /// Edwards curve used by EdDSA signatures
    Ed448,
    /// Montgomery curve used for key agreement only
    X25519,
    /// Montgomery curve used for key agreement only
    X448,
}

impl JWKOctetKeyPairCurves {
    /// Registered name of this curve.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ed25519 => "Ed25519",
            Self::Ed448 => "Ed448",
            Self::X25519 => "X25519",
            Self::X448 => "X448",
        }
    }
}

impl FromStr for JWKOctetKeyPairCurves {
    type Err = JoseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Ed25519" => Ok(Self::Ed25519),
            "Ed448" => Ok(Self::Ed448),
            "X25519" => Ok(Self::X25519),
            "X448" => Ok(Self::X448),
            _ => Err(JoseError::invalid_jwk_parameter("crv")),
        }
    }
}

fn require_curve<C: FromStr<Err = JoseError>>(
    parameters: &Map<String, Value>,
) -> Result<C, JoseError> {
    parameters
        .get("crv")
        .and_then(Value::as_str)
        .ok_or_else(|| JoseError::invalid_jwk_parameter("crv"))?
        .parse()
}

fn require_string(parameters: &Map<String, Value>, name: &str) -> Result<(), JoseError> {
    match parameters.get(name) {
        Some(Value::String(_)) => Ok(()),
        _ => Err(JoseError::invalid_jwk_parameter(name)),
    }
}

fn optional_string(parameters: &Map<String, Value>, name: &str) -> Result<(), JoseError> {
    match parameters.get(name) {
        None | Some(Value::String(_)) => Ok(()),
        Some(_) => Err(JoseError::invalid_jwk_parameter(name)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio_test::assert_err;

    use super::*;

    fn params(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a json object"),
        }
    }

    fn rejected_parameter(kty: JWKType, value: Value) -> String {
        assert_err!(kty.validate(&params(value))).to_string()
    }

    #[test]
    fn jwk_thumb_order_is_correct() {
        let output = serde_json::to_string(&ThumbprintParameters::EC {
            crv: "P-256",
            x: "x",
            y: "y",
        })
        .unwrap();
        assert_eq!(output, r##"{"crv":"P-256","kty":"EC","x":"x","y":"y"}"##);

        let output =
            serde_json::to_string(&ThumbprintParameters::OKP { crv: "Ed25519", x: "x" }).unwrap();
        assert_eq!(output, r##"{"crv":"Ed25519","kty":"OKP","x":"x"}"##);

        let output = serde_json::to_string(&ThumbprintParameters::RSA { e: "e", n: "n" }).unwrap();
        assert_eq!(output, r##"{"e":"e","kty":"RSA","n":"n"}"##);

        let output = serde_json::to_string(&ThumbprintParameters::OCT { k: "k" }).unwrap();
        assert_eq!(output, r##"{"k":"k","kty":"oct"}"##);
    }

    #[test]
    fn thumbprint_projection_drops_other_members() {
        let parameters = params(json!({
            "kty": "EC",
            "crv": "P-256",
            "x": "x",
            "y": "y",
            "d": "d",
            "kid": "key-1",
        }));
        let projection = JWKType::EC.thumbprint_parameters(&parameters).unwrap();
        assert_eq!(
            projection,
            ThumbprintParameters::EC {
                crv: "P-256",
                x: "x",
                y: "y"
            }
        );
    }

    #[test]
    fn kty_must_match_backend() {
        assert_eq!(
            rejected_parameter(JWKType::EC, json!({"kty": "OKP", "crv": "P-256", "x": "", "y": ""})),
            "Invalid json web key parameter \"kty\"."
        );
    }

    #[test]
    fn ec_members_are_checked_in_order() {
        assert_eq!(
            rejected_parameter(JWKType::EC, json!({"kty": "EC", "crv": "secp256k1"})),
            "Invalid json web key parameter \"crv\"."
        );
        assert_eq!(
            rejected_parameter(JWKType::EC, json!({"kty": "EC", "crv": "P-256", "y": "y"})),
            "Invalid json web key parameter \"x\"."
        );
        assert_eq!(
            rejected_parameter(JWKType::EC, json!({"kty": "EC", "crv": "P-384", "x": "x"})),
            "Invalid json web key parameter \"y\"."
        );
        assert_eq!(
            rejected_parameter(
                JWKType::EC,
                json!({"kty": "EC", "crv": "P-521", "x": "x", "y": "y", "d": 1})
            ),
            "Invalid json web key parameter \"d\"."
        );
        JWKType::EC
            .validate(&params(
                json!({"kty": "EC", "crv": "P-521", "x": "x", "y": "y", "d": "d"}),
            ))
            .unwrap();
    }

    #[test]
    fn okp_accepts_signature_and_agreement_curves() {
        for crv in ["Ed25519", "Ed448", "X25519", "X448"] {
            JWKType::OKP
                .validate(&params(json!({"kty": "OKP", "crv": crv, "x": "x"})))
                .unwrap();
        }
        assert_eq!(
            rejected_parameter(JWKType::OKP, json!({"kty": "OKP", "crv": "P-256", "x": "x"})),
            "Invalid json web key parameter \"crv\"."
        );
        assert_eq!(
            rejected_parameter(JWKType::OKP, json!({"kty": "OKP", "crv": "Ed25519"})),
            "Invalid json web key parameter \"x\"."
        );
    }

    #[test]
    fn rsa_modulus_must_have_2048_bits() {
        let short = crate::jose::jwk_utils::encode_base64url([0xab; 255]);
        assert_eq!(
            rejected_parameter(JWKType::RSA, json!({"kty": "RSA", "n": short, "e": "AQAB"})),
            "Invalid json web key parameter \"n\"."
        );

        let n = crate::jose::jwk_utils::encode_base64url([0xab; 256]);
        JWKType::RSA
            .validate(&params(json!({"kty": "RSA", "n": n, "e": "AQAB"})))
            .unwrap();
        assert_eq!(
            rejected_parameter(JWKType::RSA, json!({"kty": "RSA", "n": n})),
            "Invalid json web key parameter \"e\"."
        );
    }

    #[test]
    fn rsa_private_members_are_all_or_nothing() {
        let n = crate::jose::jwk_utils::encode_base64url([0xab; 256]);
        assert_eq!(
            rejected_parameter(
                JWKType::RSA,
                json!({"kty": "RSA", "n": n, "e": "AQAB", "qi": "qi"})
            ),
            "Invalid json web key parameter \"d\"."
        );
        assert_eq!(
            rejected_parameter(
                JWKType::RSA,
                json!({"kty": "RSA", "n": n, "e": "AQAB", "d": "d", "p": "p", "q": "q", "dp": "dp", "dq": "dq"})
            ),
            "Invalid json web key parameter \"qi\"."
        );
    }

    #[test]
    fn oct_secret_must_not_be_empty() {
        assert_eq!(
            rejected_parameter(JWKType::OCT, json!({"kty": "oct", "k": ""})),
            "Invalid json web key parameter \"k\"."
        );
        JWKType::OCT
            .validate(&params(json!({"kty": "oct", "k": "secret"})))
            .unwrap();
    }

    #[test]
    fn private_parameters_per_key_type() {
        assert_eq!(JWKType::EC.private_parameters(), ["d"]);
        assert_eq!(JWKType::OKP.private_parameters(), ["d"]);
        assert_eq!(
            JWKType::RSA.private_parameters(),
            ["d", "p", "q", "dp", "dq", "qi"]
        );
        assert_eq!(JWKType::OCT.private_parameters(), ["k"]);
    }

    #[test]
    fn key_types_parse_by_registered_name() {
        assert_eq!("oct".parse::<JWKType>().unwrap(), JWKType::OCT);
        assert_eq!("OKP".parse::<JWKType>().unwrap(), JWKType::OKP);
        assert_err!("OCT".parse::<JWKType>());
    }
}
