//! Edwards-curve signatures (`EdDSA`) as defined in [`rfc8037`]
//!
//! [`rfc8037`]: https://datatracker.ietf.org/doc/html/rfc8037#section-3.1

use aws_lc_rs::signature::{self, ED25519, Ed25519KeyPair};

use crate::jose::{
    JWK, JWKOctetKeyPairCurves, JoseError, JoseErrorKind, error::ErrorContext as _,
    jwk_utils::decode_parameter,
};

const SIGNATURE_CURVES: [JWKOctetKeyPairCurves; 2] =
    [JWKOctetKeyPairCurves::Ed25519, JWKOctetKeyPairCurves::Ed448];

fn curve(jwk: &JWK) -> Option<JWKOctetKeyPairCurves> {
    jwk.get("crv")
        .and_then(|crv| crv.as_str())
        .and_then(|crv| crv.parse().ok())
}

pub(super) fn validate_curve(jwk: &JWK) -> Result<(), JoseError> {
    match curve(jwk) {
        Some(crv) if SIGNATURE_CURVES.contains(&crv) => Ok(()),
        _ => Err(JoseError::invalid_jwk(
            "The json web signature algorithm \"EdDSA\" only accepts the elliptic curves [\"Ed25519\", \"Ed448\"].",
        )),
    }
}

/// Only Ed25519 has a primitive in the crypto provider.
fn require_ed25519(jwk: &JWK) -> Result<(), JoseError> {
    match curve(jwk) {
        Some(JWKOctetKeyPairCurves::Ed25519) => Ok(()),
        Some(crv) => Err(JoseError::invalid_jwk(format!(
            "The elliptic curve \"{}\" is not supported by the cryptographic provider.",
            crv.as_str()
        ))),
        None => Err(JoseError::invalid_jwk_parameter("crv")),
    }
}

pub(super) fn sign(message: &[u8], jwk: &JWK) -> Result<Vec<u8>, JoseError> {
    require_ed25519(jwk)?;
    let seed = decode_parameter(jwk.parameters(), "d")?;
    let public_key = decode_parameter(jwk.parameters(), "x")?;

    let key_pair = Ed25519KeyPair::from_seed_and_public_key(&seed, &public_key).jose_context(
        JoseErrorKind::InvalidJsonWebKey,
        "The provided json web key is not a valid Ed25519 key pair.",
    )?;
    Ok(key_pair.sign(message).as_ref().to_vec())
}

pub(super) fn verify(signature: &[u8], message: &[u8], jwk: &JWK) -> Result<bool, JoseError> {
    require_ed25519(jwk)?;
    let public_key = decode_parameter(jwk.parameters(), "x")?;
    Ok(signature::UnparsedPublicKey::new(&ED25519, public_key)
        .verify(message, signature)
        .is_ok())
}
