//! ECDSA with the NIST curves (`ES256`, `ES384`, `ES512`)
//!
//! Signatures use the fixed-width `r || s` encoding of [`rfc7518`] section 3.4.
//!
//! [`rfc7518`]: https://datatracker.ietf.org/doc/html/rfc7518#section-3.4

use aws_lc_rs::{
    rand::SystemRandom,
    signature::{
        self, ECDSA_P256_SHA256_FIXED_SIGNING, ECDSA_P384_SHA384_FIXED_SIGNING,
        ECDSA_P521_SHA512_FIXED_SIGNING, EcdsaKeyPair, EcdsaSigningAlgorithm,
    },
};

use crate::jose::{
    JWA, JWK, JWKEllipticCurves, JoseError, JoseErrorKind, error::ErrorContext as _,
    jwk_utils::decode_parameter,
};

fn config(alg: JWA) -> Option<(&'static EcdsaSigningAlgorithm, JWKEllipticCurves)> {
    match alg {
        JWA::ES256 => Some((&ECDSA_P256_SHA256_FIXED_SIGNING, JWKEllipticCurves::P256)),
        JWA::ES384 => Some((&ECDSA_P384_SHA384_FIXED_SIGNING, JWKEllipticCurves::P384)),
        JWA::ES512 => Some((&ECDSA_P521_SHA512_FIXED_SIGNING, JWKEllipticCurves::P521)),
        _ => None,
    }
}

fn signing_algorithm(alg: JWA) -> Result<&'static EcdsaSigningAlgorithm, JoseError> {
    config(alg).map(|(algorithm, _)| algorithm).ok_or_else(|| {
        JoseError::invalid_jwk(format!(
            "The json web signature algorithm \"{alg}\" is not an ecdsa algorithm."
        ))
    })
}

pub(super) fn validate_curve(alg: JWA, jwk: &JWK) -> Result<(), JoseError> {
    let Some((_, curve)) = config(alg) else {
        return Err(JoseError::invalid_jwk_parameter("crv"));
    };
    if jwk.get("crv").and_then(|crv| crv.as_str()) != Some(curve.as_str()) {
        return Err(JoseError::invalid_jwk(format!(
            "The json web signature algorithm \"{alg}\" only accepts the elliptic curve \"{}\".",
            curve.as_str()
        )));
    }
    Ok(())
}

/// Uncompressed SEC1 point `0x04 || x || y` of an EC key.
fn public_point(jwk: &JWK) -> Result<Vec<u8>, JoseError> {
    let x = decode_parameter(jwk.parameters(), "x")?;
    let y = decode_parameter(jwk.parameters(), "y")?;

    let mut point = Vec::with_capacity(1 + x.len() + y.len());
    point.push(0x04);
    point.extend_from_slice(&x);
    point.extend_from_slice(&y);
    Ok(point)
}

pub(super) fn sign(alg: JWA, message: &[u8], jwk: &JWK) -> Result<Vec<u8>, JoseError> {
    let algorithm = signing_algorithm(alg)?;
    let d = decode_parameter(jwk.parameters(), "d")?;
    let point = public_point(jwk)?;

    let key_pair = EcdsaKeyPair::from_private_key_and_public_key(algorithm, &d, &point)
        .jose_context(
            JoseErrorKind::InvalidJsonWebKey,
            "The provided json web key is not a valid elliptic curve key pair.",
        )?;
    let signature = key_pair.sign(&SystemRandom::new(), message).jose_context(
        JoseErrorKind::InvalidJsonWebKey,
        "The message could not be signed with the provided json web key.",
    )?;
    Ok(signature.as_ref().to_vec())
}

pub(super) fn verify(
    alg: JWA,
    signature: &[u8],
    message: &[u8],
    jwk: &JWK,
) -> Result<bool, JoseError> {
    let algorithm: &'static signature::EcdsaVerificationAlgorithm = signing_algorithm(alg)?;
    let point = public_point(jwk)?;
    Ok(signature::UnparsedPublicKey::new(algorithm, point)
        .verify(message, signature)
        .is_ok())
}
