//! HMAC with SHA-2 functions (`HS256`, `HS384`, `HS512`)

use aws_lc_rs::{constant_time, hmac};

use crate::jose::{JWA, JWK, JoseError, jwk_utils::decode_parameter};

/// Hash function and minimum secret size in bytes of an HMAC algorithm.
fn config(alg: JWA) -> Option<(hmac::Algorithm, usize)> {
    match alg {
        JWA::HS256 => Some((hmac::HMAC_SHA256, 32)),
        JWA::HS384 => Some((hmac::HMAC_SHA384, 48)),
        JWA::HS512 => Some((hmac::HMAC_SHA512, 64)),
        _ => None,
    }
}

fn key(alg: JWA, jwk: &JWK) -> Result<hmac::Key, JoseError> {
    let (algorithm, _) = config(alg).ok_or_else(|| not_hmac(alg))?;
    let secret = decode_parameter(jwk.parameters(), "k")?;
    Ok(hmac::Key::new(algorithm, &secret))
}

pub(super) fn validate_key(alg: JWA, jwk: &JWK) -> Result<(), JoseError> {
    let (_, key_size) = config(alg).ok_or_else(|| not_hmac(alg))?;
    let secret = decode_parameter(jwk.parameters(), "k")?;
    if secret.len() < key_size {
        return Err(JoseError::invalid_jwk(format!(
            "The json web key parameter \"k\" must have at least {key_size} bytes."
        )));
    }
    Ok(())
}

pub(super) fn sign(alg: JWA, message: &[u8], jwk: &JWK) -> Result<Vec<u8>, JoseError> {
    let tag = hmac::sign(&key(alg, jwk)?, message);
    Ok(tag.as_ref().to_vec())
}

pub(super) fn verify(
    alg: JWA,
    signature: &[u8],
    message: &[u8],
    jwk: &JWK,
) -> Result<bool, JoseError> {
    let expected = sign(alg, message, jwk)?;
    Ok(signature.len() == expected.len()
        && constant_time::verify_slices_are_equal(signature, &expected).is_ok())
}

fn not_hmac(alg: JWA) -> JoseError {
    JoseError::invalid_jwk(format!(
        "The json web signature algorithm \"{alg}\" is not an hmac algorithm."
    ))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio_test::assert_err;

    use super::super::tests::{assert_round_trip, jwk};
    use crate::jose::jwk_utils::encode_base64url;

    use super::*;

    fn secret(len: usize) -> JWK {
        let k = encode_base64url(vec![0x5a; len]);
        jwk(json!({"kty": "oct", "k": k}))
    }

    #[test]
    fn round_trips() {
        let key = jwk(json!({"kty": "oct", "k": "qDM80igvja4Tg_tNsEuWDhl2bMM6_NgJEldFhIEuwqQ"}));
        assert_round_trip(JWA::HS256, &key);
        assert_round_trip(JWA::HS384, &secret(48));
        assert_round_trip(JWA::HS512, &secret(64));
    }

    #[test]
    fn signatures_have_digest_length() {
        assert_eq!(JWA::HS256.sign(b"m", Some(&secret(32))).unwrap().len(), 32);
        assert_eq!(JWA::HS384.sign(b"m", Some(&secret(48))).unwrap().len(), 48);
        assert_eq!(JWA::HS512.sign(b"m", Some(&secret(64))).unwrap().len(), 64);
    }

    #[test]
    fn matches_rfc4231_test_case_2() {
        // "Jefe" is too short for HS256 so the primitive is exercised directly
        let key = hmac::Key::new(hmac::HMAC_SHA256, b"Jefe");
        let tag = hmac::sign(&key, b"what do ya want for nothing?");
        assert_eq!(
            encode_base64url(tag.as_ref()),
            "W9zBRr9gdU5qBCQmCJV1x1oAPwidJzmDnexYuWTsOEM"
        );
    }

    #[test]
    fn short_secrets_are_rejected() {
        for (alg, size) in [(JWA::HS256, 32), (JWA::HS384, 48), (JWA::HS512, 64)] {
            let error = assert_err!(alg.sign(b"message", Some(&secret(size - 1))));
            assert_eq!(
                error.to_string(),
                format!("The json web key parameter \"k\" must have at least {size} bytes.")
            );
        }
        // a longer secret is fine
        JWA::HS256.sign(b"message", Some(&secret(64))).unwrap();
    }

    #[test]
    fn different_secret_does_not_verify() {
        let signature = JWA::HS256.sign(b"message", Some(&secret(32))).unwrap();
        let other = jwk(json!({"kty": "oct", "k": encode_base64url(vec![0x11; 32])}));
        assert!(!JWA::HS256.verify(&signature, b"message", Some(&other)).unwrap());
    }
}
