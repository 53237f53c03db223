//! RSA signatures with PKCS#1 v1.5 (`RS256`, `RS384`, `RS512`)
//! or PSS (`PS256`, `PS384`, `PS512`) padding

use aws_lc_rs::{
    rand::SystemRandom,
    signature::{
        RSA_PKCS1_2048_8192_SHA256, RSA_PKCS1_2048_8192_SHA384, RSA_PKCS1_2048_8192_SHA512,
        RSA_PKCS1_SHA256, RSA_PKCS1_SHA384, RSA_PKCS1_SHA512, RSA_PSS_2048_8192_SHA256,
        RSA_PSS_2048_8192_SHA384, RSA_PSS_2048_8192_SHA512, RSA_PSS_SHA256, RSA_PSS_SHA384,
        RSA_PSS_SHA512, RsaEncoding, RsaKeyPair, RsaParameters, RsaPublicKeyComponents,
    },
};

use crate::jose::{
    JWA, JWK, JoseError, JoseErrorKind,
    error::ErrorContext as _,
    jwk_utils::{RsaPrivateComponents, create_rsa_private_key, decode_parameter, trim_leading_zeros},
};

/// Padding with its hash for signing and the matching verification parameters.
fn config(alg: JWA) -> Result<(&'static dyn RsaEncoding, &'static RsaParameters), JoseError> {
    match alg {
        JWA::RS256 => Ok((&RSA_PKCS1_SHA256, &RSA_PKCS1_2048_8192_SHA256)),
        JWA::RS384 => Ok((&RSA_PKCS1_SHA384, &RSA_PKCS1_2048_8192_SHA384)),
        JWA::RS512 => Ok((&RSA_PKCS1_SHA512, &RSA_PKCS1_2048_8192_SHA512)),
        JWA::PS256 => Ok((&RSA_PSS_SHA256, &RSA_PSS_2048_8192_SHA256)),
        JWA::PS384 => Ok((&RSA_PSS_SHA384, &RSA_PSS_2048_8192_SHA384)),
        JWA::PS512 => Ok((&RSA_PSS_SHA512, &RSA_PSS_2048_8192_SHA512)),
        _ => Err(JoseError::invalid_jwk(format!(
            "The json web signature algorithm \"{alg}\" is not an rsa algorithm."
        ))),
    }
}

pub(super) fn sign(alg: JWA, message: &[u8], jwk: &JWK) -> Result<Vec<u8>, JoseError> {
    let (padding, _) = config(alg)?;

    let parameters = jwk.parameters();
    let decode = |name: &str| decode_parameter(parameters, name);
    let (n, e, d) = (decode("n")?, decode("e")?, decode("d")?);
    let (p, q) = (decode("p")?, decode("q")?);
    let (dp, dq, qi) = (decode("dp")?, decode("dq")?, decode("qi")?);

    let der = create_rsa_private_key(&RsaPrivateComponents {
        n: &n,
        e: &e,
        d: &d,
        p: &p,
        q: &q,
        dp: &dp,
        dq: &dq,
        qi: &qi,
    });
    let key_pair = RsaKeyPair::from_der(&der).jose_context(
        JoseErrorKind::InvalidJsonWebKey,
        "The provided json web key is not a valid rsa private key.",
    )?;

    let mut signature = vec![0; key_pair.public_modulus_len()];
    key_pair
        .sign(padding, &SystemRandom::new(), message, &mut signature)
        .jose_context(
            JoseErrorKind::InvalidJsonWebKey,
            "The message could not be signed with the provided json web key.",
        )?;
    Ok(signature)
}

pub(super) fn verify(
    alg: JWA,
    signature: &[u8],
    message: &[u8],
    jwk: &JWK,
) -> Result<bool, JoseError> {
    let (_, parameters) = config(alg)?;
    let n = decode_parameter(jwk.parameters(), "n")?;
    let e = decode_parameter(jwk.parameters(), "e")?;

    let public_key = RsaPublicKeyComponents {
        n: trim_leading_zeros(&n),
        e: trim_leading_zeros(&e),
    };
    Ok(public_key.verify(parameters, message, signature).is_ok())
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use tokio_test::assert_err;

    use super::super::tests::{assert_round_trip, jwk};

    use super::*;

    const RSA_PRIVATE_KEY: &str = include_str!("../../../test_data/rsa_private_key.json");

    fn rsa() -> JWK {
        jwk(serde_json::from_str::<Value>(RSA_PRIVATE_KEY).unwrap())
    }

    #[test]
    fn round_trips() {
        let key = rsa();
        for alg in [
            JWA::RS256,
            JWA::RS384,
            JWA::RS512,
            JWA::PS256,
            JWA::PS384,
            JWA::PS512,
        ] {
            assert_round_trip(alg, &key);
        }
    }

    #[test]
    fn pkcs1_signatures_are_deterministic_and_pss_are_not() {
        let key = rsa();

        let first = JWA::RS256.sign(b"message", Some(&key)).unwrap();
        let second = JWA::RS256.sign(b"message", Some(&key)).unwrap();
        assert_eq!(first.len(), 256);
        assert_eq!(first, second);

        let first = JWA::PS256.sign(b"message", Some(&key)).unwrap();
        let second = JWA::PS256.sign(b"message", Some(&key)).unwrap();
        assert_eq!(first.len(), 256);
        assert_ne!(first, second);
    }

    #[test]
    fn padding_modes_do_not_cross_verify() {
        let key = rsa();
        let signature = JWA::RS256.sign(b"message", Some(&key)).unwrap();
        assert!(!JWA::PS256.verify(&signature, b"message", Some(&key)).unwrap());
        assert!(!JWA::RS384.verify(&signature, b"message", Some(&key)).unwrap());
    }

    #[test]
    fn public_key_cannot_sign() {
        let public = JWK::try_from_parameters(rsa().to_json(false)).unwrap();
        assert!(!public.is_private());
        assert_eq!(public.to_json(true).len(), 3);
        let error = assert_err!(JWA::RS256.sign(b"message", Some(&public)));
        assert_eq!(
            error.to_string(),
            "Cannot use a public json web key for signing a message."
        );
    }

    #[test]
    fn other_key_types_are_rejected() {
        let key = jwk(json!({"kty": "oct", "k": "qDM80igvja4Tg_tNsEuWDhl2bMM6_NgJEldFhIEuwqQ"}));
        let error = assert_err!(JWA::PS384.verify(b"sig", b"message", Some(&key)));
        assert_eq!(
            error.to_string(),
            "The json web signature algorithm \"PS384\" only accepts \"RSA\" json web keys."
        );
    }
}
