use base64::{Engine as _, prelude::BASE64_URL_SAFE_NO_PAD};
use jose::{
    BoxError, CertificateBundleFetcher, JWA, JWK, JWKS, JWS, JWSHeaders, JWSSerialization,
    JoseErrorKind, JoseHeader,
};
use serde_json::{Value, json};
use tokio_test::assert_err;

mod utils;

fn header(value: Value) -> JoseHeader {
    JoseHeader::try_from(value).unwrap()
}

fn decode(value: &str) -> Vec<u8> {
    BASE64_URL_SAFE_NO_PAD.decode(value).unwrap()
}

fn ed25519_key() -> JWK {
    JWK::try_from(json!({
        "kty": "OKP",
        "crv": "Ed25519",
        "d": "nWGxne_9WmC6hEr0kuwsxERJxWl7MmkZcDusAxyuf2A",
        "x": "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo",
    }))
    .unwrap()
}

fn hmac_key() -> JWK {
    JWK::try_from(json!({
        "kty": "oct",
        "kid": "hmac",
        "alg": "HS256",
        "use": "sig",
        "k": "qDM80igvja4Tg_tNsEuWDhl2bMM6_NgJEldFhIEuwqQ",
    }))
    .unwrap()
}

#[test]
fn compact_eddsa_signature_is_reproduced() {
    let jws = JWS::compact(
        header(json!({"alg": "EdDSA"})),
        "Example of Ed25519 signing",
    )
    .unwrap();
    assert_eq!(jws.serialization(), JWSSerialization::Compact);
    assert_eq!(
        jws.signing_input(0).unwrap(),
        "eyJhbGciOiJFZERTQSJ9.RXhhbXBsZSBvZiBFZDI1NTE5IHNpZ25pbmc"
    );

    let jwk = ed25519_key();
    let expected = decode(
        "hgyY0il_MGCjP0JzlnLWG1PPOt7-09PGcvMg3AIbQR6dWbhijcNR4ki4iylGjg5BhVsPt9g7sVvpAr_MuM0KAg",
    );
    assert_eq!(jws.sign(0, Some(&jwk)).unwrap(), expected);
    assert!(jws.verify(0, &expected, Some(&jwk)).unwrap());

    let mut tampered = expected;
    tampered[0] ^= 1;
    assert!(!jws.verify(0, &tampered, Some(&jwk)).unwrap());
}

#[test]
fn flattened_signature_with_certificate_bound_key() {
    let key = utils::certified_key("leaf");
    let jwk = JWK::try_from_parameters_with_policy(utils::params(key.members), &utils::policy())
        .unwrap();
    assert!(!key.pem.is_empty());

    let jws = JWS::flattened(
        header(json!({"alg": "ES256"})),
        header(json!({"kid": "leaf"})),
        r#"{"iss":"joe"}"#,
    )
    .unwrap();
    assert_eq!(jws.headers()[0].algorithm(), Some(JWA::ES256));

    let signature = jws.sign(0, Some(&jwk)).unwrap();
    assert_eq!(signature.len(), 64);

    let public = JWK::try_from_parameters_with_policy(jwk.to_json(false), &utils::policy())
        .unwrap();
    assert!(!public.is_private());
    assert!(jws.verify(0, &signature, Some(&public)).unwrap());

    let error = assert_err!(jws.sign(0, Some(&public)));
    assert_eq!(error.kind(), JoseErrorKind::InvalidJsonWebKey);
}

#[test]
fn general_serialization_signs_with_every_key() {
    let key = utils::certified_key("ec");
    let jwks = JWKS::from_keys(vec![
        JWK::try_from_parameters_with_policy(utils::params(key.members), &utils::policy())
            .unwrap(),
        hmac_key(),
    ]);

    let jws = JWS::general(
        vec![
            JWSHeaders::new(
                Some(header(json!({"alg": "ES256"}))),
                Some(header(json!({"kid": "ec"}))),
            ),
            JWSHeaders::new(None, Some(header(json!({"alg": "HS256", "kid": "hmac"})))),
        ],
        "payload",
    )
    .unwrap();

    for (index, entry) in jws.headers().iter().enumerate() {
        let kid = entry
            .unprotected()
            .and_then(|header| header.get("kid"))
            .and_then(Value::as_str);
        let jwk = jwks.get(|key| key.kid() == kid).unwrap();
        let signature = jws.sign(index, Some(jwk)).unwrap();
        assert!(jws.verify(index, &signature, Some(jwk)).unwrap());
    }

    assert_eq!(jws.signing_input(1).unwrap(), ".cGF5bG9hZA");

    let ec = jwks.get(|key| key.kid() == Some("ec")).unwrap();
    let error = assert_err!(jws.sign(1, Some(ec)));
    assert_eq!(
        error.to_string(),
        "The json web signature algorithm \"HS256\" only accepts \"oct\" json web keys."
    );
}

#[test]
fn malformed_header_sets_are_rejected() {
    let error = assert_err!(JWS::flattened(
        header(json!({"alg": "HS256", "kid": "a"})),
        header(json!({"kid": "b"})),
        "payload",
    ));
    assert_eq!(error.kind(), JoseErrorKind::InvalidJoseHeader);

    let error = assert_err!(JWS::general(
        vec![JWSHeaders::new(None, Some(header(json!({"kid": "a"}))))],
        "payload",
    ));
    assert_eq!(
        error.to_string(),
        "Missing required jose header parameter \"alg\"."
    );
}

struct PemBundle(String);

impl CertificateBundleFetcher for PemBundle {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, BoxError> {
        Ok(self.0.clone().into_bytes())
    }
}

#[tokio::test]
async fn key_loaded_through_x5u_signs() {
    let key = utils::certified_key("remote");
    let mut members = utils::params(key.members);
    members.remove("x5c");
    members.insert("x5u".to_owned(), json!("https://example.com/remote.pem"));

    let jwk = JWK::load(members, &utils::policy(), &PemBundle(key.pem))
        .await
        .unwrap();

    let signature = JWA::ES256.sign(b"message", Some(&jwk)).unwrap();
    assert!(JWA::ES256.verify(&signature, b"message", Some(&jwk)).unwrap());
}
