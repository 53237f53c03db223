use std::time::{Duration, UNIX_EPOCH};

use base64::{
    Engine as _,
    prelude::{BASE64_STANDARD, BASE64_URL_SAFE_NO_PAD},
};
use jose::{
    X509Policy,
    dep::aws_lc_rs::{
        encoding::AsBigEndian as _,
        signature::{ECDSA_P256_SHA256_FIXED_SIGNING, EcdsaKeyPair},
    },
};
use rcgen::{CertificateParams, KeyPair, PKCS_ECDSA_P256_SHA256, date_time_ymd};
use serde_json::{Map, Value, json};

/// An EC P-256 key together with the self-signed certificate holding it.
pub(crate) struct CertifiedKey {
    /// Private key members, including `x5c`.
    pub(crate) members: Value,
    pub(crate) pem: String,
}

pub(crate) fn certified_key(name: &str) -> CertifiedKey {
    let key_pair = KeyPair::generate_for(&PKCS_ECDSA_P256_SHA256).unwrap();

    let mut params = CertificateParams::new(vec![format!("{name}.example")]).unwrap();
    params.not_before = date_time_ymd(2020, 1, 1);
    params.not_after = date_time_ymd(2030, 1, 1);
    let certificate = params.self_signed(&key_pair).unwrap();

    let d = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &key_pair.serialize_der())
        .unwrap()
        .private_key()
        .as_be_bytes()
        .unwrap();
    let point = key_pair.public_key_raw();
    let (x, y) = point[1..].split_at(32);

    CertifiedKey {
        members: json!({
            "kty": "EC",
            "kid": name,
            "crv": "P-256",
            "x": BASE64_URL_SAFE_NO_PAD.encode(x),
            "y": BASE64_URL_SAFE_NO_PAD.encode(y),
            "d": BASE64_URL_SAFE_NO_PAD.encode(d.as_ref()),
            "x5c": [BASE64_STANDARD.encode(certificate.der())],
        }),
        pem: certificate.pem(),
    }
}

/// Checks certificates on 2025-06-15, inside the window of [`certified_key`].
pub(crate) fn policy() -> X509Policy {
    X509Policy::new().with_verification_time(UNIX_EPOCH + Duration::from_secs(1_750_000_000))
}

pub(crate) fn params(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected a json object"),
    }
}
