use base64::{
    Engine as _, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde_json::{Map, Value};

use crate::jose::{
    JoseError,
    constants::{
        DER_LENGTH_SHORT_FORM_MAX, DER_TAG_INTEGER, DER_TAG_SEQUENCE, INTEGER_SIGN_BIT_MASK,
        RSA_PRIVATE_KEY_VERSION,
    },
};

const LENIENT_DECODING: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_encode_padding(false)
    .with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// Base64url engine which encodes without padding and accepts padded input.
pub(crate) const BASE64_URL_LENIENT: GeneralPurpose =
    GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT_DECODING);

/// Standard base64 engine used by `x5c` entries, padding optional.
pub(crate) const BASE64_STANDARD_LENIENT: GeneralPurpose =
    GeneralPurpose::new(&alphabet::STANDARD, LENIENT_DECODING);

/// Base64url-decode the key parameter `name`.
///
/// A missing, non string or undecodable value is reported as an invalid parameter.
pub(crate) fn decode_parameter(
    parameters: &Map<String, Value>,
    name: &str,
) -> Result<Vec<u8>, JoseError> {
    parameters
        .get(name)
        .and_then(Value::as_str)
        .and_then(|value| BASE64_URL_LENIENT.decode(value).ok())
        .ok_or_else(|| JoseError::invalid_jwk_parameter(name))
}

pub(crate) fn encode_base64url(value: impl AsRef<[u8]>) -> String {
    BASE64_URL_LENIENT.encode(value)
}

/// Strip the leading zero octets of a big-endian unsigned integer.
pub(crate) fn trim_leading_zeros(value: &[u8]) -> &[u8] {
    let start = value
        .iter()
        .position(|byte| *byte != 0)
        .unwrap_or(value.len());
    value.get(start..).unwrap_or_default()
}

/// Two-prime private key members in the order of `RSAPrivateKey`.
pub(crate) struct RsaPrivateComponents<'a> {
    pub(crate) n: &'a [u8],
    pub(crate) e: &'a [u8],
    pub(crate) d: &'a [u8],
    pub(crate) p: &'a [u8],
    pub(crate) q: &'a [u8],
    pub(crate) dp: &'a [u8],
    pub(crate) dq: &'a [u8],
    pub(crate) qi: &'a [u8],
}

/// In appendix A.1.2 of [RFC 8017](https://datatracker.ietf.org/doc/rfc8017/) the
/// DER encoded private key format is defined as
///```rust,ignore
/// RSAPrivateKey ::= SEQUENCE {
///     version           Version,
///     modulus           INTEGER,  -- n
///     publicExponent    INTEGER,  -- e
///     privateExponent   INTEGER,  -- d
///     prime1            INTEGER,  -- p
///     prime2            INTEGER,  -- q
///     exponent1         INTEGER,  -- d mod (p-1)
///     exponent2         INTEGER,  -- d mod (q-1)
///     coefficient       INTEGER,  -- (inverse of q) mod p
/// }
///```
/// `SEQUENCE` here is a DER encoded representation of a byte sequence defined in section 8.9 of
/// [X.690](https://www.itu.int/ITU-T/studygroups/com17/languages/X.690-0207.pdf).
///
/// `INTEGER` here is a DER encoded representation of an integer defined in section 8.3 of
/// [X.690](https://www.itu.int/ITU-T/studygroups/com17/languages/X.690-0207.pdf).
pub(crate) fn create_rsa_private_key(components: &RsaPrivateComponents<'_>) -> Vec<u8> {
    let members = [
        &[RSA_PRIVATE_KEY_VERSION][..],
        components.n,
        components.e,
        components.d,
        components.p,
        components.q,
        components.dp,
        components.dq,
        components.qi,
    ];

    let content: Vec<u8> = members.into_iter().flat_map(encode_integer).collect();
    let len_encoding = encode_der_length(content.len());

    let mut result = Vec::with_capacity(1 + len_encoding.len() + content.len());
    result.push(DER_TAG_SEQUENCE);
    result.extend_from_slice(&len_encoding);
    result.extend(content);
    result
}

/// This function is an implementation of length encoding as defined in section 8.1.3
/// [ITU X.690](https://www.itu.int/ITU-T/studygroups/com17/languages/X.690-0207.pdf) specification.
fn encode_der_length(len: usize) -> Vec<u8> {
    if let Ok(short) = u8::try_from(len)
        && len <= DER_LENGTH_SHORT_FORM_MAX
    {
        return vec![short];
    }

    let len_bytes: Vec<u8> = len
        .to_be_bytes()
        .into_iter()
        .skip_while(|byte| *byte == 0)
        .collect();
    // at most size_of::<usize>() octets, always fits
    let count = len_bytes.len() as u8;

    let mut result = Vec::with_capacity(1 + len_bytes.len());
    result.push(INTEGER_SIGN_BIT_MASK | count);
    result.extend(len_bytes);
    result
}

/// This function is a minimal implementation of DER encoded integers as defined in the
/// [ITU X.690](https://www.itu.int/ITU-T/studygroups/com17/languages/X.690-0207.pdf) specification.
///
/// Hence, it should only be used for encoding JWK RSA members, which are
/// big-endian unsigned integers. The function should ***NOT*** be used
/// for general ASN.1 encoded values.
fn encode_integer(value: &[u8]) -> Vec<u8> {
    let value = match trim_leading_zeros(value) {
        [] => &[0][..],
        trimmed => trimmed,
    };
    let needs_leading_zero = value
        .first()
        .is_some_and(|byte| byte & INTEGER_SIGN_BIT_MASK != 0);
    let value_len = value.len() + usize::from(needs_leading_zero);
    let len_bytes = encode_der_length(value_len);

    let mut result = Vec::with_capacity(1 + len_bytes.len() + value_len);
    result.push(DER_TAG_INTEGER);
    result.extend_from_slice(&len_bytes);
    if needs_leading_zero {
        result.push(0);
    }
    result.extend_from_slice(value);
    result
}
