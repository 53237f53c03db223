pub(crate) use der_encoding_tags::*;

mod der_encoding_tags {
    /// Identifier tag for a DER encoded integer.
    /// Defined in [ITU X.680](https://www.itu.int/ITU-T/studygroups/com17/languages/X.680-0207.pdf).
    pub(crate) const DER_TAG_INTEGER: u8 = 0x02;
    /// Identifier tag for a DER encoded sequence.
    /// Defined in [ITU X.680](https://www.itu.int/ITU-T/studygroups/com17/languages/X.680-0207.pdf).
    pub(crate) const DER_TAG_SEQUENCE: u8 = 0x30;
    /// Maximum length of a DER encoded length in short form.
    /// Defined in [ITU X.690](https://www.itu.int/ITU-T/studygroups/com17/languages/X.690-0207.pdf).
    pub(crate) const DER_LENGTH_SHORT_FORM_MAX: usize = 127;
}

// Integer encoding constants
pub(crate) const INTEGER_SIGN_BIT_MASK: u8 = 0x80;

/// `version` of a two-prime `RSAPrivateKey`, see appendix A.1.2 of
/// [RFC 8017](https://datatracker.ietf.org/doc/rfc8017/).
pub(crate) const RSA_PRIVATE_KEY_VERSION: u8 = 0x00;

/// Header parameter names registered by JWS and JWE.
///
/// Processors must understand these, so listing them in `crit` is an error.
pub(crate) const RESERVED_HEADER_PARAMETERS: [&str; 20] = [
    "alg", "enc", "zip", "jku", "jwk", "kid", "x5u", "x5c", "x5t", "x5t#S256", "typ", "cty",
    "crit", "epk", "apu", "apv", "iv", "tag", "p2s", "p2c",
];

/// Private members of an RSA key using the Chinese Remainder Theorem representation.
pub(crate) const RSA_PRIVATE_PARAMETERS: [&str; 6] = ["d", "p", "q", "dp", "dq", "qi"];

/// Private member of an elliptic curve or octet key pair key.
pub(crate) const CURVE_PRIVATE_PARAMETERS: [&str; 1] = ["d"];

/// Secret member of a symmetric key.
pub(crate) const OCT_PRIVATE_PARAMETERS: [&str; 1] = ["k"];

/// Default bound on fetching the certificate bundle referenced by `x5u`, in seconds.
pub(crate) const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
