//! # JOSE: JSON Object Signing and Encryption
//!
//! JOSE is an IETF standard for securely transferring data between parties using JSON.
//! This module validates the JSON shapes JOSE is built from and performs the
//! signature cryptography of JWS:
//!
//! * JWK (JSON Web Key): a JSON representation of a cryptographic key. A [`JWK`]
//!   is validated against the members of its key type, the consistency of its
//!   `use` and `key_ops`, and the X.509 certificate chain bound to it, if any.
//!   See [`rfc7517`] for more details.
//!
//! * JWKS (JSON Web Key Set): an ordered set of keys with predicate lookups.
//!
//! * JWS (JSON Web Signature): protected and unprotected headers of one or
//!   more signatures over a payload. A [`JWS`] is assembled for one of the
//!   three serializations and checks the headers of every signature.
//!   See [`rfc7515`] for more details.
//!
//! * JWA (JSON Web Algorithm): the closed set of signature algorithms. Every
//!   [`JWA`] checks that a key may be used by it before signing or verifying.
//!   Encryption algorithms are only known by name. See [`rfc7518`] and
//!   [`rfc8037`] for more details.
//!
//! [`rfc7515`]: https://datatracker.ietf.org/doc/html/rfc7515
//! [`rfc7517`]: https://datatracker.ietf.org/doc/html/rfc7517
//! [`rfc7518`]: https://datatracker.ietf.org/doc/html/rfc7518
//! [`rfc8037`]: https://datatracker.ietf.org/doc/html/rfc8037

mod constants;
mod jwk_utils;

mod error;
pub use error::{BoxError, JoseError, JoseErrorKind};

mod jwa;
pub use jwa::{JWA, JWECompression, JWEContentEncryption, JWEAlgorithm, JWSOperation};

mod kty;
pub use kty::{JWKEllipticCurves, JWKOctetKeyPairCurves, JWKType};

mod jwk;
pub use jwk::{JWK, JWKKeyOp, JWKUse, ThumbprintHash};

mod jwks;
pub use jwks::JWKS;

mod header;
pub use header::JoseHeader;

mod jws;
pub use jws::{JWS, JWSHeaders, JWSSerialization};

mod x509;
pub use x509::{CertificateBundleFetcher, X509Policy};
