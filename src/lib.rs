//! Validation and signature cryptography for JOSE (JSON Object Signing and Encryption).
//!
//! `jose` checks the JSON objects JOSE is built from before they are trusted
//! and performs the cryptography of JSON Web Signatures:
//!
//! | category | support list |
//! |-|-|
//! | ✅ [JWK] | ✅ `EC` ⸱ ✅ `OKP` ⸱ ✅ `RSA` ⸱ ✅ `oct` ⸱ ✅ `use`/`key_ops` ⸱ ✅ [thumbprints](JWK::thumbprint) ⸱ ✅ `x5c` ⸱ ✅ [`x5u`](JWK::load) |
//! | ✅ [JWKS] | ✅ ordered sets ⸱ ✅ [predicate lookups](JWKS::get) |
//! | ✅ [JWS] | ✅ compact ⸱ ✅ flattened ⸱ ✅ general ⸱ ✅ `crit` |
//! | ✅ [JWA] | ✅ `HS*` ⸱ ✅ `ES*` ⸱ ✅ `EdDSA` (Ed25519) ⸱ ✅ `RS*` ⸱ ✅ `PS*` ⸱ ✅ `none` |
//! | 🏗️ JWE | ✅ [algorithm](JWEAlgorithm) and [encryption](JWEContentEncryption) names ⸱ ❌ encryption |
//!
//! Keys are validated when they are created, so a [`JWK`] value is always
//! well formed. Signing and verification check that the key may be used by
//! the algorithm before any cryptography takes place:
//!
//! ```
//! use jose::{JWA, JWK};
//! use serde_json::json;
//!
//! let jwk = JWK::try_from(json!({
//!     "kty": "oct",
//!     "alg": "HS256",
//!     "k": "qDM80igvja4Tg_tNsEuWDhl2bMM6_NgJEldFhIEuwqQ",
//! }))?;
//!
//! let signature = JWA::HS256.sign(b"payload", Some(&jwk))?;
//! assert!(JWA::HS256.verify(&signature, b"payload", Some(&jwk))?);
//! assert!(JWA::HS384.sign(b"payload", Some(&jwk)).is_err());
//! # Ok::<(), jose::JoseError>(())
//! ```
//!
//! Certificate chains bound to a key through `x5u` are fetched by a
//! [`CertificateBundleFetcher`] of your choice, bounded by the timeout of
//! the [`X509Policy`].
//!
//! The cryptography is provided by [`aws-lc-rs`](https://docs.rs/aws-lc-rs),
//! logging goes through [`tracing`](https://docs.rs/tracing).

#![cfg_attr(docsrs, feature(doc_cfg))]

#[doc(inline)]
pub use jose_crypto::jose::*;

pub mod dep {
    //! Dependencies for jose.
    //!
    //! Exported for your convenience.

    #[doc(inline)]
    pub use ::jose_crypto::dep::*;

    pub mod jose_crypto {
        //! Re-export of the [`jose-crypto`] crate.
        //!
        //! [`jose-crypto`]: https://docs.rs/jose-crypto

        #[doc(inline)]
        pub use ::jose_crypto::*;
    }
}
