//! Validation and signature cryptography of JOSE objects.
//!
//! This includes:
//! - JSON Web Keys and Key Sets, including bound X.509 certificate chains
//! - JOSE headers and the header sets of JSON Web Signatures
//! - JWS signing and verification with HMAC, ECDSA, EdDSA and RSA
//!
//! # Jose
//!
//! Crate used by the end-user `jose` crate, which re-exports everything below.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod jose;

pub mod dep {
    //! Dependencies for jose crypto modules.
    //!
    //! Exported for your convenience

    pub mod aws_lc_rs {
        //! Re-export of the [`aws-lc-rs`] crate.
        //!
        //! [`aws-lc-rs`]: https://docs.rs/aws-lc-rs

        #[doc(inline)]
        pub use aws_lc_rs::*;
    }

    pub mod pki_types {
        //! Re-export of the [`rustls-pki-types`] crate.
        //!
        //! [`rustls-pki-types`]: https://docs.rs/rustls-pki-types

        #[doc(inline)]
        pub use rustls_pki_types::*;
    }

    pub mod serde_json {
        //! Re-export of the [`serde_json`] crate.
        //!
        //! [`serde_json`]: https://docs.rs/serde_json

        #[doc(inline)]
        pub use serde_json::*;
    }

    pub mod x509_parser {
        //! Re-export of the [`x509_parser`] crate.
        //!
        //! [`x509_parser`]: https://docs.rs/x509_parser

        #[doc(inline)]
        pub use x509_parser::*;
    }
}
