//! Names registered for JSON Web Encryption in [`rfc7516`] and [`rfc7518`]
//!
//! Only the names are known here: a `jwk` may declare one of them as its
//! `alg` and a header may carry them, but no encryption is performed.
//!
//! [`rfc7516`]: https://datatracker.ietf.org/doc/html/rfc7516
//! [`rfc7518`]: https://datatracker.ietf.org/doc/html/rfc7518

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::jose::JoseError;

macro_rules! registered_names {
    (
        $(#[$meta:meta])*
        $name:ident, $parameter:literal, [$($variant:ident => $value:literal,)+]
    ) => {
        $(#[$meta])*
        #[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[doc = concat!("`", $value, "`")]
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            #[doc = concat!("All registered `", $parameter, "` values.")]
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Registered name.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = JoseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|value| value.as_str() == s)
                    .ok_or_else(|| JoseError::invalid_header_parameter($parameter))
            }
        }
    };
}

registered_names!(
    /// Key management algorithms (`alg`) of a JSON Web Encryption
    JWEAlgorithm,
    "alg",
    [
        A128GCMKW => "A128GCMKW",
        A128KW => "A128KW",
        A192GCMKW => "A192GCMKW",
        A192KW => "A192KW",
        A256GCMKW => "A256GCMKW",
        A256KW => "A256KW",
        EcdhEs => "ECDH-ES",
        EcdhEsA128KW => "ECDH-ES+A128KW",
        EcdhEsA192KW => "ECDH-ES+A192KW",
        EcdhEsA256KW => "ECDH-ES+A256KW",
        Pbes2Hs256A128KW => "PBES2-HS256+A128KW",
        Pbes2Hs384A192KW => "PBES2-HS384+A192KW",
        Pbes2Hs512A256KW => "PBES2-HS512+A256KW",
        RsaOaep => "RSA-OAEP",
        RsaOaep256 => "RSA-OAEP-256",
        RsaOaep384 => "RSA-OAEP-384",
        RsaOaep512 => "RSA-OAEP-512",
        RsaPkcs1 => "RSA1_5",
        Dir => "dir",
    ]
);

registered_names!(
    /// Content encryption algorithms (`enc`) of a JSON Web Encryption
    JWEContentEncryption,
    "enc",
    [
        A128CbcHs256 => "A128CBC-HS256",
        A128GCM => "A128GCM",
        A192CbcHs384 => "A192CBC-HS384",
        A192GCM => "A192GCM",
        A256CbcHs512 => "A256CBC-HS512",
        A256GCM => "A256GCM",
    ]
);

registered_names!(
    /// Compression algorithms (`zip`) of a JSON Web Encryption
    JWECompression,
    "zip",
    [
        Deflate => "DEF",
    ]
);
