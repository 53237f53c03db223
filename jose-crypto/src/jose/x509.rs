//! Validation of the X.509 certificate chain bound to a [`JWK`].
//!
//! A key can carry its certificate chain inline (`x5c`) or reference it
//! through a URL (`x5u`). Either way the chain is an ordered list of
//! certificates where the first one holds the public key of the [`JWK`] and
//! every certificate is signed by the one that follows it. Only the links
//! of the supplied chain are checked: no trust anchor lookup or revocation
//! checking takes place.
//!
//! [`JWK`]: crate::jose::JWK

use std::{
    future::Future,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use aws_lc_rs::digest::{self, SHA1_FOR_LEGACY_USE_ONLY, SHA256};
use base64::Engine as _;
use rustls_pki_types::{CertificateDer, pem::PemObject as _};
use serde_json::{Map, Value};
use x509_parser::{
    certificate::X509Certificate, parse_x509_certificate, public_key::PublicKey,
};

use crate::jose::{
    BoxError, JoseError, JoseErrorKind,
    constants::DEFAULT_FETCH_TIMEOUT_SECS,
    error::ErrorContext as _,
    jwk_utils::{BASE64_STANDARD_LENIENT, BASE64_URL_LENIENT, encode_base64url, trim_leading_zeros},
};

const OID_EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";
const OID_ED25519: &str = "1.3.101.112";
const OID_ED448: &str = "1.3.101.113";
const OID_X25519: &str = "1.3.101.110";
const OID_X448: &str = "1.3.101.111";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Policy applied while validating the certificate chain of a [`JWK`].
///
/// [`JWK`]: crate::jose::JWK
pub struct X509Policy {
    verification_time: Option<SystemTime>,
    fetch_timeout: Duration,
}

impl Default for X509Policy {
    fn default() -> Self {
        Self {
            verification_time: None,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

impl X509Policy {
    /// Create a new [`X509Policy`], checking validity against the
    /// system clock and fetching `x5u` bundles with a 10 second timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check certificate validity at the given time instead of the system clock.
    #[must_use]
    pub fn with_verification_time(mut self, time: SystemTime) -> Self {
        self.verification_time = Some(time);
        self
    }

    /// Check certificate validity at the given time instead of the system clock.
    pub fn set_verification_time(&mut self, time: SystemTime) -> &mut Self {
        self.verification_time = Some(time);
        self
    }

    /// Maximum time to wait for the certificate bundle referenced by `x5u`.
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Maximum time to wait for the certificate bundle referenced by `x5u`.
    pub fn set_fetch_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Time at which certificate validity is checked, `None` meaning the system clock.
    #[must_use]
    pub fn verification_time(&self) -> Option<SystemTime> {
        self.verification_time
    }

    /// Maximum time to wait for the certificate bundle referenced by `x5u`.
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    fn unix_time(&self) -> i64 {
        let now = self.verification_time.unwrap_or_else(SystemTime::now);
        match now.duration_since(UNIX_EPOCH) {
            Ok(since) => i64::try_from(since.as_secs()).unwrap_or(i64::MAX),
            Err(before) => i64::try_from(before.duration().as_secs()).map_or(i64::MIN, |secs| -secs),
        }
    }
}

/// Retrieves the PEM certificate bundle referenced by the `x5u` member of a [`JWK`].
///
/// Implementations perform the network request, the caller bounds it
/// with [`X509Policy::fetch_timeout`]. No retries are performed.
///
/// [`JWK`]: crate::jose::JWK
pub trait CertificateBundleFetcher: Send + Sync {
    /// Fetch the raw body found at `url`.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, BoxError>> + Send;
}

/// Where the certificate chain of a key comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CertificateSource<'a> {
    Chain,
    Url(&'a str),
}

impl<'a> CertificateSource<'a> {
    /// Check how the X.509 members of a key relate to each other.
    ///
    /// Returns `None` when the key has no X.509 members at all.
    pub(crate) fn from_parameters(
        parameters: &'a Map<String, Value>,
    ) -> Result<Option<Self>, JoseError> {
        let x5u = parameters.get("x5u").and_then(Value::as_str);
        let has_x5c = parameters.contains_key("x5c");
        let has_x5t = parameters.contains_key("x5t");
        let has_x5t_s256 = parameters.contains_key("x5t#S256");

        match (x5u, has_x5c) {
            (Some(_), true) => Err(JoseError::invalid_jwk(
                "The parameters \"x5u\" and \"x5c\" cannot be used together.",
            )),
            (Some(url), false) => Ok(Some(Self::Url(url))),
            (None, true) => Ok(Some(Self::Chain)),
            (None, false) => match (has_x5t, has_x5t_s256) {
                (true, true) => Err(JoseError::invalid_jwk(
                    "The parameters \"x5t\" and \"x5t#S256\" require one of \"x5u\" or \"x5c\".",
                )),
                (true, false) => Err(JoseError::invalid_jwk(
                    "The parameter \"x5t\" requires one of \"x5u\" or \"x5c\".",
                )),
                (false, true) => Err(JoseError::invalid_jwk(
                    "The parameter \"x5t#S256\" requires one of \"x5u\" or \"x5c\".",
                )),
                (false, false) => Ok(None),
            },
        }
    }
}

/// Ordered list of DER certificates, leaf first.
#[derive(Debug, Clone)]
pub(crate) struct CertificateChain {
    parameter: &'static str,
    certificates: Vec<CertificateDer<'static>>,
}

impl CertificateChain {
    /// Decode the base64 DER certificates of the `x5c` member.
    pub(crate) fn from_x5c(parameters: &Map<String, Value>) -> Result<Self, JoseError> {
        let entries = parameters
            .get("x5c")
            .and_then(Value::as_array)
            .filter(|entries| !entries.is_empty())
            .ok_or_else(|| JoseError::invalid_jwk_parameter("x5c"))?;

        let certificates = entries
            .iter()
            .map(|entry| {
                let encoded = entry
                    .as_str()
                    .ok_or_else(|| JoseError::invalid_jwk_parameter("x5c"))?;
                BASE64_STANDARD_LENIENT
                    .decode(encoded)
                    .map(CertificateDer::from)
                    .jose_context(JoseErrorKind::InvalidJsonWebKey, invalid_certificate("x5c"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            parameter: "x5c",
            certificates,
        })
    }

    /// Extract the certificates of a PEM bundle, in the order they appear.
    pub(crate) fn from_pem_bundle(bundle: &[u8]) -> Result<Self, JoseError> {
        let certificates = CertificateDer::pem_slice_iter(bundle)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|error| error.to_string())
            .jose_context(JoseErrorKind::InvalidJsonWebKey, invalid_certificate("x5u"))?;

        if certificates.is_empty() {
            return Err(JoseError::invalid_jwk(invalid_certificate("x5u")));
        }

        Ok(Self {
            parameter: "x5u",
            certificates,
        })
    }

    /// Fetch and parse the bundle at `url`, waiting at most [`X509Policy::fetch_timeout`].
    pub(crate) async fn fetch<F>(
        url: &str,
        policy: &X509Policy,
        fetcher: &F,
    ) -> Result<Self, JoseError>
    where
        F: CertificateBundleFetcher,
    {
        tracing::trace!(url, timeout = ?policy.fetch_timeout, "fetching x5u certificate bundle");

        let body = match tokio::time::timeout(policy.fetch_timeout, fetcher.fetch(url)).await {
            Ok(Ok(body)) => body,
            Ok(Err(error)) => {
                tracing::debug!(url, "failed to fetch x5u certificate bundle: {error}");
                return Err(fetch_failure().with_cause(error));
            }
            Err(elapsed) => {
                tracing::debug!(url, "timed out fetching x5u certificate bundle");
                return Err(fetch_failure().with_cause(elapsed));
            }
        };

        let chain = Self::from_pem_bundle(&body)?;
        tracing::trace!(
            url,
            certificates = chain.certificates.len(),
            "fetched x5u certificate bundle"
        );
        Ok(chain)
    }

    /// Validate this chain against the members of the key it is bound to.
    pub(crate) fn validate(
        &self,
        parameters: &Map<String, Value>,
        policy: &X509Policy,
    ) -> Result<(), JoseError> {
        let parsed = self
            .certificates
            .iter()
            .map(|der| match parse_x509_certificate(der) {
                Ok(([], certificate)) => Ok(certificate),
                Ok(_) => Err(BoxError::from("trailing data after certificate")),
                Err(error) => Err(BoxError::from(error.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()
            .jose_context(
                JoseErrorKind::InvalidJsonWebKey,
                invalid_certificate(self.parameter),
            )?;

        let now = policy.unix_time();
        for certificate in &parsed {
            let validity = certificate.validity();
            if validity.not_before.timestamp() > now {
                return Err(JoseError::invalid_jwk(
                    "The provided certificate is not yet valid.",
                ));
            }
            if validity.not_after.timestamp() < now {
                return Err(JoseError::invalid_jwk(
                    "The provided certificate is expired.",
                ));
            }
        }

        let (Some(leaf), Some(leaf_der)) = (parsed.first(), self.certificates.first()) else {
            return Err(JoseError::invalid_jwk(invalid_certificate(self.parameter)));
        };

        let exported = export_public_parameters(leaf).ok_or_else(key_mismatch)?;
        let matches_key = exported.iter().all(|(name, value)| {
            parameters.get(*name).and_then(Value::as_str) == Some(value.as_str())
        });
        if !matches_key {
            return Err(key_mismatch());
        }

        if let Some(x5t) = parameters.get("x5t").and_then(Value::as_str)
            && !fingerprint_matches(&SHA1_FOR_LEGACY_USE_ONLY, leaf_der, x5t)
        {
            return Err(JoseError::invalid_jwk(
                "The certificate's SHA-1 Fingerprint does not match the value at \"x5t\".",
            ));
        }

        if let Some(x5t_s256) = parameters.get("x5t#S256").and_then(Value::as_str)
            && !fingerprint_matches(&SHA256, leaf_der, x5t_s256)
        {
            return Err(JoseError::invalid_jwk(
                "The certificate's SHA-256 Fingerprint does not match the value at \"x5t#S256\".",
            ));
        }

        for (index, link) in parsed.windows(2).enumerate() {
            let [certificate, issuer] = link else {
                continue;
            };
            certificate
                .verify_signature(Some(issuer.public_key()))
                .map_err(|error| error.to_string())
                .jose_context(
                    JoseErrorKind::InvalidJsonWebKey,
                    "A certificate in the chain was not successfully verified.",
                )?;
            tracing::trace!(index, "certificate verified by its issuer");
        }

        Ok(())
    }
}

fn invalid_certificate(parameter: &str) -> String {
    format!("The parameter \"{parameter}\" contains an invalid certificate.")
}

fn key_mismatch() -> JoseError {
    JoseError::invalid_jwk("The provided certificate did not sign the json web key.")
}

fn fetch_failure() -> JoseError {
    JoseError::invalid_jwk("The certificate bundle referenced by \"x5u\" could not be fetched.")
}

fn fingerprint_matches(algorithm: &'static digest::Algorithm, der: &[u8], expected: &str) -> bool {
    BASE64_URL_LENIENT
        .decode(expected)
        .is_ok_and(|expected| digest::digest(algorithm, der).as_ref() == expected.as_slice())
}

/// Public members of the JWK equivalent to the key of `certificate`.
fn export_public_parameters(
    certificate: &X509Certificate<'_>,
) -> Option<Vec<(&'static str, String)>> {
    let spki = certificate.public_key();
    let key: &[u8] = &spki.subject_public_key.data;

    match spki.algorithm.algorithm.to_id_string().as_str() {
        OID_EC_PUBLIC_KEY => {
            // uncompressed point: 0x04 || x || y
            let (crv, coordinate_len) = match key.len() {
                65 => ("P-256", 32),
                97 => ("P-384", 48),
                133 => ("P-521", 66),
                _ => return None,
            };
            let (x, y) = key.get(1..)?.split_at(coordinate_len);
            Some(vec![
                ("kty", "EC".to_owned()),
                ("crv", crv.to_owned()),
                ("x", encode_base64url(x)),
                ("y", encode_base64url(y)),
            ])
        }
        oid @ (OID_ED25519 | OID_ED448 | OID_X25519 | OID_X448) => {
            let crv = match oid {
                OID_ED25519 => "Ed25519",
                OID_ED448 => "Ed448",
                OID_X25519 => "X25519",
                _ => "X448",
            };
            Some(vec![
                ("kty", "OKP".to_owned()),
                ("crv", crv.to_owned()),
                ("x", encode_base64url(key)),
            ])
        }
        _ => match spki.parsed().ok()? {
            PublicKey::RSA(rsa) => Some(vec![
                ("kty", "RSA".to_owned()),
                ("n", encode_base64url(trim_leading_zeros(rsa.modulus))),
                ("e", encode_base64url(trim_leading_zeros(rsa.exponent))),
            ]),
            _ => None,
        },
    }
}
