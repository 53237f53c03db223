use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::jose::{
    JWA, JWK, JoseError, JoseErrorKind, JoseHeader, error::ErrorContext as _,
    jwk_utils::BASE64_URL_LENIENT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Serialization a [`JWS`] was assembled for, see [`rfc7515`] section 7
///
/// [`rfc7515`]: https://datatracker.ietf.org/doc/html/rfc7515#section-7
pub enum JWSSerialization {
    /// Single protected header, `header.payload.signature`
    Compact,
    /// JSON serialization with a single signature
    Flattened,
    /// JSON serialization with one or more signatures
    General,
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
/// [`JWSHeaders`] holds the protected and unprotected header of one signature
///
/// Either half may be absent. When both are present their parameter
/// names must not overlap.
pub struct JWSHeaders {
    protected: Option<JoseHeader>,
    unprotected: Option<JoseHeader>,
}

impl JWSHeaders {
    /// Create headers for a single signature.
    ///
    /// Nothing is validated until the headers are used to create a [`JWS`].
    #[must_use]
    pub fn new(protected: Option<JoseHeader>, unprotected: Option<JoseHeader>) -> Self {
        Self {
            protected,
            unprotected,
        }
    }

    /// The integrity protected header, if any.
    #[must_use]
    pub fn protected(&self) -> Option<&JoseHeader> {
        self.protected.as_ref()
    }

    /// The unprotected header, if any.
    #[must_use]
    pub fn unprotected(&self) -> Option<&JoseHeader> {
        self.unprotected.as_ref()
    }

    /// Signature algorithm named by either half.
    #[must_use]
    pub fn algorithm(&self) -> Option<JWA> {
        [self.protected.as_ref(), self.unprotected.as_ref()]
            .into_iter()
            .flatten()
            .find_map(|header| header.get("alg"))
            .and_then(Value::as_str)
            .and_then(|alg| alg.parse().ok())
    }

    /// Base64url encoded protected header, empty when there is none.
    pub fn encoded_protected(&self) -> Result<String, JoseError> {
        let Some(protected) = &self.protected else {
            return Ok(String::new());
        };
        let bytes = serde_json::to_vec(protected).jose_context(
            JoseErrorKind::InvalidJoseHeader,
            "The protected jose header could not be serialized.",
        )?;
        Ok(BASE64_URL_LENIENT.encode(bytes))
    }

    fn validate(&self) -> Result<(), JoseError> {
        if let Some(protected) = &self.protected {
            validate_algorithm(protected)?;
            protected.validate_protected()?;
        }
        if let Some(unprotected) = &self.unprotected {
            validate_algorithm(unprotected)?;
            unprotected.validate_unprotected()?;
        }

        if let (Some(protected), Some(unprotected)) = (&self.protected, &self.unprotected) {
            let shared = protected.shared_names(unprotected);
            if !shared.is_empty() {
                return Err(JoseError::invalid_jose_header(format!(
                    "The protected and unprotected jose headers must be disjoint. Shared parameters: {}.",
                    shared
                        .iter()
                        .map(|name| format!("\"{name}\""))
                        .collect::<Vec<_>>()
                        .join(", ")
                )));
            }
        }

        if self.algorithm().is_none() {
            return Err(JoseError::invalid_jws(
                "Missing required jose header parameter \"alg\".",
            ));
        }
        Ok(())
    }
}

/// `alg`, when present, must name a supported signature algorithm.
fn validate_algorithm(header: &JoseHeader) -> Result<(), JoseError> {
    match header.get("alg") {
        None => Ok(()),
        Some(alg) if alg.as_str().is_some_and(|alg| alg.parse::<JWA>().is_ok()) => Ok(()),
        Some(_) => Err(JoseError::invalid_header_parameter("alg")),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// [`JWS`] or JSON Web Signature as defined in [`rfc7515`]
///
/// A [`JWS`] pairs a payload with the validated headers of each of its
/// signatures. Producing the final token encoding is up to the caller;
/// the signing input of every signature is available through
/// [`JWS::signing_input`].
///
/// [`rfc7515`]: https://datatracker.ietf.org/doc/html/rfc7515
pub struct JWS {
    serialization: JWSSerialization,
    headers: Vec<JWSHeaders>,
    payload: Vec<u8>,
}

impl JWS {
    /// Assemble a [`JWS`] for the compact serialization.
    ///
    /// The protected header is the only header and must name the algorithm.
    pub fn compact(protected: JoseHeader, payload: impl Into<Vec<u8>>) -> Result<Self, JoseError> {
        if !protected.get("alg").is_some_and(Value::is_string) {
            return Err(reject(JoseError::invalid_header_parameter("alg")));
        }
        Self::assemble(
            JWSSerialization::Compact,
            vec![JWSHeaders::new(Some(protected), None)],
            payload.into(),
        )
    }

    /// Assemble a [`JWS`] for the flattened JSON serialization.
    pub fn flattened(
        protected: JoseHeader,
        unprotected: JoseHeader,
        payload: impl Into<Vec<u8>>,
    ) -> Result<Self, JoseError> {
        Self::assemble(
            JWSSerialization::Flattened,
            vec![JWSHeaders::new(Some(protected), Some(unprotected))],
            payload.into(),
        )
    }

    /// Assemble a [`JWS`] for the general JSON serialization, one entry per signature.
    pub fn general(
        headers: Vec<JWSHeaders>,
        payload: impl Into<Vec<u8>>,
    ) -> Result<Self, JoseError> {
        if headers.is_empty() {
            return Err(reject(JoseError::invalid_jws(
                "A json web signature requires at least one signature.",
            )));
        }
        Self::assemble(JWSSerialization::General, headers, payload.into())
    }

    fn assemble(
        serialization: JWSSerialization,
        headers: Vec<JWSHeaders>,
        payload: Vec<u8>,
    ) -> Result<Self, JoseError> {
        for entry in &headers {
            entry.validate().map_err(reject)?;
        }

        tracing::debug!(
            ?serialization,
            signatures = headers.len(),
            "json web signature headers accepted"
        );
        Ok(Self {
            serialization,
            headers,
            payload,
        })
    }

    /// Cheap check whether `data` looks like a JWS header: an object whose
    /// `alg` is a supported signature algorithm.
    #[must_use]
    pub fn is_jws_header(data: &Value) -> bool {
        data.get("alg")
            .and_then(Value::as_str)
            .is_some_and(|alg| alg.parse::<JWA>().is_ok())
    }

    /// Serialization this [`JWS`] was assembled for.
    #[must_use]
    pub fn serialization(&self) -> JWSSerialization {
        self.serialization
    }

    /// Headers of every signature, in order.
    #[must_use]
    pub fn headers(&self) -> &[JWSHeaders] {
        &self.headers
    }

    /// Raw payload bytes, before base64url encoding.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// `ASCII(BASE64URL(protected) || '.' || BASE64URL(payload))` of the signature at `index`.
    pub fn signing_input(&self, index: usize) -> Result<String, JoseError> {
        let headers = self.entry(index)?;
        Ok(format!(
            "{}.{}",
            headers.encoded_protected()?,
            BASE64_URL_LENIENT.encode(&self.payload)
        ))
    }

    /// Sign the signing input of the signature at `index` with its algorithm.
    pub fn sign(&self, index: usize, jwk: Option<&JWK>) -> Result<Vec<u8>, JoseError> {
        let alg = self.algorithm(index)?;
        alg.sign(self.signing_input(index)?.as_bytes(), jwk)
    }

    /// Verify `signature` over the signing input of the signature at `index`.
    pub fn verify(
        &self,
        index: usize,
        signature: &[u8],
        jwk: Option<&JWK>,
    ) -> Result<bool, JoseError> {
        let alg = self.algorithm(index)?;
        alg.verify(signature, self.signing_input(index)?.as_bytes(), jwk)
    }

    fn entry(&self, index: usize) -> Result<&JWSHeaders, JoseError> {
        self.headers.get(index).ok_or_else(|| {
            JoseError::invalid_jws(format!(
                "The json web signature has no signature at index {index}."
            ))
        })
    }

    fn algorithm(&self, index: usize) -> Result<JWA, JoseError> {
        self.entry(index)?
            .algorithm()
            .ok_or_else(|| JoseError::invalid_header_parameter("alg"))
    }
}

fn reject(error: JoseError) -> JoseError {
    tracing::debug!("json web signature headers rejected: {error}");
    error
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio_test::assert_err;
    use tracing_test::traced_test;

    use super::*;

    fn header(value: Value) -> JoseHeader {
        JoseHeader::try_from(value).unwrap()
    }

    fn hmac_key() -> JWK {
        JWK::try_from(json!({
            "kty": "oct",
            "k": "qDM80igvja4Tg_tNsEuWDhl2bMM6_NgJEldFhIEuwqQ",
        }))
        .unwrap()
    }

    #[test]
    fn compact_requires_registered_alg() {
        let jws = JWS::compact(header(json!({"alg": "HS256", "typ": "JWT"})), "payload").unwrap();
        assert_eq!(jws.serialization(), JWSSerialization::Compact);
        assert_eq!(jws.headers()[0].algorithm(), Some(JWA::HS256));
        assert_eq!(jws.payload(), b"payload");

        for value in [json!({}), json!({"alg": 1}), json!({"alg": "HS1"}), json!({"alg": "A128KW"})] {
            let error = assert_err!(JWS::compact(header(value), "payload"));
            assert_eq!(error.kind(), JoseErrorKind::InvalidJoseHeader);
            assert_eq!(error.to_string(), "Invalid jose header parameter \"alg\".");
        }
    }

    #[test]
    fn alg_is_checked_before_the_other_parameters() {
        let error = assert_err!(JWS::compact(header(json!({"alg": "HS1", "kid": 1})), ""));
        assert_eq!(error.to_string(), "Invalid jose header parameter \"alg\".");

        let error = assert_err!(JWS::compact(header(json!({"alg": "HS256", "kid": 1})), ""));
        assert_eq!(error.to_string(), "Invalid jose header parameter \"kid\".");
    }

    #[test]
    fn flattened_headers_must_be_disjoint() {
        let error = assert_err!(JWS::flattened(
            header(json!({"alg": "ES256", "kid": "a"})),
            header(json!({"alg": "ES256", "kid": "a", "typ": "JWT"})),
            "payload",
        ));
        assert_eq!(error.kind(), JoseErrorKind::InvalidJoseHeader);
        assert_eq!(
            error.to_string(),
            "The protected and unprotected jose headers must be disjoint. Shared parameters: \"alg\", \"kid\"."
        );

        let jws = JWS::flattened(
            header(json!({"alg": "ES256"})),
            header(json!({"kid": "a"})),
            "payload",
        )
        .unwrap();
        assert_eq!(jws.serialization(), JWSSerialization::Flattened);
    }

    #[test]
    fn alg_may_live_in_either_half() {
        let jws = JWS::flattened(
            header(json!({"typ": "JWT"})),
            header(json!({"alg": "EdDSA"})),
            "payload",
        )
        .unwrap();
        assert_eq!(jws.headers()[0].algorithm(), Some(JWA::EdDSA));

        let error = assert_err!(JWS::flattened(
            header(json!({"typ": "JWT"})),
            header(json!({"kid": "a"})),
            "payload",
        ));
        assert_eq!(error.kind(), JoseErrorKind::InvalidJsonWebSignature);
        assert_eq!(
            error.to_string(),
            "Missing required jose header parameter \"alg\"."
        );
    }

    #[test]
    fn unprotected_half_follows_unprotected_rules() {
        let error = assert_err!(JWS::flattened(
            header(json!({"alg": "HS256"})),
            header(json!({"crit": ["b64"], "b64": false})),
            "payload",
        ));
        assert_eq!(error.to_string(), "Invalid jose header parameter \"crit\".");

        let error = assert_err!(JWS::flattened(
            header(json!({"alg": "HS256"})),
            header(json!({"jku": "https://example.com", "jwk": {"kty": "oct"}})),
            "payload",
        ));
        assert_eq!(
            error.to_string(),
            "The jose header parameters \"jku\" and \"jwk\" cannot be used together."
        );
    }

    #[test]
    fn general_validates_every_entry() {
        let jws = JWS::general(
            vec![
                JWSHeaders::new(Some(header(json!({"alg": "HS256"}))), None),
                JWSHeaders::new(None, Some(header(json!({"alg": "none"})))),
                JWSHeaders::new(
                    Some(header(json!({"alg": "RS256", "crit": ["exp"], "exp": 1}))),
                    Some(header(json!({"kid": "rsa"}))),
                ),
            ],
            "payload",
        )
        .unwrap();
        assert_eq!(jws.serialization(), JWSSerialization::General);
        assert_eq!(jws.headers().len(), 3);

        let error = assert_err!(JWS::general(
            vec![
                JWSHeaders::new(Some(header(json!({"alg": "HS256"}))), None),
                JWSHeaders::new(Some(header(json!({"alg": "HS256", "crit": ["exp"]}))), None),
            ],
            "payload",
        ));
        assert_eq!(
            error.to_string(),
            "Missing required jose header parameter \"exp\"."
        );

        let error = assert_err!(JWS::general(Vec::new(), "payload"));
        assert_eq!(error.kind(), JoseErrorKind::InvalidJsonWebSignature);
    }

    #[test]
    fn is_jws_header_discriminates_on_alg() {
        assert!(JWS::is_jws_header(&json!({"alg": "none"})));
        assert!(JWS::is_jws_header(&json!({"alg": "PS512", "kid": 1})));
        assert!(!JWS::is_jws_header(&json!({"alg": "dir"})));
        assert!(!JWS::is_jws_header(&json!({"alg": null})));
        assert!(!JWS::is_jws_header(&json!({})));
        assert!(!JWS::is_jws_header(&json!("HS256")));
    }

    #[test]
    fn signs_and_verifies_the_signing_input() {
        // RFC 7515 appendix A.1 header, encoded in sorted key order
        let jws = JWS::compact(header(json!({"alg": "HS256"})), "{\"iss\":\"joe\"}").unwrap();
        assert_eq!(
            jws.signing_input(0).unwrap(),
            "eyJhbGciOiJIUzI1NiJ9.eyJpc3MiOiJqb2UifQ"
        );

        let key = hmac_key();
        let signature = jws.sign(0, Some(&key)).unwrap();
        assert!(jws.verify(0, &signature, Some(&key)).unwrap());
        assert!(!jws.verify(0, b"forged", Some(&key)).unwrap());

        let error = assert_err!(jws.sign(1, Some(&key)));
        assert_eq!(error.kind(), JoseErrorKind::InvalidJsonWebSignature);
    }

    #[test]
    fn unprotected_alg_signs_with_empty_protected_header() {
        let jws = JWS::general(
            vec![JWSHeaders::new(None, Some(header(json!({"alg": "HS256"}))))],
            "payload",
        )
        .unwrap();
        assert_eq!(jws.signing_input(0).unwrap(), ".cGF5bG9hZA");

        let key = hmac_key();
        let signature = jws.sign(0, Some(&key)).unwrap();
        assert!(jws.verify(0, &signature, Some(&key)).unwrap());
    }

    #[test]
    #[traced_test]
    fn rejection_is_logged() {
        assert_err!(JWS::compact(header(json!({"alg": "HS1"})), "payload"));
        assert!(logs_contain("json web signature headers rejected"));
    }
}
