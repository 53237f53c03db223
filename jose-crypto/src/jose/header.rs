use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::jose::{
    JWK, JoseError, JoseErrorKind, constants::RESERVED_HEADER_PARAMETERS,
    error::ErrorContext as _, jwk::is_non_empty_string_list,
};

/// Registered parameters and the shape their value must have, in checking order.
const PARAMETER_SHAPES: [(&str, fn(&Value) -> bool); 9] = [
    ("jku", Value::is_string),
    ("jwk", JWK::is_jwk),
    ("kid", Value::is_string),
    ("x5u", Value::is_string),
    ("x5c", is_non_empty_string_list),
    ("x5t", Value::is_string),
    ("x5t#S256", Value::is_string),
    ("typ", Value::is_string),
    ("cty", Value::is_string),
];

#[derive(Default, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
/// [`JoseHeader`] stores the parameters of a protected or unprotected
/// JOSE header as defined in [`rfc7515`]
///
/// The header is a plain parameter map. It is checked against the registered
/// parameter shapes by [`JoseHeader::validate_protected`] or
/// [`JoseHeader::validate_unprotected`], depending on where it is used.
///
/// [`rfc7515`]: https://datatracker.ietf.org/doc/html/rfc7515#section-4
pub struct JoseHeader(Map<String, Value>);

impl JoseHeader {
    /// Create an empty [`JoseHeader`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the provided parameter, replacing a previous value.
    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        value: impl Serialize,
    ) -> Result<Self, JoseError> {
        self.set_parameter(name, value)?;
        Ok(self)
    }

    /// Set the provided parameter, replacing a previous value.
    pub fn set_parameter(
        &mut self,
        name: impl Into<String>,
        value: impl Serialize,
    ) -> Result<&mut Self, JoseError> {
        let name = name.into();
        let value = serde_json::to_value(value).with_jose_context(
            JoseErrorKind::InvalidJoseHeader,
            || format!("Invalid jose header parameter \"{name}\"."),
        )?;
        self.0.insert(name, value);
        Ok(self)
    }

    /// Value of the parameter `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Whether the parameter `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Parameter names of this header.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// The parameters as a JSON object.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume the header into its JSON object.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Whether the header has no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Try decode the header into the provided `T`.
    pub fn decode<'de, 'a: 'de, T>(&'a self) -> Result<T, JoseError>
    where
        T: Deserialize<'de>,
    {
        T::deserialize(&self.0).jose_context(
            JoseErrorKind::InvalidJoseHeader,
            "The jose header could not be decoded.",
        )
    }

    /// Validate a header integrity protected by the signature.
    ///
    /// Besides the shared checks, `crit` must be a non-empty list of unique
    /// extension names which are all present in this header.
    pub fn validate_protected(&self) -> Result<(), JoseError> {
        self.validate_shared()?;

        let Some(crit) = self.0.get("crit") else {
            return Ok(());
        };
        let names = crit_names(crit).ok_or_else(|| JoseError::invalid_header_parameter("crit"))?;
        if let Some(missing) = names.iter().find(|name| !self.0.contains_key(**name)) {
            return Err(JoseError::invalid_jose_header(format!(
                "Missing required jose header parameter \"{missing}\"."
            )));
        }
        Ok(())
    }

    /// Validate a header that is not integrity protected.
    ///
    /// Critical extensions are not allowed here, nor is naming two
    /// different key sources through both `jku` and `jwk`.
    pub fn validate_unprotected(&self) -> Result<(), JoseError> {
        self.validate_shared()?;

        if self.0.contains_key("crit") {
            return Err(JoseError::invalid_header_parameter("crit"));
        }
        if self.0.contains_key("jku") && self.0.contains_key("jwk") {
            return Err(JoseError::invalid_jose_header(
                "The jose header parameters \"jku\" and \"jwk\" cannot be used together.",
            ));
        }
        Ok(())
    }

    /// Parameter names present in both this header and `other`.
    #[must_use]
    pub fn shared_names(&self, other: &Self) -> Vec<&str> {
        self.names().filter(|name| other.contains(name)).collect()
    }

    fn validate_shared(&self) -> Result<(), JoseError> {
        for (name, is_valid) in PARAMETER_SHAPES {
            if self.0.get(name).is_some_and(|value| !is_valid(value)) {
                return Err(JoseError::invalid_header_parameter(name));
            }
        }
        Ok(())
    }
}

/// Names listed by a well-formed `crit`, `None` when malformed.
fn crit_names(crit: &Value) -> Option<Vec<&str>> {
    let names = crit
        .as_array()
        .filter(|names| !names.is_empty())?
        .iter()
        .map(Value::as_str)
        .collect::<Option<Vec<_>>>()?;

    let reserved = names
        .iter()
        .any(|name| RESERVED_HEADER_PARAMETERS.contains(name));
    let unique = names.iter().collect::<HashSet<_>>().len() == names.len();
    (!reserved && unique).then_some(names)
}

impl From<Map<String, Value>> for JoseHeader {
    fn from(parameters: Map<String, Value>) -> Self {
        Self(parameters)
    }
}

impl TryFrom<Value> for JoseHeader {
    type Error = JoseError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(parameters) => Ok(Self(parameters)),
            _ => Err(JoseError::new(JoseErrorKind::InvalidJoseHeader)),
        }
    }
}
