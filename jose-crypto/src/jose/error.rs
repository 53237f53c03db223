//! Error type shared by all JOSE validation and signing operations.

use std::{borrow::Cow, error::Error as StdError, fmt};

/// Alias for a type-erased error type.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Category of a [`JoseError`].
///
/// Every kind carries a fixed default message, used whenever
/// the error was created without a more specific one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum JoseErrorKind {
    /// A JOSE header parameter is malformed or not allowed where it appears.
    InvalidJoseHeader,
    /// A JSON Web Key is malformed, bound to an invalid certificate,
    /// or cannot be used for the requested operation.
    InvalidJsonWebKey,
    /// A JSON Web Key Set does not have the `{"keys": [...]}` shape.
    InvalidJsonWebKeySet,
    /// A JSON Web Signature cannot be assembled from the given parts.
    InvalidJsonWebSignature,
    /// No JSON Web Key of a set satisfied a lookup.
    JsonWebKeyNotFound,
}

impl JoseErrorKind {
    /// Message used when a [`JoseError`] of this kind has no message of its own.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::InvalidJoseHeader => "The provided JOSE Header is invalid.",
            Self::InvalidJsonWebKey => "The provided JSON Web Key is invalid.",
            Self::InvalidJsonWebKeySet => "The provided JSON Web Key Set is invalid.",
            Self::InvalidJsonWebSignature => "The provided JSON Web Signature is invalid.",
            Self::JsonWebKeyNotFound => {
                "No JSON Web Key matches the criteria at the JSON Web Key Set."
            }
        }
    }
}

impl fmt::Display for JoseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InvalidJoseHeader => "invalid jose header",
            Self::InvalidJsonWebKey => "invalid json web key",
            Self::InvalidJsonWebKeySet => "invalid json web key set",
            Self::InvalidJsonWebSignature => "invalid json web signature",
            Self::JsonWebKeyNotFound => "json web key not found",
        })
    }
}

/// Error returned when a JOSE object fails validation or cannot be used.
///
/// # Formatting
///
/// The `Display` implementation only prints the message of this error,
/// which names the offending parameter or the violated rule. The underlying
/// cause, if any, is exposed through [`std::error::Error::source`].
///
/// A cryptographic mismatch while verifying a signature is never reported
/// as a [`JoseError`]; verification returns `false` instead.
pub struct JoseError {
    inner: Box<ErrorImpl>,
}

struct ErrorImpl {
    kind: JoseErrorKind,
    message: Option<Cow<'static, str>>,
    cause: Option<BoxError>,
}

impl JoseError {
    /// Create a new [`JoseError`] of the given kind, using its default message.
    #[must_use]
    pub fn new(kind: JoseErrorKind) -> Self {
        Self {
            inner: Box::new(ErrorImpl {
                kind,
                message: None,
                cause: None,
            }),
        }
    }

    /// Replace the message of this error.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.inner.message = Some(message.into());
        self
    }

    /// Attach the underlying cause of this error.
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.inner.cause = Some(cause.into());
        self
    }

    /// Kind of this error.
    #[must_use]
    pub fn kind(&self) -> JoseErrorKind {
        self.inner.kind
    }

    /// Message of this error, falling back to the default message of its kind.
    #[must_use]
    pub fn message(&self) -> &str {
        self.inner
            .message
            .as_deref()
            .unwrap_or(self.inner.kind.default_message())
    }

    pub(crate) fn invalid_jose_header(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(JoseErrorKind::InvalidJoseHeader).with_message(message)
    }

    pub(crate) fn invalid_jwk(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(JoseErrorKind::InvalidJsonWebKey).with_message(message)
    }

    pub(crate) fn invalid_jwks(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(JoseErrorKind::InvalidJsonWebKeySet).with_message(message)
    }

    pub(crate) fn invalid_jws(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(JoseErrorKind::InvalidJsonWebSignature).with_message(message)
    }

    pub(crate) fn invalid_jwk_parameter(name: &str) -> Self {
        Self::invalid_jwk(format!("Invalid json web key parameter \"{name}\"."))
    }

    pub(crate) fn invalid_header_parameter(name: &str) -> Self {
        Self::invalid_jose_header(format!("Invalid jose header parameter \"{name}\"."))
    }
}

impl fmt::Debug for JoseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("JoseError");
        f.field("kind", &self.inner.kind);
        f.field("message", &self.message());
        if let Some(cause) = &self.inner.cause {
            f.field("cause", cause);
        }
        f.finish()
    }
}

impl fmt::Display for JoseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl StdError for JoseError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .cause
            .as_ref()
            .map(|cause| &**cause as &(dyn StdError + 'static))
    }
}

impl From<JoseErrorKind> for JoseError {
    fn from(kind: JoseErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Convert foreign errors into a [`JoseError`] of a given kind,
/// keeping the foreign error as its cause.
pub(crate) trait ErrorContext<T>: private::Sealed {
    fn jose_context(
        self,
        kind: JoseErrorKind,
        message: impl Into<Cow<'static, str>>,
    ) -> Result<T, JoseError>;

    fn with_jose_context<F, M>(self, kind: JoseErrorKind, message: F) -> Result<T, JoseError>
    where
        F: FnOnce() -> M,
        M: Into<Cow<'static, str>>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: Into<BoxError>,
{
    fn jose_context(
        self,
        kind: JoseErrorKind,
        message: impl Into<Cow<'static, str>>,
    ) -> Result<T, JoseError> {
        self.map_err(|error| {
            JoseError::new(kind)
                .with_message(message)
                .with_cause(error)
        })
    }

    fn with_jose_context<F, M>(self, kind: JoseErrorKind, message: F) -> Result<T, JoseError>
    where
        F: FnOnce() -> M,
        M: Into<Cow<'static, str>>,
    {
        self.map_err(|error| {
            JoseError::new(kind)
                .with_message(message())
                .with_cause(error)
        })
    }
}

mod private {
    pub(crate) trait Sealed {}

    impl<T, E> Sealed for Result<T, E> {}
}
