use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;

/// Broad category of an [`Error`].
///
/// A non-2xx reply from the registry is not an error; it comes back as an
/// [`ApiReply`](crate::ApiReply) whose `code` carries the HTTP status.
#[non_exhaustive]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Kind {
    /// Client could not be constructed from the supplied configuration.
    Configuration,
    /// A required submission argument was missing. No permit was taken.
    Validation,
    /// The caller cancelled while waiting for a permit. No permit was taken.
    Cancelled,
    /// The HTTP exchange failed below the application level. The permit for
    /// the call has already been spent.
    Transport,
    /// Serializer, decoder or limiter fault.
    Internal,
}

#[derive(Debug)]
pub struct Error {
    kind: Kind,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    backtrace: Backtrace,
}

impl Error {
    pub fn with_source<S: StdError + Send + Sync + 'static>(kind: Kind, source: S) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
            backtrace: Backtrace::capture(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    #[must_use]
    pub fn inner(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        let e = self.source.as_deref()?;
        e.downcast_ref::<E>()
    }

    pub fn configuration<S: Into<String>>(reason: S) -> Self {
        Configuration {
            reason: reason.into(),
        }
        .into()
    }

    pub fn validation<S: Into<String>>(reason: S) -> Self {
        Validation {
            reason: reason.into(),
        }
        .into()
    }

    #[must_use]
    pub fn cancelled() -> Self {
        Cancelled.into()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.kind == Kind::Cancelled
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(src) => write!(f, "{:?}: {}", self.kind, src),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Configuration {
    pub reason: String,
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid client configuration: {}", self.reason)
    }
}

impl StdError for Configuration {}

#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validation {
    pub reason: String,
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid: {}", self.reason)
    }
}

impl StdError for Validation {}

#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("cancelled by the caller")
    }
}

impl StdError for Cancelled {}

impl From<Configuration> for Error {
    fn from(err: Configuration) -> Self {
        Error::with_source(Kind::Configuration, err)
    }
}

impl From<Validation> for Error {
    fn from(err: Validation) -> Self {
        Error::with_source(Kind::Validation, err)
    }
}

impl From<Cancelled> for Error {
    fn from(err: Cancelled) -> Self {
        Error::with_source(Kind::Cancelled, err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::with_source(Kind::Transport, err)
    }
}

impl From<reqwest::header::InvalidHeaderValue> for Error {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Error::with_source(Kind::Configuration, err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(Kind::Configuration, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(Kind::Internal, err)
    }
}

impl From<tokio::sync::AcquireError> for Error {
    fn from(err: tokio::sync::AcquireError) -> Self {
        Error::with_source(Kind::Internal, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_carries_reason() {
        let err = Error::validation("signature is required");

        assert_eq!(err.kind(), Kind::Validation, "kind");
        assert_eq!(
            err.downcast_ref::<Validation>().map(|v| v.reason.as_str()),
            Some("signature is required"),
            "reason"
        );
        assert_eq!(
            err.to_string(),
            "Validation: invalid: signature is required",
            "display"
        );
    }

    #[test]
    fn cancelled_is_distinct_kind() {
        let err = Error::cancelled();

        assert!(err.is_cancelled(), "cancelled flag");
        assert!(err.downcast_ref::<Cancelled>().is_some(), "source type");
        assert!(!Error::configuration("x").is_cancelled(), "other kinds");
    }
}
