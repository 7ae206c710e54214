//! Client-side error types.
//!
//! This module provides [`ClientError`], the error type for every client
//! operation, and [`ErrorKind`] for matching on the failure class without
//! destructuring.

use softlayer_core::{CodecError, Fault, FaultCode};

/// Client error variants.
///
/// Nothing is retried automatically; every failure reaches the caller.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ClientError {
    /// The client could not be constructed from the supplied configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A textual object mask has unbalanced brackets or empty path segments.
    #[error("malformed mask: {0}")]
    MalformedMask(String),

    /// An option name or value was rejected before any request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The server answered with an XML-RPC fault.
    #[error("{code}: {message}")]
    Fault { code: FaultCode, message: String },

    /// Connection failure, or an HTTP error status without a fault body.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The request could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// The response body is not a valid XML-RPC document.
    #[error("decode error: {0}")]
    Decode(String),

    /// The response decoded but has an unexpected shape.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Discriminant of [`ClientError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    MalformedMask,
    InvalidArgument,
    Fault,
    Transport,
    Timeout,
    Encode,
    Decode,
    Protocol,
}

impl ClientError {
    /// Create a fault error.
    pub fn fault<C: Into<FaultCode>, S: Into<String>>(code: C, message: S) -> Self {
        ClientError::Fault {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        ClientError::InvalidArgument(message.into())
    }

    /// Create a configuration error.
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        ClientError::Configuration(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Configuration(_) => ErrorKind::Configuration,
            ClientError::MalformedMask(_) => ErrorKind::MalformedMask,
            ClientError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ClientError::Fault { .. } => ErrorKind::Fault,
            ClientError::Transport(_) => ErrorKind::Transport,
            ClientError::Timeout(_) => ErrorKind::Timeout,
            ClientError::Encode(_) => ErrorKind::Encode,
            ClientError::Decode(_) => ErrorKind::Decode,
            ClientError::Protocol(_) => ErrorKind::Protocol,
        }
    }

    /// Whether the server reported a fault.
    pub fn is_fault(&self) -> bool {
        matches!(self, ClientError::Fault { .. })
    }

    /// Whether the request hit its timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout(_))
    }

    /// The fault code, for fault errors.
    pub fn fault_code(&self) -> Option<&FaultCode> {
        match self {
            ClientError::Fault { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Get the error message.
    ///
    /// For faults this is the server's `faultString` verbatim.
    pub fn message(&self) -> &str {
        match self {
            ClientError::Fault { message, .. } => message,
            ClientError::Configuration(msg)
            | ClientError::MalformedMask(msg)
            | ClientError::InvalidArgument(msg)
            | ClientError::Transport(msg)
            | ClientError::Timeout(msg)
            | ClientError::Encode(msg)
            | ClientError::Decode(msg)
            | ClientError::Protocol(msg) => msg,
        }
    }
}

impl From<Fault> for ClientError {
    fn from(fault: Fault) -> Self {
        ClientError::Fault {
            code: fault.code,
            message: fault.message,
        }
    }
}

impl From<CodecError> for ClientError {
    fn from(err: CodecError) -> Self {
        ClientError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_accessors() {
        let err = ClientError::fault("SoftLayer_Exception_ObjectNotFound", "Unable to find object");
        assert!(err.is_fault());
        assert_eq!(err.kind(), ErrorKind::Fault);
        assert_eq!(err.message(), "Unable to find object");
        assert_eq!(
            err.fault_code(),
            Some(&FaultCode::Text("SoftLayer_Exception_ObjectNotFound".into()))
        );
        assert_eq!(
            err.to_string(),
            "SoftLayer_Exception_ObjectNotFound: Unable to find object"
        );
    }

    #[test]
    fn test_variants_kind() {
        assert_eq!(
            ClientError::Transport("connection refused".into()).kind(),
            ErrorKind::Transport
        );
        assert_eq!(ClientError::Timeout("5s".into()).kind(), ErrorKind::Timeout);
        assert!(ClientError::Timeout("5s".into()).is_timeout());
        assert!(!ClientError::Transport("reset".into()).is_timeout());
        assert_eq!(
            ClientError::MalformedMask("mask[a".into()).kind(),
            ErrorKind::MalformedMask
        );
        assert!(ClientError::invalid_argument("chunk").fault_code().is_none());
    }

    #[test]
    fn test_from_fault_and_codec_error() {
        let err = ClientError::from(Fault::new(-1, "boom"));
        assert_eq!(err.fault_code(), Some(&FaultCode::Int(-1)));

        let err = ClientError::from(CodecError::MalformedFault("missing faultString".into()));
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(err.message().contains("missing faultString"));
    }
}
