//! Faults and codec errors.
//!
//! - [`Fault`]: A structured error returned by the server instead of a result
//! - [`CodecError`]: A document could not be encoded or decoded

use std::fmt;

use crate::value::{Struct, Value};

/// Struct member carrying the fault code.
pub const FAULT_CODE: &str = "faultCode";

/// Struct member carrying the fault message.
pub const FAULT_STRING: &str = "faultString";

/// The code of a fault.
///
/// Plain XML-RPC servers use integers; the SoftLayer API sends exception
/// class names such as `SoftLayer_Exception_ObjectNotFound`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FaultCode {
    Int(i64),
    Text(String),
}

impl fmt::Display for FaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultCode::Int(code) => write!(f, "{code}"),
            FaultCode::Text(code) => f.write_str(code),
        }
    }
}

impl From<i64> for FaultCode {
    fn from(code: i64) -> Self {
        FaultCode::Int(code)
    }
}

impl From<&str> for FaultCode {
    fn from(code: &str) -> Self {
        FaultCode::Text(code.to_owned())
    }
}

impl From<String> for FaultCode {
    fn from(code: String) -> Self {
        FaultCode::Text(code)
    }
}

impl From<&FaultCode> for Value {
    fn from(code: &FaultCode) -> Self {
        match code {
            FaultCode::Int(code) => Value::Int(*code),
            FaultCode::Text(code) => Value::String(code.clone()),
        }
    }
}

/// A fault returned by the server.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct Fault {
    pub code: FaultCode,
    pub message: String,
}

impl Fault {
    pub fn new<C: Into<FaultCode>, S: Into<String>>(code: C, message: S) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Read a fault from the struct inside a `<fault>` element.
    pub fn from_value(value: &Value) -> Result<Self, CodecError> {
        let members = value.as_struct().ok_or_else(|| {
            CodecError::MalformedFault(format!("expected struct, got {}", value.type_name()))
        })?;

        let code = match members.get(FAULT_CODE) {
            Some(Value::Int(code)) => FaultCode::Int(*code),
            Some(Value::String(code)) => FaultCode::Text(code.clone()),
            Some(other) => {
                return Err(CodecError::MalformedFault(format!(
                    "{FAULT_CODE} must be int or string, got {}",
                    other.type_name()
                )));
            }
            None => return Err(CodecError::MalformedFault(format!("missing {FAULT_CODE}"))),
        };

        let message = members
            .get(FAULT_STRING)
            .and_then(Value::as_str)
            .ok_or_else(|| CodecError::MalformedFault(format!("missing {FAULT_STRING}")))?;

        Ok(Self {
            code,
            message: message.to_owned(),
        })
    }

    /// The struct sent inside a `<fault>` element.
    pub fn to_value(&self) -> Value {
        let mut members = Struct::new();
        members.insert(FAULT_CODE.to_owned(), Value::from(&self.code));
        members.insert(FAULT_STRING.to_owned(), Value::String(self.message.clone()));
        Value::Struct(members)
    }
}

/// XML-RPC document errors.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The document is not well-formed XML.
    #[error("malformed XML: {0}")]
    Xml(String),

    /// The document is well-formed but does not follow the XML-RPC grammar.
    #[error("expected {expected}, found {found}")]
    Unexpected { expected: String, found: String },

    /// A scalar element holds text that is not valid for its type.
    #[error("invalid {kind} value: {text:?}")]
    InvalidValue { kind: &'static str, text: String },

    /// The value has no XML-RPC representation.
    #[error("cannot encode {0}")]
    Unencodable(String),

    /// A `<fault>` element does not hold a fault struct.
    #[error("malformed fault: {0}")]
    MalformedFault(String),
}

impl From<quick_xml::Error> for CodecError {
    fn from(err: quick_xml::Error) -> Self {
        CodecError::Xml(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_from_value_text_code() {
        let value: Value = [
            (FAULT_CODE, Value::from("SoftLayer_Exception_ObjectNotFound")),
            (FAULT_STRING, Value::from("Unable to find object")),
        ]
        .into_iter()
        .collect();

        let fault = Fault::from_value(&value).unwrap();
        assert_eq!(fault.code, FaultCode::Text("SoftLayer_Exception_ObjectNotFound".into()));
        assert_eq!(fault.message, "Unable to find object");
        assert_eq!(
            fault.to_string(),
            "SoftLayer_Exception_ObjectNotFound: Unable to find object"
        );
    }

    #[test]
    fn test_fault_from_value_int_code() {
        let fault = Fault::new(-32601, "method not found");
        assert_eq!(Fault::from_value(&fault.to_value()).unwrap(), fault);
    }

    #[test]
    fn test_fault_missing_members() {
        let value: Value = [(FAULT_CODE, Value::from(1))].into_iter().collect();
        assert!(matches!(
            Fault::from_value(&value),
            Err(CodecError::MalformedFault(_))
        ));

        assert!(Fault::from_value(&Value::from("oops")).is_err());
    }
}
