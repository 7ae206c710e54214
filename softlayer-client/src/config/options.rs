//! Call options for per-request configuration.
//!
//! This module provides [`CallOptions`] for configuring individual calls
//! with an object id, mask, filter, pagination bounds, headers and timeout.

use std::time::Duration;

use softlayer_core::Value;

use super::headers::HeaderSet;
use super::mask::Mask;
use crate::ClientError;

/// Options for configuring individual calls.
///
/// # Example
///
/// ```ignore
/// use softlayer_client::CallOptions;
///
/// let options = CallOptions::new()
///     .id(1234)
///     .mask("mask[id,hostname,datacenter[name]]")
///     .limit(50);
///
/// let guest = client.call("Virtual_Guest", "getObject", &[], options).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Target object id, sent as `<Service>InitParameters`.
    pub(crate) id: Option<i64>,
    pub(crate) mask: Option<Mask>,
    /// Object filter, sent verbatim as `<Service>ObjectFilter`.
    pub(crate) filter: Option<Value>,
    /// Page size. Zero means no limit.
    pub(crate) limit: Option<u32>,
    pub(crate) offset: u32,
    /// Extra HTTP headers for this call.
    pub(crate) raw_headers: Vec<(String, String)>,
    /// Replaces every protocol header, including `authenticate`.
    pub(crate) headers: Option<HeaderSet>,
    /// Overrides the client's default timeout.
    pub(crate) timeout: Option<Duration>,
}

impl CallOptions {
    /// Create new default call options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the object mask.
    ///
    /// Accepts text in bracket or dotted syntax, or a structured [`Value`].
    /// Textual masks are validated when the call is made.
    pub fn mask<M: Into<Mask>>(mut self, mask: M) -> Self {
        self.mask = Some(mask.into());
        self
    }

    pub fn filter<F: Into<Value>>(mut self, filter: F) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Add an HTTP header to this call.
    ///
    /// Setting `Content-Type` replaces the default; `Content-Length` is
    /// always computed from the body.
    pub fn raw_header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.raw_headers.push((name.into(), value.into()));
        self
    }

    /// Send exactly these protocol headers, ignoring every other option and
    /// the client's defaults.
    pub fn headers(mut self, headers: HeaderSet) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Set the timeout for this call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get the configured timeout, if any.
    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn get_limit(&self) -> Option<u32> {
        self.limit
    }

    pub fn get_offset(&self) -> u32 {
        self.offset
    }

    /// Set an option by name.
    ///
    /// Recognized names are `id`, `mask`, `filter`, `headers`,
    /// `raw_headers`, `limit` and `offset`. [`Value::Nil`] clears an option.
    /// Unknown names and values of the wrong type fail with
    /// [`ClientError::InvalidArgument`].
    pub fn set(mut self, name: &str, value: Value) -> Result<Self, ClientError> {
        match name {
            "id" => self.id = optional(name, value, |v| v.as_i64())?,
            "mask" => {
                self.mask = optional(name, value, |v| match v {
                    Value::String(_) | Value::Struct(_) => Some(Mask::from(v.clone())),
                    _ => None,
                })?
            }
            "filter" => self.filter = optional(name, value, |v| v.as_struct().map(|_| v.clone()))?,
            "headers" => {
                self.headers = optional(name, value, |v| v.as_struct().cloned().map(HeaderSet::from))?
            }
            "raw_headers" => {
                self.raw_headers = optional(name, value, |v| {
                    v.as_struct()?
                        .iter()
                        .map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_owned())))
                        .collect::<Option<Vec<_>>>()
                })?
                .unwrap_or_default()
            }
            "limit" => {
                self.limit = optional(name, value, |v| v.as_i64().and_then(|i| u32::try_from(i).ok()))?
            }
            "offset" => {
                self.offset = optional(name, value, |v| v.as_i64().and_then(|i| u32::try_from(i).ok()))?
                    .unwrap_or(0)
            }
            other => {
                return Err(ClientError::invalid_argument(format!(
                    "unexpected option {other:?}"
                )));
            }
        }
        Ok(self)
    }
}

fn optional<T>(
    name: &str,
    value: Value,
    convert: impl FnOnce(&Value) -> Option<T>,
) -> Result<Option<T>, ClientError> {
    if value.is_nil() {
        return Ok(None);
    }
    convert(&value).map(Some).ok_or_else(|| {
        ClientError::invalid_argument(format!(
            "option {name:?} does not accept a {} value",
            value.type_name()
        ))
    })
}
