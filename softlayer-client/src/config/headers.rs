//! Protocol headers.
//!
//! SoftLayer reads per-call options from a `{headers: {...}}` struct sent as
//! the first XML-RPC parameter. Global headers use bare names; headers that
//! configure the target object are prefixed with the service name, for
//! example `SoftLayer_Hardware_ServerInitParameters`.

use softlayer_core::{Struct, Value};

use super::mask::Mask;
use super::options::CallOptions;
use crate::ClientError;

/// Credentials header.
pub const AUTHENTICATE: &str = "authenticate";
/// Pagination header.
pub const RESULT_LIMIT: &str = "resultLimit";
/// Global header carrying a textual object mask.
pub const GLOBAL_OBJECT_MASK: &str = "SoftLayer_ObjectMask";
/// Suffix of the header selecting the target object.
pub const INIT_PARAMETERS: &str = "InitParameters";
/// Suffix of the header carrying a structured object mask.
pub const OBJECT_MASK: &str = "ObjectMask";
/// Suffix of the header carrying an object filter.
pub const OBJECT_FILTER: &str = "ObjectFilter";

/// Protocol headers of a single call, keyed by header name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeaderSet(Struct);

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, replacing any previous body.
    pub fn insert<K: Into<String>, V: Into<Value>>(&mut self, name: K, body: V) -> Option<Value> {
        self.0.insert(name.into(), body.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// The `{headers: {...}}` parameter that leads every call.
    pub fn to_param(&self) -> Value {
        let mut param = Struct::new();
        param.insert("headers".to_owned(), Value::Struct(self.0.clone()));
        Value::Struct(param)
    }
}

impl From<Struct> for HeaderSet {
    fn from(headers: Struct) -> Self {
        HeaderSet(headers)
    }
}

impl From<HeaderSet> for Value {
    fn from(headers: HeaderSet) -> Self {
        Value::Struct(headers.0)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for HeaderSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        HeaderSet(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Build the headers for a call to `service`.
///
/// `defaults` already holds the `authenticate` header when the client has
/// credentials. A full header override in `options` replaces everything.
pub fn build_headers(
    service: &str,
    defaults: &HeaderSet,
    options: &CallOptions,
) -> Result<HeaderSet, ClientError> {
    if let Some(headers) = &options.headers {
        return Ok(headers.clone());
    }

    let mut headers = defaults.clone();

    if let Some(id) = options.id {
        headers.insert(
            format!("{service}{INIT_PARAMETERS}"),
            [("id", Value::Int(id))].into_iter().collect::<Value>(),
        );
    }

    if let Some(mask) = &options.mask {
        match mask.normalized()? {
            Mask::Structured(tree) => {
                headers.insert(
                    format!("{service}{OBJECT_MASK}"),
                    [("mask", tree)].into_iter().collect::<Value>(),
                );
            }
            Mask::Textual(text) => {
                headers.insert(
                    GLOBAL_OBJECT_MASK,
                    [("mask", Value::String(text))].into_iter().collect::<Value>(),
                );
            }
        }
    }

    if let Some(filter) = &options.filter {
        headers.insert(format!("{service}{OBJECT_FILTER}"), filter.clone());
    }

    if let Some(limit) = options.limit.filter(|limit| *limit > 0) {
        headers.insert(RESULT_LIMIT, result_limit(limit, options.offset));
    }

    Ok(headers)
}

/// Body of the [`RESULT_LIMIT`] header.
pub(crate) fn result_limit(limit: u32, offset: u32) -> Value {
    [("limit", Value::from(limit)), ("offset", Value::from(offset))]
        .into_iter()
        .collect()
}
