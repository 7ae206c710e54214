//! Service handles.

use std::fmt;

use futures::Stream;
use serde::de::DeserializeOwned;
use softlayer_core::Value;

use crate::client::Client;
use crate::config::CallOptions;
use crate::transport::Transport;
use crate::ClientError;

/// A [`Client`] bound to one service.
///
/// Obtained from [`Client::service`]. Cheap to create and copy around; it
/// only borrows the client.
///
/// # Example
///
/// ```ignore
/// let guests = client.service("Virtual_Guest");
/// let guest = guests
///     .call("getObject", &[], CallOptions::new().id(1234))
///     .await?;
/// ```
pub struct Service<'a, T> {
    client: &'a Client<T>,
    name: String,
}

impl<'a, T: Transport> Service<'a, T> {
    pub(crate) fn new(client: &'a Client<T>, name: String) -> Self {
        Self { client, name }
    }

    /// The full service name, e.g. `SoftLayer_Account`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn client(&self) -> &'a Client<T> {
        self.client
    }

    pub async fn call(
        &self,
        method: &str,
        args: &[Value],
        options: CallOptions,
    ) -> Result<Value, ClientError> {
        self.client.call(&self.name, method, args, options).await
    }

    /// Call `method` with default options.
    pub async fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, ClientError> {
        self.client.invoke(&self.name, method, args).await
    }

    pub async fn call_as<R: DeserializeOwned>(
        &self,
        method: &str,
        args: &[Value],
        options: CallOptions,
    ) -> Result<R, ClientError> {
        self.client.call_as(&self.name, method, args, options).await
    }

    /// See [`Client::iter_call`].
    pub fn iter_call(
        &self,
        method: &str,
        args: &[Value],
        options: CallOptions,
    ) -> Result<impl Stream<Item = Result<Value, ClientError>> + Send + use<'a, T>, ClientError> {
        self.client.iter_call(&self.name, method, args, options)
    }

    /// See [`Client::iter_call_chunked`].
    pub fn iter_call_chunked(
        &self,
        method: &str,
        args: &[Value],
        chunk: u32,
        options: CallOptions,
    ) -> Result<impl Stream<Item = Result<Value, ClientError>> + Send + use<'a, T>, ClientError> {
        self.client
            .iter_call_chunked(&self.name, method, args, chunk, options)
    }
}

impl<T> Clone for Service<'_, T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client,
            name: self.name.clone(),
        }
    }
}

impl<T> fmt::Display for Service<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<SoftLayer Service: {}>", self.name)
    }
}

impl<T> fmt::Debug for Service<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service").field("name", &self.name).finish()
    }
}
