//! Async client for the SoftLayer API.
//!
//! This crate talks to the SoftLayer XML-RPC API. Any method of any service
//! can be called by name; per-call options such as the target object id,
//! object masks, object filters and pagination bounds are sent as protocol
//! headers.
//!
//! ## Features
//!
//! - Calls to any `SoftLayer_*` service by name
//! - Username/API key or session token authentication
//! - Object masks in structured, bracket (`mask[a[b]]`) or dotted
//!   (`mask.a.b`) form
//! - Lazy, paged iteration over list methods
//! - HTTPS with rustls and pooled connections
//!
//! ## Example
//!
//! ```ignore
//! use softlayer_client::{CallOptions, Client};
//!
//! let client = Client::builder()
//!     .credentials("SLUSER", "0123456789abcdef")
//!     .build()?;
//!
//! let account = client
//!     .call("Account", "getObject", &[], CallOptions::new().mask("id,companyName"))
//!     .await?;
//!
//! println!("{:?}", account.get("companyName"));
//! ```
//!
//! ## Service Handles
//!
//! ```ignore
//! let guests = client.service("Virtual_Guest");
//!
//! guests
//!     .call("setTags", &["web,prod".into()], CallOptions::new().id(1234))
//!     .await?;
//! ```
//!
//! ## Pagination
//!
//! [`Client::iter_call`] requests a list method page by page and yields its
//! items as a [`Stream`](futures::Stream). The next page is only requested
//! once the previous one has been consumed.
//!
//! ```ignore
//! use futures::TryStreamExt;
//!
//! let mut guests = client.iter_call(
//!     "Account",
//!     "getVirtualGuests",
//!     &[],
//!     CallOptions::new().mask("id,hostname").limit(500),
//! )?;
//!
//! while let Some(guest) = guests.try_next().await? {
//!     println!("{:?}", guest.get("hostname"));
//! }
//! ```
//!
//! ## Configuration From the Environment
//!
//! ```ignore
//! use softlayer_client::ClientConfig;
//!
//! // SL_USERNAME, SL_API_KEY, SL_ENDPOINT_URL, SL_TIMEOUT
//! let client = ClientConfig::from_env()?.into_builder().build()?;
//! ```
//!
//! ## Errors
//!
//! Every operation returns [`ClientError`]. Faults reported by the server
//! arrive as [`ClientError::Fault`] with the server's message; nothing is
//! retried automatically.
//!
//! ## Tracing
//!
//! With the `tracing` feature (on by default) every call runs in an
//! `rpc.call` span carrying `rpc.service` and `rpc.method`.

mod auth;
mod builder;
mod client;
pub mod config;
mod error;
pub mod pagination;
mod service;
pub mod transport;

#[cfg(test)]
mod testing;

pub use auth::Auth;
pub use builder::{API_PRIVATE_ENDPOINT, API_PUBLIC_ENDPOINT, ClientBuilder};
pub use client::{Client, SERVICE_PREFIX, service_name};
pub use error::{ClientError, ErrorKind};
pub use service::Service;

// Re-export from config module
pub use config::{CallOptions, ClientConfig, HeaderSet, Mask};

pub use pagination::DEFAULT_CHUNK;

// Re-export transport types at the top level for convenience
pub use transport::{HyperTransport, HyperTransportBuilder, RpcRequest, Transport, XmlRpcTransport};

// Re-export core types that users need
pub use softlayer_core::{Fault, FaultCode, Struct, Value};
