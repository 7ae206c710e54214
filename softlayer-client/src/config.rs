//! Configuration modules for the SoftLayer client.
//!
//! This module contains request-level configuration:
//! - [`CallOptions`]: Per-call id, mask, filter, pagination and timeout
//! - [`Mask`]: Object masks and their normalization
//! - [`HeaderSet`]: The protocol headers sent with a call
//! - [`ClientConfig`]: Settings resolved from `SL_*` environment variables

mod env;
pub(crate) mod headers;
mod mask;
mod options;

pub use env::{ClientConfig, ENV_API_KEY, ENV_ENDPOINT_URL, ENV_TIMEOUT, ENV_USERNAME};
pub use headers::{
    AUTHENTICATE, GLOBAL_OBJECT_MASK, HeaderSet, INIT_PARAMETERS, OBJECT_FILTER, OBJECT_MASK,
    RESULT_LIMIT, build_headers,
};
pub(crate) use headers::result_limit;
pub use mask::{Mask, normalize as normalize_mask};
pub use options::CallOptions;
