//! Core wire types for the SoftLayer XML-RPC API.
//!
//! This crate provides the types and functions shared by the client
//! (`softlayer-client`) and by anything that needs to speak the server side
//! of the protocol, such as test servers.
//!
//! ## Modules
//!
//! - `value`: The XML-RPC value model
//! - `codec`: Encoding and decoding of call, response and fault envelopes
//! - `error`: Faults and codec errors

mod codec;
mod error;
mod value;

pub use codec::*;
pub use error::*;
pub use value::*;
