//! # wirerpc coder framework
//!
//! Building blocks for implementing wirerpc wire-format coders.
//!
//! wirerpc implements the JSON-RPC 2.0 protocol rules but decouples the
//! wire data format from the RPC layer: a [`Coder`] decodes wire data into
//! [`Request`] values and encodes [`Response`] values back onto the wire,
//! so any data format can speak the protocol. Coders are allowed to deviate
//! for things like the object member names the JSON-RPC 2.0 specification
//! requires, as long as the protocol semantics are preserved and the wire
//! format is documented.
//!
//! Coders register a factory per content type in the process-wide
//! [`registry`]; the dispatch layer selects one per exchange based on the
//! declared content type and constructs it bound to that exchange's body
//! reader and [`ResponseSink`].

pub mod coder;
pub mod error;
pub mod number;
pub mod registry;
pub mod request;
pub mod response;

pub use coder::{Coder, CoderFault, DecodedRequests, ResponseSink};
pub use error::{Error, codes};
pub use number::Number;
pub use registry::{NewCoderFn, register, replace, select};
pub use request::{Request, RequestId};
pub use response::Response;
