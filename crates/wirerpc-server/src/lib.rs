//! # wirerpc server
//!
//! A generalized JSON-RPC 2.0 dispatch engine.
//!
//! wirerpc implements the JSON-RPC 2.0 specification but decouples the wire
//! data format from the RPC layer: the [`Server`] validates requests,
//! resolves methods, invokes them, and assembles responses under the
//! protocol rules (batching, notifications, the error taxonomy), while a
//! [`Coder`] selected by content type decodes and encodes the wire data.
//! The reference coder for the JSON wire format lives in [`json`]; other
//! formats plug in through the [`coder`] registry.
//!
//! A transport adapter hands each inbound exchange to [`Server::handle`]
//! together with a [`ResponseSink`]; everything else (listening, TLS,
//! routing, timeouts) stays in the adapter.
//!
//! The JSON-RPC 2.0 specification can be found at
//! <https://www.jsonrpc.org/specification>.

pub mod json;
pub mod method;
pub mod server;

pub use method::{FnMethod, Method};
pub use server::{Exchange, Server};

// Re-export the coder framework types methods and transports interact with.
pub use wirerpc_coder as coder;
pub use wirerpc_coder::{
    Coder, CoderFault, DecodedRequests, Error, Number, Request, RequestId, Response, ResponseSink,
};
