use std::io::{self, Write};

use http::{HeaderName, HeaderValue, StatusCode};

use crate::error::Error;
use crate::request::{Request, RequestId};
use crate::response::Response;

/// A transport or encoding failure that cannot be expressed as a protocol
/// error response.
///
/// Protocol errors ([`Error`]) always become wire responses; a fault is
/// what is left when even writing to the wire goes wrong.
#[derive(Debug, thiserror::Error)]
pub enum CoderFault {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// The requests decoded from one inbound exchange.
#[derive(Debug)]
pub struct DecodedRequests {
    /// Decoded requests in wire order. A `None` entry marks a batch member
    /// whose wire data was structurally unparseable; it keeps its position
    /// so batch length and order are preserved, and the dispatcher answers
    /// it with an invalid-request error.
    pub requests: Vec<Option<Request>>,
    /// Whether the exchange was recognized as a batch. Batch responses are
    /// encoded as a sequence even when only one member produced a response.
    pub batch: bool,
}

/// The response side of one exchange, as exposed by the transport adapter.
///
/// Status and headers must be set before the first body byte is written;
/// how they are flushed is the adapter's business.
pub trait ResponseSink: Write {
    fn set_status(&mut self, status: StatusCode);
    fn set_header(&mut self, name: HeaderName, value: HeaderValue);
}

/// Decodes and encodes RPC message data for one exchange.
///
/// A coder instance is constructed per exchange, bound to that exchange's
/// body reader and [`ResponseSink`], and never reused.
pub trait Coder {
    /// Decodes the request(s) and indicates whether the input is a batch.
    ///
    /// A top-level [`Error`] means nothing could be decoded at all and is
    /// answered with a single error response.
    fn read_requests(&mut self) -> Result<DecodedRequests, Error>;

    /// Encodes a single response and writes it to the client.
    fn write_response(&mut self, response: &Response) -> Result<(), CoderFault>;

    /// Encodes a batch response and writes it to the client.
    fn write_responses(&mut self, responses: &[Response]) -> Result<(), CoderFault>;

    /// Reports a runtime fault that cannot be handled with an RPC error
    /// response.
    fn write_exception(
        &mut self,
        id: Option<&RequestId>,
        fault: &dyn std::error::Error,
    ) -> Result<(), CoderFault>;

    /// Sets the outgoing content type header. Called before any body byte
    /// is written, even when the exchange fails validation, so that error
    /// responses are correctly typed.
    fn declare_content_type(&mut self);
}
