use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::request::RequestId;
use crate::response::Response;

/// Reserved RPC error codes.
pub mod codes {
    /// Invalid wire data was received, or an error occurred while decoding
    /// and parsing it.
    pub const PARSE_ERROR: i64 = -32700;
    /// The decoded and parsed wire data is not a valid request object.
    pub const INVALID_REQUEST: i64 = -32600;
    /// The method does not exist / is not available.
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// Invalid method parameter(s).
    pub const INVALID_PARAMS: i64 = -32602;
    /// Internal RPC error.
    pub const INTERNAL_ERROR: i64 = -32603;

    /// First code of the server error range.
    pub const SERVER_ERROR_BEGIN: i64 = -32000;
    /// Last code of the server error range.
    pub const SERVER_ERROR_END: i64 = -32099;
    /// First code of the runtime-internal sub-range. Codes from here down to
    /// [`SERVER_ERROR_END`] must never be assigned to application methods.
    pub const SERVER_ERROR_RESERVED_BEGIN: i64 = -32090;

    /// A runtime fault that cannot be handled with an RPC response.
    /// See [`Error::exception`](super::Error::exception) and
    /// `Coder::write_exception`.
    pub const EXCEPTION: i64 = -32090;
    /// A single request produced more than one response.
    pub const MULTIPLE_RESPONSES: i64 = -32091;
}

/// An error raised while handling an RPC request.
///
/// Always convertible to a wire response via [`Error::into_response`];
/// faults that cannot be expressed this way are `CoderFault`s instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Error {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Error {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error() -> Self {
        Self::new(codes::PARSE_ERROR, "Parse error")
    }

    pub fn invalid_request() -> Self {
        Self::new(codes::INVALID_REQUEST, "Invalid Request")
    }

    pub fn method_not_found() -> Self {
        Self::new(codes::METHOD_NOT_FOUND, "Method not found")
    }

    pub fn invalid_params() -> Self {
        Self::new(codes::INVALID_PARAMS, "Invalid params")
    }

    pub fn internal_error() -> Self {
        Self::new(codes::INTERNAL_ERROR, "Internal error")
    }

    /// Returns a "Server error" with an application-chosen code.
    ///
    /// # Panics
    ///
    /// Panics when `code` is outside the server error range or inside its
    /// reserved sub-range; both are programmer error.
    pub fn server_error(code: i64) -> Self {
        assert!(
            (codes::SERVER_ERROR_END..=codes::SERVER_ERROR_BEGIN).contains(&code),
            "code {code} is not valid for use as server error"
        );
        assert!(
            code > codes::SERVER_ERROR_RESERVED_BEGIN,
            "code {code} is a reserved server error code"
        );
        Self::new(code, "Server error")
    }

    /// Wraps a runtime fault that cannot be handled with an RPC response.
    ///
    /// Intended for implementing `Coder::write_exception`: the fault's
    /// description becomes the error data.
    pub fn exception(fault: &dyn std::error::Error) -> Self {
        Self::new(codes::EXCEPTION, "Server error").with_data(fault.to_string())
    }

    /// Reserved error reported when a single request produced more than one
    /// response.
    pub fn multiple_responses() -> Self {
        Self::new(codes::MULTIPLE_RESPONSES, "Server error").with_data("multiple responses")
    }

    /// Returns the error with `data` attached.
    pub fn with_data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Builds the error response for the request this error belongs to,
    /// copying the request id if one was identified.
    pub fn into_response(self, id: Option<RequestId>) -> Response {
        Response::error(id, self)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RPC error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}
