use serde_json::Value;

use crate::error::Error;
use crate::request::{Request, RequestId};

/// An RPC response.
///
/// At most one of `result` and `error` is meaningful; the encoder emits
/// `error` when it is set and `result` otherwise, so the exclusivity is
/// enforced at encode time rather than by a union check at every call site.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub result: Option<Value>,
    pub error: Option<Error>,
    /// Copied from the originating request, or `None` when no request could
    /// be identified (encoded as a wire null).
    pub id: Option<RequestId>,
}

impl Response {
    /// Builds a success response carrying `value`.
    pub fn result(id: Option<RequestId>, value: Value) -> Self {
        Self {
            result: Some(value),
            error: None,
            id,
        }
    }

    /// Builds the success response for `request`, copying its id.
    pub fn for_request(request: &Request, value: Value) -> Self {
        Self::result(request.id.clone(), value)
    }

    /// Builds an error response.
    pub fn error(id: Option<RequestId>, error: Error) -> Self {
        Self {
            result: None,
            error: Some(error),
            id,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn result_response() {
        let response = Response::result(Some(RequestId::from_raw("1")), json!(19));
        assert!(!response.is_error());
        assert_eq!(response.result, Some(json!(19)));
        assert_eq!(response.error, None);
    }

    #[test]
    fn for_request_copies_id() {
        let request = Request {
            method: "subtract".to_string(),
            params: Some(json!([42, 23])),
            id: Some(RequestId::from_raw("7")),
        };
        let response = Response::for_request(&request, json!(19));
        assert_eq!(response.id, Some(RequestId::from_raw("7")));
    }

    #[test]
    fn error_response() {
        let response = Response::error(None, Error::invalid_request());
        assert!(response.is_error());
        assert_eq!(response.result, None);
        assert_eq!(response.id, None);
    }
}
