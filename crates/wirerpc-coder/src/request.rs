use std::fmt;

use serde_json::Value;

/// An opaque request id, preserved byte-for-byte from the wire.
///
/// The coder that decoded the request is responsible for parsing and
/// validating the token; the dispatch layer only carries it through
/// unchanged so the response can re-emit it exactly as received (a numeric
/// id of `1` must never come back as `1.0`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(Vec<u8>);

impl RequestId {
    /// Wraps a raw wire token.
    pub fn from_raw(raw: impl Into<Vec<u8>>) -> Self {
        Self(raw.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl From<&str> for RequestId {
    fn from(raw: &str) -> Self {
        Self::from_raw(raw)
    }
}

/// A decoded RPC request.
///
/// Constructed once per decoded message by a coder and consumed by exactly
/// one dispatch attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Name of the method to invoke.
    pub method: String,
    /// Raw parameter value: an array (by-position), an object (by-name), or
    /// whatever other shape the wire happened to carry. Shape errors are
    /// reported at dispatch time, not at decode time.
    pub params: Option<Value>,
    /// `None` marks a notification (no id field on the wire). A wire null
    /// id is a present value, not a notification.
    pub id: Option<RequestId>,
}

impl Request {
    /// Whether this request is a notification and must never receive a
    /// response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_id_preserves_raw_token() {
        let id = RequestId::from_raw("1.0");
        assert_eq!(id.as_bytes(), b"1.0");
        assert_eq!(id.to_string(), "1.0");

        let id = RequestId::from_raw(r#""id""#);
        assert_eq!(id.as_bytes(), br#""id""#);
    }

    #[test]
    fn notification_has_no_id() {
        let request = Request {
            method: "notify".to_string(),
            params: Some(json!([1, 2])),
            id: None,
        };
        assert!(request.is_notification());

        let request = Request {
            method: "call".to_string(),
            params: None,
            id: Some(RequestId::from_raw("null")),
        };
        assert!(!request.is_notification());
    }
}
