use std::collections::HashMap;
use std::io::BufRead;

use http::header::{ALLOW, CONTENT_TYPE};
use http::{HeaderValue, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use wirerpc_coder::registry;
use wirerpc_coder::{Coder, CoderFault, Error, Request, Response, ResponseSink};

use crate::method::Method;

/// One inbound exchange, as handed over by the transport adapter.
pub struct Exchange<'a> {
    /// Transport verb. Only `POST` carries RPC data; any other verb is
    /// answered with a method-not-allowed signal.
    pub verb: http::Method,
    /// Declared content type, used to select the coder.
    pub content_type: &'a str,
    /// Declared body length, if the transport knows it.
    pub content_length: Option<u64>,
    /// Request body reader.
    pub body: Box<dyn BufRead + 'a>,
}

/// The RPC dispatch engine.
///
/// Methods are registered before serving begins and the registry is
/// read-only afterwards; `register` takes `&mut self`, so a server shared
/// across workers cannot be mutated while requests are in flight.
/// Registering during active serving is caller error, not something the
/// engine guards against.
pub struct Server {
    methods: HashMap<String, Box<dyn Method>>,
}

impl Server {
    pub fn new() -> Self {
        Self {
            methods: HashMap::new(),
        }
    }

    /// Registers an RPC method under `name`.
    ///
    /// # Panics
    ///
    /// Panics when `name` is empty or already registered; both are
    /// programmer error detectable at startup.
    pub fn register(&mut self, name: impl Into<String>, method: impl Method + 'static) {
        let name = name.into();
        assert!(!name.is_empty(), "method name is empty");
        assert!(
            !self.methods.contains_key(&name),
            "method already exists: {name}"
        );
        self.methods.insert(name, Box::new(method));
    }

    /// Drives one exchange through decode, dispatch, and encode.
    ///
    /// Decode, dispatch, and encode proceed synchronously on the calling
    /// worker; timeouts and cancellation belong to the transport adapter.
    pub fn handle<S: ResponseSink>(&self, exchange: Exchange<'_>, sink: &mut S) {
        let Exchange {
            verb,
            content_type,
            content_length,
            body,
        } = exchange;

        let Some(new_coder) = registry::lookup(content_type) else {
            debug!(content_type, "no coder registered");
            unsupported_media_type(sink, content_type);
            return;
        };

        let is_write = verb == http::Method::POST;
        if !is_write {
            sink.set_status(StatusCode::METHOD_NOT_ALLOWED);
            sink.set_header(ALLOW, HeaderValue::from_static("POST"));
        }

        let fatal = {
            let mut coder = new_coder(&mut *sink, body);
            coder.declare_content_type();

            let written = if !is_write {
                let error = Error::parse_error().with_data("invalid HTTP method");
                coder.write_response(&error.into_response(None))
            } else if content_length == Some(0) {
                let error = Error::parse_error().with_data("empty POST body");
                coder.write_response(&error.into_response(None))
            } else {
                self.serve(coder.as_mut())
            };

            match written {
                Ok(()) => None,
                Err(fault) => {
                    warn!(%fault, "response write failed, reporting exception");
                    coder.write_exception(None, &fault).err()
                }
            }
        };

        if let Some(fault) = fatal {
            internal_error(sink, &fault);
        }
    }

    fn serve(&self, coder: &mut (dyn Coder + '_)) -> Result<(), CoderFault> {
        let decoded = match coder.read_requests() {
            Ok(decoded) => decoded,
            Err(error) => return coder.write_response(&error.into_response(None)),
        };
        debug!(
            requests = decoded.requests.len(),
            batch = decoded.batch,
            "decoded exchange"
        );

        let mut responses = Vec::new();
        for request in &decoded.requests {
            match request {
                // Unparseable batch member: answered in place so the batch
                // keeps its length and order.
                None => responses.push(Error::invalid_request().into_response(None)),
                Some(request) => {
                    if let Some(response) = self.invoke_request(request) {
                        responses.push(response);
                    }
                }
            }
        }

        if decoded.batch {
            // A batch of nothing but notifications writes nothing at all.
            if responses.is_empty() {
                return Ok(());
            }
            return coder.write_responses(&responses);
        }

        match responses.as_slice() {
            // Request was a notification.
            [] => Ok(()),
            [response] => coder.write_response(response),
            _ => {
                let error = Error::multiple_responses();
                coder.write_response(&error.into_response(None))
            }
        }
    }

    fn invoke_request(&self, request: &Request) -> Option<Response> {
        if request.method.is_empty() || request.method.starts_with("rpc.") {
            return Some(Error::method_not_found().into_response(request.id.clone()));
        }

        let Some(method) = self.methods.get(&request.method) else {
            return Some(Error::method_not_found().into_response(request.id.clone()));
        };

        let params = match &request.params {
            Some(Value::Array(params)) => params.clone(),
            Some(Value::Object(named)) => match method.parse_named_params(named) {
                Ok(params) => params,
                Err(reason) => {
                    let error = Error::invalid_params().with_data(reason);
                    return Some(error.into_response(request.id.clone()));
                }
            },
            _ => {
                let error = Error::invalid_params()
                    .with_data("params should be by-position (array) or by-name (object)");
                return Some(error.into_response(request.id.clone()));
            }
        };

        debug!(method = %request.method, "invoking");
        let outcome = method.invoke(params);

        if request.is_notification() {
            // Notifications never get a response, whatever the method
            // returned.
            return None;
        }

        Some(match outcome {
            Ok(value) => Response::result(request.id.clone(), value),
            Err(error) => error.into_response(request.id.clone()),
        })
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

fn unsupported_media_type(sink: &mut dyn ResponseSink, content_type: &str) {
    sink.set_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    sink.set_header(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    let _ = writeln!(sink, "media type {content_type:?} is not supported");
}

fn internal_error(sink: &mut dyn ResponseSink, fault: &CoderFault) {
    sink.set_status(StatusCode::INTERNAL_SERVER_ERROR);
    sink.set_header(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    let _ = writeln!(sink, "error: {fault}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    struct PingMethod;

    impl Method for PingMethod {
        fn parse_named_params(&self, _params: &Map<String, Value>) -> Result<Vec<Value>, String> {
            Ok(Vec::new())
        }

        fn invoke(&self, _params: Vec<Value>) -> Result<Value, Error> {
            Ok(json!("pong"))
        }
    }

    #[test]
    #[should_panic(expected = "method name is empty")]
    fn register_empty_name_panics() {
        let mut server = Server::new();
        server.register("", PingMethod);
    }

    #[test]
    #[should_panic(expected = "method already exists: ping")]
    fn register_duplicate_panics() {
        let mut server = Server::new();
        server.register("ping", PingMethod);
        server.register("ping", PingMethod);
    }

    #[test]
    fn reserved_prefix_is_not_dispatched() {
        let mut server = Server::new();
        server.register("rpc.internal", PingMethod);

        let request = Request {
            method: "rpc.internal".to_string(),
            params: Some(json!([])),
            id: Some(wirerpc_coder::RequestId::from_raw("1")),
        };
        let response = server.invoke_request(&request).unwrap();
        assert_eq!(response.error.unwrap().code, wirerpc_coder::codes::METHOD_NOT_FOUND);
    }

    #[test]
    fn notification_suppresses_method_outcome() {
        let mut server = Server::new();
        server.register("ping", PingMethod);

        let request = Request {
            method: "ping".to_string(),
            params: Some(json!([])),
            id: None,
        };
        assert!(server.invoke_request(&request).is_none());
    }

    #[test]
    fn resolution_errors_respond_even_for_notifications() {
        let server = Server::new();

        let request = Request {
            method: "missing".to_string(),
            params: Some(json!([])),
            id: None,
        };
        let response = server.invoke_request(&request).unwrap();
        assert_eq!(response.error.unwrap().code, wirerpc_coder::codes::METHOD_NOT_FOUND);
        assert_eq!(response.id, None);
    }
}
