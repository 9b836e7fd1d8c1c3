//! The reference coder for the JSON wire format (JSON-RPC 2.0).
//!
//! Decoding preserves numeric literals (a parameter of `2.0` stays `2.0`
//! until a method asks for a cast) and keeps request id bytes verbatim, so
//! an id of `1` is re-emitted as `1` and never as `1.0`.

use std::io::{BufRead, Read};
use std::sync::Once;

use http::HeaderValue;
use http::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::value::RawValue;

use wirerpc_coder::{
    Coder, CoderFault, DecodedRequests, Error, Request, RequestId, Response, ResponseSink, registry,
};

/// Content type the JSON coder registers under.
pub const CONTENT_TYPE_JSON: &str = "application/json";

const VERSION: &str = "2.0";

/// Registers the JSON coder for `application/json`.
///
/// Transport setup should call this once before serving begins; further
/// calls are no-ops, so shared setup paths can call it unconditionally.
pub fn register() {
    static REGISTER: Once = Once::new();
    REGISTER.call_once(|| registry::register(CONTENT_TYPE_JSON, new_json_coder));
}

fn new_json_coder<'a>(
    sink: &'a mut dyn ResponseSink,
    body: Box<dyn BufRead + 'a>,
) -> Box<dyn Coder + 'a> {
    Box::new(JsonCoder { sink, body })
}

struct JsonCoder<'a> {
    sink: &'a mut dyn ResponseSink,
    body: Box<dyn BufRead + 'a>,
}

impl Coder for JsonCoder<'_> {
    fn read_requests(&mut self) -> Result<DecodedRequests, Error> {
        let mut data = Vec::new();
        self.body
            .read_to_end(&mut data)
            .map_err(|err| Error::parse_error().with_data(err.to_string()))?;

        // A leading `[` marks a batch; anything else is a single message.
        let first = data
            .iter()
            .find(|&&byte| !matches!(byte, b' ' | b'\t' | b'\r' | b'\n'))
            .copied();
        match first {
            Some(b'[') => read_batch(&data),
            Some(_) => read_single(&data),
            None => Err(Error::parse_error().with_data("unexpected end of input")),
        }
    }

    fn write_response(&mut self, response: &Response) -> Result<(), CoderFault> {
        let id = raw_id(response.id.as_ref())?;
        serde_json::to_writer(&mut *self.sink, &wire_response(response, &id))?;
        self.sink.write_all(b"\n")?;
        Ok(())
    }

    fn write_responses(&mut self, responses: &[Response]) -> Result<(), CoderFault> {
        let ids = responses
            .iter()
            .map(|response| raw_id(response.id.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let wire: Vec<WireResponse<'_>> = responses
            .iter()
            .zip(&ids)
            .map(|(response, id)| wire_response(response, id))
            .collect();
        serde_json::to_writer(&mut *self.sink, &wire)?;
        self.sink.write_all(b"\n")?;
        Ok(())
    }

    fn write_exception(
        &mut self,
        id: Option<&RequestId>,
        fault: &dyn std::error::Error,
    ) -> Result<(), CoderFault> {
        let response = Error::exception(fault).into_response(id.cloned());
        self.write_response(&response)
    }

    fn declare_content_type(&mut self) {
        self.sink.set_header(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
    }
}

fn read_single(data: &[u8]) -> Result<DecodedRequests, Error> {
    let wire: WireRequest<'_> = serde_json::from_slice(data)
        .map_err(|err| Error::invalid_request().with_data(err.to_string()))?;
    let request = wire.into_request()?;
    Ok(DecodedRequests {
        requests: vec![Some(request)],
        batch: false,
    })
}

fn read_batch(data: &[u8]) -> Result<DecodedRequests, Error> {
    let members: Vec<&RawValue> = serde_json::from_slice(data)
        .map_err(|err| Error::parse_error().with_data(err.to_string()))?;
    if members.is_empty() {
        return Err(Error::invalid_request());
    }

    let mut requests = Vec::with_capacity(members.len());
    for member in members {
        match serde_json::from_str::<WireRequest<'_>>(member.get()) {
            // Unparseable member: keep its position, the dispatcher answers
            // it with an invalid-request error.
            Err(_) => requests.push(None),
            Ok(wire) => match wire.into_request() {
                Ok(request) => requests.push(Some(request)),
                // Parsed but not a valid request: dropped from the batch,
                // it produces no response at all.
                Err(_) => {}
            },
        }
    }
    Ok(DecodedRequests {
        requests,
        batch: true,
    })
}

/// One request object as it appears on the wire. Every member is optional
/// at the structural level; semantic validation happens in
/// [`WireRequest::into_request`].
#[derive(Deserialize)]
struct WireRequest<'a> {
    #[serde(default)]
    jsonrpc: String,
    #[serde(default)]
    method: String,
    #[serde(default)]
    params: Option<Value>,
    #[serde(borrow, default, deserialize_with = "present_id")]
    id: Option<&'a RawValue>,
}

/// Captures the raw id token whenever the field is present. Deserializing
/// `Option<&RawValue>` directly would turn a wire `"id": null` into `None`,
/// conflating a present null id with an absent one (a notification).
fn present_id<'de, D>(deserializer: D) -> Result<Option<&'de RawValue>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    <&RawValue>::deserialize(deserializer).map(Some)
}

impl WireRequest<'_> {
    fn into_request(self) -> Result<Request, Error> {
        if self.jsonrpc != VERSION {
            return Err(Error::invalid_request().with_data("invalid version"));
        }

        let id = match self.id {
            None => None,
            Some(raw) => {
                // The token is valid JSON by construction; only its type
                // needs checking before the bytes are retained verbatim.
                let value: Value = serde_json::from_str(raw.get())
                    .map_err(|err| Error::parse_error().with_data(err.to_string()))?;
                match value {
                    Value::String(_) | Value::Number(_) | Value::Null => {}
                    _ => return Err(Error::invalid_request().with_data("invalid id type")),
                }
                Some(RequestId::from_raw(raw.get()))
            }
        };

        Ok(Request {
            method: self.method,
            params: self.params,
            id,
        })
    }
}

/// One response object as encoded onto the wire. Exactly one of `result`
/// and `error` is emitted.
#[derive(Serialize)]
struct WireResponse<'a> {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a Error>,
    id: &'a RawValue,
}

static NULL: Value = Value::Null;

fn wire_response<'a>(response: &'a Response, id: &'a RawValue) -> WireResponse<'a> {
    if let Some(error) = &response.error {
        WireResponse {
            jsonrpc: VERSION,
            result: None,
            error: Some(error),
            id,
        }
    } else {
        WireResponse {
            jsonrpc: VERSION,
            result: Some(response.result.as_ref().unwrap_or(&NULL)),
            error: None,
            id,
        }
    }
}

fn raw_id(id: Option<&RequestId>) -> Result<Box<RawValue>, CoderFault> {
    let token = match id {
        Some(id) => std::str::from_utf8(id.as_bytes())
            .map_err(|err| CoderFault::Other(format!("invalid request id bytes: {err}")))?
            .to_owned(),
        None => "null".to_owned(),
    };
    RawValue::from_string(token).map_err(CoderFault::from)
}
