//! Minimal HTTP transport adapter serving the dispatch engine over hyper.
//!
//! Run with `cargo run --example subtract_server`, then:
//!
//! ```text
//! curl -s -X POST 127.0.0.1:8000 \
//!   -H 'Content-Type: application/json' \
//!   -d '{"jsonrpc":"2.0","method":"subtract","params":[42,23],"id":1}'
//! ```

use std::convert::Infallible;
use std::io::{self, Write};
use std::sync::Arc;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderName, HeaderValue, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{error, info};

use wirerpc_server::{Error, Exchange, FnMethod, Number, ResponseSink, Server, json};

/// Buffers the engine's output until the hyper response can be built.
#[derive(Default)]
struct BufferSink {
    status: Option<StatusCode>,
    headers: Vec<(HeaderName, HeaderValue)>,
    body: Vec<u8>,
}

impl Write for BufferSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ResponseSink for BufferSink {
    fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.push((name, value));
    }
}

impl BufferSink {
    fn into_response(self) -> hyper::Response<Full<Bytes>> {
        let mut builder = hyper::Response::builder().status(self.status.unwrap_or(StatusCode::OK));
        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }
        builder
            .body(Full::new(Bytes::from(self.body)))
            .expect("response construction cannot fail")
    }
}

async fn serve_exchange(
    server: Arc<Server>,
    request: hyper::Request<Incoming>,
) -> Result<hyper::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = request.into_parts();
    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_owned();

    let data = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            error!("reading request body: {err}");
            let response = hyper::Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .body(Full::new(Bytes::new()))
                .expect("response construction cannot fail");
            return Ok(response);
        }
    };

    let mut sink = BufferSink::default();
    let exchange = Exchange {
        verb: parts.method,
        content_type: &content_type,
        content_length: Some(data.len() as u64),
        body: Box::new(data.as_ref()),
    };
    server.handle(exchange, &mut sink);

    Ok(sink.into_response())
}

fn subtract(params: Vec<serde_json::Value>) -> Result<serde_json::Value, Error> {
    let (Some(minuend), Some(subtrahend)) = (params.first(), params.get(1)) else {
        return Err(Error::invalid_params().with_data("expected two parameters"));
    };
    let minuend = Number::from_value(minuend)
        .and_then(|n| n.cast_i64())
        .ok_or_else(|| Error::invalid_params().with_data("minuend must be an integer"))?;
    let subtrahend = Number::from_value(subtrahend)
        .and_then(|n| n.cast_i64())
        .ok_or_else(|| Error::invalid_params().with_data("subtrahend must be an integer"))?;
    Ok(json!(minuend - subtrahend))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    json::register();

    let mut server = Server::new();
    server.register(
        "subtract",
        FnMethod::new(subtract).with_param_names(["minuend", "subtrahend"]),
    );
    let server = Arc::new(server);

    let listener = TcpListener::bind("127.0.0.1:8000").await?;
    info!("listening on {}", listener.local_addr()?);

    loop {
        let (stream, peer) = listener.accept().await?;
        info!("connection from {peer}");

        let server = Arc::clone(&server);
        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            let service = service_fn(move |request| serve_exchange(Arc::clone(&server), request));

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                error!("serving connection: {err}");
            }
        });
    }
}
