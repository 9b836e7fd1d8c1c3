#![allow(dead_code)]

use std::io::{self, Write};

use http::{HeaderName, HeaderValue, StatusCode};

use wirerpc_server::{Exchange, ResponseSink, Server};

/// In-memory response sink recording what the engine produced.
#[derive(Default)]
pub struct Recorder {
    pub status: Option<StatusCode>,
    pub headers: Vec<(HeaderName, HeaderValue)>,
    pub body: Vec<u8>,
}

impl Recorder {
    pub fn body_str(&self) -> &str {
        std::str::from_utf8(&self.body).expect("response body is not UTF-8")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.as_str() == name)
            .and_then(|(_, value)| value.to_str().ok())
    }
}

impl Write for Recorder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ResponseSink for Recorder {
    fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.push((name, value));
    }
}

/// Drives one exchange through the server and returns the recorded output.
pub fn request(server: &Server, verb: http::Method, content_type: &str, body: &str) -> Recorder {
    let mut recorder = Recorder::default();
    let exchange = Exchange {
        verb,
        content_type,
        content_length: Some(body.len() as u64),
        body: Box::new(body.as_bytes()),
    };
    server.handle(exchange, &mut recorder);
    recorder
}

pub fn post(server: &Server, content_type: &str, body: &str) -> Recorder {
    request(server, http::Method::POST, content_type, body)
}

pub fn post_json(server: &Server, body: &str) -> Recorder {
    post(server, "application/json", body)
}
