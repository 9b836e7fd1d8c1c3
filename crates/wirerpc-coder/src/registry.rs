use std::collections::HashMap;
use std::io::BufRead;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::coder::{Coder, ResponseSink};

/// Constructs a coder bound to one exchange's response sink and body
/// reader. Called once per exchange.
pub type NewCoderFn =
    for<'a> fn(&'a mut dyn ResponseSink, Box<dyn BufRead + 'a>) -> Box<dyn Coder + 'a>;

static CODERS: Lazy<Mutex<HashMap<String, NewCoderFn>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Registers a coder factory for a content type.
///
/// Registration is expected to happen at process initialization, before
/// serving begins.
///
/// # Panics
///
/// Panics when `content_type` is empty or already registered; both are
/// programmer error.
pub fn register(content_type: &str, new_fn: NewCoderFn) {
    assert!(!content_type.is_empty(), "content type is empty");

    let duplicate = {
        let mut coders = CODERS.lock().expect("coder registry poisoned");
        if coders.contains_key(content_type) {
            true
        } else {
            coders.insert(content_type.to_owned(), new_fn);
            false
        }
    };
    if duplicate {
        panic!("coder already registered for content type {content_type}");
    }
    debug!(content_type, "registered coder");
}

/// Like [`register`], but overwrites any existing registration.
///
/// # Panics
///
/// Panics when `content_type` is empty.
pub fn replace(content_type: &str, new_fn: NewCoderFn) {
    assert!(!content_type.is_empty(), "content type is empty");

    CODERS
        .lock()
        .expect("coder registry poisoned")
        .insert(content_type.to_owned(), new_fn);
    debug!(content_type, "replaced coder");
}

/// Looks up the factory registered for a content type.
pub fn lookup(content_type: &str) -> Option<NewCoderFn> {
    CODERS
        .lock()
        .expect("coder registry poisoned")
        .get(content_type)
        .copied()
}

/// Constructs the coder appropriate for the given content type, bound to
/// the exchange's sink and body. Returns `None` if no coder is registered
/// for the content type.
pub fn select<'a>(
    content_type: &str,
    sink: &'a mut dyn ResponseSink,
    body: Box<dyn BufRead + 'a>,
) -> Option<Box<dyn Coder + 'a>> {
    let new_fn = lookup(content_type)?;
    Some(new_fn(sink, body))
}
