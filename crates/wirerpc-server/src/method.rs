use serde_json::{Map, Value};

use wirerpc_coder::Error;

/// An RPC method.
///
/// A method sees its parameters in by-position form; when the wire carries
/// by-name parameters, [`parse_named_params`](Method::parse_named_params)
/// converts them into positional order first.
pub trait Method: Send + Sync {
    /// Converts by-name parameters into their by-position representation.
    ///
    /// The returned description is surfaced to the caller as the data of an
    /// "Invalid params" error.
    fn parse_named_params(&self, params: &Map<String, Value>) -> Result<Vec<Value>, String>;

    /// Invokes the method with by-position parameters, returning either the
    /// domain result value or a protocol error.
    fn invoke(&self, params: Vec<Value>) -> Result<Value, Error>;
}

/// A [`Method`] backed by a closure and a declared parameter order.
///
/// The parameter names bind by-name parameters positionally: a caller
/// supplying an object must provide every declared name.
pub struct FnMethod<F> {
    param_names: Vec<String>,
    func: F,
}

impl<F> FnMethod<F>
where
    F: Fn(Vec<Value>) -> Result<Value, Error> + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self {
            param_names: Vec::new(),
            func,
        }
    }

    /// Declares the positional order used to bind by-name parameters.
    pub fn with_param_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.param_names = names.into_iter().map(Into::into).collect();
        self
    }
}

impl<F> Method for FnMethod<F>
where
    F: Fn(Vec<Value>) -> Result<Value, Error> + Send + Sync,
{
    fn parse_named_params(&self, params: &Map<String, Value>) -> Result<Vec<Value>, String> {
        self.param_names
            .iter()
            .map(|name| {
                params
                    .get(name)
                    .cloned()
                    .ok_or_else(|| format!("parameter {name:?} not provided"))
            })
            .collect()
    }

    fn invoke(&self, params: Vec<Value>) -> Result<Value, Error> {
        (self.func)(params)
    }
}
