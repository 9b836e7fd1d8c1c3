use serde_json::Value;

/// A wire-native numeric literal.
///
/// Method implementations should not assume a single host numeric type;
/// this wrapper exposes the casts a method may attempt. Casts never panic:
/// a value that does not fit the target type reports `None` instead of
/// wrapping or truncating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Number<'a>(&'a serde_json::Number);

impl<'a> Number<'a> {
    /// Wraps `value` if it is a number.
    pub fn from_value(value: &'a Value) -> Option<Self> {
        match value {
            Value::Number(number) => Some(Self(number)),
            _ => None,
        }
    }

    /// Succeeds for every syntactically valid number literal.
    pub fn cast_f64(&self) -> Option<f64> {
        self.0.as_f64()
    }

    /// Succeeds only for integral literals that fit the signed 64-bit
    /// range; out-of-range values fail instead of wrapping.
    pub fn cast_i64(&self) -> Option<i64> {
        self.0.as_i64()
    }

    /// Like [`cast_i64`](Self::cast_i64), but additionally fails for
    /// negative literals.
    pub fn cast_u64(&self) -> Option<u64> {
        self.cast_i64().and_then(|value| u64::try_from(value).ok())
    }
}
