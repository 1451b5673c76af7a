//! JSON codec (default).
//!
//! Structural, loss-less serialization for every [`Value`] whose floats
//! are finite. Encoding a non-finite float is a [`CodecError`]; it is
//! never silently written as `null`. JSON integers that do not fit `i64`
//! decode lossily as `Float`.

use async_trait::async_trait;
use serde_json::{Map, Number, Value as Json};

use super::traits::{Codec, CodecError};
use crate::value::Value;

/// Default JSON codec.
///
/// Round-trip guarantee: `decode(encode(v)) == v` for every value with
/// only finite floats.
///
/// # Example
///
/// ```
/// use keymirror_core::{JsonCodec, Value};
///
/// let codec = JsonCodec;
/// let text = codec.encode_text(&Value::from(42i64)).unwrap();
/// assert_eq!(text, "42");
/// assert_eq!(codec.decode_text(&text).unwrap(), Value::Int(42));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    /// Encode a value to JSON text synchronously.
    pub fn encode_text(&self, value: &Value) -> Result<String, CodecError> {
        let json = to_json(value)?;
        serde_json::to_string(&json)
            .map_err(|e| CodecError::with_source("failed to render JSON text", e))
    }

    /// Decode JSON text back into a value synchronously.
    pub fn decode_text(&self, text: &str) -> Result<Value, CodecError> {
        let json: Json = serde_json::from_str(text)
            .map_err(|e| CodecError::with_source("stored text is not valid JSON", e))?;
        Ok(from_json(json))
    }
}

#[async_trait]
impl Codec for JsonCodec {
    async fn encode(&self, value: &Value) -> Result<String, CodecError> {
        self.encode_text(value)
    }

    async fn decode(&self, text: &str) -> Result<Value, CodecError> {
        self.decode_text(text)
    }

    fn name(&self) -> &str {
        "json"
    }
}

fn to_json(value: &Value) -> Result<Json, CodecError> {
    Ok(match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::Number(Number::from(*i)),
        Value::Float(f) => Json::Number(Number::from_f64(*f).ok_or_else(|| {
            CodecError::new(format!("non-finite float {f} is not JSON-representable"))
        })?),
        Value::String(s) => Json::String(s.clone()),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(to_json(item)?);
            }
            Json::Array(out)
        }
        Value::Object(entries) => {
            let mut out = Map::with_capacity(entries.len());
            for (k, v) in entries {
                out.insert(k.clone(), to_json(v)?);
            }
            Json::Object(out)
        }
    })
}

fn from_json(json: Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                // u64 beyond i64::MAX decodes lossily as a float
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Json::String(s) => Value::String(s),
        Json::Array(items) => Value::Array(items.into_iter().map(from_json).collect()),
        Json::Object(entries) => {
            Value::Object(entries.into_iter().map(|(k, v)| (k, from_json(v))).collect())
        }
    }
}
