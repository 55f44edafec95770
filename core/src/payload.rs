use crate::{now_timestamp, Reading};

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("payload is not valid utf-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("payload is not a valid key-value document: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("field `{field}` is not numeric: {value:?}")]
    NonNumeric { field: &'static str, value: String },
}

/// Wire shape of a sensor message. Every key is optional; absent keys get
/// the defaults from [`decode`].
#[derive(Debug, serde::Deserialize)]
struct WirePayload {
    timestamp: Option<String>,
    light_status: Option<String>,
    temperature: Option<Scalar>,
    humidity: Option<Scalar>,
}

/// Numeric fields may arrive as JSON numbers or as numeric strings.
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    fn coerce(&self) -> Option<f64> {
        match self {
            Scalar::Number(value) => Some(*value),
            Scalar::Text(text) => text.trim().parse().ok(),
        }
    }
}

/// Turns a raw topic payload into a normalized [`Reading`].
///
/// Defaults: `timestamp` is the decode-time wall clock, `light_status` is
/// `"unknown"`, `temperature` and `humidity` are `0.0`.
pub fn decode(payload: &[u8]) -> Result<Reading, DecodeError> {
    let text = std::str::from_utf8(payload)?;
    let wire: WirePayload = serde_json::from_str(text)?;

    let temperature = coerce_numeric("temperature", wire.temperature)?;
    let humidity = coerce_numeric("humidity", wire.humidity)?;

    Ok(Reading {
        timestamp: wire.timestamp.unwrap_or_else(now_timestamp),
        light_status: wire.light_status.unwrap_or_else(|| "unknown".to_string()),
        temperature,
        humidity,
    })
}

fn coerce_numeric(field: &'static str, value: Option<Scalar>) -> Result<f64, DecodeError> {
    match value {
        None => Ok(0.0),
        Some(scalar) => scalar.coerce().ok_or_else(|| DecodeError::NonNumeric {
            field,
            value: match scalar {
                Scalar::Number(value) => value.to_string(),
                Scalar::Text(text) => text,
            },
        }),
    }
}
