use std::convert::TryFrom;
use std::fmt;

/// Event [data attribute](https://github.com/cloudevents/spec/blob/master/spec.md#event-data)
/// representation: at most one of a domain value tree or raw bytes, never
/// both (spec.md section 3, "Event").
///
/// Grounded on `cloudevents-sdk`'s `event::Data` enum.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    /// Non-JSON binary payload.
    Binary(Vec<u8>),
    /// Non-JSON string payload.
    String(String),
    /// JSON payload, already decoded into a `serde_json::Value` tree.
    Json(serde_json::Value),
}

pub(crate) fn is_json_content_type(ct: &str) -> bool {
    let ct = ct.split(';').next().unwrap_or(ct).trim();
    ct.starts_with("application/json") || ct.starts_with("text/json") || ct.ends_with("+json")
}

impl Data {
    /// Builds [`Data`] from raw bytes, interpreting them as JSON when
    /// `content_type` (defaulting to `application/json`) says so.
    pub fn from_bytes(content_type: Option<&str>, bytes: Vec<u8>) -> Result<Self, serde_json::Error> {
        if is_json_content_type(content_type.unwrap_or("application/json")) {
            serde_json::from_slice::<serde_json::Value>(&bytes).map(Data::Json)
        } else {
            Ok(Data::Binary(bytes))
        }
    }

    /// The canonical byte serialization of this payload.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            Data::Binary(b) => Ok(b.clone()),
            Data::String(s) => Ok(s.clone().into_bytes()),
            Data::Json(v) => serde_json::to_vec(v),
        }
    }
}

impl From<serde_json::Value> for Data {
    fn from(v: serde_json::Value) -> Self {
        Data::Json(v)
    }
}

impl From<Vec<u8>> for Data {
    fn from(v: Vec<u8>) -> Self {
        Data::Binary(v)
    }
}

impl From<String> for Data {
    fn from(v: String) -> Self {
        Data::String(v)
    }
}

impl TryFrom<Data> for serde_json::Value {
    type Error = serde_json::Error;

    fn try_from(value: Data) -> Result<Self, Self::Error> {
        match value {
            Data::Binary(v) => serde_json::from_slice(&v),
            Data::Json(v) => Ok(v),
            Data::String(s) => serde_json::from_str(&s),
        }
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Data::Binary(v) => write!(f, "Binary data: {:?}", v),
            Data::String(s) => write!(f, "String data: {}", s),
            Data::Json(j) => write!(f, "Json data: {}", j),
        }
    }
}
