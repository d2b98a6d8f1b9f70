use serde::{Deserialize, Serialize};

/// Generic `{ data, message, status }` envelope.
///
/// Read directly where only the `message` matters (logout). Endpoints that
/// may answer with either the envelope or the bare resource go through
/// [`Payload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl<T> Default for ApiResponse<T> {
    fn default() -> Self {
        Self {
            data: None,
            message: None,
            status: None,
        }
    }
}

/// Envelope variant of [`Payload`]: `data` must be present
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Enveloped<T> {
    pub data: T,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
}

/// A body that is either `{ "data": T, ... }` or `T` itself.
///
/// The envelope is tried first, so a bare `T` that happens to carry a `data`
/// field of the right type would be unwrapped; no resource in the contracts
/// has such a field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Payload<T> {
    Enveloped(Enveloped<T>),
    Bare(T),
}

impl<T> Payload<T> {
    pub fn into_inner(self) -> T {
        match self {
            Payload::Enveloped(envelope) => envelope.data,
            Payload::Bare(value) => value,
        }
    }
}
