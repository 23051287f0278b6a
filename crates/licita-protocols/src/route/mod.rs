//! Typed routes.
//!
//! A [`Route`] binds a routing key to the payload types of its request and
//! response. Payloads still travel as JSON; the typed layer decodes them at
//! the handler boundary and at the caller.

macro_rules! route {
    ($(#[$meta:meta])* $name:ident, $key:expr, $req:ty => $resp:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl $crate::route::Route for $name {
            type Request = $req;
            type Response = $resp;

            fn key() -> $crate::types::RouteKey {
                $key.into()
            }
        }
    };
}

mod auction;
mod auth;
mod document;
mod settings;
mod system;
mod ui;

pub use auction::*;
pub use auth::*;
pub use document::*;
pub use settings::*;
pub use system::*;
pub use ui::*;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::MessagingError;
use crate::types::RouteKey;

pub trait Route: Send + Sync + 'static {
    type Request: Serialize + DeserializeOwned + Send + 'static;
    type Response: Serialize + DeserializeOwned + Send + 'static;

    fn key() -> RouteKey;

    /// Encode a request payload; `null` is sent as an absent payload.
    fn encode_request(request: &Self::Request) -> Result<Option<Value>, MessagingError> {
        let value = serde_json::to_value(request)
            .map_err(|e| MessagingError::invalid_data(format!("{}: {}", Self::key(), e)))?;
        Ok((!value.is_null()).then_some(value))
    }

    /// Decode the payload a handler received. Fails with `INVALID_DATA`.
    fn decode_request(payload: Option<&Value>) -> Result<Self::Request, MessagingError> {
        decode_payload(payload).map_err(|e| {
            MessagingError::invalid_data(format!("Invalid payload for {}: {}", Self::key(), e))
        })
    }

    fn encode_response(response: &Self::Response) -> Result<Value, MessagingError> {
        serde_json::to_value(response)
            .map_err(|e| MessagingError::invalid_data(format!("{}: {}", Self::key(), e)))
    }

    /// Decode the payload a caller received. Fails with `DATA_PARSING_ERROR`.
    fn decode_response(payload: Value) -> Result<Self::Response, MessagingError> {
        serde_json::from_value(payload).map_err(|e| {
            MessagingError::data_parsing(format!("Invalid response for {}: {}", Self::key(), e))
        })
    }
}

/// Absent payloads decode as `null`, falling back to an empty object so
/// structs whose fields all have defaults accept them.
fn decode_payload<T: DeserializeOwned>(payload: Option<&Value>) -> Result<T, serde_json::Error> {
    match payload {
        Some(value) if !value.is_null() => T::deserialize(value),
        _ => T::deserialize(&Value::Null)
            .or_else(|_| T::deserialize(&Value::Object(Map::new()))),
    }
}

/// Generic acknowledgement returned by mutating handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[cfg(test)]
#[path = "route_tests.rs"]
mod tests;
