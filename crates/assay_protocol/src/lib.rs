//! Wire contract shared by the AssayFlow servers.
//!
//! Every RPC in the assurance control plane speaks the same shape: a JSON
//! request envelope carrying a method name plus a flat string-to-string
//! argument map, answered by a flat string-to-string result map. Failure is
//! signalled by the presence of the `error` key; callers must test for the
//! key, never for a particular value.

pub mod bog;
pub mod defaults;
pub mod encoding;
pub mod methods;

pub use bog::BillOfGoods;
pub use methods::MethodTable;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Flat argument/result map used on the wire. Ordered so that serialized
/// responses are stable across runs.
pub type RpcMap = BTreeMap<String, String>;

/// Key whose presence in a result map marks the operation as failed.
pub const ERROR_KEY: &str = "error";

/// Request envelope for both servers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: String,
    #[serde(default)]
    pub args: RpcMap,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, args: RpcMap) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }
}

/// Protocol-level errors.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Request envelope could not be parsed
    #[error("Malformed request: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Date string did not match the assessment date format
    #[error("Unparseable date: {0}")]
    DateParse(String),
}

/// True when the result map signals failure.
///
/// Only key presence matters; an empty error value still counts.
pub fn is_error(results: &RpcMap) -> bool {
    results.contains_key(ERROR_KEY)
}

/// Record a failure in the result map, keeping whatever was assembled so far.
pub fn put_error(results: &mut RpcMap, message: impl Into<String>) {
    results.insert(ERROR_KEY.to_string(), message.into());
}

/// Build a result map that carries only an error.
pub fn error_map(message: impl Into<String>) -> RpcMap {
    let mut results = RpcMap::new();
    put_error(&mut results, message);
    results
}
