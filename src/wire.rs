//! JSON helpers for values crossing a process boundary.
//!
//! Serde already derives the encodings; these helpers keep formatting
//! stable and map failures into `PropmanError`.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{PropmanError, PropmanResult};

/// Serialize a value (typically a `StepReport` or `MultiEvent`) to pretty JSON.
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> PropmanResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| PropmanError::internal(format!("serialize: {e}")))
}

/// Deserialize a value from JSON.
pub fn from_json<T: DeserializeOwned>(s: &str) -> PropmanResult<T> {
    serde_json::from_str::<T>(s).map_err(|e| PropmanError::internal(format!("deserialize: {e}")))
}
