//! Response decoding.
//!
//! [`decode_page`] and [`decode_record`] turn a back-end body into typed records.
//! With [`ResponseShape::Strict`] the body must be the documented envelope
//! `{ success: true, data, pagination? }` and anything else is a schema error.
//! With [`ResponseShape::Lenient`] the body goes through [`extract_array`], which
//! finds an array in whatever shape the back end chose and falls back to empty.

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use crate::{
    config::ResponseShape,
    error::{AppError, AppResult},
    models::{Page, Pagination},
};

/// Collection field names tried when the expected one is missing
pub const COMMON_FIELDS: [&str; 6] = ["guests", "rooms", "bookings", "items", "results", "records"];

/// Extract an array from a loosely shaped response. Never fails: a body without a
/// usable array yields an empty vector.
pub fn extract_array(data: &Value, field_name: Option<&str>) -> Vec<Value> {
    if let Value::Array(items) = data {
        tracing::trace!("Response is already an array");
        return items.clone();
    }

    let Value::Object(object) = data else {
        tracing::debug!("Response is not an object, no array extracted");
        return Vec::new();
    };

    if let Some(Value::Array(items)) = object.get("data") {
        tracing::trace!("Found array in data");
        return items.clone();
    }

    if let Some(field) = field_name {
        if let Some(Value::Array(items)) = object.get(field) {
            tracing::trace!(field, "Found array in named field");
            return items.clone();
        }
    }

    for field in COMMON_FIELDS {
        if let Some(Value::Array(items)) = object.get(field) {
            tracing::trace!(field, "Found array in common field");
            return items.clone();
        }
    }

    if object.len() == 1 {
        if let Some((key, Value::Array(items))) = object.iter().next() {
            tracing::trace!(field = %key, "Found array in single property");
            return items.clone();
        }
    }

    tracing::debug!("Could not extract an array, using an empty one");
    Vec::new()
}

/// The documented success envelope
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: T,
    #[serde(default)]
    pagination: Option<Pagination>,
    #[serde(default)]
    message: Option<String>,
}

/// `{ success: false, message }` answered with a 2xx status
pub(crate) fn unsuccessful(body: &Value) -> Option<AppError> {
    match body.get("success") {
        Some(Value::Bool(false)) => Some(AppError::Api {
            status: 200,
            message: body.get("message").and_then(Value::as_str).map(str::to_string),
        }),
        _ => None,
    }
}

fn strict_envelope<T: DeserializeOwned>(body: Value) -> AppResult<Envelope<T>> {
    if let Some(err) = unsuccessful(&body) {
        return Err(err);
    }
    let envelope: Envelope<T> = serde_json::from_value(body)
        .map_err(|e| AppError::Schema(format!("expected {{ success, data }} envelope: {}", e)))?;
    if !envelope.success {
        return Err(AppError::Api {
            status: 200,
            message: envelope.message,
        });
    }
    Ok(envelope)
}

/// Decode one page of records
pub fn decode_page<R: DeserializeOwned>(
    body: Value,
    shape: ResponseShape,
    field_name: &str,
    page: u32,
) -> AppResult<Page<R>> {
    match shape {
        ResponseShape::Strict => {
            let envelope: Envelope<Vec<R>> = strict_envelope(body)?;
            Ok(Page::new(envelope.data, page, envelope.pagination.as_ref()))
        }
        ResponseShape::Lenient => {
            if let Some(err) = unsuccessful(&body) {
                return Err(err);
            }
            let pagination = body
                .get("pagination")
                .cloned()
                .and_then(|p| serde_json::from_value::<Pagination>(p).ok());
            let items = extract_array(&body, Some(field_name))
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<Vec<R>, _>>()?;
            Ok(Page::new(items, page, pagination.as_ref()))
        }
    }
}

/// Decode a single record
pub fn decode_record<R: DeserializeOwned>(body: Value, shape: ResponseShape) -> AppResult<R> {
    match shape {
        ResponseShape::Strict => Ok(strict_envelope::<R>(body)?.data),
        ResponseShape::Lenient => {
            if let Some(err) = unsuccessful(&body) {
                return Err(err);
            }
            let record = match body {
                Value::Object(mut object) if object.get("data").map_or(false, Value::is_object) => {
                    object.remove("data").unwrap_or(Value::Null)
                }
                other => other,
            };
            Ok(serde_json::from_value(record)?)
        }
    }
}
